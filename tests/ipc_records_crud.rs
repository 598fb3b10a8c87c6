use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_sidecar(db: &Path) -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_gradebook");
    let mut child = Command::new(exe)
        .arg("--ipc")
        .arg("--init")
        .arg("--db")
        .arg(db)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn gradebook");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let value = request(stdin, reader, id, method, params);
    assert_eq!(
        value.get("ok").and_then(|v| v.as_bool()),
        Some(true),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or(json!({}))
}

fn error_code(value: &serde_json::Value) -> Option<&str> {
    value
        .get("error")
        .and_then(|e| e.get("code"))
        .and_then(|v| v.as_str())
}

#[test]
fn course_lifecycle_keeps_credits_on_blank_patch() {
    let workspace = temp_dir("gradebook-course-crud");
    let (mut child, mut stdin, mut reader) = spawn_sidecar(&workspace.join("gb.sqlite3"));

    let created = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "courses.create",
        json!({ "code": "CS101", "name": "Intro", "credits": 3 }),
    );
    let id = created["id"].as_i64().expect("course id");

    let patched = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "courses.update",
        json!({ "id": id, "patch": { "credits": "" } }),
    );
    assert_eq!(patched["outcome"].as_str(), Some("noChanges"));

    let got = request_ok(&mut stdin, &mut reader, "3", "courses.get", json!({ "id": id }));
    assert_eq!(got["course"]["code"].as_str(), Some("CS101"));
    assert_eq!(got["course"]["credits"].as_i64(), Some(3));

    let renamed = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "courses.update",
        json!({ "id": id.to_string(), "patch": { "name": "Intro to Computing", "credits": 4 } }),
    );
    assert_eq!(renamed["outcome"].as_str(), Some("updated"));
    let got = request_ok(&mut stdin, &mut reader, "5", "courses.get", json!({ "id": id }));
    assert_eq!(got["course"]["name"].as_str(), Some("Intro to Computing"));
    assert_eq!(got["course"]["credits"].as_i64(), Some(4));

    let bad = request(
        &mut stdin,
        &mut reader,
        "6",
        "courses.update",
        json!({ "id": id, "patch": { "credits": "lots" } }),
    );
    assert_eq!(error_code(&bad), Some("bad_params"));
    assert_eq!(bad["error"]["details"]["field"].as_str(), Some("credits"));

    request_ok(&mut stdin, &mut reader, "7", "courses.delete", json!({ "id": id }));
    let gone = request_ok(&mut stdin, &mut reader, "8", "courses.get", json!({ "id": id }));
    assert!(gone["course"].is_null());

    let again = request(&mut stdin, &mut reader, "9", "courses.delete", json!({ "id": id }));
    assert_eq!(error_code(&again), Some("not_found"));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn student_list_filters_and_sorts() {
    let workspace = temp_dir("gradebook-student-crud");
    let (mut child, mut stdin, mut reader) = spawn_sidecar(&workspace.join("gb.sqlite3"));

    for (i, (first, last)) in [("Grace", "Hopper"), ("Ada", "Lovelace"), ("Alan", "Turing")]
        .iter()
        .enumerate()
    {
        request_ok(
            &mut stdin,
            &mut reader,
            &format!("s{}", i),
            "students.create",
            json!({ "firstName": first, "lastName": last, "gender": "f", "department": "CS" }),
        );
    }

    let missing_name = request(
        &mut stdin,
        &mut reader,
        "m",
        "students.create",
        json!({ "firstName": "Solo" }),
    );
    assert_eq!(error_code(&missing_name), Some("bad_params"));

    let bad_date = request(
        &mut stdin,
        &mut reader,
        "d",
        "students.create",
        json!({ "firstName": "Kat", "lastName": "Johnson", "dateOfBirth": "1918/08/26" }),
    );
    assert_eq!(error_code(&bad_date), Some("bad_params"));

    let filtered = request_ok(
        &mut stdin,
        &mut reader,
        "f",
        "students.list",
        json!({ "filter": "LOVE" }),
    );
    let rows = filtered["students"].as_array().expect("students");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["firstName"].as_str(), Some("Ada"));
    assert_eq!(rows[0]["gender"].as_str(), Some("F"));
    assert_eq!(rows[0]["status"].as_str(), Some("Active"));

    let by_id = request_ok(
        &mut stdin,
        &mut reader,
        "i",
        "students.list",
        json!({ "sortBy": "id" }),
    );
    let ids: Vec<i64> = by_id["students"]
        .as_array()
        .expect("students")
        .iter()
        .filter_map(|s| s["id"].as_i64())
        .collect();
    assert_eq!(ids, vec![1, 2, 3]);

    let bad_sort = request(
        &mut stdin,
        &mut reader,
        "b",
        "students.list",
        json!({ "sortBy": "gpa" }),
    );
    assert_eq!(error_code(&bad_sort), Some("bad_params"));

    let missing = request(
        &mut stdin,
        &mut reader,
        "u",
        "students.update",
        json!({ "id": 99, "patch": {} }),
    );
    assert_eq!(error_code(&missing), Some("not_found"));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn grades_validate_ranges_and_filter_by_owner() {
    let workspace = temp_dir("gradebook-grade-crud");
    let (mut child, mut stdin, mut reader) = spawn_sidecar(&workspace.join("gb.sqlite3"));

    request_ok(
        &mut stdin,
        &mut reader,
        "s",
        "students.create",
        json!({ "firstName": "Ada", "lastName": "Lovelace" }),
    );
    request_ok(
        &mut stdin,
        &mut reader,
        "c",
        "courses.create",
        json!({ "code": "CS101", "name": "Intro" }),
    );

    let created = request_ok(
        &mut stdin,
        &mut reader,
        "g1",
        "grades.create",
        json!({ "studentId": 1, "courseId": 1, "firstSemester": 85, "secondSemester": "90", "gpa": 3.5 }),
    );
    let grade_id = created["id"].as_i64().expect("grade id");

    let too_high = request(
        &mut stdin,
        &mut reader,
        "g2",
        "grades.create",
        json!({ "studentId": 1, "courseId": 1, "gpa": 4.5 }),
    );
    assert_eq!(error_code(&too_high), Some("bad_params"));
    assert_eq!(too_high["error"]["details"]["field"].as_str(), Some("gpa"));

    let negative = request(
        &mut stdin,
        &mut reader,
        "g3",
        "grades.update",
        json!({ "id": grade_id, "patch": { "firstSemester": -1 } }),
    );
    assert_eq!(error_code(&negative), Some("bad_params"));

    // Enrollments may point at records that do not exist.
    request_ok(
        &mut stdin,
        &mut reader,
        "g4",
        "grades.create",
        json!({ "studentId": 42, "courseId": 1 }),
    );

    let got = request_ok(&mut stdin, &mut reader, "g5", "grades.get", json!({ "id": grade_id }));
    assert_eq!(got["grade"]["studentName"].as_str(), Some("Ada Lovelace"));
    assert_eq!(got["grade"]["courseName"].as_str(), Some("Intro"));
    assert_eq!(got["grade"]["gpa"].as_f64(), Some(3.5));
    assert_eq!(got["grade"]["status"].as_str(), Some("Enrolled"));

    let for_student = request_ok(
        &mut stdin,
        &mut reader,
        "g6",
        "grades.list",
        json!({ "studentId": 1 }),
    );
    assert_eq!(for_student["grades"].as_array().map(|a| a.len()), Some(1));

    let for_course = request_ok(
        &mut stdin,
        &mut reader,
        "g7",
        "grades.list",
        json!({ "courseId": "1" }),
    );
    assert_eq!(for_course["grades"].as_array().map(|a| a.len()), Some(2));

    let by_name = request_ok(
        &mut stdin,
        &mut reader,
        "g8",
        "grades.list",
        json!({ "filter": "ada" }),
    );
    assert_eq!(by_name["grades"].as_array().map(|a| a.len()), Some(1));

    let done = request_ok(
        &mut stdin,
        &mut reader,
        "g9",
        "grades.update",
        json!({ "id": grade_id, "patch": { "status": "completed" } }),
    );
    assert_eq!(done["outcome"].as_str(), Some("updated"));

    request_ok(&mut stdin, &mut reader, "g10", "grades.delete", json!({ "id": grade_id }));
    let gone = request_ok(&mut stdin, &mut reader, "g11", "grades.get", json!({ "id": grade_id }));
    assert!(gone["grade"].is_null());

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
