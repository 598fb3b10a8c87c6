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

fn approx(value: &serde_json::Value, expected: f64) -> bool {
    value
        .as_f64()
        .map(|v| (v - expected).abs() < 1e-9)
        .unwrap_or(false)
}

/// Ada: CS101 4.0 and MA201 2.0. Alan: CS101 1.5. Grace (graduated): CS101 1.0.
fn seed(stdin: &mut ChildStdin, reader: &mut BufReader<ChildStdout>) {
    let students = [
        ("Ada", "Lovelace", "Active"),
        ("Alan", "Turing", "Active"),
        ("Grace", "Hopper", "Graduated"),
    ];
    for (i, (first, last, status)) in students.iter().enumerate() {
        request_ok(
            stdin,
            reader,
            &format!("seed-s{}", i),
            "students.create",
            json!({ "firstName": first, "lastName": last, "status": status }),
        );
    }
    request_ok(
        stdin,
        reader,
        "seed-c1",
        "courses.create",
        json!({ "code": "CS101", "name": "Intro", "credits": 3 }),
    );
    request_ok(
        stdin,
        reader,
        "seed-c2",
        "courses.create",
        json!({ "code": "MA201", "name": "Linear Algebra", "credits": 1 }),
    );
    let grades = [(1, 1, 4.0), (1, 2, 2.0), (2, 1, 1.5), (3, 1, 1.0)];
    for (i, (student, course, gpa)) in grades.iter().enumerate() {
        request_ok(
            stdin,
            reader,
            &format!("seed-g{}", i),
            "grades.create",
            json!({ "studentId": student, "courseId": course, "gpa": gpa }),
        );
    }
}

#[test]
fn analytic_reports_follow_the_seeded_grades() {
    let workspace = temp_dir("gradebook-reports");
    let (mut child, mut stdin, mut reader) = spawn_sidecar(&workspace.join("gb.sqlite3"));
    seed(&mut stdin, &mut reader);

    let transcript = request_ok(
        &mut stdin,
        &mut reader,
        "t",
        "reports.transcript",
        json!({ "studentId": 1 }),
    );
    let overall = &transcript["report"]["overall"];
    assert!(approx(&overall["gpa"], 3.5));
    assert!(approx(&overall["creditsGraded"], 4.0));
    assert_eq!(transcript["report"]["lines"].as_array().map(|a| a.len()), Some(2));
    assert!(transcript["text"]
        .as_str()
        .unwrap_or_default()
        .contains("Overall GPA: 3.50"));

    let top = request_ok(
        &mut stdin,
        &mut reader,
        "p",
        "reports.topPerformers",
        json!({ "n": 2 }),
    );
    let ranked = top["report"]["ranked"].as_array().expect("ranked");
    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0]["key"]["name"].as_str(), Some("Ada Lovelace"));
    assert!(approx(&ranked[0]["average"], 3.0));
    assert_eq!(ranked[1]["key"]["name"].as_str(), Some("Alan Turing"));
    assert_eq!(top["report"]["eligible"].as_u64(), Some(3));

    let at_risk = request_ok(
        &mut stdin,
        &mut reader,
        "r",
        "reports.atRisk",
        json!({ "threshold": 2.0 }),
    );
    let flagged = at_risk["report"]["students"].as_array().expect("students");
    assert_eq!(flagged.len(), 1);
    assert_eq!(flagged[0]["key"]["name"].as_str(), Some("Alan Turing"));

    let stats = request_ok(&mut stdin, &mut reader, "c", "reports.courseStats", json!({}));
    let courses = stats["report"]["courses"].as_array().expect("courses");
    assert_eq!(courses.len(), 2);
    assert_eq!(courses[0]["code"].as_str(), Some("CS101"));
    assert_eq!(courses[0]["totalEnrollments"].as_u64(), Some(3));
    assert!(approx(&courses[0]["average"], 6.5 / 3.0));
    assert!(approx(&courses[1]["average"], 2.0));

    let summary = request_ok(&mut stdin, &mut reader, "s", "reports.summary", json!({}));
    assert_eq!(summary["report"]["students"].as_i64(), Some(3));
    assert_eq!(summary["report"]["courses"].as_i64(), Some(2));
    assert_eq!(summary["report"]["grades"].as_i64(), Some(4));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn transcript_for_unknown_student_is_not_found() {
    let workspace = temp_dir("gradebook-reports-missing");
    let (mut child, mut stdin, mut reader) = spawn_sidecar(&workspace.join("gb.sqlite3"));

    let resp = request(
        &mut stdin,
        &mut reader,
        "1",
        "reports.transcript",
        json!({ "studentId": 7 }),
    );
    assert_eq!(resp["ok"].as_bool(), Some(false));
    assert_eq!(resp["error"]["code"].as_str(), Some("not_found"));

    let bad_n = request(
        &mut stdin,
        &mut reader,
        "2",
        "reports.topPerformers",
        json!({ "n": 0 }),
    );
    assert_eq!(bad_n["error"]["code"].as_str(), Some("bad_params"));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn export_writes_report_text_to_disk() {
    let workspace = temp_dir("gradebook-reports-export");
    let (mut child, mut stdin, mut reader) = spawn_sidecar(&workspace.join("gb.sqlite3"));
    seed(&mut stdin, &mut reader);

    let target = workspace.join("transcript-ada");
    let written = request_ok(
        &mut stdin,
        &mut reader,
        "e",
        "reports.export",
        json!({ "path": target.to_string_lossy(), "kind": "transcript", "studentId": 1 }),
    );
    let path = PathBuf::from(written["path"].as_str().expect("path"));
    assert_eq!(path, workspace.join("transcript-ada.txt"));
    let text = std::fs::read_to_string(&path).expect("read export");
    assert!(text.contains("Ada Lovelace"));
    assert!(text.contains("Overall GPA: 3.50"));

    let unknown = request(
        &mut stdin,
        &mut reader,
        "u",
        "reports.export",
        json!({ "path": target.to_string_lossy(), "kind": "honourRoll" }),
    );
    assert_eq!(unknown["error"]["code"].as_str(), Some("bad_params"));

    drop(stdin);
    let _ = child.wait();
    let _ = std::fs::remove_dir_all(workspace);
}
