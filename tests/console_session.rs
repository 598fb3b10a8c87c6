use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
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

/// Run a console session over piped stdin and return (exit code, stdout).
fn run_console(db: &Path, extra: &[&str], input: &str) -> (Option<i32>, String) {
    let exe = env!("CARGO_BIN_EXE_gradebook");
    let mut child = Command::new(exe)
        .args(extra)
        .arg("--db")
        .arg(db)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn gradebook");
    {
        let mut stdin = child.stdin.take().expect("child stdin");
        stdin.write_all(input.as_bytes()).expect("write input");
    }
    let out = child.wait_with_output().expect("wait for gradebook");
    (
        out.status.code(),
        String::from_utf8_lossy(&out.stdout).to_string(),
    )
}

#[test]
fn add_course_then_exit_persists_the_record() {
    let workspace = temp_dir("gradebook-console-add");
    let db = workspace.join("gb.sqlite3");

    let input = "admin\nadmin123\n9\n2\n4\nCS101\nIntro\n3\n\n\n\n7\n7\ny\n";
    let (code, out) = run_console(&db, &["--init"], input);
    assert_eq!(code, Some(0));
    assert!(out.contains("Login successful! Welcome System Administrator"));
    assert!(out.contains("Invalid choice. Please try again."));
    assert!(out.contains("Course added successfully with ID 1."));
    assert!(out.contains("Thank you for using Student Grade Management System!"));

    // A second session, without --init, sees the course written by the first.
    let (code, out) = run_console(&db, &[], "admin\nadmin123\n2\n1\n7\n7\ny\n");
    assert_eq!(code, Some(0));
    assert!(out.contains("CS101"));

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn three_bad_logins_end_the_program() {
    let workspace = temp_dir("gradebook-console-login");
    let db = workspace.join("gb.sqlite3");

    let (code, out) = run_console(&db, &["--init"], "admin\nx\nadmin\ny\nadmin\nz\n");
    assert_eq!(code, Some(0));
    assert!(out.contains("Attempts remaining: 2"));
    assert!(out.contains("Login failed. Exiting..."));
    assert!(!out.contains("MAIN MENU"));

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn closed_input_ends_the_session_cleanly() {
    let workspace = temp_dir("gradebook-console-eof");
    let db = workspace.join("gb.sqlite3");

    let (code, out) = run_console(&db, &["--init"], "admin\nadmin123\n");
    assert_eq!(code, Some(0));
    assert!(out.contains("MAIN MENU"));

    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn missing_database_refuses_to_start_the_console() {
    let workspace = temp_dir("gradebook-console-missing");
    let db = workspace.join("typo.sqlite3");

    let (code, out) = run_console(&db, &[], "admin\nadmin123\n");
    assert_eq!(code, Some(1));
    assert!(!out.contains("LOGIN"));
    assert!(!db.exists());

    let _ = std::fs::remove_dir_all(workspace);
}
