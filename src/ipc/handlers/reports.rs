use super::{db_conn, required_id, required_str};
use crate::ipc::error::{app_err, err, ok, reply, IpcCode};
use crate::ipc::types::{AppState, Request};
use crate::report::{self, ReportKind};
use serde::Serialize;
use serde_json::json;
use std::fmt::Display;

/// Structured rows for the grid plus the same report as console text.
fn report_json<T: Serialize + Display>(req: &Request, r: &T) -> serde_json::Value {
    match serde_json::to_value(r) {
        Ok(model) => ok(&req.id, json!({ "report": model, "text": r.to_string() })),
        Err(e) => err(&req.id, IpcCode::SerializeFailed, e.to_string(), None),
    }
}

fn top_n(state: &AppState, req: &Request) -> Result<usize, serde_json::Value> {
    match req.params.get("n") {
        None | Some(serde_json::Value::Null) => Ok(state.config.top_n),
        Some(v) => v
            .as_u64()
            .filter(|n| *n > 0)
            .map(|n| n as usize)
            .ok_or_else(|| err(&req.id, IpcCode::BadParams, "n must be a positive integer", None)),
    }
}

fn threshold(state: &AppState, req: &Request) -> Result<f64, serde_json::Value> {
    match req.params.get("threshold") {
        None | Some(serde_json::Value::Null) => Ok(state.config.at_risk_threshold),
        Some(v) => v
            .as_f64()
            .filter(|t| t.is_finite())
            .ok_or_else(|| err(&req.id, IpcCode::BadParams, "threshold must be a number", None)),
    }
}

fn parse_kind(state: &AppState, req: &Request) -> Result<ReportKind, serde_json::Value> {
    let kind = req
        .params
        .get("kind")
        .and_then(|v| v.as_str())
        .unwrap_or("summary");
    Ok(match kind {
        "studentList" => ReportKind::StudentList,
        "gradeSummary" => ReportKind::GradeSummary,
        "transcript" => ReportKind::Transcript(required_id(req, "studentId")?),
        "topPerformers" => ReportKind::TopPerformers(top_n(state, req)?),
        "courseStats" => ReportKind::CourseStats,
        "atRisk" => ReportKind::AtRisk(threshold(state, req)?),
        "summary" => ReportKind::Summary,
        other => {
            return Err(err(
                &req.id,
                IpcCode::BadParams,
                format!("unknown report kind: {}", other),
                None,
            ))
        }
    })
}

fn handle_report(state: &mut AppState, req: &Request) -> serde_json::Value {
    let db = match db_conn(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let built = match req.method.as_str() {
        "reports.studentList" => report::student_list(db).map(|r| report_json(req, &r)),
        "reports.gradeSummary" => report::grade_summary(db).map(|r| report_json(req, &r)),
        "reports.transcript" => match required_id(req, "studentId") {
            Ok(id) => report::transcript(db, id).map(|r| report_json(req, &r)),
            Err(e) => return e,
        },
        "reports.topPerformers" => match top_n(state, req) {
            Ok(n) => report::top_performers(db, n).map(|r| report_json(req, &r)),
            Err(e) => return e,
        },
        "reports.courseStats" => report::course_stats(db).map(|r| report_json(req, &r)),
        "reports.atRisk" => match threshold(state, req) {
            Ok(t) => report::at_risk(db, t).map(|r| report_json(req, &r)),
            Err(e) => return e,
        },
        _ => report::summary(db).map(|r| report_json(req, &r)),
    };
    built.unwrap_or_else(|e| app_err(&req.id, &e))
}

fn handle_export(state: &mut AppState, req: &Request) -> serde_json::Value {
    let db = match db_conn(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let path = match required_str(req, "path") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let kind = match parse_kind(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let written = report::render(db, kind).and_then(|text| report::export_report(&path, &text));
    reply(&req.id, written.map(|p| json!({ "path": p.to_string_lossy() })))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "reports.studentList"
        | "reports.gradeSummary"
        | "reports.transcript"
        | "reports.topPerformers"
        | "reports.courseStats"
        | "reports.atRisk"
        | "reports.summary" => Some(handle_report(state, req)),
        "reports.export" => Some(handle_export(state, req)),
        _ => None,
    }
}
