use super::{
    db_conn, form_from, optional_id, outcome_json, patch_form, required_id, ListQuery,
};
use crate::ipc::error::reply;
use crate::ipc::types::{AppState, Request};
use crate::records::grades::{self, GradeForm};
use serde_json::json;

/// `studentId` or `courseId` narrow the listing; otherwise `filter` matches
/// student and course names.
fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let db = match db_conn(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let query = match ListQuery::parse(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let scoped = match (optional_id(req, "studentId"), optional_id(req, "courseId")) {
        (Err(e), _) | (_, Err(e)) => return e,
        (Ok(Some(student_id)), _) => grades::list_for_student(db, student_id),
        (Ok(None), Ok(Some(course_id))) => grades::list_for_course(db, course_id),
        (Ok(None), Ok(None)) => grades::list(db, query.filter.as_deref()),
    };
    let listed = scoped.map(|mut rows| {
        if query.sort_by_id {
            rows.sort_by_key(|g| g.id);
        }
        json!({ "grades": rows })
    });
    reply(&req.id, listed)
}

fn handle_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (db, id) = match db_conn(state, req).and_then(|db| Ok((db, required_id(req, "id")?))) {
        Ok(v) => v,
        Err(e) => return e,
    };
    reply(&req.id, grades::get(db, id).map(|grade| json!({ "grade": grade })))
}

fn handle_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let db = match db_conn(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let form: GradeForm = match form_from(req, &req.params) {
        Ok(v) => v,
        Err(e) => return e,
    };
    reply(&req.id, grades::create(db, &form).map(|id| json!({ "id": id })))
}

fn handle_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (db, id) = match db_conn(state, req).and_then(|db| Ok((db, required_id(req, "id")?))) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let patch: GradeForm = match patch_form(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    reply(&req.id, grades::update(db, id, &patch).map(outcome_json))
}

fn handle_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (db, id) = match db_conn(state, req).and_then(|db| Ok((db, required_id(req, "id")?))) {
        Ok(v) => v,
        Err(e) => return e,
    };
    reply(&req.id, grades::delete(db, id).map(|_| json!({ "ok": true })))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "grades.list" => Some(handle_list(state, req)),
        "grades.get" => Some(handle_get(state, req)),
        "grades.create" => Some(handle_create(state, req)),
        "grades.update" => Some(handle_update(state, req)),
        "grades.delete" => Some(handle_delete(state, req)),
        _ => None,
    }
}
