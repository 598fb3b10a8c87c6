use super::{db_conn, form_from, outcome_json, patch_form, required_id, ListQuery};
use crate::ipc::error::reply;
use crate::ipc::types::{AppState, Request};
use crate::records::students::{self, StudentForm};
use serde_json::json;

fn handle_list(state: &mut AppState, req: &Request) -> serde_json::Value {
    let db = match db_conn(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let query = match ListQuery::parse(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let listed = students::list(db, query.filter.as_deref()).map(|mut rows| {
        if query.sort_by_id {
            rows.sort_by_key(|s| s.id);
        }
        json!({ "students": rows })
    });
    reply(&req.id, listed)
}

fn handle_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (db, id) = match db_conn(state, req).and_then(|db| Ok((db, required_id(req, "id")?))) {
        Ok(v) => v,
        Err(e) => return e,
    };
    reply(&req.id, students::get(db, id).map(|student| json!({ "student": student })))
}

fn handle_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let db = match db_conn(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let form: StudentForm = match form_from(req, &req.params) {
        Ok(v) => v,
        Err(e) => return e,
    };
    reply(&req.id, students::create(db, &form).map(|id| json!({ "id": id })))
}

fn handle_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (db, id) = match db_conn(state, req).and_then(|db| Ok((db, required_id(req, "id")?))) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let patch: StudentForm = match patch_form(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    reply(&req.id, students::update(db, id, &patch).map(outcome_json))
}

fn handle_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (db, id) = match db_conn(state, req).and_then(|db| Ok((db, required_id(req, "id")?))) {
        Ok(v) => v,
        Err(e) => return e,
    };
    reply(&req.id, students::delete(db, id).map(|_| json!({ "ok": true })))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.list" => Some(handle_list(state, req)),
        "students.get" => Some(handle_get(state, req)),
        "students.create" => Some(handle_create(state, req)),
        "students.update" => Some(handle_update(state, req)),
        "students.delete" => Some(handle_delete(state, req)),
        _ => None,
    }
}
