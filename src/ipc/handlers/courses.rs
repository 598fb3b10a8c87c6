use super::{db_conn, form_from, outcome_json, patch_form, required_id, ListQuery};
use crate::ipc::error::reply;
use crate::ipc::types::{AppState, Request};
use crate::records::courses::{self, CourseForm};
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
    let listed = courses::list(db, query.filter.as_deref()).map(|mut rows| {
        if query.sort_by_id {
            rows.sort_by_key(|c| c.id);
        }
        json!({ "courses": rows })
    });
    reply(&req.id, listed)
}

fn handle_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (db, id) = match db_conn(state, req).and_then(|db| Ok((db, required_id(req, "id")?))) {
        Ok(v) => v,
        Err(e) => return e,
    };
    reply(&req.id, courses::get(db, id).map(|course| json!({ "course": course })))
}

fn handle_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let db = match db_conn(state, req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let form: CourseForm = match form_from(req, &req.params) {
        Ok(v) => v,
        Err(e) => return e,
    };
    reply(&req.id, courses::create(db, &form).map(|id| json!({ "id": id })))
}

fn handle_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (db, id) = match db_conn(state, req).and_then(|db| Ok((db, required_id(req, "id")?))) {
        Ok(v) => v,
        Err(e) => return e,
    };
    let patch: CourseForm = match patch_form(req) {
        Ok(v) => v,
        Err(e) => return e,
    };
    reply(&req.id, courses::update(db, id, &patch).map(outcome_json))
}

fn handle_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (db, id) = match db_conn(state, req).and_then(|db| Ok((db, required_id(req, "id")?))) {
        Ok(v) => v,
        Err(e) => return e,
    };
    reply(&req.id, courses::delete(db, id).map(|_| json!({ "ok": true })))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "courses.list" => Some(handle_list(state, req)),
        "courses.get" => Some(handle_get(state, req)),
        "courses.create" => Some(handle_create(state, req)),
        "courses.update" => Some(handle_update(state, req)),
        "courses.delete" => Some(handle_delete(state, req)),
        _ => None,
    }
}
