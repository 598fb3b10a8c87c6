pub mod auth;
pub mod backup;
pub mod core;
pub mod courses;
pub mod grades;
pub mod reports;
pub mod students;

use crate::db::Db;
use crate::ipc::error::{bad_field, err, IpcCode};
use crate::ipc::types::{AppState, Request};
use crate::records::{Field, Form, UpdateOutcome};
use serde_json::json;

pub(crate) fn db_conn<'a>(state: &'a AppState, req: &Request) -> Result<&'a Db, serde_json::Value> {
    state
        .db
        .as_ref()
        .ok_or_else(|| err(&req.id, IpcCode::NoDatabase, "open a database first", None))
}

pub(crate) fn required_str(req: &Request, key: &str) -> Result<String, serde_json::Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| err(&req.id, IpcCode::BadParams, format!("missing {}", key), None))
}

/// Integer id from a JSON number or a numeric string.
pub(crate) fn required_id(req: &Request, key: &str) -> Result<i64, serde_json::Value> {
    optional_id(req, key)?
        .ok_or_else(|| err(&req.id, IpcCode::BadParams, format!("missing {}", key), None))
}

pub(crate) fn optional_id(req: &Request, key: &str) -> Result<Option<i64>, serde_json::Value> {
    match req.params.get(key) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(v) => v
            .as_i64()
            .or_else(|| v.as_str().and_then(|s| s.trim().parse::<i64>().ok()))
            .map(Some)
            .ok_or_else(|| bad_field(&req.id, key, format!("{} must be an integer id", key))),
    }
}

/// Build a form from the fields of `obj` named by each field's key. Strings
/// and numbers are accepted; null or absent means "not supplied".
pub(crate) fn form_from<F: Field>(
    req: &Request,
    obj: &serde_json::Value,
) -> Result<Form<F>, serde_json::Value> {
    let mut form = Form::new();
    for field in F::ALL {
        match obj.get(field.key()) {
            None | Some(serde_json::Value::Null) => {}
            Some(serde_json::Value::String(s)) => form.set(*field, s.as_str()),
            Some(serde_json::Value::Number(n)) => form.set(*field, n.to_string()),
            Some(_) => {
                return Err(bad_field(
                    &req.id,
                    field.key(),
                    format!("{} must be a string or a number", field.key()),
                ))
            }
        }
    }
    Ok(form)
}

/// The `patch` object of an update request.
pub(crate) fn patch_form<F: Field>(req: &Request) -> Result<Form<F>, serde_json::Value> {
    match req.params.get("patch") {
        Some(p) if p.is_object() => form_from(req, p),
        _ => Err(err(&req.id, IpcCode::BadParams, "missing patch object", None)),
    }
}

pub(crate) struct ListQuery {
    pub filter: Option<String>,
    pub sort_by_id: bool,
}

impl ListQuery {
    pub(crate) fn parse(req: &Request) -> Result<Self, serde_json::Value> {
        let filter = req
            .params
            .get("filter")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());
        let sort_by_id = match req.params.get("sortBy").and_then(|v| v.as_str()) {
            None => false,
            Some("id") => true,
            Some(other) => {
                return Err(err(
                    &req.id,
                    IpcCode::BadParams,
                    format!("unsupported sortBy: {}", other),
                    Some(json!({ "allowed": ["id"] })),
                ))
            }
        };
        Ok(Self { filter, sort_by_id })
    }
}

pub(crate) fn outcome_json(outcome: UpdateOutcome) -> serde_json::Value {
    match outcome {
        UpdateOutcome::Updated => json!({ "outcome": "updated" }),
        UpdateOutcome::NoChanges => json!({ "outcome": "noChanges" }),
    }
}
