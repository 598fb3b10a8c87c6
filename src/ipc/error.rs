use crate::error::{AppError, AppResult};
use serde_json::json;

/// Failures raised by the sidecar itself rather than by the record layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpcCode {
    BadJson,
    BadParams,
    NoDatabase,
    AuthFailed,
    NotFound,
    NotImplemented,
    SerializeFailed,
}

impl IpcCode {
    pub fn as_str(self) -> &'static str {
        match self {
            IpcCode::BadJson => "bad_json",
            IpcCode::BadParams => "bad_params",
            IpcCode::NoDatabase => "no_database",
            IpcCode::AuthFailed => "auth_failed",
            IpcCode::NotFound => "not_found",
            IpcCode::NotImplemented => "not_implemented",
            IpcCode::SerializeFailed => "serialize_failed",
        }
    }
}

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

pub fn err(
    id: &str,
    code: IpcCode,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    failure(Some(id), code.as_str(), message.into(), details)
}

/// `bad_params` naming the offending field in `details.field`.
pub fn bad_field(id: &str, field: &str, message: impl Into<String>) -> serde_json::Value {
    err(id, IpcCode::BadParams, message, Some(json!({ "field": field })))
}

/// Reply to a line that did not parse; there is no id to echo.
pub fn bad_json(message: impl Into<String>) -> serde_json::Value {
    failure(None, IpcCode::BadJson.as_str(), message.into(), None)
}

/// Error response carrying the code and details of an [`AppError`].
pub fn app_err(id: &str, e: &AppError) -> serde_json::Value {
    if let AppError::Query(_) = e {
        log::warn!("request {id}: {e}");
    }
    failure(Some(id), e.code(), e.to_string(), e.details())
}

pub fn reply(id: &str, result: AppResult<serde_json::Value>) -> serde_json::Value {
    match result {
        Ok(v) => ok(id, v),
        Err(e) => app_err(id, &e),
    }
}

fn failure(
    id: Option<&str>,
    code: &str,
    message: String,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({
        "code": code,
        "message": message,
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    let mut resp = json!({
        "ok": false,
        "error": error,
    });
    if let Some(id) = id {
        resp["id"] = json!(id);
    }
    resp
}
