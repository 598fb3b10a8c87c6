use crate::db::Db;
use crate::ipc::error::{app_err, err, ok, IpcCode};
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::PathBuf;

fn handle_health(state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(
        &req.id,
        json!({
            "version": env!("CARGO_PKG_VERSION"),
            "dbPath": state.db.as_ref().map(|db| db.path().to_string_lossy().to_string()),
            "user": state.user,
        }),
    )
}

fn handle_db_open(state: &mut AppState, req: &Request) -> serde_json::Value {
    let p = req
        .params
        .get("path")
        .and_then(|v| v.as_str())
        .map(PathBuf::from);
    let Some(path) = p else {
        return err(&req.id, IpcCode::BadParams, "missing params.path", None);
    };

    let create = req
        .params
        .get("create")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);
    let opened = if create {
        Db::create(&path)
    } else {
        Db::open(&path)
    };
    match opened {
        Ok(db) => {
            if let Some(old) = state.db.replace(db) {
                old.close();
            }
            state.config.db_path = path.clone();
            ok(&req.id, json!({ "dbPath": path.to_string_lossy() }))
        }
        Err(e) => app_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "health" => Some(handle_health(state, req)),
        "db.open" => Some(handle_db_open(state, req)),
        _ => None,
    }
}
