use super::required_str;
use crate::backup;
use crate::db::Db;
use crate::ipc::error::{app_err, err, reply, IpcCode};
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::PathBuf;

fn handle_backup_export(state: &mut AppState, req: &Request) -> serde_json::Value {
    let out_path = match required_str(req, "outPath") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let db_path = state
        .db
        .as_ref()
        .map(|db| db.path().to_path_buf())
        .unwrap_or_else(|| state.config.db_path.clone());

    let exported = backup::export_database_bundle(&db_path, &PathBuf::from(&out_path));
    reply(
        &req.id,
        exported.map(|summary| {
            json!({
                "path": out_path,
                "bundleId": summary.bundle_id,
                "bytes": summary.bytes,
            })
        }),
    )
}

fn handle_backup_import(state: &mut AppState, req: &Request) -> serde_json::Value {
    let in_path = match required_str(req, "inPath") {
        Ok(v) => v,
        Err(e) => return e,
    };
    let src = PathBuf::from(&in_path);
    if !src.is_file() {
        return err(
            &req.id,
            IpcCode::NotFound,
            "backup file not found",
            Some(json!({ "path": in_path })),
        );
    }

    // The connection must be closed before its file is replaced.
    let db_path = match state.db.take() {
        Some(db) => {
            let path = db.path().to_path_buf();
            db.close();
            path
        }
        None => state.config.db_path.clone(),
    };

    let imported = backup::import_database_bundle(&src, &db_path);
    match Db::open(&db_path) {
        Ok(db) => state.db = Some(db),
        Err(e) => return app_err(&req.id, &e),
    }
    reply(
        &req.id,
        imported.map(|summary| {
            json!({
                "dbPath": db_path.to_string_lossy(),
                "formatDetected": summary.format_detected,
                "bundleId": summary.bundle_id,
            })
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "backup.export" => Some(handle_backup_export(state, req)),
        "backup.import" => Some(handle_backup_import(state, req)),
        _ => None,
    }
}
