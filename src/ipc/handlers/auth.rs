use super::{db_conn, required_str};
use crate::auth::{Authenticator, SqliteCredentialStore, StaticCredentials};
use crate::config::AuthBackend;
use crate::ipc::error::{err, ok, IpcCode};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_login(state: &mut AppState, req: &Request) -> serde_json::Value {
    let creds =
        required_str(req, "username").and_then(|u| Ok((u, required_str(req, "password")?)));
    let (username, password) = match creds {
        Ok(v) => v,
        Err(e) => return e,
    };

    let user = match state.config.auth {
        AuthBackend::Static => StaticCredentials::with_defaults().verify(&username, &password),
        AuthBackend::Database => match db_conn(state, req) {
            Ok(db) => SqliteCredentialStore::new(db).verify(&username, &password),
            Err(e) => return e,
        },
    };
    let Some(user) = user else {
        log::info!("failed login for {username}");
        return err(&req.id, IpcCode::AuthFailed, "invalid username or password", None);
    };

    log::info!("{} logged in over ipc", user.username);
    let result = json!({ "user": user });
    state.user = Some(user);
    ok(&req.id, result)
}

fn handle_logout(state: &mut AppState, req: &Request) -> serde_json::Value {
    let was = state.user.take().map(|u| u.username);
    ok(&req.id, json!({ "loggedOut": was }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "auth.login" => Some(handle_login(state, req)),
        "auth.logout" => Some(handle_logout(state, req)),
        _ => None,
    }
}
