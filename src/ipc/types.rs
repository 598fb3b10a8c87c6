use crate::auth::UserInfo;
use crate::config::Config;
use crate::db::Db;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub config: Config,
    pub db: Option<Db>,
    pub user: Option<UserInfo>,
}

impl AppState {
    pub fn new(config: Config, db: Option<Db>) -> Self {
        Self {
            config,
            db,
            user: None,
        }
    }
}
