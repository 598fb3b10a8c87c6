use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("could not open database {path}: {source}")]
    Connection {
        path: String,
        #[source]
        source: rusqlite::Error,
    },
    #[error("query failed: {0}")]
    Query(#[from] rusqlite::Error),
    #[error("{field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },
    #[error("could not write {path}: {source}")]
    Export {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{0:#}")]
    Backup(anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        AppError::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn not_found(entity: &'static str, id: i64) -> Self {
        AppError::NotFound { entity, id }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Connection { .. } => "db_open_failed",
            AppError::Query(_) => "db_query_failed",
            AppError::Validation { .. } => "bad_params",
            AppError::NotFound { .. } => "not_found",
            AppError::Export { .. } => "export_failed",
            AppError::Backup(_) => "backup_failed",
        }
    }

    /// Extra structured context for the sidecar error payload.
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            AppError::Validation { field, .. } => Some(json!({ "field": field })),
            AppError::NotFound { entity, id } => Some(json!({ "entity": entity, "id": id })),
            AppError::Export { path, .. } => Some(json!({ "path": path })),
            _ => None,
        }
    }

    /// Text shown to a console user. Query failures stay generic; the driver
    /// message goes to the log instead.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Query(_) => "The operation failed. Please try again.".to_string(),
            AppError::NotFound { entity, id } => {
                format!("No {} with ID {} exists. Please check the ID.", entity, id)
            }
            other => other.to_string(),
        }
    }
}
