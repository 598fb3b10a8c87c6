use crate::config::AuthBackend;
use crate::db::Db;
use crate::error::AppResult;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Role {
    Administrator,
    Teacher,
    Student,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Administrator => "Administrator",
            Role::Teacher => "Teacher",
            Role::Student => "Student",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "administrator" | "admin" => Some(Role::Administrator),
            "teacher" => Some(Role::Teacher),
            "student" => Some(Role::Student),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub username: String,
    pub role: Role,
    pub full_name: String,
}

/// Accounts present in every fresh database.
pub const DEFAULT_ACCOUNTS: [(&str, &str, Role, &str); 3] = [
    ("admin", "admin123", Role::Administrator, "System Administrator"),
    ("teacher", "teacher123", Role::Teacher, "John Teacher"),
    ("student", "student123", Role::Student, "Jane Student"),
];

pub trait Authenticator {
    fn verify(&self, username: &str, password: &str) -> Option<UserInfo>;
}

pub fn hash_password(password: &str) -> String {
    sha256_hex(password.as_bytes())
}

/// Lower-case hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest.iter() {
        let _ = write!(out, "{:02x}", b);
    }
    out
}

/// Credentials held in memory, keyed by username.
pub struct StaticCredentials {
    accounts: HashMap<String, (String, UserInfo)>,
}

impl StaticCredentials {
    pub fn new() -> Self {
        Self {
            accounts: HashMap::new(),
        }
    }

    pub fn with_defaults() -> Self {
        let mut creds = Self::new();
        for (username, password, role, full_name) in DEFAULT_ACCOUNTS {
            creds.add(username, password, role, full_name);
        }
        creds
    }

    pub fn add(&mut self, username: &str, password: &str, role: Role, full_name: &str) {
        self.accounts.insert(
            username.to_string(),
            (
                password.to_string(),
                UserInfo {
                    username: username.to_string(),
                    role,
                    full_name: full_name.to_string(),
                },
            ),
        );
    }
}

impl Default for StaticCredentials {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl Authenticator for StaticCredentials {
    fn verify(&self, username: &str, password: &str) -> Option<UserInfo> {
        let (expected, info) = self.accounts.get(username)?;
        (expected == password).then(|| info.clone())
    }
}

/// Credentials stored in the `users` table as SHA-256 digests.
pub struct SqliteCredentialStore<'a> {
    db: &'a Db,
}

impl<'a> SqliteCredentialStore<'a> {
    pub fn new(db: &'a Db) -> Self {
        Self { db }
    }

    fn lookup(&self, username: &str, password: &str) -> AppResult<Option<UserInfo>> {
        let row: Option<(String, String, Option<String>)> = self.db.fetch_one(
            "SELECT password_hash, role, full_name FROM users WHERE username = ?",
            [username],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )?;
        let Some((stored_hash, role, full_name)) = row else {
            return Ok(None);
        };
        if !stored_hash.eq_ignore_ascii_case(&hash_password(password)) {
            return Ok(None);
        }
        let Some(role) = Role::parse(&role) else {
            log::warn!("user {username} has unknown role {role:?}");
            return Ok(None);
        };
        Ok(Some(UserInfo {
            username: username.to_string(),
            role,
            full_name: full_name
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| username.to_string()),
        }))
    }
}

impl Authenticator for SqliteCredentialStore<'_> {
    fn verify(&self, username: &str, password: &str) -> Option<UserInfo> {
        match self.lookup(username, password) {
            Ok(v) => v,
            Err(e) => {
                log::warn!("credential lookup failed: {e}");
                None
            }
        }
    }
}

/// The credential store selected by configuration.
pub fn authenticator<'a>(backend: AuthBackend, db: &'a Db) -> Box<dyn Authenticator + 'a> {
    match backend {
        AuthBackend::Database => Box::new(SqliteCredentialStore::new(db)),
        AuthBackend::Static => Box::new(StaticCredentials::with_defaults()),
    }
}
