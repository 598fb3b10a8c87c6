use crate::calc::{DEFAULT_AT_RISK_THRESHOLD, DEFAULT_TOP_N};
use std::path::PathBuf;

const DEFAULT_DB_FILE: &str = "gradebook.sqlite3";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Console,
    Ipc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthBackend {
    Database,
    Static,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    /// Create the database file when it does not exist.
    pub init: bool,
    pub mode: Mode,
    pub auth: AuthBackend,
    pub top_n: usize,
    pub at_risk_threshold: f64,
    pub page_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE),
            init: false,
            mode: Mode::Console,
            auth: AuthBackend::Database,
            top_n: DEFAULT_TOP_N,
            at_risk_threshold: DEFAULT_AT_RISK_THRESHOLD,
            page_size: 5,
        }
    }
}

impl Config {
    /// Resolve settings from `.env`, the process environment and the command
    /// line, in increasing order of precedence.
    pub fn load(args: impl IntoIterator<Item = String>) -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv();
        let env: Vec<(String, String)> = std::env::vars().collect();
        Self::from_sources(env, args)
    }

    pub fn from_sources(
        env: impl IntoIterator<Item = (String, String)>,
        args: impl IntoIterator<Item = String>,
    ) -> anyhow::Result<Self> {
        let mut cfg = Config::default();

        for (key, value) in env {
            let value = value.trim().to_string();
            match key.as_str() {
                "GRADEBOOK_DB" if !value.is_empty() => cfg.db_path = PathBuf::from(value),
                "GRADEBOOK_AUTH" => match value.to_ascii_lowercase().as_str() {
                    "db" | "database" => cfg.auth = AuthBackend::Database,
                    "static" => cfg.auth = AuthBackend::Static,
                    other => log::warn!("ignoring GRADEBOOK_AUTH={other:?}; expected db or static"),
                },
                "GRADEBOOK_TOP_N" => {
                    cfg.top_n = parse_or_default(&key, &value, cfg.top_n, |n: &usize| *n > 0)
                }
                "GRADEBOOK_AT_RISK_THRESHOLD" => {
                    cfg.at_risk_threshold = parse_or_default(
                        &key,
                        &value,
                        cfg.at_risk_threshold,
                        |t: &f64| t.is_finite(),
                    )
                }
                "GRADEBOOK_PAGE_SIZE" => {
                    cfg.page_size = parse_or_default(&key, &value, cfg.page_size, |n: &usize| *n > 0)
                }
                _ => {}
            }
        }

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--ipc" => cfg.mode = Mode::Ipc,
                "--console" => cfg.mode = Mode::Console,
                "--init" => cfg.init = true,
                "--db" => {
                    let Some(path) = args.next() else {
                        anyhow::bail!("--db requires a path");
                    };
                    cfg.db_path = PathBuf::from(path);
                }
                other => {
                    if let Some(path) = other.strip_prefix("--db=") {
                        cfg.db_path = PathBuf::from(path);
                    } else {
                        anyhow::bail!("unknown argument: {other}");
                    }
                }
            }
        }

        Ok(cfg)
    }
}

fn parse_or_default<T>(key: &str, raw: &str, default: T, valid: impl Fn(&T) -> bool) -> T
where
    T: std::str::FromStr + Copy,
{
    match raw.parse::<T>() {
        Ok(v) if valid(&v) => v,
        _ => {
            log::warn!("ignoring {key}={raw:?}; keeping default");
            default
        }
    }
}
