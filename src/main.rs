mod auth;
mod backup;
mod calc;
mod config;
mod console;
mod db;
mod error;
mod ipc;
mod models;
mod records;
mod report;
mod table;

use config::{Config, Mode};
use std::io;

fn main() {
    // stdout carries console output or sidecar responses, so logs go to stderr.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = match Config::load(std::env::args().skip(1)) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("gradebook: {e:#}");
            eprintln!("usage: gradebook [--db PATH] [--init] [--ipc]");
            std::process::exit(2);
        }
    };

    let opened = if config.init {
        db::Db::create(&config.db_path)
    } else {
        db::Db::open(&config.db_path)
    };
    let db = match opened {
        Ok(v) => v,
        Err(e) => {
            log::error!("{e}");
            eprintln!("FATAL: Could not establish database connection.");
            eprintln!("{}", e);
            eprintln!("Please verify the database path exists and is writable.");
            eprintln!("Run with --init to create a new database.");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(config, db) {
        eprintln!("gradebook: {e:#}");
        std::process::exit(1);
    }
}

fn run(config: Config, db: db::Db) -> anyhow::Result<()> {
    match config.mode {
        Mode::Console => {
            let stdin = io::stdin();
            let stdout = io::stdout();
            let mut app = console::ConsoleApp::new(&config, db, stdin.lock(), stdout.lock());
            let result = app.run();
            if let Some(db) = app.into_db() {
                db.close();
            }
            result?;
        }
        Mode::Ipc => {
            log::info!("serving sidecar requests on stdin");
            let mut state = ipc::AppState::new(config, Some(db));
            let result = ipc::serve(&mut state, io::stdin().lock(), io::stdout().lock());
            if let Some(db) = state.db.take() {
                db.close();
            }
            result?;
        }
    }
    Ok(())
}
