mod error;
mod handlers;
mod router;
mod types;

pub use router::handle_request;
pub use types::{AppState, Request};

use std::io::{BufRead, Write};

/// Serve newline-delimited JSON requests from `input` until it closes.
pub fn serve<R: BufRead, W: Write>(state: &mut AppState, input: R, mut out: W) -> std::io::Result<()> {
    for line in input.lines() {
        let line = match line {
            Ok(v) => v,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // No id to answer to.
                log::warn!("unparseable request: {e}");
                let resp = error::bad_json(e.to_string());
                writeln!(out, "{resp}")?;
                out.flush()?;
                continue;
            }
        };

        log::debug!("request {} {}", req.id, req.method);
        let resp = handle_request(state, req);
        writeln!(out, "{resp}")?;
        out.flush()?;
    }
    Ok(())
}
