use super::terminal::Terminal;
use crate::auth::{Authenticator, UserInfo};
use std::io::{self, BufRead, Write};

pub const MAX_ATTEMPTS: usize = 3;

/// Prompt for credentials up to [`MAX_ATTEMPTS`] times. A blank username or
/// password uses up an attempt.
pub fn login<R: BufRead, W: Write>(
    term: &mut Terminal<R, W>,
    auth: &dyn Authenticator,
) -> io::Result<Option<UserInfo>> {
    term.heading("LOGIN - STUDENT GRADE MANAGEMENT SYSTEM")?;
    for attempt in 1..=MAX_ATTEMPTS {
        let username = term.ask("Username: ")?;
        let password = term.ask("Password: ")?;
        if username.is_empty() || password.is_empty() {
            term.say("Please enter both username and password.")?;
            continue;
        }
        if let Some(user) = auth.verify(&username, &password) {
            log::info!("{} logged in as {}", user.username, user.role.as_str());
            term.say(format!("Login successful! Welcome {}", user.full_name))?;
            return Ok(Some(user));
        }
        log::info!("failed login for {username}");
        term.say(format!(
            "Invalid username or password. Attempts remaining: {}",
            MAX_ATTEMPTS - attempt
        ))?;
    }
    term.say("Login failed - maximum attempts exceeded.")?;
    Ok(None)
}
