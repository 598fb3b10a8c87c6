mod courses;
mod grades;
mod login;
mod reports;
mod students;
mod terminal;

use crate::auth::{self, UserInfo};
use crate::backup;
use crate::config::Config;
use crate::db::Db;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use terminal::{is_eof, Terminal};

const MAIN_ITEMS: &[&str] = &[
    "Student Management",
    "Course Management",
    "Grade Management",
    "Reports & Analytics",
    "Backup Database",
    "Logout",
    "Exit",
];

const BACKUP_ITEMS: &[&str] = &["Export Backup", "Restore from Backup", "Back"];

/// The interactive text front end. Owns the connection for the length of the
/// session so a restore can close and reopen it.
pub struct ConsoleApp<'a, R, W> {
    term: Terminal<R, W>,
    config: &'a Config,
    db: Option<Db>,
    user: Option<UserInfo>,
}

impl<'a, R: BufRead, W: Write> ConsoleApp<'a, R, W> {
    pub fn new(config: &'a Config, db: Db, input: R, output: W) -> Self {
        Self {
            term: Terminal::new(input, output),
            config,
            db: Some(db),
            user: None,
        }
    }

    /// Run until the user exits, login fails or input ends.
    pub fn run(&mut self) -> io::Result<()> {
        match self.session() {
            Err(e) if is_eof(&e) => {
                log::info!("end of input, leaving console session");
                Ok(())
            }
            other => other,
        }
    }

    /// Hand the connection back for closing.
    pub fn into_db(self) -> Option<Db> {
        self.db
    }

    fn session(&mut self) -> io::Result<()> {
        self.term.heading("STUDENT GRADE MANAGEMENT SYSTEM")?;
        if !self.login()? {
            return self.term.say("Login failed. Exiting...");
        }

        loop {
            let Some(db) = self.db.as_ref() else {
                return self.term.say("No database is open. Exiting...");
            };
            let title = match &self.user {
                Some(u) => format!("MAIN MENU - Welcome {} ({})", u.full_name, u.role.as_str()),
                None => "MAIN MENU".to_string(),
            };
            match self.term.menu(&title, MAIN_ITEMS)? {
                1 => students::menu(&mut self.term, db)?,
                2 => courses::menu(&mut self.term, db)?,
                3 => grades::menu(&mut self.term, db, self.config.page_size)?,
                4 => reports::menu(&mut self.term, db, self.config)?,
                5 => self.backup_menu()?,
                6 => {
                    if self.term.confirm("Are you sure you want to logout?")? {
                        if let Some(u) = self.user.take() {
                            log::info!("{} logged out", u.username);
                        }
                        if !self.login()? {
                            return self.term.say("Login failed. Exiting...");
                        }
                    }
                }
                _ => {
                    if self.term.confirm("Are you sure you want to exit?")? {
                        self.term
                            .say("Thank you for using Student Grade Management System!")?;
                        return self.term.say("Goodbye!");
                    }
                }
            }
        }
    }

    fn login(&mut self) -> io::Result<bool> {
        let Some(db) = self.db.as_ref() else {
            return Ok(false);
        };
        let authenticator = auth::authenticator(self.config.auth, db);
        self.user = login::login(&mut self.term, authenticator.as_ref())?;
        Ok(self.user.is_some())
    }

    fn backup_menu(&mut self) -> io::Result<()> {
        match self.term.menu("BACKUP DATABASE", BACKUP_ITEMS)? {
            1 => self.export_backup(),
            2 => self.restore_backup(),
            _ => Ok(()),
        }
    }

    fn export_backup(&mut self) -> io::Result<()> {
        let Some(db) = self.db.as_ref() else {
            return Ok(());
        };
        let out = self.term.ask("Backup file (.zip): ")?;
        if out.is_empty() {
            return self.term.say("Backup cancelled.");
        }
        match backup::export_database_bundle(db.path(), &PathBuf::from(out)) {
            Ok(summary) => self.term.say(format!(
                "Backup written to {} ({} bytes).",
                summary.path.display(),
                summary.bytes
            )),
            Err(e) => self.term.error(&e),
        }
    }

    fn restore_backup(&mut self) -> io::Result<()> {
        let src = self.term.ask("Backup file to restore: ")?;
        if src.is_empty() {
            return self.term.say("Restore cancelled.");
        }
        if !self
            .term
            .confirm("Replace all current records with the backup?")?
        {
            return self.term.say("Restore cancelled.");
        }
        let Some(db) = self.db.take() else {
            return Ok(());
        };
        let db_path = db.path().to_path_buf();
        db.close();

        let imported = backup::import_database_bundle(&PathBuf::from(src), &db_path);
        match Db::open(&db_path) {
            Ok(db) => self.db = Some(db),
            Err(e) => return self.term.error(&e),
        }
        match imported {
            Ok(summary) => self
                .term
                .say(format!("Restored from {} backup.", summary.format_detected)),
            Err(e) => self.term.error(&e),
        }
    }

    #[cfg(test)]
    fn into_output(self) -> W {
        self.term.into_output()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Table;
    use std::io::Cursor;

    fn session(db: Db, input: &str) -> (String, Db) {
        let config = Config::default();
        let mut app = ConsoleApp::new(&config, db, Cursor::new(input.as_bytes().to_vec()), Vec::new());
        app.run().expect("run");
        let db = app.db.take().expect("db");
        (String::from_utf8(app.into_output()).expect("utf8"), db)
    }

    #[test]
    fn add_course_then_exit() {
        let db = Db::open_in_memory().expect("open");
        let input = "admin\nadmin123\n9\n2\n4\nCS101\nIntro\n3\n\n\n\n7\n7\ny\n";
        let (out, db) = session(db, input);
        assert!(out.contains("Welcome System Administrator (Administrator)"));
        assert!(out.contains("Invalid choice"));
        assert!(out.contains("Course added successfully with ID 1."));
        assert!(out.contains("Goodbye!"));
        assert_eq!(db.count(Table::Courses).expect("count"), 1);
    }

    #[test]
    fn delete_needs_y_to_confirm() {
        let db = Db::open_in_memory().expect("open");
        db.insert(
            "INSERT INTO students(first_name, last_name, status) VALUES('Ada', 'Lovelace', 'Active')",
            [],
        )
        .expect("student");
        let input = "admin\nadmin123\n1\n6\n1\nn\n6\n1\nY\n7\n7\ny\n";
        let (out, db) = session(db, input);
        assert!(out.contains("Deletion cancelled."));
        assert!(out.contains("Student deleted successfully."));
        assert_eq!(db.count(Table::Students).expect("count"), 0);
    }

    #[test]
    fn end_of_input_ends_the_session_cleanly() {
        let db = Db::open_in_memory().expect("open");
        let (out, _db) = session(db, "admin\nadmin123\n1\n");
        assert!(out.contains("STUDENT MANAGEMENT"));
    }

    #[test]
    fn declined_exit_returns_to_menu() {
        let db = Db::open_in_memory().expect("open");
        let (out, _db) = session(db, "student\nstudent123\n7\nn\n7\ny\n");
        assert_eq!(out.matches("MAIN MENU - Welcome Jane Student").count(), 2);
    }

    #[test]
    fn failed_relogin_after_logout_ends_session() {
        let db = Db::open_in_memory().expect("open");
        let (out, _db) = session(db, "teacher\nteacher123\n6\ny\nx\nx\nx\nx\nx\nx\n");
        assert!(out.contains("Login failed. Exiting..."));
    }
}
