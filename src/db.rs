use crate::auth;
use crate::error::{AppError, AppResult};
use rusqlite::{Connection, OpenFlags, OptionalExtension, Params, Row};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Students,
    Courses,
    Grades,
}

impl Table {
    fn name(self) -> &'static str {
        match self {
            Table::Students => "students",
            Table::Courses => "courses",
            Table::Grades => "grades",
        }
    }
}

/// The single connection a process owns. Every statement autocommits.
pub struct Db {
    conn: Connection,
    path: PathBuf,
}

impl Db {
    /// Open an existing database file. A missing file, a missing directory
    /// or a file that is not a database is a connection error; nothing is
    /// created.
    pub fn open(path: &Path) -> AppResult<Db> {
        Self::connect(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
    }

    /// Open the database file, creating it when it does not exist yet. The
    /// parent directory must already exist.
    pub fn create(path: &Path) -> AppResult<Db> {
        Self::connect(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
    }

    fn connect(path: &Path, flags: OpenFlags) -> AppResult<Db> {
        let connection_error = |source: rusqlite::Error| AppError::Connection {
            path: path.to_string_lossy().to_string(),
            source,
        };
        let conn = Connection::open_with_flags(path, flags).map_err(connection_error)?;
        ensure_schema(&conn).map_err(connection_error)?;
        log::info!("opened database {}", path.display());
        Ok(Db {
            conn,
            path: path.to_path_buf(),
        })
    }

    #[cfg(test)]
    pub fn open_in_memory() -> AppResult<Db> {
        let conn = Connection::open_in_memory()?;
        ensure_schema(&conn)?;
        Ok(Db {
            conn,
            path: PathBuf::from(":memory:"),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    #[cfg(test)]
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Run a mutating statement and return the number of changed rows.
    pub fn execute<P: Params>(&self, sql: &str, params: P) -> AppResult<usize> {
        self.conn
            .execute(sql, params)
            .map_err(|e| query_failed(sql, e))
    }

    /// Run an INSERT and return the new row id.
    pub fn insert<P: Params>(&self, sql: &str, params: P) -> AppResult<i64> {
        self.execute(sql, params)?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn fetch_one<T, P, F>(&self, sql: &str, params: P, map: F) -> AppResult<Option<T>>
    where
        P: Params,
        F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    {
        self.conn
            .query_row(sql, params, map)
            .optional()
            .map_err(|e| query_failed(sql, e))
    }

    pub fn fetch_all<T, P, F>(&self, sql: &str, params: P, map: F) -> AppResult<Vec<T>>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let mut stmt = self.conn.prepare(sql).map_err(|e| query_failed(sql, e))?;
        stmt.query_map(params, map)
            .and_then(|it| it.collect::<Result<Vec<_>, _>>())
            .map_err(|e| query_failed(sql, e))
    }

    pub fn count(&self, table: Table) -> AppResult<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", table.name());
        self.conn
            .query_row(&sql, [], |r| r.get(0))
            .map_err(|e| query_failed(&sql, e))
    }

    pub fn close(self) {
        let path = self.path;
        match self.conn.close() {
            Ok(()) => log::info!("closed database {}", path.display()),
            Err((_, e)) => log::warn!("closing database {} failed: {e}", path.display()),
        }
    }
}

fn query_failed(sql: &str, e: rusqlite::Error) -> AppError {
    let head: String = sql.split_whitespace().collect::<Vec<_>>().join(" ");
    let head: String = head.chars().take(100).collect();
    log::warn!("query error: {e} (sql: {head})");
    AppError::Query(e)
}

fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    // No foreign keys: deleting a student or a course leaves its enrollments
    // in place.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS students(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            gender TEXT,
            date_of_birth TEXT,
            contact TEXT,
            address TEXT,
            department TEXT,
            status TEXT
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_students_name ON students(last_name, first_name)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS courses(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            code TEXT NOT NULL,
            name TEXT NOT NULL,
            credits INTEGER,
            department TEXT,
            academic_year TEXT,
            description TEXT
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_courses_code ON courses(code)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS grades(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            student_id INTEGER NOT NULL,
            course_id INTEGER NOT NULL,
            first_semester REAL,
            second_semester REAL,
            gpa REAL,
            status TEXT
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_grades_student ON grades(student_id)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_grades_course ON grades(course_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS users(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL,
            full_name TEXT
        )",
        [],
    )?;
    for (username, password, role, full_name) in auth::DEFAULT_ACCOUNTS {
        conn.execute(
            "INSERT OR IGNORE INTO users(username, password_hash, role, full_name)
             VALUES(?, ?, ?, ?)",
            (
                username,
                auth::hash_password(password),
                role.as_str(),
                full_name,
            ),
        )?;
    }

    Ok(())
}
