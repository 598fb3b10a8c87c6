use super::{delete_row, optional_value, text, update_row, Field, Form, UpdateOutcome};
use crate::db::Db;
use crate::error::{AppError, AppResult};
use crate::models::{Student, StudentStatus};
use chrono::NaiveDate;
use rusqlite::types::Value;

const TABLE: &str = "students";
const ENTITY: &str = "student";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentField {
    FirstName,
    LastName,
    Gender,
    DateOfBirth,
    Contact,
    Address,
    Department,
    Status,
}

impl Field for StudentField {
    const ALL: &'static [Self] = &[
        StudentField::FirstName,
        StudentField::LastName,
        StudentField::Gender,
        StudentField::DateOfBirth,
        StudentField::Contact,
        StudentField::Address,
        StudentField::Department,
        StudentField::Status,
    ];

    fn column(self) -> &'static str {
        match self {
            StudentField::FirstName => "first_name",
            StudentField::LastName => "last_name",
            StudentField::Gender => "gender",
            StudentField::DateOfBirth => "date_of_birth",
            StudentField::Contact => "contact",
            StudentField::Address => "address",
            StudentField::Department => "department",
            StudentField::Status => "status",
        }
    }

    fn key(self) -> &'static str {
        match self {
            StudentField::FirstName => "firstName",
            StudentField::LastName => "lastName",
            StudentField::Gender => "gender",
            StudentField::DateOfBirth => "dateOfBirth",
            StudentField::Contact => "contact",
            StudentField::Address => "address",
            StudentField::Department => "department",
            StudentField::Status => "status",
        }
    }

    fn label(self) -> &'static str {
        match self {
            StudentField::FirstName => "First Name",
            StudentField::LastName => "Last Name",
            StudentField::Gender => "Gender (M/F)",
            StudentField::DateOfBirth => "Date of Birth (YYYY-MM-DD)",
            StudentField::Contact => "Contact",
            StudentField::Address => "Address",
            StudentField::Department => "Department",
            StudentField::Status => "Status (Active/Inactive/Graduated)",
        }
    }

    fn normalize(self, raw: &str) -> AppResult<Value> {
        let raw = raw.trim();
        match self {
            StudentField::Gender => Ok(Value::Text(raw.to_uppercase())),
            StudentField::DateOfBirth => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map(|d| Value::Text(d.format("%Y-%m-%d").to_string()))
                .map_err(|_| {
                    AppError::validation("date of birth", format!("{raw:?} is not a YYYY-MM-DD date"))
                }),
            StudentField::Status => StudentStatus::parse(raw)
                .map(|s| Value::Text(s.as_str().to_string()))
                .ok_or_else(|| {
                    AppError::validation("status", "must be Active, Inactive or Graduated")
                }),
            _ => Ok(text(raw)),
        }
    }
}

pub type StudentForm = Form<StudentField>;

/// All students ordered by last then first name, optionally narrowed to
/// those whose first or last name contains `filter` (case-insensitive).
pub fn list(db: &Db, filter: Option<&str>) -> AppResult<Vec<Student>> {
    let filter = filter.map(str::trim).filter(|f| !f.is_empty());
    match filter {
        None => db.fetch_all(
            &format!(
                "SELECT {} FROM students ORDER BY last_name COLLATE NOCASE, first_name COLLATE NOCASE, id",
                Student::COLUMNS
            ),
            [],
            Student::from_row,
        ),
        Some(f) => db.fetch_all(
            &format!(
                "SELECT {} FROM students
                 WHERE instr(lower(first_name), lower(?1)) > 0
                    OR instr(lower(last_name), lower(?1)) > 0
                 ORDER BY last_name COLLATE NOCASE, first_name COLLATE NOCASE, id",
                Student::COLUMNS
            ),
            [f],
            Student::from_row,
        ),
    }
}

pub fn get(db: &Db, id: i64) -> AppResult<Option<Student>> {
    db.fetch_one(
        &format!("SELECT {} FROM students WHERE id = ?", Student::COLUMNS),
        [id],
        Student::from_row,
    )
}

pub fn create(db: &Db, form: &StudentForm) -> AppResult<i64> {
    let (Some(first_name), Some(last_name)) = (
        form.get(StudentField::FirstName),
        form.get(StudentField::LastName),
    ) else {
        return Err(AppError::validation(
            "name",
            "first name and last name are required",
        ));
    };

    let status = match form.get(StudentField::Status) {
        Some(raw) => StudentField::Status.normalize(raw)?,
        None => Value::Text(StudentStatus::Active.as_str().to_string()),
    };

    let id = db.insert(
        "INSERT INTO students(
           first_name, last_name, gender, date_of_birth,
           contact, address, department, status
         ) VALUES(?, ?, ?, ?, ?, ?, ?, ?)",
        (
            first_name,
            last_name,
            optional_value(form, StudentField::Gender)?,
            optional_value(form, StudentField::DateOfBirth)?,
            optional_value(form, StudentField::Contact)?,
            optional_value(form, StudentField::Address)?,
            optional_value(form, StudentField::Department)?,
            status,
        ),
    )?;
    log::info!("created student {id}");
    Ok(id)
}

pub fn update(db: &Db, id: i64, form: &StudentForm) -> AppResult<UpdateOutcome> {
    update_row(db, TABLE, ENTITY, id, form)
}

pub fn delete(db: &Db, id: i64) -> AppResult<()> {
    delete_row(db, TABLE, ENTITY, id)
}
