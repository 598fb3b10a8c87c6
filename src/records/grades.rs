use super::{
    delete_row, optional_value, parse_id, parse_number, update_row, Field, Form, UpdateOutcome,
};
use crate::db::Db;
use crate::error::{AppError, AppResult};
use crate::models::{EnrollmentStatus, Grade};
use rusqlite::types::Value;

const TABLE: &str = "grades";
const ENTITY: &str = "grade";

pub const GPA_MAX: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradeField {
    StudentId,
    CourseId,
    FirstSemester,
    SecondSemester,
    Gpa,
    Status,
}

impl Field for GradeField {
    const ALL: &'static [Self] = &[
        GradeField::StudentId,
        GradeField::CourseId,
        GradeField::FirstSemester,
        GradeField::SecondSemester,
        GradeField::Gpa,
        GradeField::Status,
    ];

    fn column(self) -> &'static str {
        match self {
            GradeField::StudentId => "student_id",
            GradeField::CourseId => "course_id",
            GradeField::FirstSemester => "first_semester",
            GradeField::SecondSemester => "second_semester",
            GradeField::Gpa => "gpa",
            GradeField::Status => "status",
        }
    }

    fn key(self) -> &'static str {
        match self {
            GradeField::StudentId => "studentId",
            GradeField::CourseId => "courseId",
            GradeField::FirstSemester => "firstSemester",
            GradeField::SecondSemester => "secondSemester",
            GradeField::Gpa => "gpa",
            GradeField::Status => "status",
        }
    }

    fn label(self) -> &'static str {
        match self {
            GradeField::StudentId => "Student ID",
            GradeField::CourseId => "Course ID",
            GradeField::FirstSemester => "First Semester Mark",
            GradeField::SecondSemester => "Second Semester Mark",
            GradeField::Gpa => "GPA (0-4)",
            GradeField::Status => "Status (Enrolled/Completed/Dropped)",
        }
    }

    fn normalize(self, raw: &str) -> AppResult<Value> {
        match self {
            GradeField::StudentId => parse_id("student id", raw).map(Value::Integer),
            GradeField::CourseId => parse_id("course id", raw).map(Value::Integer),
            GradeField::FirstSemester => parse_mark("first semester", raw).map(Value::Real),
            GradeField::SecondSemester => parse_mark("second semester", raw).map(Value::Real),
            GradeField::Gpa => {
                let v = parse_number("gpa", raw)?;
                if !(0.0..=GPA_MAX).contains(&v) {
                    return Err(AppError::validation(
                        "gpa",
                        format!("{v} is outside 0 to {GPA_MAX}"),
                    ));
                }
                Ok(Value::Real(v))
            }
            GradeField::Status => EnrollmentStatus::parse(raw)
                .map(|s| Value::Text(s.as_str().to_string()))
                .ok_or_else(|| {
                    AppError::validation("status", "must be Enrolled, Completed or Dropped")
                }),
        }
    }
}

pub type GradeForm = Form<GradeField>;

fn parse_mark(field: &'static str, raw: &str) -> AppResult<f64> {
    let v = parse_number(field, raw)?;
    if v < 0.0 {
        return Err(AppError::validation(field, "marks cannot be negative"));
    }
    Ok(v)
}

fn list_where(db: &Db, clause: &str, params: impl rusqlite::Params) -> AppResult<Vec<Grade>> {
    let sql = format!("{} {} ORDER BY g.id", Grade::SELECT, clause);
    db.fetch_all(&sql, params, Grade::from_row)
}

/// Every enrollment in id order, optionally narrowed to those whose student
/// or course name contains `filter` (case-insensitive).
pub fn list(db: &Db, filter: Option<&str>) -> AppResult<Vec<Grade>> {
    match filter.map(str::trim).filter(|f| !f.is_empty()) {
        None => list_where(db, "", []),
        Some(f) => list_where(
            db,
            "WHERE instr(lower(s.first_name || ' ' || s.last_name), lower(?1)) > 0
                OR instr(lower(c.name), lower(?1)) > 0
                OR instr(lower(c.code), lower(?1)) > 0",
            [f],
        ),
    }
}

pub fn list_for_student(db: &Db, student_id: i64) -> AppResult<Vec<Grade>> {
    list_where(db, "WHERE g.student_id = ?", [student_id])
}

pub fn list_for_course(db: &Db, course_id: i64) -> AppResult<Vec<Grade>> {
    list_where(db, "WHERE g.course_id = ?", [course_id])
}

pub fn get(db: &Db, id: i64) -> AppResult<Option<Grade>> {
    db.fetch_one(
        &format!("{} WHERE g.id = ?", Grade::SELECT),
        [id],
        Grade::from_row,
    )
}

/// The referenced student and course are not required to exist.
pub fn create(db: &Db, form: &GradeForm) -> AppResult<i64> {
    let (Some(student), Some(course)) = (
        form.get(GradeField::StudentId),
        form.get(GradeField::CourseId),
    ) else {
        return Err(AppError::validation(
            "enrollment",
            "student id and course id are required",
        ));
    };
    let student_id = parse_id("student id", student)?;
    let course_id = parse_id("course id", course)?;
    let status = match form.get(GradeField::Status) {
        Some(raw) => GradeField::Status.normalize(raw)?,
        None => Value::Text(EnrollmentStatus::Enrolled.as_str().to_string()),
    };

    let id = db.insert(
        "INSERT INTO grades(student_id, course_id, first_semester, second_semester, gpa, status)
         VALUES(?, ?, ?, ?, ?, ?)",
        (
            student_id,
            course_id,
            optional_value(form, GradeField::FirstSemester)?,
            optional_value(form, GradeField::SecondSemester)?,
            optional_value(form, GradeField::Gpa)?,
            status,
        ),
    )?;
    log::info!("created grade {id} (student {student_id}, course {course_id})");
    Ok(id)
}

pub fn update(db: &Db, id: i64, form: &GradeForm) -> AppResult<UpdateOutcome> {
    update_row(db, TABLE, ENTITY, id, form)
}

pub fn delete(db: &Db, id: i64) -> AppResult<()> {
    delete_row(db, TABLE, ENTITY, id)
}
