use super::{delete_row, optional_value, text, update_row, Field, Form, UpdateOutcome};
use crate::db::Db;
use crate::error::{AppError, AppResult};
use crate::models::Course;
use rusqlite::types::Value;

const TABLE: &str = "courses";
const ENTITY: &str = "course";

pub const DEFAULT_CREDITS: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseField {
    Code,
    Name,
    Credits,
    Department,
    AcademicYear,
    Description,
}

impl Field for CourseField {
    const ALL: &'static [Self] = &[
        CourseField::Code,
        CourseField::Name,
        CourseField::Credits,
        CourseField::Department,
        CourseField::AcademicYear,
        CourseField::Description,
    ];

    fn column(self) -> &'static str {
        match self {
            CourseField::Code => "code",
            CourseField::Name => "name",
            CourseField::Credits => "credits",
            CourseField::Department => "department",
            CourseField::AcademicYear => "academic_year",
            CourseField::Description => "description",
        }
    }

    fn key(self) -> &'static str {
        match self {
            CourseField::Code => "code",
            CourseField::Name => "name",
            CourseField::Credits => "credits",
            CourseField::Department => "department",
            CourseField::AcademicYear => "academicYear",
            CourseField::Description => "description",
        }
    }

    fn label(self) -> &'static str {
        match self {
            CourseField::Code => "Course Code",
            CourseField::Name => "Course Name",
            CourseField::Credits => "Credits",
            CourseField::Department => "Department",
            CourseField::AcademicYear => "Academic Year",
            CourseField::Description => "Description",
        }
    }

    fn normalize(self, raw: &str) -> AppResult<Value> {
        match self {
            CourseField::Credits => parse_credits(raw).map(Value::Integer),
            _ => Ok(text(raw)),
        }
    }
}

pub type CourseForm = Form<CourseField>;

fn parse_credits(raw: &str) -> AppResult<i64> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|c| *c >= 0)
        .ok_or_else(|| {
            AppError::validation(
                "credits",
                format!("{:?} is not a whole number of 0 or more", raw.trim()),
            )
        })
}

/// All courses ordered by code, optionally narrowed to those whose code or
/// name contains `filter` (case-insensitive).
pub fn list(db: &Db, filter: Option<&str>) -> AppResult<Vec<Course>> {
    let filter = filter.map(str::trim).filter(|f| !f.is_empty());
    match filter {
        None => db.fetch_all(
            &format!(
                "SELECT {} FROM courses ORDER BY code COLLATE NOCASE, id",
                Course::COLUMNS
            ),
            [],
            Course::from_row,
        ),
        Some(f) => db.fetch_all(
            &format!(
                "SELECT {} FROM courses
                 WHERE instr(lower(code), lower(?1)) > 0
                    OR instr(lower(name), lower(?1)) > 0
                 ORDER BY code COLLATE NOCASE, id",
                Course::COLUMNS
            ),
            [f],
            Course::from_row,
        ),
    }
}

pub fn get(db: &Db, id: i64) -> AppResult<Option<Course>> {
    db.fetch_one(
        &format!("SELECT {} FROM courses WHERE id = ?", Course::COLUMNS),
        [id],
        Course::from_row,
    )
}

/// Blank credits fall back to [`DEFAULT_CREDITS`].
pub fn create(db: &Db, form: &CourseForm) -> AppResult<i64> {
    let (Some(code), Some(name)) = (form.get(CourseField::Code), form.get(CourseField::Name))
    else {
        return Err(AppError::validation(
            "course",
            "course code and course name are required",
        ));
    };
    let credits = match form.get(CourseField::Credits) {
        Some(raw) => parse_credits(raw)?,
        None => DEFAULT_CREDITS,
    };

    let id = db.insert(
        "INSERT INTO courses(code, name, credits, department, academic_year, description)
         VALUES(?, ?, ?, ?, ?, ?)",
        (
            code,
            name,
            credits,
            optional_value(form, CourseField::Department)?,
            optional_value(form, CourseField::AcademicYear)?,
            optional_value(form, CourseField::Description)?,
        ),
    )?;
    log::info!("created course {id} ({code})");
    Ok(id)
}

pub fn update(db: &Db, id: i64, form: &CourseForm) -> AppResult<UpdateOutcome> {
    update_row(db, TABLE, ENTITY, id, form)
}

pub fn delete(db: &Db, id: i64) -> AppResult<()> {
    delete_row(db, TABLE, ENTITY, id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intro() -> CourseForm {
        Form::new()
            .with(CourseField::Code, "CS101")
            .with(CourseField::Name, "Intro")
            .with(CourseField::Credits, "3")
    }

    #[test]
    fn add_update_blank_delete_lifecycle() {
        let db = Db::open_in_memory().expect("open");
        let id = create(&db, &intro()).expect("create");

        let listed = list(&db, None).expect("list");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].credits, Some(3));

        let blank_credit = Form::new().with(CourseField::Credits, "");
        assert_eq!(
            update(&db, id, &blank_credit).expect("update"),
            UpdateOutcome::NoChanges
        );
        assert_eq!(get(&db, id).expect("get").expect("course").credits, Some(3));

        delete(&db, id).expect("delete");
        assert!(list(&db, None).expect("list").is_empty());
        assert!(get(&db, id).expect("get").is_none());
    }

    #[test]
    fn credits_must_be_a_non_negative_integer() {
        let db = Db::open_in_memory().expect("open");
        for bad in ["abc", "-1", "2.5"] {
            let form = intro().with(CourseField::Credits, bad);
            assert_eq!(create(&db, &form).unwrap_err().code(), "bad_params", "{bad}");
        }
        assert!(list(&db, None).expect("list").is_empty());

        let id = create(&db, &intro()).expect("create");
        let patch = Form::new().with(CourseField::Credits, "many");
        assert_eq!(update(&db, id, &patch).unwrap_err().code(), "bad_params");
        assert_eq!(get(&db, id).expect("get").expect("course").credits, Some(3));
    }

    #[test]
    fn blank_credits_default_on_create() {
        let db = Db::open_in_memory().expect("open");
        let form = Form::new()
            .with(CourseField::Code, "HIS200")
            .with(CourseField::Name, "World History");
        let id = create(&db, &form).expect("create");
        assert_eq!(
            get(&db, id).expect("get").expect("course").credits,
            Some(DEFAULT_CREDITS)
        );
    }

    #[test]
    fn code_and_name_are_required() {
        let db = Db::open_in_memory().expect("open");
        let form = Form::new().with(CourseField::Code, "CS101");
        assert_eq!(create(&db, &form).unwrap_err().code(), "bad_params");
    }

    #[test]
    fn list_filters_on_code_or_name_sorted_by_code() {
        let db = Db::open_in_memory().expect("open");
        create(&db, &intro()).expect("cs101");
        create(
            &db,
            &Form::new()
                .with(CourseField::Code, "BIO110")
                .with(CourseField::Name, "Cell Biology"),
        )
        .expect("bio");
        let codes: Vec<String> = list(&db, None)
            .expect("list")
            .into_iter()
            .map(|c| c.code)
            .collect();
        assert_eq!(codes, vec!["BIO110", "CS101"]);

        let hits = list(&db, Some("biology")).expect("filter");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].code, "BIO110");
        assert_eq!(list(&db, Some("cs1")).expect("filter").len(), 1);
    }

    #[test]
    fn update_and_delete_unknown_course_are_not_found() {
        let db = Db::open_in_memory().expect("open");
        let patch = Form::new().with(CourseField::Name, "Renamed");
        assert_eq!(update(&db, 9, &patch).unwrap_err().code(), "not_found");
        assert_eq!(delete(&db, 9).unwrap_err().code(), "not_found");
    }
}
