use rusqlite::types::{FromSql, FromSqlResult, ValueRef};
use rusqlite::Row;
use serde::{Serialize, Serializer};
use std::fmt;

/// A numeric column as it was found on disk. Rows written by other tools may
/// hold text in GPA or mark columns, so nothing is coerced at read time.
#[derive(Debug, Clone, PartialEq)]
pub enum NumericCell {
    Blank,
    Number(f64),
    Text(String),
}

impl NumericCell {
    /// Finite numeric value, parsing text cells; `None` for blank or dirty
    /// cells.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            NumericCell::Blank => None,
            NumericCell::Number(v) if v.is_finite() => Some(*v),
            NumericCell::Number(_) => None,
            NumericCell::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            NumericCell::Blank => true,
            NumericCell::Text(s) => s.trim().is_empty(),
            NumericCell::Number(_) => false,
        }
    }
}

impl From<f64> for NumericCell {
    fn from(v: f64) -> Self {
        NumericCell::Number(v)
    }
}

impl From<&str> for NumericCell {
    fn from(s: &str) -> Self {
        NumericCell::Text(s.to_string())
    }
}

impl FromSql for NumericCell {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        Ok(match value {
            ValueRef::Null => NumericCell::Blank,
            ValueRef::Integer(i) => NumericCell::Number(i as f64),
            ValueRef::Real(f) => NumericCell::Number(f),
            ValueRef::Text(t) => NumericCell::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => NumericCell::Text(String::from_utf8_lossy(b).into_owned()),
        })
    }
}

impl fmt::Display for NumericCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericCell::Blank => Ok(()),
            NumericCell::Number(v) => write!(f, "{}", v),
            NumericCell::Text(s) => write!(f, "{}", s),
        }
    }
}

impl Serialize for NumericCell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            NumericCell::Blank => serializer.serialize_none(),
            NumericCell::Number(v) => serializer.serialize_f64(*v),
            NumericCell::Text(s) => serializer.serialize_str(s),
        }
    }
}

/// A reference column (`grades.student_id`, `grades.course_id`) that is
/// normally an integer id but may hold anything another tool wrote there.
#[derive(Debug, Clone, PartialEq)]
pub enum IdCell {
    Id(i64),
    Raw(String),
}

impl FromSql for IdCell {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let raw = match value {
            ValueRef::Null => String::new(),
            ValueRef::Integer(i) => return Ok(IdCell::Id(i)),
            ValueRef::Real(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                return Ok(IdCell::Id(f as i64))
            }
            ValueRef::Real(f) => f.to_string(),
            ValueRef::Text(t) | ValueRef::Blob(t) => String::from_utf8_lossy(t).trim().to_string(),
        };
        Ok(match raw.parse::<i64>() {
            Ok(id) => IdCell::Id(id),
            Err(_) => IdCell::Raw(raw),
        })
    }
}

impl fmt::Display for IdCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdCell::Id(id) => write!(f, "{}", id),
            IdCell::Raw(s) => write!(f, "{}", s),
        }
    }
}

impl Serialize for IdCell {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            IdCell::Id(id) => serializer.serialize_i64(*id),
            IdCell::Raw(s) => serializer.serialize_str(s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentStatus {
    Active,
    Inactive,
    Graduated,
}

impl StudentStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "active" => Some(StudentStatus::Active),
            "inactive" => Some(StudentStatus::Inactive),
            "graduated" => Some(StudentStatus::Graduated),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StudentStatus::Active => "Active",
            StudentStatus::Inactive => "Inactive",
            StudentStatus::Graduated => "Graduated",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollmentStatus {
    Enrolled,
    Completed,
    Dropped,
}

impl EnrollmentStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "enrolled" => Some(EnrollmentStatus::Enrolled),
            "completed" => Some(EnrollmentStatus::Completed),
            "dropped" => Some(EnrollmentStatus::Dropped),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EnrollmentStatus::Enrolled => "Enrolled",
            EnrollmentStatus::Completed => "Completed",
            EnrollmentStatus::Dropped => "Dropped",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub gender: Option<String>,
    pub date_of_birth: Option<String>,
    pub contact: Option<String>,
    pub address: Option<String>,
    pub department: Option<String>,
    pub status: Option<String>,
}

impl Student {
    pub const COLUMNS: &'static str =
        "id, first_name, last_name, gender, date_of_birth, contact, address, department, status";

    pub fn from_row(r: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Student {
            id: r.get(0)?,
            first_name: r.get::<_, Option<String>>(1)?.unwrap_or_default(),
            last_name: r.get::<_, Option<String>>(2)?.unwrap_or_default(),
            gender: non_blank(r.get(3)?),
            date_of_birth: non_blank(r.get(4)?),
            contact: non_blank(r.get(5)?),
            address: non_blank(r.get(6)?),
            department: non_blank(r.get(7)?),
            status: non_blank(r.get(8)?),
        })
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub credits: Option<i64>,
    pub department: Option<String>,
    pub academic_year: Option<String>,
    pub description: Option<String>,
}

impl Course {
    pub const COLUMNS: &'static str =
        "id, code, name, credits, department, academic_year, description";

    pub fn from_row(r: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Course {
            id: r.get(0)?,
            code: r.get::<_, Option<String>>(1)?.unwrap_or_default(),
            name: r.get::<_, Option<String>>(2)?.unwrap_or_default(),
            credits: whole_number(&r.get(3)?),
            department: non_blank(r.get(4)?),
            academic_year: non_blank(r.get(5)?),
            description: non_blank(r.get(6)?),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Grade {
    pub id: i64,
    pub student_id: IdCell,
    pub course_id: IdCell,
    pub student_name: Option<String>,
    pub course_name: Option<String>,
    pub first_semester: NumericCell,
    pub second_semester: NumericCell,
    pub gpa: NumericCell,
    pub status: Option<String>,
}

impl Grade {
    /// Enrollment columns plus the names of the referenced student and course.
    /// LEFT JOINs keep orphaned enrollments visible.
    pub const SELECT: &'static str = "SELECT g.id, g.student_id, g.course_id,
                s.first_name || ' ' || s.last_name, c.name,
                g.first_semester, g.second_semester, g.gpa, g.status
         FROM grades g
         LEFT JOIN students s ON s.id = g.student_id
         LEFT JOIN courses c ON c.id = g.course_id";

    pub fn from_row(r: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Grade {
            id: r.get(0)?,
            student_id: r.get(1)?,
            course_id: r.get(2)?,
            student_name: non_blank(r.get(3)?),
            course_name: non_blank(r.get(4)?),
            first_semester: r.get(5)?,
            second_semester: r.get(6)?,
            gpa: r.get(7)?,
            status: non_blank(r.get(8)?),
        })
    }

    /// Student name, or `#<stored id>` when no student matches.
    pub fn student_label(&self) -> String {
        self.student_name
            .clone()
            .unwrap_or_else(|| format!("#{}", self.student_id))
    }

    pub fn course_label(&self) -> String {
        self.course_name
            .clone()
            .unwrap_or_else(|| format!("#{}", self.course_id))
    }
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.and_then(|s| {
        let t = s.trim().to_string();
        if t.is_empty() {
            None
        } else {
            Some(t)
        }
    })
}

/// Integral value of a cell; fractional or unparseable values are `None`.
pub fn whole_number(cell: &NumericCell) -> Option<i64> {
    cell.as_number()
        .filter(|v| v.fract() == 0.0)
        .map(|v| v as i64)
}
