pub mod courses;
pub mod grades;
pub mod students;

use crate::db::Db;
use crate::error::{AppError, AppResult};
use rusqlite::params_from_iter;
use rusqlite::types::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updated,
    NoChanges,
}

/// A column a Record Manager may write. Implementations are closed enums, so
/// statement text only ever contains these names.
pub trait Field: Copy + Eq + 'static {
    const ALL: &'static [Self];

    fn column(self) -> &'static str;

    /// camelCase name used by the sidecar protocol.
    fn key(self) -> &'static str;

    /// Prompt label used by the console.
    fn label(self) -> &'static str;

    /// Validate a non-blank raw value and convert it for binding.
    fn normalize(self, raw: &str) -> AppResult<Value>;
}

/// Raw user input keyed by field. Blank entries count as "not supplied".
#[derive(Debug, Clone, PartialEq)]
pub struct Form<F> {
    values: Vec<(F, String)>,
}

impl<F: Field> Default for Form<F> {
    fn default() -> Self {
        Self { values: Vec::new() }
    }
}

impl<F: Field> Form<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: F, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: F, value: impl Into<String>) {
        let value = value.into();
        match self.values.iter_mut().find(|(f, _)| *f == field) {
            Some(slot) => slot.1 = value,
            None => self.values.push((field, value)),
        }
    }

    /// Trimmed value, or `None` when absent or blank.
    pub fn get(&self, field: F) -> Option<&str> {
        self.values
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, v)| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn supplied(&self) -> Vec<F> {
        F::ALL
            .iter()
            .copied()
            .filter(|f| self.get(*f).is_some())
            .collect()
    }
}

/// Parse a user-typed record id.
pub fn parse_id(field: &'static str, raw: &str) -> AppResult<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| AppError::validation(field, format!("{:?} is not a valid ID", raw.trim())))
}

fn optional_value<F: Field>(form: &Form<F>, field: F) -> AppResult<Value> {
    match form.get(field) {
        Some(raw) => field.normalize(raw),
        None => Ok(Value::Null),
    }
}

fn text(raw: &str) -> Value {
    Value::Text(raw.trim().to_string())
}

fn exists(db: &Db, table: &'static str, id: i64) -> AppResult<bool> {
    let sql = format!("SELECT 1 FROM {} WHERE id = ?", table);
    Ok(db.fetch_one(&sql, [id], |r| r.get::<_, i64>(0))?.is_some())
}

/// Write the supplied fields of `form` to row `id`.
///
/// The row is looked up first so a missing id is reported without a write;
/// a form with nothing supplied is a no-op.
fn update_row<F: Field>(
    db: &Db,
    table: &'static str,
    entity: &'static str,
    id: i64,
    form: &Form<F>,
) -> AppResult<UpdateOutcome> {
    if !exists(db, table, id)? {
        return Err(AppError::not_found(entity, id));
    }

    let mut set_parts: Vec<String> = Vec::new();
    let mut bind_values: Vec<Value> = Vec::new();
    for field in form.supplied() {
        let raw = form.get(field).unwrap_or_default();
        bind_values.push(field.normalize(raw)?);
        set_parts.push(format!("{} = ?", field.column()));
    }
    if set_parts.is_empty() {
        return Ok(UpdateOutcome::NoChanges);
    }

    let sql = format!("UPDATE {} SET {} WHERE id = ?", table, set_parts.join(", "));
    bind_values.push(Value::Integer(id));
    db.execute(&sql, params_from_iter(bind_values))?;
    log::info!("updated {entity} {id}");
    Ok(UpdateOutcome::Updated)
}

fn delete_row(db: &Db, table: &'static str, entity: &'static str, id: i64) -> AppResult<()> {
    if !exists(db, table, id)? {
        return Err(AppError::not_found(entity, id));
    }
    let sql = format!("DELETE FROM {} WHERE id = ?", table);
    db.execute(&sql, [id])?;
    log::info!("deleted {entity} {id}");
    Ok(())
}

fn parse_number(field: &'static str, raw: &str) -> AppResult<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| AppError::validation(field, format!("{:?} is not a number", raw.trim())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::students::StudentField;

    #[test]
    fn form_treats_blank_as_absent() {
        let form = Form::new()
            .with(StudentField::FirstName, "  Ada ")
            .with(StudentField::LastName, "   ")
            .with(StudentField::FirstName, "Grace");
        assert_eq!(form.get(StudentField::FirstName), Some("Grace"));
        assert_eq!(form.get(StudentField::LastName), None);
        assert_eq!(form.get(StudentField::Status), None);
        assert_eq!(form.supplied(), vec![StudentField::FirstName]);
    }

    #[test]
    fn parse_id_rejects_text() {
        assert_eq!(parse_id("student id", " 12 ").expect("id"), 12);
        let e = parse_id("student id", "abc").unwrap_err();
        assert_eq!(e.code(), "bad_params");
    }
}
