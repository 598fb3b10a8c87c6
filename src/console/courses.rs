use super::terminal::Terminal;
use crate::db::Db;
use crate::models::Course;
use crate::records::courses::{self, CourseField};
use crate::records::{Field, UpdateOutcome};
use crate::table::{opt, TextTable};
use std::io::{self, BufRead, Write};

const ITEMS: &[&str] = &[
    "View All Courses",
    "Search Course by ID",
    "Search Course by Name",
    "Add Course",
    "Update Course",
    "Delete Course",
    "Back to Main Menu",
];

pub fn menu<R: BufRead, W: Write>(term: &mut Terminal<R, W>, db: &Db) -> io::Result<()> {
    loop {
        match term.menu("COURSE MANAGEMENT", ITEMS)? {
            1 => view(term, db, None)?,
            2 => search_by_id(term, db)?,
            3 => {
                let name = term.ask("Enter course name or code: ")?;
                view(term, db, Some(&name))?
            }
            4 => add(term, db)?,
            5 => update(term, db)?,
            6 => delete(term, db)?,
            _ => return Ok(()),
        }
    }
}

fn view<R: BufRead, W: Write>(
    term: &mut Terminal<R, W>,
    db: &Db,
    filter: Option<&str>,
) -> io::Result<()> {
    let rows = match courses::list(db, filter) {
        Ok(rows) => rows,
        Err(e) => return term.error(&e),
    };
    if rows.is_empty() {
        return term.say("No courses found.");
    }
    let mut t = TextTable::new(&[
        ("ID", 6),
        ("Code", 10),
        ("Name", 30),
        ("Credits", 8),
        ("Department", 20),
        ("Year", 10),
    ]);
    for c in &rows {
        t.push([
            c.id.to_string(),
            c.code.clone(),
            c.name.clone(),
            c.credits.map(|v| v.to_string()).unwrap_or_default(),
            opt(&c.department),
            opt(&c.academic_year),
        ]);
    }
    term.write_block(&t.render())?;
    term.say(format!("Total courses: {}", rows.len()))
}

fn show_detail<R: BufRead, W: Write>(term: &mut Terminal<R, W>, c: &Course) -> io::Result<()> {
    term.say(format!("ID: {}", c.id))?;
    term.say(format!("Code: {}", c.code))?;
    term.say(format!("Name: {}", c.name))?;
    term.say(format!(
        "Credits: {}",
        c.credits.map(|v| v.to_string()).unwrap_or_default()
    ))?;
    term.say(format!("Department: {}", opt(&c.department)))?;
    term.say(format!("Academic Year: {}", opt(&c.academic_year)))?;
    term.say(format!("Description: {}", opt(&c.description)))
}

fn search_by_id<R: BufRead, W: Write>(term: &mut Terminal<R, W>, db: &Db) -> io::Result<()> {
    let Some(id) = term.ask_id("Enter course ID: ")? else {
        return Ok(());
    };
    match courses::get(db, id) {
        Ok(Some(c)) => show_detail(term, &c),
        Ok(None) => term.say("Course not found."),
        Err(e) => term.error(&e),
    }
}

fn add<R: BufRead, W: Write>(term: &mut Terminal<R, W>, db: &Db) -> io::Result<()> {
    term.heading("ADD NEW COURSE")?;
    let form = term.form(CourseField::ALL)?;
    match courses::create(db, &form) {
        Ok(id) => term.say(format!("Course added successfully with ID {id}.")),
        Err(e) => term.error(&e),
    }
}

fn update<R: BufRead, W: Write>(term: &mut Terminal<R, W>, db: &Db) -> io::Result<()> {
    term.heading("UPDATE COURSE")?;
    let Some(id) = term.ask_id("Enter course ID to update: ")? else {
        return Ok(());
    };
    match courses::get(db, id) {
        Ok(Some(c)) => term.say(format!("Updating {} {}", c.code, c.name))?,
        Ok(None) => return term.say("Course not found."),
        Err(e) => return term.error(&e),
    }
    term.say("Enter new information (leave blank to keep current value):")?;
    let form = term.form(CourseField::ALL)?;
    match courses::update(db, id, &form) {
        Ok(UpdateOutcome::Updated) => term.say("Course updated successfully."),
        Ok(UpdateOutcome::NoChanges) => term.say("No updates provided."),
        Err(e) => term.error(&e),
    }
}

fn delete<R: BufRead, W: Write>(term: &mut Terminal<R, W>, db: &Db) -> io::Result<()> {
    term.heading("DELETE COURSE")?;
    let Some(id) = term.ask_id("Enter course ID to delete: ")? else {
        return Ok(());
    };
    let course = match courses::get(db, id) {
        Ok(Some(c)) => c,
        Ok(None) => return term.say("Course not found."),
        Err(e) => return term.error(&e),
    };
    if !term.confirm(&format!("Delete {} {}?", course.code, course.name))? {
        return term.say("Deletion cancelled.");
    }
    match courses::delete(db, id) {
        Ok(()) => term.say("Course deleted successfully."),
        Err(e) => term.error(&e),
    }
}
