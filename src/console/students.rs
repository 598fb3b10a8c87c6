use super::terminal::Terminal;
use crate::db::Db;
use crate::models::Student;
use crate::records::students::{self, StudentField};
use crate::records::{Field, UpdateOutcome};
use crate::table::{opt, TextTable};
use std::io::{self, BufRead, Write};

const ITEMS: &[&str] = &[
    "View All Students",
    "Search Student by ID",
    "Search Student by Name",
    "Add Student",
    "Update Student",
    "Delete Student",
    "Back to Main Menu",
];

pub fn menu<R: BufRead, W: Write>(term: &mut Terminal<R, W>, db: &Db) -> io::Result<()> {
    loop {
        match term.menu("STUDENT MANAGEMENT", ITEMS)? {
            1 => view_all(term, db)?,
            2 => search_by_id(term, db)?,
            3 => search_by_name(term, db)?,
            4 => add(term, db)?,
            5 => update(term, db)?,
            6 => delete(term, db)?,
            _ => return Ok(()),
        }
    }
}

fn show_table<R: BufRead, W: Write>(
    term: &mut Terminal<R, W>,
    rows: &[Student],
) -> io::Result<()> {
    if rows.is_empty() {
        return term.say("No students found.");
    }
    let mut t = TextTable::new(&[
        ("ID", 6),
        ("Name", 25),
        ("Gender", 7),
        ("Birth Date", 11),
        ("Department", 20),
        ("Status", 10),
    ]);
    for s in rows {
        t.push([
            s.id.to_string(),
            s.full_name(),
            opt(&s.gender),
            opt(&s.date_of_birth),
            opt(&s.department),
            opt(&s.status),
        ]);
    }
    term.write_block(&t.render())?;
    term.say(format!("Total students: {}", rows.len()))
}

fn show_detail<R: BufRead, W: Write>(term: &mut Terminal<R, W>, s: &Student) -> io::Result<()> {
    term.say(format!("ID: {}", s.id))?;
    term.say(format!("Name: {}", s.full_name()))?;
    term.say(format!("Gender: {}", opt(&s.gender)))?;
    term.say(format!("Date of Birth: {}", opt(&s.date_of_birth)))?;
    term.say(format!("Contact: {}", opt(&s.contact)))?;
    term.say(format!("Address: {}", opt(&s.address)))?;
    term.say(format!("Department: {}", opt(&s.department)))?;
    term.say(format!("Status: {}", opt(&s.status)))
}

fn view_all<R: BufRead, W: Write>(term: &mut Terminal<R, W>, db: &Db) -> io::Result<()> {
    term.heading("ALL STUDENTS")?;
    match students::list(db, None) {
        Ok(rows) => show_table(term, &rows),
        Err(e) => term.error(&e),
    }
}

fn search_by_id<R: BufRead, W: Write>(term: &mut Terminal<R, W>, db: &Db) -> io::Result<()> {
    let Some(id) = term.ask_id("Enter student ID: ")? else {
        return Ok(());
    };
    match students::get(db, id) {
        Ok(Some(s)) => show_detail(term, &s),
        Ok(None) => term.say("Student not found."),
        Err(e) => term.error(&e),
    }
}

fn search_by_name<R: BufRead, W: Write>(term: &mut Terminal<R, W>, db: &Db) -> io::Result<()> {
    let name = term.ask("Enter name to search: ")?;
    match students::list(db, Some(&name)) {
        Ok(rows) => show_table(term, &rows),
        Err(e) => term.error(&e),
    }
}

fn add<R: BufRead, W: Write>(term: &mut Terminal<R, W>, db: &Db) -> io::Result<()> {
    term.heading("ADD NEW STUDENT")?;
    let form = term.form(StudentField::ALL)?;
    match students::create(db, &form) {
        Ok(id) => term.say(format!("Student added successfully with ID {id}.")),
        Err(e) => term.error(&e),
    }
}

fn update<R: BufRead, W: Write>(term: &mut Terminal<R, W>, db: &Db) -> io::Result<()> {
    term.heading("UPDATE STUDENT")?;
    let Some(id) = term.ask_id("Enter student ID to update: ")? else {
        return Ok(());
    };
    match students::get(db, id) {
        Ok(Some(s)) => term.say(format!("Updating {}", s.full_name()))?,
        Ok(None) => return term.say("Student not found."),
        Err(e) => return term.error(&e),
    }
    term.say("Enter new information (leave blank to keep current value):")?;
    let form = term.form(StudentField::ALL)?;
    match students::update(db, id, &form) {
        Ok(UpdateOutcome::Updated) => term.say("Student updated successfully."),
        Ok(UpdateOutcome::NoChanges) => term.say("No updates provided."),
        Err(e) => term.error(&e),
    }
}

fn delete<R: BufRead, W: Write>(term: &mut Terminal<R, W>, db: &Db) -> io::Result<()> {
    term.heading("DELETE STUDENT")?;
    let Some(id) = term.ask_id("Enter student ID to delete: ")? else {
        return Ok(());
    };
    let student = match students::get(db, id) {
        Ok(Some(s)) => s,
        Ok(None) => return term.say("Student not found."),
        Err(e) => return term.error(&e),
    };
    if !term.confirm(&format!("Delete {}?", student.full_name()))? {
        return term.say("Deletion cancelled.");
    }
    match students::delete(db, id) {
        Ok(()) => term.say("Student deleted successfully."),
        Err(e) => term.error(&e),
    }
}
