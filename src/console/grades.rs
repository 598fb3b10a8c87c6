use super::terminal::Terminal;
use crate::db::Db;
use crate::models::Grade;
use crate::records::grades::{self, GradeField};
use crate::records::{Field, UpdateOutcome};
use crate::table::{opt, paginate, TextTable};
use std::io::{self, BufRead, Write};

const ITEMS: &[&str] = &[
    "View All Grades",
    "Search Grade by ID",
    "Search Grades by Name",
    "View Grades by Student",
    "View Grades by Course",
    "Add Grade",
    "Update Grade",
    "Delete Grade",
    "Back to Main Menu",
];

const EDITABLE: &[GradeField] = &[
    GradeField::FirstSemester,
    GradeField::SecondSemester,
    GradeField::Gpa,
    GradeField::Status,
];

pub fn menu<R: BufRead, W: Write>(
    term: &mut Terminal<R, W>,
    db: &Db,
    page_size: usize,
) -> io::Result<()> {
    loop {
        match term.menu("GRADE MANAGEMENT", ITEMS)? {
            1 => {
                let rows = grades::list(db, None);
                show(term, "ALL GRADES", rows, page_size)?
            }
            2 => search_by_id(term, db)?,
            3 => {
                let name = term.ask("Enter student or course name: ")?;
                let rows = grades::list(db, Some(&name));
                show(term, "MATCHING GRADES", rows, page_size)?
            }
            4 => {
                let Some(id) = term.ask_id("Enter student ID: ")? else {
                    continue;
                };
                let rows = grades::list_for_student(db, id);
                show(term, &format!("GRADES FOR STUDENT ID: {id}"), rows, page_size)?
            }
            5 => {
                let Some(id) = term.ask_id("Enter course ID: ")? else {
                    continue;
                };
                let rows = grades::list_for_course(db, id);
                show(term, &format!("GRADES FOR COURSE ID: {id}"), rows, page_size)?
            }
            6 => add(term, db)?,
            7 => update(term, db)?,
            8 => delete(term, db)?,
            _ => return Ok(()),
        }
    }
}

fn table() -> TextTable {
    TextTable::new(&[
        ("ID", 5),
        ("Student", 22),
        ("Course", 22),
        ("Sem1", 7),
        ("Sem2", 7),
        ("GPA", 5),
        ("Status", 10),
    ])
}

fn row(g: &Grade) -> [String; 7] {
    [
        g.id.to_string(),
        g.student_label(),
        g.course_label(),
        g.first_semester.to_string(),
        g.second_semester.to_string(),
        g.gpa.to_string(),
        opt(&g.status),
    ]
}

/// Print rows `page_size` at a time; Enter continues, `q` stops early.
fn show<R: BufRead, W: Write>(
    term: &mut Terminal<R, W>,
    title: &str,
    rows: crate::error::AppResult<Vec<Grade>>,
    page_size: usize,
) -> io::Result<()> {
    let rows = match rows {
        Ok(rows) => rows,
        Err(e) => return term.error(&e),
    };
    if rows.is_empty() {
        return term.say("No grades found.");
    }
    let pages = paginate(&rows, page_size);
    for (i, page) in pages.iter().enumerate() {
        term.heading(&format!("{title} (Page {}/{})", i + 1, pages.len()))?;
        let mut t = table();
        for g in page.iter() {
            t.push(row(g));
        }
        term.write_block(&t.render())?;
        if i + 1 < pages.len() {
            let next = term.ask("Press Enter to see next page (or 'q' to quit): ")?;
            if next.eq_ignore_ascii_case("q") {
                break;
            }
        }
    }
    term.say(format!("Total grades: {}", rows.len()))
}

fn search_by_id<R: BufRead, W: Write>(term: &mut Terminal<R, W>, db: &Db) -> io::Result<()> {
    let Some(id) = term.ask_id("Enter enrollment ID: ")? else {
        return Ok(());
    };
    match grades::get(db, id) {
        Ok(Some(g)) => {
            let mut t = table();
            t.push(row(&g));
            term.write_block(&t.render())
        }
        Ok(None) => term.say("Enrollment record not found."),
        Err(e) => term.error(&e),
    }
}

fn add<R: BufRead, W: Write>(term: &mut Terminal<R, W>, db: &Db) -> io::Result<()> {
    term.heading("ADD NEW GRADE")?;
    let form = term.form(GradeField::ALL)?;
    match grades::create(db, &form) {
        Ok(id) => term.say(format!("Grade added successfully with enrollment ID {id}.")),
        Err(e) => term.error(&e),
    }
}

fn update<R: BufRead, W: Write>(term: &mut Terminal<R, W>, db: &Db) -> io::Result<()> {
    term.heading("UPDATE GRADE")?;
    let Some(id) = term.ask_id("Enter enrollment ID to update: ")? else {
        return Ok(());
    };
    match grades::get(db, id) {
        Ok(Some(_)) => {}
        Ok(None) => return term.say("Enrollment record not found."),
        Err(e) => return term.error(&e),
    }
    term.say("Enter new information (leave blank to keep current value):")?;
    let form = term.form(EDITABLE)?;
    match grades::update(db, id, &form) {
        Ok(UpdateOutcome::Updated) => term.say("Grade updated successfully."),
        Ok(UpdateOutcome::NoChanges) => term.say("No updates provided."),
        Err(e) => term.error(&e),
    }
}

fn delete<R: BufRead, W: Write>(term: &mut Terminal<R, W>, db: &Db) -> io::Result<()> {
    term.heading("DELETE GRADE")?;
    let Some(id) = term.ask_id("Enter enrollment ID to delete: ")? else {
        return Ok(());
    };
    match grades::get(db, id) {
        Ok(Some(_)) => {}
        Ok(None) => return term.say("Enrollment record not found."),
        Err(e) => return term.error(&e),
    }
    if !term.confirm("Are you sure you want to delete this record?")? {
        return term.say("Deletion cancelled.");
    }
    match grades::delete(db, id) {
        Ok(()) => term.say("Grade deleted successfully."),
        Err(e) => term.error(&e),
    }
}
