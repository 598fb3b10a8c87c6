use super::terminal::Terminal;
use crate::config::Config;
use crate::db::Db;
use crate::report::{self, ReportKind};
use std::io::{self, BufRead, Write};

const ITEMS: &[&str] = &[
    "Student List",
    "Grade Summary",
    "Transcript",
    "Top Performers",
    "Course Stats",
    "At-Risk",
    "Export",
    "Back",
];

pub fn menu<R: BufRead, W: Write>(
    term: &mut Terminal<R, W>,
    db: &Db,
    config: &Config,
) -> io::Result<()> {
    loop {
        let choice = term.menu("REPORTS & ANALYTICS", ITEMS)?;
        let kind = match choice {
            1 => ReportKind::StudentList,
            2 => ReportKind::GradeSummary,
            3 => match term.ask_id("Student ID: ")? {
                Some(id) => ReportKind::Transcript(id),
                None => continue,
            },
            4 => ReportKind::TopPerformers(config.top_n),
            5 => ReportKind::CourseStats,
            6 => ReportKind::AtRisk(config.at_risk_threshold),
            7 => {
                export(term, db, config)?;
                continue;
            }
            _ => return Ok(()),
        };
        term.say("")?;
        match report::render(db, kind) {
            Ok(text) => term.write_block(&text)?,
            Err(e) => term.error(&e)?,
        }
    }
}

/// Ask which report to write, then the file name. A blank choice writes the
/// record-count summary.
fn export<R: BufRead, W: Write>(
    term: &mut Terminal<R, W>,
    db: &Db,
    config: &Config,
) -> io::Result<()> {
    let which = term.ask(
        "Report to export (1 Student List, 2 Grade Summary, 3 Transcript, 4 Top Performers, \
         5 Course Stats, 6 At-Risk, Enter for summary): ",
    )?;
    let kind = match which.as_str() {
        "" => ReportKind::Summary,
        "1" => ReportKind::StudentList,
        "2" => ReportKind::GradeSummary,
        "3" => match term.ask_id("Student ID: ")? {
            Some(id) => ReportKind::Transcript(id),
            None => return Ok(()),
        },
        "4" => ReportKind::TopPerformers(config.top_n),
        "5" => ReportKind::CourseStats,
        "6" => ReportKind::AtRisk(config.at_risk_threshold),
        _ => return term.say("Invalid choice."),
    };
    let text = match report::render(db, kind) {
        Ok(text) => text,
        Err(e) => return term.error(&e),
    };
    let name = term.ask("Filename: ")?;
    match report::export_report(&name, &text) {
        Ok(path) => term.say(format!("Exported to {}.", path.display())),
        Err(e) => term.error(&e),
    }
}
