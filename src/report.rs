use crate::calc::{
    self, round2, CourseGradeRow, CourseStat, EnrollmentRow, Flagged, StudentKey, TopPerformers,
    WeightedGpa,
};
use crate::db::{Db, Table};
use crate::error::{AppError, AppResult};
use crate::models::{whole_number, Grade, IdCell, NumericCell, Student};
use crate::records::{grades, students};
use crate::table::{self, TextTable};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Every report the console and the sidecar can produce.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReportKind {
    StudentList,
    GradeSummary,
    Transcript(i64),
    TopPerformers(usize),
    CourseStats,
    AtRisk(f64),
    Summary,
}

/// Build the report and return its text.
pub fn render(db: &Db, kind: ReportKind) -> AppResult<String> {
    Ok(match kind {
        ReportKind::StudentList => student_list(db)?.to_string(),
        ReportKind::GradeSummary => grade_summary(db)?.to_string(),
        ReportKind::Transcript(id) => transcript(db, id)?.to_string(),
        ReportKind::TopPerformers(n) => top_performers(db, n)?.to_string(),
        ReportKind::CourseStats => course_stats(db)?.to_string(),
        ReportKind::AtRisk(threshold) => at_risk(db, threshold)?.to_string(),
        ReportKind::Summary => summary(db)?.to_string(),
    })
}

fn banner(f: &mut fmt::Formatter<'_>, title: &str, t: &TextTable) -> fmt::Result {
    writeln!(f, "{title}")?;
    writeln!(f, "{}", "=".repeat(t.width()))?;
    writeln!(f, "{}", t.header())?;
    writeln!(f, "{}", t.rule())
}

fn gpa_text(cell: &NumericCell) -> String {
    match cell.as_number() {
        Some(v) => format!("{v:.2}"),
        None => cell.to_string(),
    }
}

fn breakdown(f: &mut fmt::Formatter<'_>, label: &str, counts: &[(String, usize)]) -> fmt::Result {
    let parts: Vec<String> = counts.iter().map(|(k, n)| format!("{k} {n}")).collect();
    writeln!(f, "{label}: {}", parts.join(", "))
}

const BLANK_LABEL: &str = "(none)";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentListReport {
    pub students: Vec<Student>,
    pub by_status: Vec<(String, usize)>,
    pub by_gender: Vec<(String, usize)>,
    pub by_department: Vec<(String, usize)>,
}

pub fn student_list(db: &Db) -> AppResult<StudentListReport> {
    let students = students::list(db, None)?;
    Ok(StudentListReport {
        by_status: calc::distribution(students.iter().map(|s| s.status.as_deref()), BLANK_LABEL),
        by_gender: calc::distribution(students.iter().map(|s| s.gender.as_deref()), BLANK_LABEL),
        by_department: calc::distribution(
            students.iter().map(|s| s.department.as_deref()),
            BLANK_LABEL,
        ),
        students,
    })
}

impl fmt::Display for StudentListReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut t = TextTable::new(&[
            ("ID", 8),
            ("Name", 25),
            ("Gender", 10),
            ("Department", 20),
            ("Status", 12),
        ]);
        for s in &self.students {
            t.push([
                s.id.to_string(),
                s.full_name(),
                table::opt(&s.gender),
                table::opt(&s.department),
                table::opt(&s.status),
            ]);
        }
        banner(f, &format!("STUDENT LIST ({} students)", t.len()), &t)?;
        for line in t.lines() {
            writeln!(f, "{line}")?;
        }
        if !self.students.is_empty() {
            writeln!(f)?;
            breakdown(f, "By status", &self.by_status)?;
            breakdown(f, "By gender", &self.by_gender)?;
            breakdown(f, "By department", &self.by_department)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeSummaryReport {
    pub grades: Vec<Grade>,
    pub by_status: Vec<(String, usize)>,
}

pub fn grade_summary(db: &Db) -> AppResult<GradeSummaryReport> {
    let grades = grades::list(db, None)?;
    Ok(GradeSummaryReport {
        by_status: calc::distribution(grades.iter().map(|g| g.status.as_deref()), BLANK_LABEL),
        grades,
    })
}

impl fmt::Display for GradeSummaryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut t = TextTable::new(&[
            ("ID", 6),
            ("Student Name", 25),
            ("Course Name", 30),
            ("GPA", 6),
            ("Status", 10),
        ]);
        for g in &self.grades {
            t.push([
                g.id.to_string(),
                g.student_label(),
                g.course_label(),
                gpa_text(&g.gpa),
                table::opt(&g.status),
            ]);
        }
        banner(f, &format!("GRADE SUMMARY ({} records)", t.len()), &t)?;
        for line in t.lines() {
            writeln!(f, "{line}")?;
        }
        if !self.grades.is_empty() {
            writeln!(f)?;
            breakdown(f, "By status", &self.by_status)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptLine {
    pub grade_id: i64,
    pub course_id: IdCell,
    pub code: Option<String>,
    pub course_name: Option<String>,
    pub credits: Option<i64>,
    pub first_semester: NumericCell,
    pub second_semester: NumericCell,
    pub gpa: NumericCell,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptReport {
    pub student: Student,
    pub lines: Vec<TranscriptLine>,
    pub overall: WeightedGpa,
}

pub fn transcript(db: &Db, student_id: i64) -> AppResult<TranscriptReport> {
    let student =
        students::get(db, student_id)?.ok_or_else(|| AppError::not_found("student", student_id))?;
    let lines = db.fetch_all(
        "SELECT g.id, g.course_id, c.code, c.name, c.credits,
                g.first_semester, g.second_semester, g.gpa
         FROM grades g
         LEFT JOIN courses c ON c.id = g.course_id
         WHERE g.student_id = ?
         ORDER BY g.id",
        [student_id],
        |r| {
            let credits: NumericCell = r.get(4)?;
            Ok(TranscriptLine {
                grade_id: r.get(0)?,
                course_id: r.get(1)?,
                code: r.get(2)?,
                course_name: r.get(3)?,
                credits: whole_number(&credits),
                first_semester: r.get(5)?,
                second_semester: r.get(6)?,
                gpa: r.get(7)?,
            })
        },
    )?;
    let overall = calc::weighted_gpa(
        lines
            .iter()
            .map(|l| (l.credits.map(|c| c as f64), l.gpa.as_number())),
    );
    Ok(TranscriptReport {
        student,
        lines,
        overall,
    })
}

impl fmt::Display for TranscriptReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut t = TextTable::new(&[
            ("Course", 30),
            ("Credit", 8),
            ("Sem1", 6),
            ("Sem2", 6),
            ("GPA", 5),
        ]);
        for l in &self.lines {
            t.push([
                l.course_name
                    .clone()
                    .unwrap_or_else(|| format!("#{}", l.course_id)),
                l.credits.map(|c| c.to_string()).unwrap_or_default(),
                l.first_semester.to_string(),
                l.second_semester.to_string(),
                gpa_text(&l.gpa),
            ]);
        }
        banner(
            f,
            &format!(
                "TRANSCRIPT: {} (ID {})",
                self.student.full_name(),
                self.student.id
            ),
            &t,
        )?;
        for line in t.lines() {
            writeln!(f, "{line}")?;
        }
        writeln!(f, "{}", t.rule())?;
        let o = &self.overall;
        if o.credits_graded > 0.0 {
            writeln!(
                f,
                "Overall GPA: {:.2} ({} of {} credits graded)",
                round2(o.gpa),
                o.credits_graded,
                o.credits_attempted
            )
        } else {
            writeln!(f, "Overall GPA: 0.00 (no graded credits)")
        }
    }
}

/// One row per student joined with each of their enrollments; students with
/// no enrollments appear once.
fn enrollment_rows(db: &Db) -> AppResult<Vec<EnrollmentRow>> {
    db.fetch_all(
        "SELECT s.id, s.first_name, s.last_name, s.status, g.id, g.gpa
         FROM students s
         LEFT JOIN grades g ON g.student_id = s.id
         ORDER BY s.id, g.id",
        [],
        |r| {
            let first: Option<String> = r.get(1)?;
            let last: Option<String> = r.get(2)?;
            Ok(EnrollmentRow {
                student_id: r.get(0)?,
                student_name: format!(
                    "{} {}",
                    first.unwrap_or_default(),
                    last.unwrap_or_default()
                )
                .trim()
                .to_string(),
                student_status: r.get(3)?,
                enrollment_id: r.get(4)?,
                gpa: r.get(5)?,
            })
        },
    )
}

fn course_rows(db: &Db) -> AppResult<Vec<CourseGradeRow>> {
    db.fetch_all(
        "SELECT c.id, c.code, c.name, g.id, g.gpa
         FROM courses c
         LEFT JOIN grades g ON g.course_id = c.id
         ORDER BY c.code COLLATE NOCASE, c.id, g.id",
        [],
        |r| {
            Ok(CourseGradeRow {
                course_id: r.get(0)?,
                code: r.get::<_, Option<String>>(1)?.unwrap_or_default(),
                name: r.get::<_, Option<String>>(2)?.unwrap_or_default(),
                enrollment_id: r.get(3)?,
                gpa: r.get(4)?,
            })
        },
    )
}

fn student_averages(db: &Db) -> AppResult<Vec<calc::GroupAverage<StudentKey>>> {
    let rows = enrollment_rows(db)?;
    Ok(calc::group_average(&rows, StudentKey::from_row, |r| &r.gpa))
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopPerformersReport {
    pub limit: usize,
    #[serde(flatten)]
    pub top: TopPerformers<StudentKey>,
}

pub fn top_performers(db: &Db, n: usize) -> AppResult<TopPerformersReport> {
    let groups = student_averages(db)?;
    Ok(TopPerformersReport {
        limit: n,
        top: calc::top_performers(&groups, n),
    })
}

impl fmt::Display for TopPerformersReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut t = TextTable::new(&[
            ("Rank", 6),
            ("Student Name", 30),
            ("GPA", 6),
            ("Courses", 8),
        ]);
        for r in &self.top.ranked {
            t.push([
                r.rank.to_string(),
                r.key.name.clone(),
                format!("{:.2}", r.average),
                r.graded.to_string(),
            ]);
        }
        banner(
            f,
            &format!(
                "TOP PERFORMERS (top {} of {} students with grades)",
                t.len(),
                self.top.eligible
            ),
            &t,
        )?;
        for line in t.lines() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseStatsReport {
    pub courses: Vec<CourseStat>,
}

pub fn course_stats(db: &Db) -> AppResult<CourseStatsReport> {
    let rows = course_rows(db)?;
    Ok(CourseStatsReport {
        courses: calc::course_stats(&rows),
    })
}

impl fmt::Display for CourseStatsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut t = TextTable::new(&[
            ("Code", 10),
            ("Course Name", 30),
            ("Enrolled", 9),
            ("Graded", 7),
            ("Avg GPA", 8),
        ]);
        for c in &self.courses {
            t.push([
                c.code.clone(),
                c.name.clone(),
                c.total_enrollments.to_string(),
                c.graded_enrollments.to_string(),
                format!("{:.2}", c.average),
            ]);
        }
        banner(f, "COURSE STATISTICS", &t)?;
        for line in t.lines() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AtRiskReport {
    pub threshold: f64,
    pub students: Vec<Flagged<StudentKey>>,
}

pub fn at_risk(db: &Db, threshold: f64) -> AppResult<AtRiskReport> {
    let groups = student_averages(db)?;
    Ok(AtRiskReport {
        threshold,
        students: calc::at_risk(
            &groups,
            |k| calc::is_active_status(k.status.as_deref()),
            threshold,
        ),
    })
}

impl fmt::Display for AtRiskReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut t = TextTable::new(&[("ID", 8), ("Student Name", 30), ("GPA", 6)]);
        for s in &self.students {
            t.push([
                s.key.id.to_string(),
                s.key.name.clone(),
                format!("{:.2}", s.average),
            ]);
        }
        banner(
            f,
            &format!("AT-RISK STUDENTS (GPA < {:.2})", self.threshold),
            &t,
        )?;
        if t.is_empty() {
            return writeln!(f, "No at-risk students.");
        }
        for line in t.lines() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryReport {
    pub generated_at: String,
    pub students: i64,
    pub courses: i64,
    pub grades: i64,
}

pub fn summary(db: &Db) -> AppResult<SummaryReport> {
    Ok(SummaryReport {
        generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        students: db.count(Table::Students)?,
        courses: db.count(Table::Courses)?,
        grades: db.count(Table::Grades)?,
    })
}

impl fmt::Display for SummaryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Report generated: {}", self.generated_at)?;
        writeln!(f, "Students: {}", self.students)?;
        writeln!(f, "Courses: {}", self.courses)?;
        writeln!(f, "Grades: {}", self.grades)
    }
}

/// Where an export named `name` lands: `.txt` is added when the name has no
/// extension.
pub fn export_path(name: &str) -> AppResult<PathBuf> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::validation("filename", "a file name is required"));
    }
    let mut path = PathBuf::from(name);
    if path.extension().is_none() {
        path.set_extension("txt");
    }
    Ok(path)
}

/// Write report text to `name`, returning the path written.
pub fn export_report(name: &str, content: &str) -> AppResult<PathBuf> {
    let path = export_path(name)?;
    write_file(&path, content)?;
    log::info!("exported report to {}", path.display());
    Ok(path)
}

fn write_file(path: &Path, content: &str) -> AppResult<()> {
    std::fs::write(path, content).map_err(|source| AppError::Export {
        path: path.to_string_lossy().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(db: &Db, first: &str, last: &str, status: &str) -> i64 {
        db.insert(
            "INSERT INTO students(first_name, last_name, status, gender) VALUES(?, ?, ?, 'F')",
            (first, last, status),
        )
        .expect("student")
    }

    fn course(db: &Db, code: &str, credits: Option<i64>) -> i64 {
        db.insert(
            "INSERT INTO courses(code, name, credits) VALUES(?, ?, ?)",
            (code, format!("{code} course"), credits),
        )
        .expect("course")
    }

    fn grade(db: &Db, s: i64, c: i64, gpa: rusqlite::types::Value) {
        db.insert(
            "INSERT INTO grades(student_id, course_id, gpa, status) VALUES(?, ?, ?, 'Enrolled')",
            (s, c, gpa),
        )
        .expect("grade");
    }

    fn real(v: f64) -> rusqlite::types::Value {
        rusqlite::types::Value::Real(v)
    }

    fn dirty(v: &str) -> rusqlite::types::Value {
        rusqlite::types::Value::Text(v.to_string())
    }

    #[test]
    fn transcript_weights_by_credits_and_skips_ungraded() {
        let db = Db::open_in_memory().expect("open");
        let s = student(&db, "Ada", "Lovelace", "Active");
        let c4 = course(&db, "MATH", Some(4));
        let c2 = course(&db, "ART", Some(2));
        let c3 = course(&db, "HIS", Some(3));
        grade(&db, s, c4, real(4.0));
        grade(&db, s, c2, real(1.0));
        grade(&db, s, c3, rusqlite::types::Value::Null);

        let t = transcript(&db, s).expect("transcript");
        assert_eq!(t.lines.len(), 3);
        assert!((t.overall.gpa - 3.0).abs() < 1e-9);
        assert_eq!(t.overall.credits_graded, 6.0);
        assert_eq!(t.overall.credits_attempted, 9.0);
        assert!(t.to_string().contains("Overall GPA: 3.00 (6 of 9 credits graded)"));
    }

    #[test]
    fn dirty_credits_weigh_nothing_and_match_the_course_view() {
        let db = Db::open_in_memory().expect("open");
        let s = student(&db, "Ada", "Lovelace", "Active");
        let clean = course(&db, "MATH", Some(4));
        let half = course(&db, "ART", None);
        let text = course(&db, "HIS", None);
        db.execute("UPDATE courses SET credits = 2.5 WHERE id = ?", [half])
            .expect("fractional credits");
        db.execute("UPDATE courses SET credits = 'three' WHERE id = ?", [text])
            .expect("text credits");
        grade(&db, s, clean, real(4.0));
        grade(&db, s, half, real(1.0));
        grade(&db, s, text, real(1.0));

        let listed = crate::records::courses::list(&db, None).expect("courses");
        assert_eq!(listed.len(), 3);
        assert!(listed.iter().filter(|c| c.id != clean).all(|c| c.credits.is_none()));

        let t = transcript(&db, s).expect("transcript");
        assert_eq!(t.lines.iter().filter(|l| l.credits.is_none()).count(), 2);
        assert!((t.overall.gpa - 4.0).abs() < 1e-9);
        assert_eq!(t.overall.credits_attempted, 4.0);
    }

    #[test]
    fn text_student_ids_do_not_break_analytics() {
        let db = Db::open_in_memory().expect("open");
        let s = student(&db, "Ada", "Lovelace", "Active");
        let c = course(&db, "MATH", Some(3));
        grade(&db, s, c, real(3.0));
        db.insert(
            "INSERT INTO grades(student_id, course_id, gpa) VALUES('S-01', ?, 1.0)",
            [c],
        )
        .expect("dirty grade");

        let top = top_performers(&db, 10).expect("top");
        assert_eq!(top.top.eligible, 1);
        assert!(at_risk(&db, 2.0).expect("at risk").students.is_empty());
        let stats = course_stats(&db).expect("stats");
        assert_eq!(stats.courses[0].total_enrollments, 2);
        assert!((stats.courses[0].average - 2.0).abs() < 1e-9);
        assert_eq!(summary(&db).expect("summary").grades, 2);
    }

    #[test]
    fn transcript_without_grades_reports_zero() {
        let db = Db::open_in_memory().expect("open");
        let s = student(&db, "Alan", "Turing", "Active");
        let t = transcript(&db, s).expect("transcript");
        assert!(t.lines.is_empty());
        assert_eq!(t.overall.gpa, 0.0);
        assert!(t.to_string().contains("Overall GPA: 0.00 (no graded credits)"));
    }

    #[test]
    fn transcript_unknown_student_is_not_found() {
        let db = Db::open_in_memory().expect("open");
        assert_eq!(transcript(&db, 5).unwrap_err().code(), "not_found");
    }

    #[test]
    fn top_performers_skip_dirty_values_and_count_eligible() {
        let db = Db::open_in_memory().expect("open");
        let c = course(&db, "CS101", Some(3));
        let a = student(&db, "Ada", "Lovelace", "Active");
        let b = student(&db, "Alan", "Turing", "Active");
        student(&db, "Grace", "Hopper", "Active");
        grade(&db, a, c, real(3.0));
        grade(&db, a, c, dirty("bad"));
        grade(&db, a, c, real(2.0));
        grade(&db, b, c, real(3.5));

        let r = top_performers(&db, 1).expect("top");
        assert_eq!(r.top.eligible, 2);
        assert_eq!(r.top.ranked.len(), 1);
        assert_eq!(r.top.ranked[0].key.name, "Alan Turing");

        let all = top_performers(&db, 10).expect("top");
        assert!((all.top.ranked[1].average - 2.5).abs() < 1e-9);
        assert_eq!(all.top.ranked[1].graded, 2);
        assert!(all.to_string().contains("top 2 of 2 students with grades"));
    }

    #[test]
    fn at_risk_only_flags_active_students_below_threshold() {
        let db = Db::open_in_memory().expect("open");
        let c = course(&db, "CS101", Some(3));
        let a = student(&db, "A", "One", "Active");
        let b = student(&db, "B", "Two", "active");
        let c3 = student(&db, "C", "Three", "Active");
        let d = student(&db, "D", "Four", "Inactive");
        grade(&db, a, c, real(1.9));
        grade(&db, b, c, real(2.0));
        grade(&db, c3, c, real(3.0));
        grade(&db, d, c, real(0.5));

        let r = at_risk(&db, 2.0).expect("at risk");
        assert_eq!(r.students.len(), 1);
        assert_eq!(r.students[0].key.id, a);
        assert!(r.to_string().contains("A One"));

        let none = at_risk(&db, 0.1).expect("at risk");
        assert!(none.to_string().contains("No at-risk students."));
    }

    #[test]
    fn course_stats_separate_empty_from_ungraded() {
        let db = Db::open_in_memory().expect("open");
        let s = student(&db, "Ada", "Lovelace", "Active");
        let empty = course(&db, "AAA", Some(3));
        let waiting = course(&db, "BBB", Some(3));
        let graded = course(&db, "CCC", Some(3));
        grade(&db, s, waiting, rusqlite::types::Value::Null);
        grade(&db, s, graded, real(3.0));
        grade(&db, s, graded, real(2.0));

        let r = course_stats(&db).expect("stats");
        let by_id = |id: i64| r.courses.iter().find(|c| c.course_id == id).expect("course");
        assert_eq!(by_id(empty).total_enrollments, 0);
        assert_eq!(by_id(waiting).total_enrollments, 1);
        assert_eq!(by_id(waiting).graded_enrollments, 0);
        assert_eq!(by_id(waiting).average, 0.0);
        assert_eq!(by_id(graded).graded_enrollments, 2);
        assert!((by_id(graded).average - 2.5).abs() < 1e-9);
    }

    #[test]
    fn student_list_and_grade_summary_render_breakdowns() {
        let db = Db::open_in_memory().expect("open");
        let s = student(&db, "Ada", "Lovelace", "Active");
        student(&db, "Alan", "Turing", "Graduated");
        let c = course(&db, "CS101", Some(3));
        grade(&db, s, c, real(3.25));
        grade(&db, 99, c, real(2.0));

        let list = student_list(&db).expect("list").to_string();
        assert!(list.starts_with("STUDENT LIST (2 students)"));
        assert!(list.contains("By status: Active 1, Graduated 1"));

        let summary = grade_summary(&db).expect("summary");
        assert_eq!(summary.grades.len(), 2);
        let text = summary.to_string();
        assert!(text.contains("3.25"));
        assert!(text.contains("By status: Enrolled 2"));
    }

    #[test]
    fn summary_counts_every_table() {
        let db = Db::open_in_memory().expect("open");
        let s = student(&db, "Ada", "Lovelace", "Active");
        let c = course(&db, "CS101", Some(3));
        grade(&db, s, c, real(3.0));
        let text = render(&db, ReportKind::Summary).expect("summary");
        assert!(text.starts_with("Report generated: "));
        assert!(text.contains("Students: 1\nCourses: 1\nGrades: 1\n"));
    }

    #[test]
    fn export_appends_txt_and_reports_io_failures() {
        let dir = tempfile::tempdir().expect("tempdir");
        let name = dir.path().join("summary");
        let written = export_report(&name.to_string_lossy(), "hello\n").expect("export");
        assert_eq!(written, dir.path().join("summary.txt"));
        assert_eq!(std::fs::read_to_string(&written).expect("read"), "hello\n");

        let kept = export_path("report.csv").expect("path");
        assert_eq!(kept, PathBuf::from("report.csv"));

        let missing = dir.path().join("no-such-dir").join("out");
        let e = export_report(&missing.to_string_lossy(), "x").unwrap_err();
        assert_eq!(e.code(), "export_failed");
        assert_eq!(export_report("  ", "x").unwrap_err().code(), "bad_params");
    }
}
