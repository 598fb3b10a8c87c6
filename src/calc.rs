use crate::models::NumericCell;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

pub const DEFAULT_TOP_N: usize = 10;
pub const DEFAULT_AT_RISK_THRESHOLD: f64 = 2.0;

/// Two-decimal rounding used for every GPA shown to a user.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// One student/enrollment pair from `students LEFT JOIN grades`. Students
/// without enrollments appear once with `enrollment_id = None`.
#[derive(Debug, Clone)]
pub struct EnrollmentRow {
    pub student_id: i64,
    pub student_name: String,
    pub student_status: Option<String>,
    pub enrollment_id: Option<i64>,
    pub gpa: NumericCell,
}

/// One course/enrollment pair from `courses LEFT JOIN grades`.
#[derive(Debug, Clone)]
pub struct CourseGradeRow {
    pub course_id: i64,
    pub code: String,
    pub name: String,
    pub enrollment_id: Option<i64>,
    pub gpa: NumericCell,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentKey {
    pub id: i64,
    pub name: String,
    pub status: Option<String>,
}

impl StudentKey {
    pub fn from_row(r: &EnrollmentRow) -> Self {
        StudentKey {
            id: r.student_id,
            name: r.student_name.clone(),
            status: r.student_status.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupAverage<K> {
    pub key: K,
    pub rows: usize,
    pub values: Vec<f64>,
    pub skipped: usize,
    pub average: Option<f64>,
}

/// Group rows by `key` and average the numeric cells picked by `value`.
///
/// Groups keep first-encounter order. Blank cells are ignored; cells that do
/// not parse are counted in `skipped`. Neither contributes to the sum or the
/// count, so an ungraded enrollment never drags an average toward zero.
pub fn group_average<R, K, FK, FV>(rows: &[R], key: FK, value: FV) -> Vec<GroupAverage<K>>
where
    K: Eq + Hash + Clone,
    FK: Fn(&R) -> K,
    FV: Fn(&R) -> &NumericCell,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<GroupAverage<K>> = Vec::new();

    for row in rows {
        let k = key(row);
        let slot = *index.entry(k.clone()).or_insert_with(|| {
            groups.push(GroupAverage {
                key: k,
                rows: 0,
                values: Vec::new(),
                skipped: 0,
                average: None,
            });
            groups.len() - 1
        });
        let group = &mut groups[slot];
        group.rows += 1;

        let cell = value(row);
        match cell.as_number() {
            Some(v) => group.values.push(v),
            None if cell.is_blank() => {}
            None => {
                log::debug!("skipping unparseable value {cell:?}");
                group.skipped += 1;
            }
        }
    }

    for g in &mut groups {
        if !g.values.is_empty() {
            g.average = Some(g.values.iter().sum::<f64>() / g.values.len() as f64);
        }
    }
    groups
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ranked<K> {
    pub rank: usize,
    pub key: K,
    pub average: f64,
    pub graded: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopPerformers<K> {
    pub ranked: Vec<Ranked<K>>,
    /// Groups that had at least one value, before truncation.
    pub eligible: usize,
}

pub fn top_performers<K: Clone>(groups: &[GroupAverage<K>], n: usize) -> TopPerformers<K> {
    let mut eligible: Vec<(&GroupAverage<K>, f64)> = groups
        .iter()
        .filter_map(|g| g.average.map(|avg| (g, avg)))
        .collect();
    // Stable: equal averages keep encounter order.
    eligible.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

    let total = eligible.len();
    let ranked = eligible
        .into_iter()
        .take(n)
        .enumerate()
        .map(|(i, (g, average))| Ranked {
            rank: i + 1,
            key: g.key.clone(),
            average,
            graded: g.values.len(),
        })
        .collect();

    TopPerformers {
        ranked,
        eligible: total,
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Flagged<K> {
    pub key: K,
    pub average: f64,
}

/// Active entities whose average is strictly below `threshold`, worst first.
pub fn at_risk<K, F>(groups: &[GroupAverage<K>], is_active: F, threshold: f64) -> Vec<Flagged<K>>
where
    K: Clone,
    F: Fn(&K) -> bool,
{
    let mut flagged: Vec<Flagged<K>> = groups
        .iter()
        .filter(|g| is_active(&g.key))
        .filter_map(|g| {
            g.average
                .filter(|avg| *avg < threshold)
                .map(|average| Flagged {
                    key: g.key.clone(),
                    average,
                })
        })
        .collect();
    flagged.sort_by(|a, b| a.average.partial_cmp(&b.average).unwrap_or(Ordering::Equal));
    flagged
}

pub fn is_active_status(status: Option<&str>) -> bool {
    status
        .map(|s| s.trim().eq_ignore_ascii_case("active"))
        .unwrap_or(false)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightedGpa {
    pub gpa: f64,
    pub credits_attempted: f64,
    pub credits_graded: f64,
    pub courses_graded: usize,
}

/// Credit-weighted GPA over `(credits, gpa)` pairs.
///
/// Pairs without a GPA count toward `credits_attempted` only. Missing,
/// negative or non-finite credits weigh 0. No graded credits gives 0.0.
pub fn weighted_gpa<I>(pairs: I) -> WeightedGpa
where
    I: IntoIterator<Item = (Option<f64>, Option<f64>)>,
{
    let mut points = 0.0_f64;
    let mut attempted = 0.0_f64;
    let mut graded = 0.0_f64;
    let mut courses_graded = 0_usize;

    for (credits, gpa) in pairs {
        let credits = credits.filter(|c| c.is_finite() && *c > 0.0).unwrap_or(0.0);
        attempted += credits;
        let Some(gpa) = gpa else {
            continue;
        };
        courses_graded += 1;
        points += credits * gpa;
        graded += credits;
    }

    WeightedGpa {
        gpa: if graded > 0.0 { points / graded } else { 0.0 },
        credits_attempted: attempted,
        credits_graded: graded,
        courses_graded,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseStat {
    pub course_id: i64,
    pub code: String,
    pub name: String,
    pub total_enrollments: usize,
    pub graded_enrollments: usize,
    pub average: f64,
}

/// Per-course enrollment counts and GPA average, in first-encounter order.
/// `average` is 0.0 whenever `graded_enrollments` is 0; the two counts tell an
/// empty course apart from one still waiting on grades.
pub fn course_stats(rows: &[CourseGradeRow]) -> Vec<CourseStat> {
    let groups = group_average(
        rows,
        |r| (r.course_id, r.code.clone(), r.name.clone()),
        |r| &r.gpa,
    );

    let mut enrollments: HashMap<i64, usize> = HashMap::new();
    for r in rows {
        let entry = enrollments.entry(r.course_id).or_insert(0);
        if r.enrollment_id.is_some() {
            *entry += 1;
        }
    }

    groups
        .into_iter()
        .map(|g| {
            let (course_id, code, name) = g.key;
            CourseStat {
                course_id,
                code,
                name,
                total_enrollments: enrollments.get(&course_id).copied().unwrap_or(0),
                graded_enrollments: g.values.len(),
                average: g.average.unwrap_or(0.0),
            }
        })
        .collect()
}

/// Count labels, bucketing blank ones under `blank`. Sorted by label.
pub fn distribution<'a, I>(labels: I, blank: &str) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for label in labels {
        let label = match label.map(str::trim) {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => blank.to_string(),
        };
        *counts.entry(label).or_insert(0) += 1;
    }
    counts.into_iter().collect()
}
