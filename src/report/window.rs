//! Rolling-window KPI reporting.
//!
//! All metrics are derived from completed scores inside a trailing
//! window. The window counts completed scores only, and that choice
//! applies uniformly to every field: `total_climbs`, the distinct-day
//! count, the daily summaries, and the averages all look at the same
//! set of rows.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use derive_getters::Getters;
use derive_new::new;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::db::{Grade, ScoreRow};
use crate::report::ranking;

/// A trailing time window, inclusive of both boundary instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, new)]
pub struct WindowBounds {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl WindowBounds {
    /// Window covering the last `days` days ending at `now`.
    ///
    /// A score recorded exactly at `now - days` is inside the window;
    /// one recorded an instant earlier is not.
    pub fn trailing_days(now: NaiveDateTime, days: i64) -> Self {
        Self::new(now - Duration::days(days), now)
    }

    /// Whether the instant falls inside the window.
    pub fn contains(&self, instant: &NaiveDateTime) -> bool {
        *instant >= self.start && *instant <= self.end
    }
}

/// Per-date climb totals inside a window.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, new)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    date: NaiveDate,
    total_climbs: i64,
    total_score: i64,
}

/// KPI bundle for one climber over a trailing window.
#[derive(Debug, Clone, Getters, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowReport {
    /// Completed climbs in the window.
    total_climbs: i64,
    /// Sum of the store-defined point values of those climbs.
    total_score: i64,
    /// Distinct calendar dates with at least one completed climb.
    total_days_climbed: i64,
    /// `total_climbs / total_days_climbed`. `None` when no day in the
    /// window has a completed climb; the field is omitted from JSON
    /// rather than coerced to zero.
    #[serde(skip_serializing_if = "Option::is_none")]
    daily_avg_climbs_completed: Option<f64>,
    /// One entry per distinct date, ascending by date.
    daily_summary: Vec<DailySummary>,
    /// The hardest climb in the window, `None` when the window holds no
    /// completed score.
    best_climb: Option<ScoreRow>,
}

/// Average grade of one climb type over a window.
///
/// Grades are only comparable within a climb type, so averages are
/// always scoped per type. The mean of the point values is mapped back
/// to the nearest grade label of the same type; when two labels are
/// equally near, the easier one is reported.
#[derive(Debug, Clone, PartialEq, Getters, Serialize, new)]
#[serde(rename_all = "camelCase")]
pub struct GradeAverage {
    climb_type: String,
    avg_points: f64,
    grade: String,
    sample_size: i64,
}

/// Computes the KPI bundle for the rows inside `bounds`.
///
/// The caller supplies rows already scoped to one climber; the function
/// re-applies the window filter so it holds regardless of how the rows
/// were fetched.
#[instrument(skip(rows, bounds), fields(rows = rows.len()))]
pub fn window_report(rows: &[ScoreRow], bounds: &WindowBounds) -> WindowReport {
    let in_window: Vec<&ScoreRow> = rows
        .iter()
        .filter(|row| *row.completed() && bounds.contains(row.recorded_at()))
        .collect();

    let total_climbs = in_window.len() as i64;
    let total_score: i64 = in_window.iter().map(|row| i64::from(*row.points())).sum();

    let mut by_date: BTreeMap<NaiveDate, (i64, i64)> = BTreeMap::new();
    for row in &in_window {
        let entry = by_date.entry(row.recorded_at().date()).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += i64::from(*row.points());
    }

    let total_days_climbed = by_date.len() as i64;
    let daily_avg_climbs_completed =
        (total_days_climbed > 0).then(|| total_climbs as f64 / total_days_climbed as f64);

    let daily_summary = by_date
        .into_iter()
        .map(|(date, (climbs, score))| DailySummary::new(date, climbs, score))
        .collect();

    let best_climb = ranking::best_climb(in_window.iter().copied()).cloned();

    debug!(
        total_climbs,
        total_score, total_days_climbed, "Window report computed"
    );

    WindowReport {
        total_climbs,
        total_score,
        total_days_climbed,
        daily_avg_climbs_completed,
        daily_summary,
        best_climb,
    }
}

/// Computes the average grade per climb type over the rows inside
/// `bounds`.
///
/// A climb type appears in the result only when at least one completed
/// score of that type falls in the window; the average is otherwise
/// undefined and the type is omitted. Results are ordered by climb
/// type.
#[instrument(skip(rows, bounds, grades), fields(rows = rows.len()))]
pub fn average_grade_by_type(
    rows: &[ScoreRow],
    bounds: &WindowBounds,
    grades: &[Grade],
) -> Vec<GradeAverage> {
    let mut by_type: BTreeMap<&str, (i64, i64)> = BTreeMap::new();
    for row in rows
        .iter()
        .filter(|row| *row.completed() && bounds.contains(row.recorded_at()))
    {
        let entry = by_type.entry(row.climb_type()).or_insert((0, 0));
        entry.0 += i64::from(*row.points());
        entry.1 += 1;
    }

    by_type
        .into_iter()
        .filter_map(|(climb_type, (point_sum, count))| {
            let avg_points = point_sum as f64 / count as f64;
            nearest_grade(grades, climb_type, avg_points).map(|label| {
                GradeAverage::new(climb_type.to_string(), avg_points, label.to_string(), count)
            })
        })
        .collect()
}

/// The grade label of `climb_type` whose point value is closest to
/// `avg_points`, resolving equidistant labels to the easier grade.
fn nearest_grade<'a>(grades: &'a [Grade], climb_type: &str, avg_points: f64) -> Option<&'a str> {
    grades
        .iter()
        .filter(|grade| grade.climb_type() == climb_type)
        .min_by(|a, b| {
            let da = (f64::from(*a.points()) - avg_points).abs();
            let db = (f64::from(*b.points()) - avg_points).abs();
            da.partial_cmp(&db)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.points().cmp(b.points()))
        })
        .map(|grade| grade.grade().as_str())
}
