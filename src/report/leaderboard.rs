//! Leaderboard aggregation.

use std::collections::HashMap;

use derive_getters::Getters;
use derive_new::new;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::db::{Climber, ScoreRow};

/// One leaderboard row: a climber and their total completed ascents.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, new)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    climber_id: i32,
    name: String,
    total_score: i64,
}

/// Computes the leaderboard from the full climber and score sets.
///
/// The total score is the count of completed scores: each completed
/// ascent contributes exactly one point, regardless of attempts or
/// grade. Climbers with no completions still appear with a total of 0.
///
/// Ordering is descending by total score, ties broken by ascending
/// climber name (case-sensitive). The result is a pure function of the
/// input multisets; row order does not matter.
#[instrument(skip(climbers, rows), fields(climbers = climbers.len(), rows = rows.len()))]
pub fn leaderboard(climbers: &[Climber], rows: &[ScoreRow]) -> Vec<LeaderboardEntry> {
    let mut completions: HashMap<i32, i64> = HashMap::new();
    for row in rows.iter().filter(|row| *row.completed()) {
        *completions.entry(*row.climber_id()).or_insert(0) += 1;
    }

    let mut entries: Vec<LeaderboardEntry> = climbers
        .iter()
        .map(|climber| {
            let total = completions.get(climber.id()).copied().unwrap_or(0);
            LeaderboardEntry::new(*climber.id(), climber.name().clone(), total)
        })
        .collect();

    entries.sort_by(|a, b| {
        b.total_score
            .cmp(&a.total_score)
            .then_with(|| a.name.cmp(&b.name))
    });

    debug!(entries = entries.len(), "Leaderboard computed");
    entries
}
