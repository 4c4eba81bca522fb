//! Best-climb ranking.
//!
//! Ranks completed scores by grade difficulty with recency as the
//! tie-break. This ordering is deliberately distinct from the
//! leaderboard ordering, which ranks climbers by completion count.

use chrono::NaiveDateTime;
use tracing::instrument;

use crate::db::ScoreRow;

/// Selects the hardest completed climb from a set of score rows.
///
/// Rank key, descending priority: grade points, most recent
/// `recorded_at`, highest score id. The id makes the winner
/// deterministic even when two scores share the same grade and
/// timestamp. Incomplete scores never win; returns `None` when the set
/// contains no completed score.
#[instrument(skip(rows))]
pub fn best_climb<'a, I>(rows: I) -> Option<&'a ScoreRow>
where
    I: IntoIterator<Item = &'a ScoreRow>,
{
    rows.into_iter()
        .filter(|row| *row.completed())
        .max_by_key(|row| rank_key(row))
}

/// Ordering key for best-climb selection.
fn rank_key(row: &ScoreRow) -> (i32, NaiveDateTime, i32) {
    (*row.points(), *row.recorded_at(), *row.score_id())
}
