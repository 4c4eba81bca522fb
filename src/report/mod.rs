//! Scoring aggregation and ranking core.
//!
//! Pure computations over joined score rows fetched from the store:
//! leaderboard totals, rolling-window KPIs, and best-climb selection.
//! Nothing in this module performs I/O; the service layer feeds it rows
//! and returns the results.

mod leaderboard;
mod ranking;
mod window;

pub use leaderboard::{LeaderboardEntry, leaderboard};
pub use ranking::best_climb;
pub use window::{
    DailySummary, GradeAverage, WindowBounds, WindowReport, average_grade_by_type, window_report,
};
