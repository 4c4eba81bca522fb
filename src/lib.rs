//! Cragboard library - climbing-gym ascent tracking
//!
//! Tracks climbers, gyms, gym areas, walls, grade scales, and recorded
//! attempts/completions, and derives reporting from the raw score
//! facts.
//!
//! # Architecture
//!
//! - **db**: Diesel/SQLite store: entity models, the joined score read
//!   model, and the repository (parameterized queries only).
//! - **report**: pure aggregation core: leaderboard totals,
//!   rolling-window KPIs, best-climb ranking.
//! - **service**: business layer tying the store and the core together.
//! - **rest**: axum REST API; the service is injected as router state.
//!
//! # Example
//!
//! ```no_run
//! use cragboard::{ScoreRepository, ScoreService};
//!
//! # fn example() -> anyhow::Result<()> {
//! let repository = ScoreRepository::new("cragboard.db".to_string())?;
//! let service = ScoreService::new(repository);
//! let app = cragboard::rest::router(service);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod db;
mod error;
mod service;

// Public modules
pub mod report;
pub mod rest;

// Crate-level exports - store types
pub use db::{
    Climber, DbError, DbErrorKind, Grade, Gym, GymArea, NewClimber, NewScore, Score, ScoreFilter,
    ScoreRepository, ScoreRow, Wall,
};

// Crate-level exports - error taxonomy
pub use error::ServiceError;

// Crate-level exports - service layer
pub use service::{DashboardStats, RecordScore, ScoreService};

// Crate-level exports - aggregation core
pub use report::{
    DailySummary, GradeAverage, LeaderboardEntry, WindowBounds, WindowReport,
};
