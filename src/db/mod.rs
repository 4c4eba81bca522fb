//! Database persistence layer for climbers, gyms, walls, grades, and scores.

mod error;
mod models;
mod repository;
mod schema; // Diesel generated schema - internal use only

pub use error::{DbError, DbErrorKind};
pub use models::{
    Climber, Grade, Gym, GymArea, NewClimber, NewScore, Score, ScoreRow, Wall,
};
pub use repository::{ScoreFilter, ScoreRepository};
