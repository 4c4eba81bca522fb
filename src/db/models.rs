//! Database models and domain types.

use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;
use serde::Serialize;

use crate::db::schema;

/// Climber database model.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters, Serialize, new)]
#[diesel(table_name = schema::climbers)]
pub struct Climber {
    id: i32,
    name: String,
    nickname: Option<String>,
    email: String,
    created_at: NaiveDateTime,
}

/// Insertable climber model for registration.
#[derive(Debug, Clone, Insertable, new, Getters)]
#[diesel(table_name = schema::climbers)]
pub struct NewClimber {
    name: String,
    nickname: Option<String>,
    email: String,
}

/// Gym database model. Read-only reference data.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters, Serialize)]
#[diesel(table_name = schema::gyms)]
pub struct Gym {
    id: i32,
    name: String,
}

/// Gym area database model. Areas scope walls to a climb type
/// (e.g. "boulder", "top-rope").
#[derive(Debug, Clone, Queryable, Identifiable, Associations, Selectable, Getters, Serialize)]
#[diesel(table_name = schema::gym_areas)]
#[diesel(belongs_to(Gym))]
pub struct GymArea {
    id: i32,
    gym_id: i32,
    climb_type: String,
    name: String,
}

/// Wall database model.
#[derive(Debug, Clone, Queryable, Identifiable, Associations, Selectable, Getters, Serialize)]
#[diesel(table_name = schema::walls)]
#[diesel(belongs_to(GymArea))]
pub struct Wall {
    id: i32,
    gym_area_id: i32,
    wall_name: String,
    wall_number: i32,
}

/// Grade database model. Grades order difficulty within a single climb
/// type; `points` is the store-defined difficulty value, strictly
/// increasing with difficulty. Grades from different climb types are
/// never comparable.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters, Serialize, new)]
#[diesel(table_name = schema::grades)]
pub struct Grade {
    id: i32,
    climb_type: String,
    grade: String,
    points: i32,
}

/// Score database model: one recorded attempt or completion of a wall.
/// Scores are append-only facts; they are deleted but never updated.
#[derive(Debug, Clone, Queryable, Identifiable, Associations, Selectable, Getters, Serialize)]
#[diesel(table_name = schema::scores)]
#[diesel(belongs_to(Climber))]
#[diesel(belongs_to(Wall))]
pub struct Score {
    id: i32,
    climber_id: i32,
    wall_id: i32,
    grade: String,
    completed: bool,
    attempts: i32,
    notes: Option<String>,
    recorded_at: NaiveDateTime,
}

/// Insertable score model for recording a new attempt or completion.
#[derive(Debug, Clone, Insertable, new, Getters)]
#[diesel(table_name = schema::scores)]
pub struct NewScore {
    climber_id: i32,
    wall_id: i32,
    grade: String,
    completed: bool,
    attempts: i32,
    notes: Option<String>,
    recorded_at: NaiveDateTime,
}

/// A score joined with its climber, wall, area, gym, and grade metadata.
///
/// This is the read model the aggregation core consumes: the repository
/// assembles it from raw rows so all derived metrics stay pure
/// computations over plain values.
#[derive(Debug, Clone, Getters, Serialize, new)]
pub struct ScoreRow {
    score_id: i32,
    climber_id: i32,
    climber_name: String,
    wall_id: i32,
    wall_name: String,
    wall_number: i32,
    gym_area_id: i32,
    gym_area_name: String,
    gym_name: String,
    climb_type: String,
    grade: String,
    points: i32,
    completed: bool,
    attempts: i32,
    notes: Option<String>,
    recorded_at: NaiveDateTime,
}
