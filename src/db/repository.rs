//! Database repository for climbers, gyms, walls, grades, and scores.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;
use tracing::{debug, info, instrument, warn};

use crate::db::{
    Climber, DbError, DbErrorKind, Grade, Gym, GymArea, NewClimber, NewScore, Score, ScoreRow,
    Wall, schema,
};

/// Filter parameters for [`ScoreRepository::list_scores`].
///
/// Timestamp bounds are inclusive on both ends: a score recorded exactly
/// at `recorded_from` or `recorded_to` is returned.
#[derive(Debug, Clone, Default, Getters, new)]
pub struct ScoreFilter {
    climber_id: Option<i32>,
    recorded_from: Option<NaiveDateTime>,
    recorded_to: Option<NaiveDateTime>,
}

impl ScoreFilter {
    /// Filter matching every score.
    pub fn all() -> Self {
        Self::default()
    }

    /// Filter matching all scores of one climber.
    pub fn for_climber(climber_id: i32) -> Self {
        Self::new(Some(climber_id), None, None)
    }
}

/// Database repository for the climbing score store.
#[derive(Debug, Clone)]
pub struct ScoreRepository {
    db_path: String,
}

impl ScoreRepository {
    /// Creates a new repository connected to the database at the given path.
    ///
    /// Use `":memory:"` for an in-memory database (useful for tests).
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the path is invalid.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn new(db_path: String) -> Result<Self, DbError> {
        info!(path = %db_path, "Creating ScoreRepository");
        Ok(Self { db_path })
    }

    /// Establishes a database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.db_path, "Establishing connection");
        let mut conn = SqliteConnection::establish(&self.db_path).map_err(|e| {
            DbError::with_kind(
                format!("Failed to connect to '{}': {}", self.db_path, e),
                DbErrorKind::Connection,
            )
        })?;
        // SQLite only enforces REFERENCES clauses when asked.
        diesel::sql_query("PRAGMA foreign_keys = ON").execute(&mut conn)?;
        Ok(conn)
    }

    /// Registers a new climber.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] with [`DbErrorKind::UniqueViolation`] when the
    /// email is already taken, or on any other database error.
    ///
    /// [`DbErrorKind::UniqueViolation`]: crate::db::DbErrorKind::UniqueViolation
    #[instrument(skip(self, climber), fields(name = %climber.name(), email = %climber.email()))]
    pub fn create_climber(&self, climber: NewClimber) -> Result<Climber, DbError> {
        debug!("Creating climber");
        let mut conn = self.connection()?;

        let created = diesel::insert_into(schema::climbers::table)
            .values(&climber)
            .returning(Climber::as_returning())
            .get_result(&mut conn)?;

        info!(climber_id = created.id(), name = %created.name(), "Climber created");
        Ok(created)
    }

    /// Gets a climber by id. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_climber(&self, climber_id: i32) -> Result<Option<Climber>, DbError> {
        debug!(climber_id = %climber_id, "Looking up climber");
        let mut conn = self.connection()?;

        let climber = schema::climbers::table
            .find(climber_id)
            .first::<Climber>(&mut conn)
            .optional()?;

        Ok(climber)
    }

    /// Lists all climbers, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn list_climbers(&self) -> Result<Vec<Climber>, DbError> {
        debug!("Listing all climbers");
        let mut conn = self.connection()?;

        let climbers = schema::climbers::table
            .order(schema::climbers::name.asc())
            .load::<Climber>(&mut conn)?;

        info!(count = climbers.len(), "Climbers loaded");
        Ok(climbers)
    }

    /// Deletes a climber and all of their scores. Returns the number of
    /// climber rows removed (0 signals not-found).
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn delete_climber(&self, climber_id: i32) -> Result<usize, DbError> {
        debug!(climber_id = %climber_id, "Deleting climber");
        let mut conn = self.connection()?;

        let removed = conn.transaction::<usize, diesel::result::Error, _>(|conn| {
            diesel::delete(
                schema::scores::table.filter(schema::scores::climber_id.eq(climber_id)),
            )
            .execute(conn)?;
            diesel::delete(schema::climbers::table.find(climber_id)).execute(conn)
        })?;

        info!(climber_id = %climber_id, removed, "Climber delete finished");
        Ok(removed)
    }

    /// Lists all gyms, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn list_gyms(&self) -> Result<Vec<Gym>, DbError> {
        let mut conn = self.connection()?;

        let gyms = schema::gyms::table
            .order(schema::gyms::name.asc())
            .load::<Gym>(&mut conn)?;

        Ok(gyms)
    }

    /// Lists all gym areas joined with their owning gym, ordered by area name.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn list_gym_areas(&self) -> Result<Vec<(GymArea, Gym)>, DbError> {
        let mut conn = self.connection()?;

        let areas = schema::gym_areas::table
            .inner_join(schema::gyms::table)
            .order(schema::gym_areas::name.asc())
            .select((GymArea::as_select(), Gym::as_select()))
            .load::<(GymArea, Gym)>(&mut conn)?;

        Ok(areas)
    }

    /// Gets a gym area by id. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_gym_area(&self, gym_area_id: i32) -> Result<Option<GymArea>, DbError> {
        let mut conn = self.connection()?;

        let area = schema::gym_areas::table
            .find(gym_area_id)
            .first::<GymArea>(&mut conn)
            .optional()?;

        Ok(area)
    }

    /// Lists the areas of one gym.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn areas_for_gym(&self, gym_id: i32) -> Result<Vec<GymArea>, DbError> {
        let mut conn = self.connection()?;

        let areas = schema::gym_areas::table
            .filter(schema::gym_areas::gym_id.eq(gym_id))
            .order(schema::gym_areas::name.asc())
            .load::<GymArea>(&mut conn)?;

        Ok(areas)
    }

    /// Lists all walls joined with area and gym metadata, ordered by wall name.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn list_walls(&self) -> Result<Vec<(Wall, GymArea, Gym)>, DbError> {
        let mut conn = self.connection()?;

        let walls = schema::walls::table
            .inner_join(schema::gym_areas::table.inner_join(schema::gyms::table))
            .order(schema::walls::wall_name.asc())
            .select((Wall::as_select(), GymArea::as_select(), Gym::as_select()))
            .load::<(Wall, GymArea, Gym)>(&mut conn)?;

        Ok(walls)
    }

    /// Lists the walls of one gym (across all of its areas).
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn walls_for_gym(&self, gym_id: i32) -> Result<Vec<(Wall, GymArea)>, DbError> {
        let mut conn = self.connection()?;

        let walls = schema::walls::table
            .inner_join(schema::gym_areas::table)
            .filter(schema::gym_areas::gym_id.eq(gym_id))
            .order((
                schema::walls::wall_name.asc(),
                schema::walls::wall_number.asc(),
            ))
            .select((Wall::as_select(), GymArea::as_select()))
            .load::<(Wall, GymArea)>(&mut conn)?;

        Ok(walls)
    }

    /// Lists the walls of one gym area.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn walls_for_area(&self, gym_area_id: i32) -> Result<Vec<Wall>, DbError> {
        let mut conn = self.connection()?;

        let walls = schema::walls::table
            .filter(schema::walls::gym_area_id.eq(gym_area_id))
            .order(schema::walls::wall_number.asc())
            .load::<Wall>(&mut conn)?;

        Ok(walls)
    }

    /// Gets a wall by id. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_wall(&self, wall_id: i32) -> Result<Option<Wall>, DbError> {
        let mut conn = self.connection()?;

        let wall = schema::walls::table
            .find(wall_id)
            .first::<Wall>(&mut conn)
            .optional()?;

        Ok(wall)
    }

    /// Lists the full grade table, ordered by climb type then difficulty.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn list_grades(&self) -> Result<Vec<Grade>, DbError> {
        let mut conn = self.connection()?;

        let grades = schema::grades::table
            .order((
                schema::grades::climb_type.asc(),
                schema::grades::points.asc(),
            ))
            .load::<Grade>(&mut conn)?;

        Ok(grades)
    }

    /// Lists the grade scale of one climb type, easiest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn grades_for_climb_type(&self, climb_type: &str) -> Result<Vec<Grade>, DbError> {
        let mut conn = self.connection()?;

        let grades = schema::grades::table
            .filter(schema::grades::climb_type.eq(climb_type))
            .order(schema::grades::points.asc())
            .load::<Grade>(&mut conn)?;

        Ok(grades)
    }

    /// Records a new score. A single-row insert with no recomputation:
    /// all derived metrics are computed on read.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self, score), fields(climber_id = score.climber_id(), wall_id = score.wall_id(), grade = %score.grade()))]
    pub fn insert_score(&self, score: NewScore) -> Result<Score, DbError> {
        debug!("Recording score");
        let mut conn = self.connection()?;

        let recorded = diesel::insert_into(schema::scores::table)
            .values(&score)
            .returning(Score::as_returning())
            .get_result(&mut conn)?;

        info!(
            score_id = recorded.id(),
            climber_id = recorded.climber_id(),
            completed = recorded.completed(),
            "Score recorded"
        );
        Ok(recorded)
    }

    /// Deletes a score. Returns the number of rows removed (0 signals
    /// not-found).
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn delete_score(&self, score_id: i32) -> Result<usize, DbError> {
        debug!(score_id = %score_id, "Deleting score");
        let mut conn = self.connection()?;

        let removed = diesel::delete(schema::scores::table.find(score_id)).execute(&mut conn)?;

        info!(score_id = %score_id, removed, "Score delete finished");
        Ok(removed)
    }

    /// Loads scores joined with climber, wall, area, gym, and grade
    /// metadata, newest first. Ties on `recorded_at` fall back to
    /// descending score id so the order is reproducible.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self, filter), fields(climber_id = ?filter.climber_id()))]
    pub fn list_scores(&self, filter: &ScoreFilter) -> Result<Vec<ScoreRow>, DbError> {
        debug!("Loading joined score rows");
        let mut conn = self.connection()?;

        let grade_points: HashMap<(String, String), i32> = schema::grades::table
            .load::<Grade>(&mut conn)?
            .into_iter()
            .map(|g| ((g.climb_type().clone(), g.grade().clone()), *g.points()))
            .collect();

        let mut query = schema::scores::table
            .inner_join(schema::climbers::table)
            .inner_join(
                schema::walls::table
                    .inner_join(schema::gym_areas::table.inner_join(schema::gyms::table)),
            )
            .order(schema::scores::recorded_at.desc())
            .then_order_by(schema::scores::id.desc())
            .select((
                Score::as_select(),
                Climber::as_select(),
                Wall::as_select(),
                GymArea::as_select(),
                Gym::as_select(),
            ))
            .into_boxed();

        if let Some(climber_id) = *filter.climber_id() {
            query = query.filter(schema::scores::climber_id.eq(climber_id));
        }
        if let Some(from) = *filter.recorded_from() {
            query = query.filter(schema::scores::recorded_at.ge(from));
        }
        if let Some(to) = *filter.recorded_to() {
            query = query.filter(schema::scores::recorded_at.le(to));
        }

        let raw = query.load::<(Score, Climber, Wall, GymArea, Gym)>(&mut conn)?;

        let rows = raw
            .into_iter()
            .map(|(score, climber, wall, area, gym)| {
                let key = (area.climb_type().clone(), score.grade().clone());
                let points = match grade_points.get(&key) {
                    Some(points) => *points,
                    None => {
                        warn!(
                            score_id = score.id(),
                            climb_type = %key.0,
                            grade = %key.1,
                            "Score grade missing from grade table"
                        );
                        0
                    }
                };
                ScoreRow::new(
                    *score.id(),
                    *score.climber_id(),
                    climber.name().clone(),
                    *wall.id(),
                    wall.wall_name().clone(),
                    *wall.wall_number(),
                    *area.id(),
                    area.name().clone(),
                    gym.name().clone(),
                    area.climb_type().clone(),
                    score.grade().clone(),
                    points,
                    *score.completed(),
                    *score.attempts(),
                    score.notes().clone(),
                    *score.recorded_at(),
                )
            })
            .collect::<Vec<ScoreRow>>();

        info!(count = rows.len(), "Score rows loaded");
        Ok(rows)
    }

    /// Counts registered climbers.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn count_climbers(&self) -> Result<i64, DbError> {
        let mut conn = self.connection()?;
        let count = schema::climbers::table.count().get_result(&mut conn)?;
        Ok(count)
    }

    /// Counts walls.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn count_walls(&self) -> Result<i64, DbError> {
        let mut conn = self.connection()?;
        let count = schema::walls::table.count().get_result(&mut conn)?;
        Ok(count)
    }

    /// Counts completed ascents across all climbers.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn count_completed_ascents(&self) -> Result<i64, DbError> {
        let mut conn = self.connection()?;
        let count = schema::scores::table
            .filter(schema::scores::completed.eq(true))
            .count()
            .get_result(&mut conn)?;
        Ok(count)
    }
}
