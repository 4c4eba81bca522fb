//! Scoring business logic layer.

use chrono::{NaiveDateTime, Utc};
use derive_getters::Getters;
use derive_new::new;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::db::{
    Climber, Grade, Gym, GymArea, NewClimber, NewScore, Score, ScoreFilter, ScoreRepository,
    ScoreRow, Wall,
};
use crate::error::ServiceError;
use crate::report::{
    GradeAverage, LeaderboardEntry, WindowBounds, WindowReport, average_grade_by_type,
    leaderboard, window_report,
};

/// Request to record a new score.
///
/// `recorded_at` defaults to the current UTC time when absent; all
/// stored timestamps share the UTC convention.
#[derive(Debug, Clone, Getters, new)]
pub struct RecordScore {
    climber_id: i32,
    wall_id: i32,
    grade: String,
    completed: bool,
    attempts: i32,
    notes: Option<String>,
    recorded_at: Option<NaiveDateTime>,
}

/// Dashboard totals across the whole store.
#[derive(Debug, Clone, Getters, Serialize, new)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    total_climbers: i64,
    total_walls: i64,
    total_ascents: i64,
}

/// Service layer for climbing score operations.
///
/// Wraps [`ScoreRepository`] with validation and the aggregation core:
/// the repository supplies raw joined rows, the [`report`] functions
/// derive the metrics, and this layer maps failures onto the
/// [`ServiceError`] taxonomy.
///
/// [`report`]: crate::report
#[derive(Debug, Clone)]
pub struct ScoreService {
    repository: ScoreRepository,
}

impl ScoreService {
    /// Creates a new service backed by the given repository.
    #[instrument(skip(repository))]
    pub fn new(repository: ScoreRepository) -> Self {
        info!("Creating ScoreService");
        Self { repository }
    }

    /// Returns the underlying repository.
    pub fn repository(&self) -> &ScoreRepository {
        &self.repository
    }

    /// Registers a new climber.
    ///
    /// # Errors
    ///
    /// [`ServiceError::Validation`] when name or email is blank;
    /// [`ServiceError::Conflict`] when the email is already registered.
    #[instrument(skip(self, nickname, email), fields(name = %name))]
    pub fn register_climber(
        &self,
        name: String,
        nickname: Option<String>,
        email: String,
    ) -> Result<Climber, ServiceError> {
        debug!("Registering climber");

        if name.trim().is_empty() {
            return Err(ServiceError::Validation("name is required".to_string()));
        }
        if email.trim().is_empty() {
            return Err(ServiceError::Validation("email is required".to_string()));
        }

        let climber = self
            .repository
            .create_climber(NewClimber::new(name, nickname, email))?;
        info!(climber_id = climber.id(), "Climber registered");
        Ok(climber)
    }

    /// Gets a climber by id.
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] when no such climber exists.
    #[instrument(skip(self))]
    pub fn get_climber(&self, climber_id: i32) -> Result<Climber, ServiceError> {
        self.repository
            .get_climber(climber_id)?
            .ok_or_else(|| ServiceError::NotFound(format!("climber {}", climber_id)))
    }

    /// Lists all climbers, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Store`] on a database failure.
    #[instrument(skip(self))]
    pub fn list_climbers(&self) -> Result<Vec<Climber>, ServiceError> {
        Ok(self.repository.list_climbers()?)
    }

    /// Deletes a climber and all of their scores.
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] when no such climber exists.
    #[instrument(skip(self))]
    pub fn delete_climber(&self, climber_id: i32) -> Result<(), ServiceError> {
        let removed = self.repository.delete_climber(climber_id)?;
        if removed == 0 {
            return Err(ServiceError::NotFound(format!("climber {}", climber_id)));
        }
        info!(climber_id, "Climber deleted");
        Ok(())
    }

    /// Lists all gyms.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Store`] on a database failure.
    #[instrument(skip(self))]
    pub fn list_gyms(&self) -> Result<Vec<Gym>, ServiceError> {
        Ok(self.repository.list_gyms()?)
    }

    /// Lists all gym areas with their owning gym.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Store`] on a database failure.
    #[instrument(skip(self))]
    pub fn list_gym_areas(&self) -> Result<Vec<(GymArea, Gym)>, ServiceError> {
        Ok(self.repository.list_gym_areas()?)
    }

    /// Lists the areas of one gym.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Store`] on a database failure.
    #[instrument(skip(self))]
    pub fn areas_for_gym(&self, gym_id: i32) -> Result<Vec<GymArea>, ServiceError> {
        Ok(self.repository.areas_for_gym(gym_id)?)
    }

    /// Lists all walls with area and gym metadata.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Store`] on a database failure.
    #[instrument(skip(self))]
    pub fn list_walls(&self) -> Result<Vec<(Wall, GymArea, Gym)>, ServiceError> {
        Ok(self.repository.list_walls()?)
    }

    /// Lists the walls of one gym.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Store`] on a database failure.
    #[instrument(skip(self))]
    pub fn walls_for_gym(&self, gym_id: i32) -> Result<Vec<(Wall, GymArea)>, ServiceError> {
        Ok(self.repository.walls_for_gym(gym_id)?)
    }

    /// Lists the walls of one gym area.
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] when no such area exists.
    #[instrument(skip(self))]
    pub fn walls_for_area(&self, gym_area_id: i32) -> Result<Vec<Wall>, ServiceError> {
        self.get_gym_area(gym_area_id)?;
        Ok(self.repository.walls_for_area(gym_area_id)?)
    }

    /// Lists the grade scale available in one gym area.
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] when no such area exists.
    #[instrument(skip(self))]
    pub fn area_grades(&self, gym_area_id: i32) -> Result<Vec<Grade>, ServiceError> {
        let area = self.get_gym_area(gym_area_id)?;
        Ok(self.repository.grades_for_climb_type(area.climb_type())?)
    }

    /// Lists the grade scale available on one wall.
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] when no such wall exists.
    #[instrument(skip(self))]
    pub fn wall_grades(&self, wall_id: i32) -> Result<Vec<Grade>, ServiceError> {
        let wall = self
            .repository
            .get_wall(wall_id)?
            .ok_or_else(|| ServiceError::NotFound(format!("wall {}", wall_id)))?;
        let area = self.get_gym_area(*wall.gym_area_id())?;
        Ok(self.repository.grades_for_climb_type(area.climb_type())?)
    }

    /// Lists the full grade table.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Store`] on a database failure.
    #[instrument(skip(self))]
    pub fn list_grades(&self) -> Result<Vec<Grade>, ServiceError> {
        Ok(self.repository.list_grades()?)
    }

    /// Records a new score: a single-row insert, metrics are derived on
    /// read.
    ///
    /// # Errors
    ///
    /// [`ServiceError::Validation`] for non-positive attempts or a grade
    /// the wall's climb type does not define;
    /// [`ServiceError::NotFound`] when the climber or wall is absent.
    #[instrument(skip(self, request), fields(climber_id = request.climber_id(), wall_id = request.wall_id()))]
    pub fn record_score(&self, request: RecordScore) -> Result<Score, ServiceError> {
        debug!("Recording score");

        if *request.attempts() < 1 {
            return Err(ServiceError::Validation(
                "attempts must be at least 1".to_string(),
            ));
        }
        if request.grade().trim().is_empty() {
            return Err(ServiceError::Validation("grade is required".to_string()));
        }

        self.get_climber(*request.climber_id())?;
        let wall = self
            .repository
            .get_wall(*request.wall_id())?
            .ok_or_else(|| ServiceError::NotFound(format!("wall {}", request.wall_id())))?;
        let area = self.get_gym_area(*wall.gym_area_id())?;

        let known = self
            .repository
            .grades_for_climb_type(area.climb_type())?
            .into_iter()
            .any(|g| g.grade() == request.grade());
        if !known {
            return Err(ServiceError::Validation(format!(
                "grade '{}' is not defined for climb type '{}'",
                request.grade(),
                area.climb_type()
            )));
        }

        let recorded_at = (*request.recorded_at()).unwrap_or_else(|| Utc::now().naive_utc());
        let score = self.repository.insert_score(NewScore::new(
            *request.climber_id(),
            *request.wall_id(),
            request.grade().clone(),
            *request.completed(),
            *request.attempts(),
            request.notes().clone(),
            recorded_at,
        ))?;

        info!(score_id = score.id(), "Score recorded");
        Ok(score)
    }

    /// Deletes a score.
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] when no such score exists.
    #[instrument(skip(self))]
    pub fn delete_score(&self, score_id: i32) -> Result<(), ServiceError> {
        let removed = self.repository.delete_score(score_id)?;
        if removed == 0 {
            return Err(ServiceError::NotFound(format!("score {}", score_id)));
        }
        info!(score_id, "Score deleted");
        Ok(())
    }

    /// Lists all scores with joined metadata, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Store`] on a database failure.
    #[instrument(skip(self))]
    pub fn list_scores(&self) -> Result<Vec<ScoreRow>, ServiceError> {
        Ok(self.repository.list_scores(&ScoreFilter::all())?)
    }

    /// Gets a climber together with all of their scores, newest first.
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] when no such climber exists.
    #[instrument(skip(self))]
    pub fn climber_scores(
        &self,
        climber_id: i32,
    ) -> Result<(Climber, Vec<ScoreRow>), ServiceError> {
        let climber = self.get_climber(climber_id)?;
        let scores = self
            .repository
            .list_scores(&ScoreFilter::for_climber(climber_id))?;
        Ok((climber, scores))
    }

    /// Computes the leaderboard: every climber ordered by completed
    /// ascents descending, name ascending on ties.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Store`] on a database failure.
    #[instrument(skip(self))]
    pub fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, ServiceError> {
        let climbers = self.repository.list_climbers()?;
        let rows = self.repository.list_scores(&ScoreFilter::all())?;
        Ok(leaderboard(&climbers, &rows))
    }

    /// Computes the rolling-window KPI bundle for one climber.
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] for an unknown climber;
    /// [`ServiceError::Validation`] for a non-positive window length.
    #[instrument(skip(self, now))]
    pub fn window_report(
        &self,
        climber_id: i32,
        window_days: i64,
        now: NaiveDateTime,
    ) -> Result<WindowReport, ServiceError> {
        let rows = self.window_rows(climber_id, window_days, now)?;
        let bounds = WindowBounds::trailing_days(now, window_days);
        Ok(window_report(&rows, &bounds))
    }

    /// Selects the hardest completed climb of one climber within a
    /// trailing window. `None` when the window holds no completed score.
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] for an unknown climber;
    /// [`ServiceError::Validation`] for a non-positive window length.
    #[instrument(skip(self, now))]
    pub fn best_climb(
        &self,
        climber_id: i32,
        window_days: i64,
        now: NaiveDateTime,
    ) -> Result<Option<ScoreRow>, ServiceError> {
        let rows = self.window_rows(climber_id, window_days, now)?;
        Ok(crate::report::best_climb(&rows).cloned())
    }

    /// Computes the per-climb-type average grade of one climber over a
    /// trailing window. Types with no completed score in the window are
    /// omitted.
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] for an unknown climber;
    /// [`ServiceError::Validation`] for a non-positive window length.
    #[instrument(skip(self, now))]
    pub fn avg_grade_by_type(
        &self,
        climber_id: i32,
        window_days: i64,
        now: NaiveDateTime,
    ) -> Result<Vec<GradeAverage>, ServiceError> {
        let rows = self.window_rows(climber_id, window_days, now)?;
        let bounds = WindowBounds::trailing_days(now, window_days);
        let grades = self.repository.list_grades()?;
        Ok(average_grade_by_type(&rows, &bounds, &grades))
    }

    /// Computes dashboard totals.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Store`] on a database failure.
    #[instrument(skip(self))]
    pub fn dashboard_stats(&self) -> Result<DashboardStats, ServiceError> {
        Ok(DashboardStats::new(
            self.repository.count_climbers()?,
            self.repository.count_walls()?,
            self.repository.count_completed_ascents()?,
        ))
    }

    /// Fetches one climber's rows for a trailing window, validating the
    /// climber and window length.
    fn window_rows(
        &self,
        climber_id: i32,
        window_days: i64,
        now: NaiveDateTime,
    ) -> Result<Vec<ScoreRow>, ServiceError> {
        if window_days < 1 {
            return Err(ServiceError::Validation(
                "window length must be at least one day".to_string(),
            ));
        }
        self.get_climber(climber_id)?;

        let bounds = WindowBounds::trailing_days(now, window_days);
        let filter = ScoreFilter::new(Some(climber_id), Some(*bounds.start()), Some(*bounds.end()));
        Ok(self.repository.list_scores(&filter)?)
    }

    fn get_gym_area(&self, gym_area_id: i32) -> Result<GymArea, ServiceError> {
        self.repository
            .get_gym_area(gym_area_id)?
            .ok_or_else(|| ServiceError::NotFound(format!("gym area {}", gym_area_id)))
    }
}
