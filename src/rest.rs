//! REST API layer.
//!
//! The router is built once at process start from a [`ScoreService`]
//! and carries it as axum state: handlers receive the service
//! explicitly instead of reaching for any ambient global.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use crate::db::{Climber, Grade, ScoreRow, Wall};
use crate::error::ServiceError;
use crate::service::{RecordScore, ScoreService};

/// Default trailing window for KPI endpoints, in days.
const DEFAULT_METRIC_WINDOW_DAYS: i64 = 30;
/// Default trailing window for grade averaging, in days.
const DEFAULT_GRADE_WINDOW_DAYS: i64 = 60;

/// Builds the REST router with the service injected as shared state.
pub fn router(service: ScoreService) -> Router {
    Router::new()
        .route("/api/stats", get(dashboard_stats))
        .route("/api/leaderboard", get(get_leaderboard))
        .route("/api/climbers", get(get_climbers).post(add_climber))
        .route("/api/climbers/{climber_id}", delete(remove_climber))
        .route("/api/gyms", get(get_gyms))
        .route("/api/gym/{gym_id}/areas", get(get_gym_areas))
        .route("/api/gym/{gym_id}/walls", get(get_gym_walls))
        .route("/api/gym_areas", get(get_all_gym_areas))
        .route("/api/gym_area/{gym_area_id}/walls", get(get_area_walls))
        .route("/api/gym_area/{gym_area_id}/grades", get(get_area_grades))
        .route("/api/walls", get(get_walls))
        .route("/api/wall/{wall_id}/grades", get(get_wall_grades))
        .route("/api/grades", get(get_grades))
        .route("/api/scores", get(get_scores).post(add_score))
        .route("/api/scores/{score_id}", delete(remove_score))
        .route("/api/scores/climber/{climber_id}", get(get_climber_scores))
        .route(
            "/api/stats/climber/{climber_id}/metrics",
            get(get_climber_metrics),
        )
        .route(
            "/api/stats/climber/{climber_id}/daily_summary",
            get(get_climber_daily_summary),
        )
        .route(
            "/api/stats/climber/{climber_id}/best_climb",
            get(get_climber_best_climb),
        )
        .route(
            "/api/stats/climber/{climber_id}/avg_grade",
            get(get_climber_avg_grade),
        )
        .with_state(service)
}

/// Wrapper mapping [`ServiceError`] onto HTTP responses.
struct ApiError(ServiceError);

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            ServiceError::NotFound(what) => {
                (StatusCode::NOT_FOUND, format!("{} not found", what))
            }
            ServiceError::Validation(why) => (StatusCode::BAD_REQUEST, why.clone()),
            ServiceError::Conflict(_) => {
                (StatusCode::CONFLICT, "email already exists".to_string())
            }
            ServiceError::Store(err) => {
                error!(error = %err, "Store failure while handling request");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Request body for `POST /api/climbers`.
#[derive(Debug, Deserialize)]
struct AddClimberRequest {
    name: String,
    nickname: Option<String>,
    email: String,
}

/// Request body for `POST /api/scores`.
#[derive(Debug, Deserialize)]
struct AddScoreRequest {
    climber_id: i32,
    wall_id: i32,
    grade: String,
    completed: bool,
    attempts: i32,
    notes: Option<String>,
}

/// Query parameters for the KPI endpoints.
#[derive(Debug, Deserialize)]
struct WindowQuery {
    days: Option<i64>,
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    message: String,
}

impl MessageResponse {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Gym area row joined with its gym name.
#[derive(Debug, Serialize)]
struct GymAreaInfo {
    id: i32,
    gym_name: String,
    climb_type: String,
    name: String,
}

/// Wall row joined with area and gym names.
#[derive(Debug, Serialize)]
struct WallInfo {
    id: i32,
    gym_name: String,
    gym_area_name: String,
    climb_type: String,
    wall_name: String,
    wall_number: i32,
}

/// Wall row scoped to one gym.
#[derive(Debug, Serialize)]
struct GymWallInfo {
    id: i32,
    gym_area_name: String,
    wall_name: String,
    wall_number: i32,
}

/// Response for `GET /api/scores/climber/{id}`.
#[derive(Debug, Serialize)]
struct ClimberScoresResponse {
    climber: Climber,
    scores: Vec<ScoreRow>,
}

async fn dashboard_stats(State(service): State<ScoreService>) -> Result<Response, ApiError> {
    let stats = service.dashboard_stats()?;
    Ok(Json(stats).into_response())
}

async fn get_leaderboard(State(service): State<ScoreService>) -> Result<Response, ApiError> {
    let entries = service.leaderboard()?;
    Ok(Json(entries).into_response())
}

async fn get_climbers(State(service): State<ScoreService>) -> Result<Json<Vec<Climber>>, ApiError> {
    Ok(Json(service.list_climbers()?))
}

async fn add_climber(
    State(service): State<ScoreService>,
    Json(request): Json<AddClimberRequest>,
) -> Result<Response, ApiError> {
    let climber = service.register_climber(request.name, request.nickname, request.email)?;
    Ok((StatusCode::CREATED, Json(climber)).into_response())
}

async fn remove_climber(
    State(service): State<ScoreService>,
    Path(climber_id): Path<i32>,
) -> Result<Json<MessageResponse>, ApiError> {
    service.delete_climber(climber_id)?;
    Ok(Json(MessageResponse::new("Climber deleted successfully")))
}

async fn get_gyms(State(service): State<ScoreService>) -> Result<Response, ApiError> {
    Ok(Json(service.list_gyms()?).into_response())
}

async fn get_gym_areas(
    State(service): State<ScoreService>,
    Path(gym_id): Path<i32>,
) -> Result<Response, ApiError> {
    Ok(Json(service.areas_for_gym(gym_id)?).into_response())
}

async fn get_gym_walls(
    State(service): State<ScoreService>,
    Path(gym_id): Path<i32>,
) -> Result<Response, ApiError> {
    let walls: Vec<GymWallInfo> = service
        .walls_for_gym(gym_id)?
        .into_iter()
        .map(|(wall, area)| GymWallInfo {
            id: *wall.id(),
            gym_area_name: area.name().clone(),
            wall_name: wall.wall_name().clone(),
            wall_number: *wall.wall_number(),
        })
        .collect();
    Ok(Json(walls).into_response())
}

async fn get_all_gym_areas(State(service): State<ScoreService>) -> Result<Response, ApiError> {
    let areas: Vec<GymAreaInfo> = service
        .list_gym_areas()?
        .into_iter()
        .map(|(area, gym)| GymAreaInfo {
            id: *area.id(),
            gym_name: gym.name().clone(),
            climb_type: area.climb_type().clone(),
            name: area.name().clone(),
        })
        .collect();
    Ok(Json(areas).into_response())
}

async fn get_area_walls(
    State(service): State<ScoreService>,
    Path(gym_area_id): Path<i32>,
) -> Result<Json<Vec<Wall>>, ApiError> {
    Ok(Json(service.walls_for_area(gym_area_id)?))
}

async fn get_area_grades(
    State(service): State<ScoreService>,
    Path(gym_area_id): Path<i32>,
) -> Result<Json<Vec<Grade>>, ApiError> {
    Ok(Json(service.area_grades(gym_area_id)?))
}

async fn get_walls(State(service): State<ScoreService>) -> Result<Response, ApiError> {
    let walls: Vec<WallInfo> = service
        .list_walls()?
        .into_iter()
        .map(|(wall, area, gym)| WallInfo {
            id: *wall.id(),
            gym_name: gym.name().clone(),
            gym_area_name: area.name().clone(),
            climb_type: area.climb_type().clone(),
            wall_name: wall.wall_name().clone(),
            wall_number: *wall.wall_number(),
        })
        .collect();
    Ok(Json(walls).into_response())
}

async fn get_wall_grades(
    State(service): State<ScoreService>,
    Path(wall_id): Path<i32>,
) -> Result<Json<Vec<Grade>>, ApiError> {
    Ok(Json(service.wall_grades(wall_id)?))
}

async fn get_grades(State(service): State<ScoreService>) -> Result<Json<Vec<Grade>>, ApiError> {
    Ok(Json(service.list_grades()?))
}

async fn get_scores(State(service): State<ScoreService>) -> Result<Json<Vec<ScoreRow>>, ApiError> {
    Ok(Json(service.list_scores()?))
}

async fn add_score(
    State(service): State<ScoreService>,
    Json(request): Json<AddScoreRequest>,
) -> Result<Response, ApiError> {
    let score = service.record_score(RecordScore::new(
        request.climber_id,
        request.wall_id,
        request.grade,
        request.completed,
        request.attempts,
        request.notes,
        None,
    ))?;
    Ok((StatusCode::CREATED, Json(score)).into_response())
}

async fn remove_score(
    State(service): State<ScoreService>,
    Path(score_id): Path<i32>,
) -> Result<Json<MessageResponse>, ApiError> {
    service.delete_score(score_id)?;
    Ok(Json(MessageResponse::new("Score deleted successfully")))
}

async fn get_climber_scores(
    State(service): State<ScoreService>,
    Path(climber_id): Path<i32>,
) -> Result<Response, ApiError> {
    let (climber, scores) = service.climber_scores(climber_id)?;
    Ok(Json(ClimberScoresResponse { climber, scores }).into_response())
}

async fn get_climber_metrics(
    State(service): State<ScoreService>,
    Path(climber_id): Path<i32>,
    Query(query): Query<WindowQuery>,
) -> Result<Response, ApiError> {
    let days = query.days.unwrap_or(DEFAULT_METRIC_WINDOW_DAYS);
    let report = service.window_report(climber_id, days, Utc::now().naive_utc())?;
    Ok(Json(report).into_response())
}

async fn get_climber_daily_summary(
    State(service): State<ScoreService>,
    Path(climber_id): Path<i32>,
    Query(query): Query<WindowQuery>,
) -> Result<Response, ApiError> {
    let days = query.days.unwrap_or(DEFAULT_METRIC_WINDOW_DAYS);
    // The summary only exists as a field of the window report; there is
    // no separate computation path for it.
    let report = service.window_report(climber_id, days, Utc::now().naive_utc())?;
    Ok(Json(report.daily_summary().clone()).into_response())
}

async fn get_climber_best_climb(
    State(service): State<ScoreService>,
    Path(climber_id): Path<i32>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<Option<ScoreRow>>, ApiError> {
    let days = query.days.unwrap_or(DEFAULT_METRIC_WINDOW_DAYS);
    Ok(Json(service.best_climb(
        climber_id,
        days,
        Utc::now().naive_utc(),
    )?))
}

async fn get_climber_avg_grade(
    State(service): State<ScoreService>,
    Path(climber_id): Path<i32>,
    Query(query): Query<WindowQuery>,
) -> Result<Response, ApiError> {
    let days = query.days.unwrap_or(DEFAULT_GRADE_WINDOW_DAYS);
    let averages = service.avg_grade_by_type(climber_id, days, Utc::now().naive_utc())?;
    Ok(Json(averages).into_response())
}
