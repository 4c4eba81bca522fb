//! Tests for the service layer: validation, error taxonomy, and the
//! reporting operations against a real store.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::Connection;
use diesel::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tempfile::NamedTempFile;

use cragboard::{Climber, RecordScore, ScoreRepository, ScoreService, ServiceError};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

fn setup_service() -> (NamedTempFile, ScoreService) {
    let db_file = NamedTempFile::new().expect("Failed to create temp file");
    let db_path = db_file.path().to_str().expect("Invalid path").to_string();

    let mut conn = SqliteConnection::establish(&db_path).expect("Failed to connect");
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Migrations failed");

    let repo = ScoreRepository::new(db_path).expect("Failed to create repository");
    (db_file, ScoreService::new(repo))
}

fn ts(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .expect("Invalid date")
        .and_hms_opt(hour, min, sec)
        .expect("Invalid time")
}

fn register(service: &ScoreService, name: &str) -> Climber {
    service
        .register_climber(
            name.to_string(),
            None,
            format!("{}@example.com", name.to_lowercase()),
        )
        .expect("Register failed")
}

fn record(
    service: &ScoreService,
    climber_id: i32,
    wall_id: i32,
    grade: &str,
    completed: bool,
    recorded_at: NaiveDateTime,
) {
    service
        .record_score(RecordScore::new(
            climber_id,
            wall_id,
            grade.to_string(),
            completed,
            1,
            None,
            Some(recorded_at),
        ))
        .expect("Record failed");
}

#[test]
fn register_climber_requires_name_and_email() {
    let (_db, service) = setup_service();

    let err = service
        .register_climber("  ".to_string(), None, "x@example.com".to_string())
        .expect_err("Blank name must fail");
    assert!(matches!(err, ServiceError::Validation(_)));

    let err = service
        .register_climber("Ada".to_string(), None, "".to_string())
        .expect_err("Blank email must fail");
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[test]
fn register_climber_duplicate_email_is_conflict() {
    let (_db, service) = setup_service();
    register(&service, "Ada");

    let err = service
        .register_climber("Adelaide".to_string(), None, "ada@example.com".to_string())
        .expect_err("Duplicate email must fail");
    assert!(matches!(err, ServiceError::Conflict(_)));
}

#[test]
fn delete_missing_climber_is_not_found() {
    let (_db, service) = setup_service();
    let err = service.delete_climber(404).expect_err("Must fail");
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[test]
fn record_score_validates_attempts() {
    let (_db, service) = setup_service();
    let climber = register(&service, "Ada");

    let err = service
        .record_score(RecordScore::new(
            *climber.id(),
            1,
            "V3".to_string(),
            true,
            0,
            None,
            None,
        ))
        .expect_err("Zero attempts must fail");
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[test]
fn record_score_rejects_grade_from_other_climb_type() {
    let (_db, service) = setup_service();
    let climber = register(&service, "Ada");

    // Wall 1 is a boulder wall; 5.9 belongs to the top-rope scale.
    let err = service
        .record_score(RecordScore::new(
            *climber.id(),
            1,
            "5.9".to_string(),
            true,
            1,
            None,
            None,
        ))
        .expect_err("Cross-type grade must fail");
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[test]
fn record_score_unknown_climber_or_wall_is_not_found() {
    let (_db, service) = setup_service();
    let climber = register(&service, "Ada");

    let err = service
        .record_score(RecordScore::new(
            9999,
            1,
            "V3".to_string(),
            true,
            1,
            None,
            None,
        ))
        .expect_err("Unknown climber must fail");
    assert!(matches!(err, ServiceError::NotFound(_)));

    let err = service
        .record_score(RecordScore::new(
            *climber.id(),
            9999,
            "V3".to_string(),
            true,
            1,
            None,
            None,
        ))
        .expect_err("Unknown wall must fail");
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[test]
fn delete_missing_score_is_not_found() {
    let (_db, service) = setup_service();
    let err = service.delete_score(404).expect_err("Must fail");
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[test]
fn leaderboard_orders_totals_and_breaks_ties_by_name() {
    let (_db, service) = setup_service();
    let zoe = register(&service, "Zoe");
    let abe = register(&service, "Abe");
    let mia = register(&service, "Mia");

    let day = ts(2025, 3, 10, 10, 0, 0);
    record(&service, *zoe.id(), 1, "V2", true, day);
    record(&service, *zoe.id(), 1, "V3", true, day);
    record(&service, *mia.id(), 2, "V1", true, day);
    record(&service, *abe.id(), 2, "V1", true, day);
    // Incomplete scores never count toward the total.
    record(&service, *abe.id(), 1, "V5", false, day);

    let entries = service.leaderboard().expect("Leaderboard failed");
    let names: Vec<&str> = entries.iter().map(|e| e.name().as_str()).collect();
    assert_eq!(names, vec!["Zoe", "Abe", "Mia"]);
    assert_eq!(*entries[0].total_score(), 2);
    assert_eq!(*entries[1].total_score(), 1);
    assert_eq!(*entries[2].total_score(), 1);
}

#[test]
fn window_report_counts_completed_scores_in_window() {
    let (_db, service) = setup_service();
    let climber = register(&service, "Ada");
    let now = ts(2025, 3, 31, 12, 0, 0);

    // 3 completed and 1 incomplete across 2 distinct days, plus one
    // completed score outside the window.
    record(&service, *climber.id(), 1, "V2", true, ts(2025, 3, 10, 10, 0, 0));
    record(&service, *climber.id(), 1, "V3", true, ts(2025, 3, 10, 11, 0, 0));
    record(&service, *climber.id(), 2, "V4", true, ts(2025, 3, 12, 9, 0, 0));
    record(&service, *climber.id(), 2, "V5", false, ts(2025, 3, 12, 10, 0, 0));
    record(&service, *climber.id(), 1, "V8", true, ts(2024, 12, 1, 10, 0, 0));

    let report = service
        .window_report(*climber.id(), 30, now)
        .expect("Report failed");
    assert_eq!(*report.total_climbs(), 3);
    assert_eq!(*report.total_score(), 300 + 400 + 500);
    assert_eq!(*report.total_days_climbed(), 2);
    assert_eq!(*report.daily_avg_climbs_completed(), Some(1.5));
    assert_eq!(report.daily_summary().len(), 2);

    let best = report.best_climb().as_ref().expect("Best climb expected");
    assert_eq!(best.grade(), "V4");
}

#[test]
fn window_report_boundary_score_is_included() {
    let (_db, service) = setup_service();
    let climber = register(&service, "Ada");
    let now = ts(2025, 3, 31, 12, 0, 0);

    record(&service, *climber.id(), 1, "V1", true, ts(2025, 3, 1, 12, 0, 0));
    record(&service, *climber.id(), 1, "V2", true, ts(2025, 3, 1, 11, 59, 59));

    let report = service
        .window_report(*climber.id(), 30, now)
        .expect("Report failed");
    assert_eq!(
        *report.total_climbs(),
        1,
        "Exactly the boundary-instant score is inside the window"
    );
}

#[test]
fn window_report_empty_window_uses_sentinels() {
    let (_db, service) = setup_service();
    let climber = register(&service, "Ada");

    let report = service
        .window_report(*climber.id(), 30, ts(2025, 3, 31, 12, 0, 0))
        .expect("Report failed");
    assert_eq!(*report.total_climbs(), 0);
    assert_eq!(*report.total_days_climbed(), 0);
    assert!(report.daily_avg_climbs_completed().is_none());
    assert!(report.best_climb().is_none());
    assert!(report.daily_summary().is_empty());
}

#[test]
fn window_report_unknown_climber_is_not_found() {
    let (_db, service) = setup_service();
    let err = service
        .window_report(404, 30, ts(2025, 3, 31, 12, 0, 0))
        .expect_err("Must fail");
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[test]
fn window_report_rejects_non_positive_window() {
    let (_db, service) = setup_service();
    let climber = register(&service, "Ada");
    let err = service
        .window_report(*climber.id(), 0, ts(2025, 3, 31, 12, 0, 0))
        .expect_err("Must fail");
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[test]
fn best_climb_prefers_grade_then_recency() {
    let (_db, service) = setup_service();
    let climber = register(&service, "Ada");
    let now = ts(2025, 3, 31, 12, 0, 0);

    record(&service, *climber.id(), 1, "V6", true, ts(2025, 3, 5, 10, 0, 0));
    record(&service, *climber.id(), 1, "V6", true, ts(2025, 3, 20, 10, 0, 0));
    record(&service, *climber.id(), 1, "V2", true, ts(2025, 3, 25, 10, 0, 0));

    let best = service
        .best_climb(*climber.id(), 30, now)
        .expect("Best climb failed")
        .expect("Best climb expected");
    assert_eq!(best.grade(), "V6");
    assert_eq!(best.recorded_at(), &ts(2025, 3, 20, 10, 0, 0));
}

#[test]
fn avg_grade_by_type_through_service() {
    let (_db, service) = setup_service();
    let climber = register(&service, "Ada");
    let now = ts(2025, 3, 31, 12, 0, 0);

    record(&service, *climber.id(), 1, "V1", true, ts(2025, 3, 10, 10, 0, 0));
    record(&service, *climber.id(), 2, "V3", true, ts(2025, 3, 11, 10, 0, 0));
    record(&service, *climber.id(), 3, "5.10a", true, ts(2025, 3, 12, 10, 0, 0));

    let averages = service
        .avg_grade_by_type(*climber.id(), 60, now)
        .expect("Averages failed");
    assert_eq!(averages.len(), 2);
    assert_eq!(averages[0].climb_type(), "boulder");
    assert_eq!(averages[0].grade(), "V2");
    assert_eq!(averages[1].climb_type(), "top-rope");
    assert_eq!(averages[1].grade(), "5.10a");
}

#[test]
fn dashboard_stats_counts() {
    let (_db, service) = setup_service();
    let climber = register(&service, "Ada");
    record(&service, *climber.id(), 1, "V1", true, ts(2025, 3, 10, 10, 0, 0));
    record(&service, *climber.id(), 1, "V2", false, ts(2025, 3, 10, 11, 0, 0));

    let stats = service.dashboard_stats().expect("Stats failed");
    assert_eq!(*stats.total_climbers(), 1);
    assert_eq!(*stats.total_walls(), 4);
    assert_eq!(*stats.total_ascents(), 1);
}

#[test]
fn climber_scores_round_trip() {
    let (_db, service) = setup_service();
    let climber = register(&service, "Ada");
    record(&service, *climber.id(), 4, "5.11a", true, ts(2025, 3, 10, 10, 0, 0));

    let (found, scores) = service
        .climber_scores(*climber.id())
        .expect("Lookup failed");
    assert_eq!(found.id(), climber.id());
    assert_eq!(scores.len(), 1);
    assert_eq!(scores[0].grade(), "5.11a");
    assert_eq!(scores[0].wall_name(), "Arete");
    assert_eq!(scores[0].climb_type(), "top-rope");
}
