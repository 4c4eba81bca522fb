//! Cragboard - REST server entry point.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use cragboard::{ScoreRepository, ScoreService, rest};
use diesel::{Connection, SqliteConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;
use tracing_subscriber::EnvFilter;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            host,
            port,
            db_path,
        } => run_server(host, port, resolve_db_path(db_path)).await,
        Command::Migrate { db_path } => run_migrations_only(resolve_db_path(db_path)),
    }
}

/// Resolves the database path from the flag, the CRAGBOARD_DB
/// environment variable, or the default, in that order.
fn resolve_db_path(flag: Option<String>) -> String {
    flag.or_else(|| std::env::var("CRAGBOARD_DB").ok())
        .unwrap_or_else(|| "cragboard.db".to_string())
}

/// Run the REST API server
async fn run_server(host: String, port: u16, db_path: String) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting cragboard REST server");

    apply_migrations(&db_path)?;

    let repository = ScoreRepository::new(db_path)?;
    let service = ScoreService::new(repository);
    let app = rest::router(service);

    let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
    info!(host = %host, port, "Server ready at http://{}:{}/", host, port);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Apply pending migrations and exit
fn run_migrations_only(db_path: String) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    apply_migrations(&db_path)?;
    info!(path = %db_path, "Database is up to date");
    Ok(())
}

/// Runs any pending embedded migrations against the database.
fn apply_migrations(db_path: &str) -> Result<()> {
    let mut conn = SqliteConnection::establish(db_path)?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow::anyhow!("Migrations failed: {}", e))?;
    info!(count = applied.len(), path = %db_path, "Migrations applied");
    Ok(())
}
