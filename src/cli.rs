//! Command-line interface for cragboard.

use clap::{Parser, Subcommand};

/// Cragboard - climbing-gym ascent tracker and reporting server
#[derive(Parser, Debug)]
#[command(name = "cragboard")]
#[command(about = "Climbing-gym ascent tracker with leaderboard and rolling-window reporting", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the REST API server
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "8080")]
        port: u16,

        /// Path to the database file (created if it doesn't exist).
        /// Falls back to the CRAGBOARD_DB environment variable, then
        /// to "cragboard.db".
        #[arg(long)]
        db_path: Option<String>,
    },

    /// Apply pending database migrations and exit
    Migrate {
        /// Path to the database file (created if it doesn't exist)
        #[arg(long)]
        db_path: Option<String>,
    },
}
