//! CLI argument definitions.
//!
//! Uses clap derive macros for type-safe argument parsing.

use clap::{Parser, Subcommand};

/// Quality Credits - student credit application and approval platform
#[derive(Parser, Debug)]
#[command(name = "quality-credits")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),

    /// Run database migrations
    Migrate(MigrateArgs),

    /// Move inline proof bytes to the configured storage backend
    MigrateProofs(MigrateProofsArgs),

    /// Seed default configs and the initial admin account
    Seed(SeedArgs),
}

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Host to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0", env = "SERVER_HOST")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "3000", env = "SERVER_PORT")]
    pub port: u16,
}

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub action: MigrateAction,
}

/// Migration actions
#[derive(Subcommand, Debug)]
pub enum MigrateAction {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset and re-run all migrations
    Fresh,
}

/// Arguments for the proof migration command
#[derive(Parser, Debug)]
pub struct MigrateProofsArgs {
    /// Rows migrated per batch
    #[arg(long, default_value = "100")]
    pub batch_size: u64,

    /// Report what would be migrated without writing anything
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the seed command
#[derive(Parser, Debug)]
pub struct SeedArgs {
    /// Username for the initial admin account
    #[arg(long, default_value = "admin")]
    pub admin_username: String,

    /// Password for the initial admin account
    #[arg(long, env = "ADMIN_PASSWORD")]
    pub admin_password: String,
}
