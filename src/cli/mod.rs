//! CLI module - Command-line interface for the application.
//!
//! Provides commands for:
//! - `serve` - Start the HTTP server
//! - `migrate` - Database migrations
//! - `migrate-proofs` - Inline-proof storage migration
//! - `seed` - Default configs and the initial admin account

pub mod args;

pub use args::{Cli, Commands};
