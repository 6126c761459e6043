//! Quality Credits - role-based student credit application and approval
//! platform.
//!
//! Students submit credit claims with proof files; class officers review,
//! approve/reject and score them; administrators configure roles, credit
//! types and the grade/major/class directory. Roles and credit types are
//! data, interpreted at submission and approval time.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Core business entities, capability sets, scoring
//! - **services**: Application use cases and business logic
//! - **infra**: Infrastructure concerns (database, cache, proof storage)
//! - **api**: HTTP handlers, middleware, and routes
//! - **types**: Shared response types
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//!
//! # Seed defaults and the admin account
//! cargo run -- seed --admin-password 'change-me-please'
//!
//! # Move inline proof bytes to the storage backend
//! cargo run -- migrate-proofs
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Capability, CapabilitySet, Claim, ClaimStatus, Password, User};
pub use errors::{AppError, AppResult};
pub use infra::Cache;
