//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Database connections and repositories
//! - Caching and login-attempt counters (Redis)
//! - Proof storage backends (filesystem / S3)
//! - Unit of Work for repository access

pub mod attempts;
pub mod cache;
pub mod db;
pub mod repositories;
pub mod storage;
pub mod unit_of_work;

pub use attempts::{LoginAttempts, RedisLoginAttempts};
pub use cache::Cache;
pub use db::{Database, Migrator};
pub use repositories::{
    ClaimRepository, ConfigRepository, HistoryFilter, NoticeRepository, ProofRepository,
    StructureRepository, UserRepository,
};
pub use storage::{compress_image, proof_key, select_backend, StorageBackend};
pub use unit_of_work::{Persistence, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
pub use attempts::MockLoginAttempts;
#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{
    MockClaimRepository, MockConfigRepository, MockNoticeRepository, MockProofRepository,
    MockStructureRepository, MockUserRepository,
};
#[cfg(any(test, feature = "test-utils"))]
pub use storage::MockStorageBackend;
