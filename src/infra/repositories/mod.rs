//! Repository layer - Data access abstraction
//!
//! Repositories provide an abstraction over data persistence,
//! following the Repository pattern for clean separation of concerns.

mod claim_repository;
mod config_repository;
pub(crate) mod entities;
mod notice_repository;
mod proof_repository;
mod structure_repository;
mod user_repository;

pub use claim_repository::{ClaimRepository, ClaimStore, HistoryFilter};
pub use config_repository::{ConfigRepository, ConfigStore};
pub use notice_repository::{NoticeRepository, NoticeStore};
pub use proof_repository::{ProofRepository, ProofStore};
pub use structure_repository::{StructureRepository, StructureStore};
pub use user_repository::{UserRepository, UserStore};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use claim_repository::MockClaimRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use config_repository::MockConfigRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use notice_repository::MockNoticeRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use proof_repository::MockProofRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use structure_repository::MockStructureRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
