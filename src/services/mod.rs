//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain logic and infrastructure to fulfill
//! application use cases. They depend on abstractions (traits) for
//! dependency inversion.
//!
//! All services use the Unit of Work for centralized repository access;
//! capability checks go through the shared authorization engine.

mod approval_service;
mod auth_service;
mod authorization;
mod claim_service;
mod config_service;
pub mod container;
mod export_service;
mod notice_service;
mod structure_service;
mod user_service;

// Service Container
pub use container::{ServiceContainer, Services};

// Service traits and implementations
pub use approval_service::{ApprovalManager, ApprovalService};
pub use auth_service::{AuthService, Authenticator, Claims, TokenResponse};
pub use authorization::{AuthorizationEngine, Principal};
pub use claim_service::{ClaimManager, ClaimService};
pub use config_service::{ConfigManager, ConfigService};
pub use export_service::{ExportBundle, ExportManager, ExportService, UserCreditStats};
pub use notice_service::{NoticeManager, NoticeService};
pub use structure_service::{StructureManager, StructureService};
pub use user_service::{UserManager, UserService};

// Parallel execution utilities
pub use container::parallel;

#[cfg(any(test, feature = "test-utils"))]
pub use config_service::MockConfigService;
#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
