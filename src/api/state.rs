//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and infrastructure.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::{Cache, Database, StorageBackend};
use crate::services::{
    ApprovalService, AuthService, AuthorizationEngine, ClaimService, ConfigService, ExportService,
    NoticeService, ServiceContainer, Services, StructureService, UserService,
};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    /// Authentication service
    pub auth_service: Arc<dyn AuthService>,
    /// User service
    pub user_service: Arc<dyn UserService>,
    /// Config store service
    pub config_service: Arc<dyn ConfigService>,
    /// Claim submission service
    pub claim_service: Arc<dyn ClaimService>,
    /// Approval workflow service
    pub approval_service: Arc<dyn ApprovalService>,
    /// Structure directory service
    pub structure_service: Arc<dyn StructureService>,
    /// Notice service
    pub notice_service: Arc<dyn NoticeService>,
    /// Export service
    pub export_service: Arc<dyn ExportService>,
    /// Authorization engine for handler-level gates
    pub authz: Arc<AuthorizationEngine>,
    /// Redis cache
    pub cache: Arc<Cache>,
    /// Database connection
    pub database: Arc<Database>,
}

impl AppState {
    /// Create application state from infrastructure handles and config.
    pub fn from_config(
        database: Arc<Database>,
        cache: Arc<Cache>,
        storage: Arc<dyn StorageBackend>,
        config: Config,
    ) -> Self {
        let container = Services::from_parts(
            database.get_connection(),
            (*cache).clone(),
            storage,
            config,
        );

        Self {
            auth_service: container.auth(),
            user_service: container.users(),
            config_service: container.configs(),
            claim_service: container.claims(),
            approval_service: container.approvals(),
            structure_service: container.structure(),
            notice_service: container.notices(),
            export_service: container.export(),
            authz: container.authz(),
            cache,
            database,
        }
    }
}
