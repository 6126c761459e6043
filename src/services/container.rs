//! Service Container - Centralized service access.
//!
//! Wires every service over one shared Unit of Work, the authorization
//! engine and the process-wide storage backend. Thread-safe concurrent
//! access via Arc.

use std::future::Future;
use std::sync::Arc;

use super::approval_service::{ApprovalManager, ApprovalService};
use super::auth_service::{AuthService, Authenticator};
use super::authorization::AuthorizationEngine;
use super::claim_service::{ClaimManager, ClaimService};
use super::config_service::{ConfigManager, ConfigService};
use super::export_service::{ExportManager, ExportService};
use super::notice_service::{NoticeManager, NoticeService};
use super::structure_service::{StructureManager, StructureService};
use super::user_service::{UserManager, UserService};
use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::{Cache, Persistence, RedisLoginAttempts, StorageBackend};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
///
/// Provides centralized access to all application services.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    /// Get authentication service
    fn auth(&self) -> Arc<dyn AuthService>;

    /// Get user service
    fn users(&self) -> Arc<dyn UserService>;

    /// Get config service
    fn configs(&self) -> Arc<dyn ConfigService>;

    /// Get claim submission service
    fn claims(&self) -> Arc<dyn ClaimService>;

    /// Get approval workflow service
    fn approvals(&self) -> Arc<dyn ApprovalService>;

    /// Get structure directory service
    fn structure(&self) -> Arc<dyn StructureService>;

    /// Get notice service
    fn notices(&self) -> Arc<dyn NoticeService>;

    /// Get export service
    fn export(&self) -> Arc<dyn ExportService>;

    /// Get the authorization engine
    fn authz(&self) -> Arc<AuthorizationEngine>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    user_service: Arc<dyn UserService>,
    config_service: Arc<dyn ConfigService>,
    claim_service: Arc<dyn ClaimService>,
    approval_service: Arc<dyn ApprovalService>,
    structure_service: Arc<dyn StructureService>,
    notice_service: Arc<dyn NoticeService>,
    export_service: Arc<dyn ExportService>,
    authz: Arc<AuthorizationEngine>,
}

impl Services {
    /// Wire the full service graph from infrastructure handles.
    pub fn from_parts(
        db: sea_orm::DatabaseConnection,
        cache: Cache,
        storage: Arc<dyn StorageBackend>,
        config: Config,
    ) -> Self {
        let uow = Arc::new(Persistence::new(db));
        let attempts = Arc::new(RedisLoginAttempts::new(cache));

        let config_service: Arc<dyn ConfigService> = Arc::new(ConfigManager::new(uow.clone()));
        let authz = Arc::new(AuthorizationEngine::new(config_service.clone()));

        let auth_service = Arc::new(Authenticator::new(uow.clone(), attempts.clone(), config));
        let user_service = Arc::new(UserManager::new(uow.clone(), attempts));
        let claim_service = Arc::new(ClaimManager::new(
            uow.clone(),
            config_service.clone(),
            authz.clone(),
            storage,
        ));
        let approval_service = Arc::new(ApprovalManager::new(uow.clone(), authz.clone()));
        let structure_service = Arc::new(StructureManager::new(uow.clone()));
        let notice_service = Arc::new(NoticeManager::new(uow.clone(), authz.clone()));
        let export_service = Arc::new(ExportManager::new(
            uow,
            config_service.clone(),
            authz.clone(),
        ));

        Self {
            auth_service,
            user_service,
            config_service,
            claim_service,
            approval_service,
            structure_service,
            notice_service,
            export_service,
            authz,
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.user_service.clone()
    }

    fn configs(&self) -> Arc<dyn ConfigService> {
        self.config_service.clone()
    }

    fn claims(&self) -> Arc<dyn ClaimService> {
        self.claim_service.clone()
    }

    fn approvals(&self) -> Arc<dyn ApprovalService> {
        self.approval_service.clone()
    }

    fn structure(&self) -> Arc<dyn StructureService> {
        self.structure_service.clone()
    }

    fn notices(&self) -> Arc<dyn NoticeService> {
        self.notice_service.clone()
    }

    fn export(&self) -> Arc<dyn ExportService> {
        self.export_service.clone()
    }

    fn authz(&self) -> Arc<AuthorizationEngine> {
        self.authz.clone()
    }
}

/// Parallel execution utilities for running independent operations concurrently.
pub mod parallel {
    use super::*;
    use tokio::try_join;

    /// Execute two independent async operations in parallel.
    ///
    /// Both operations run concurrently and the function returns when both
    /// complete. If either operation fails, the error is returned immediately.
    pub async fn join2<F1, F2, T1, T2>(f1: F1, f2: F2) -> AppResult<(T1, T2)>
    where
        F1: Future<Output = AppResult<T1>>,
        F2: Future<Output = AppResult<T2>>,
    {
        try_join!(f1, f2)
    }

    /// Execute a collection of homogeneous async operations in parallel.
    ///
    /// All operations must return the same type. Results are returned in
    /// the same order as the input futures.
    pub async fn join_all<F, T>(futures: Vec<F>) -> AppResult<Vec<T>>
    where
        F: Future<Output = AppResult<T>>,
    {
        let results = futures::future::join_all(futures).await;
        results.into_iter().collect()
    }
}
