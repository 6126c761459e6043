//! Unit of Work pattern implementation.
//!
//! Centralizes access to all repositories behind one trait so services
//! depend on a single abstraction. The one multi-row write in the system,
//! claim + proof insertion, is atomic inside
//! `ClaimRepository::insert_with_proofs`; everything else is a single
//! statement and needs no explicit transaction scope.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use super::repositories::{
    ClaimRepository, ClaimStore, ConfigRepository, ConfigStore, NoticeRepository, NoticeStore,
    ProofRepository, ProofStore, StructureRepository, StructureStore, UserRepository, UserStore,
};

/// Unit of Work trait for dependency injection.
///
/// Provides centralized access to all repositories.
pub trait UnitOfWork: Send + Sync {
    /// Get user repository
    fn users(&self) -> Arc<dyn UserRepository>;

    /// Get config repository
    fn configs(&self) -> Arc<dyn ConfigRepository>;

    /// Get claim repository
    fn claims(&self) -> Arc<dyn ClaimRepository>;

    /// Get proof repository
    fn proofs(&self) -> Arc<dyn ProofRepository>;

    /// Get structure repository
    fn structure(&self) -> Arc<dyn StructureRepository>;

    /// Get notice repository
    fn notices(&self) -> Arc<dyn NoticeRepository>;
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    user_repo: Arc<UserStore>,
    config_repo: Arc<ConfigStore>,
    claim_repo: Arc<ClaimStore>,
    proof_repo: Arc<ProofStore>,
    structure_repo: Arc<StructureStore>,
    notice_repo: Arc<NoticeStore>,
}

impl Persistence {
    /// Create new UnitOfWork instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            user_repo: Arc::new(UserStore::new(db.clone())),
            config_repo: Arc::new(ConfigStore::new(db.clone())),
            claim_repo: Arc::new(ClaimStore::new(db.clone())),
            proof_repo: Arc::new(ProofStore::new(db.clone())),
            structure_repo: Arc::new(StructureStore::new(db.clone())),
            notice_repo: Arc::new(NoticeStore::new(db)),
        }
    }
}

impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn configs(&self) -> Arc<dyn ConfigRepository> {
        self.config_repo.clone()
    }

    fn claims(&self) -> Arc<dyn ClaimRepository> {
        self.claim_repo.clone()
    }

    fn proofs(&self) -> Arc<dyn ProofRepository> {
        self.proof_repo.clone()
    }

    fn structure(&self) -> Arc<dyn StructureRepository> {
        self.structure_repo.clone()
    }

    fn notices(&self) -> Arc<dyn NoticeRepository> {
        self.notice_repo.clone()
    }
}
