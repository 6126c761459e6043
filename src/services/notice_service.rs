//! Notice service - the announcement board.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use super::authorization::{AuthorizationEngine, Principal};
use crate::domain::{Capability, CreateNotice, Notice};
use crate::errors::AppResult;
use crate::infra::UnitOfWork;

/// Notice service trait for dependency injection.
#[async_trait]
pub trait NoticeService: Send + Sync {
    /// All notices, newest first (any authenticated user)
    async fn list(&self) -> AppResult<Vec<Notice>>;

    /// Publish a notice (capability gated)
    async fn publish(&self, principal: &Principal, payload: CreateNotice) -> AppResult<Notice>;

    /// Remove a notice (capability gated)
    async fn delete(&self, principal: &Principal, id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of NoticeService using Unit of Work.
pub struct NoticeManager<U: UnitOfWork> {
    uow: Arc<U>,
    authz: Arc<AuthorizationEngine>,
}

impl<U: UnitOfWork> NoticeManager<U> {
    pub fn new(uow: Arc<U>, authz: Arc<AuthorizationEngine>) -> Self {
        Self { uow, authz }
    }

    async fn require_publisher(&self, principal: &Principal) -> AppResult<()> {
        if self.authz.is_super_user(&principal.role).await? {
            return Ok(());
        }
        self.authz.require(principal, Capability::NoticesPublish).await
    }
}

#[async_trait]
impl<U: UnitOfWork> NoticeService for NoticeManager<U> {
    async fn list(&self) -> AppResult<Vec<Notice>> {
        self.uow.notices().list().await
    }

    async fn publish(&self, principal: &Principal, payload: CreateNotice) -> AppResult<Notice> {
        self.require_publisher(principal).await?;

        self.uow
            .notices()
            .create(Notice {
                id: Uuid::new_v4(),
                title: payload.title,
                body: payload.body,
                author_id: principal.id,
                published_at: Utc::now(),
            })
            .await
    }

    async fn delete(&self, principal: &Principal, id: Uuid) -> AppResult<()> {
        self.require_publisher(principal).await?;
        self.uow.notices().delete(id).await
    }
}
