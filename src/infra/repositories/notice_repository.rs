//! Notice repository.

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};
use uuid::Uuid;

use super::entities::notice::{self, ActiveModel, Entity as NoticeEntity};
use crate::domain::Notice;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Notice repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait NoticeRepository: Send + Sync {
    /// Newest first
    async fn list(&self) -> AppResult<Vec<Notice>>;

    async fn create(&self, notice: Notice) -> AppResult<Notice>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of NoticeRepository
pub struct NoticeStore {
    db: DatabaseConnection,
}

impl NoticeStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl NoticeRepository for NoticeStore {
    async fn list(&self) -> AppResult<Vec<Notice>> {
        let models = NoticeEntity::find()
            .order_by_desc(notice::Column::PublishedAt)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Notice::from).collect())
    }

    async fn create(&self, new: Notice) -> AppResult<Notice> {
        let model = ActiveModel {
            id: Set(new.id),
            title: Set(new.title),
            body: Set(new.body),
            author_id: Set(new.author_id),
            published_at: Set(new.published_at),
        }
        .insert(&self.db)
        .await
        .map_err(AppError::from)?;

        Ok(Notice::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = NoticeEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }
}
