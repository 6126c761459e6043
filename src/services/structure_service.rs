//! Structure service - the grade/major/class directory.
//!
//! Deleting a structure entity nulls the matching denormalized name on
//! every affected user; users themselves are never cascaded.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{Class, Grade, Major};
use crate::errors::AppResult;
use crate::infra::UnitOfWork;

/// Structure service trait for dependency injection.
#[async_trait]
pub trait StructureService: Send + Sync {
    async fn list_grades(&self) -> AppResult<Vec<Grade>>;
    async fn create_grade(&self, name: String) -> AppResult<Grade>;
    async fn delete_grade(&self, id: Uuid) -> AppResult<()>;

    async fn list_majors(&self) -> AppResult<Vec<Major>>;
    async fn create_major(&self, name: String) -> AppResult<Major>;
    async fn delete_major(&self, id: Uuid) -> AppResult<()>;

    async fn list_classes(&self) -> AppResult<Vec<Class>>;
    async fn create_class(&self, name: String, grade: String, major: String) -> AppResult<Class>;
    async fn delete_class(&self, id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of StructureService using Unit of Work.
pub struct StructureManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> StructureManager<U> {
    /// Create new structure service instance with Unit of Work
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> StructureService for StructureManager<U> {
    async fn list_grades(&self) -> AppResult<Vec<Grade>> {
        self.uow.structure().list_grades().await
    }

    async fn create_grade(&self, name: String) -> AppResult<Grade> {
        self.uow.structure().create_grade(name).await
    }

    async fn delete_grade(&self, id: Uuid) -> AppResult<()> {
        let removed = self.uow.structure().delete_grade(id).await?;
        let cleared = self.uow.users().clear_grade(&removed.name).await?;
        tracing::info!(grade = %removed.name, users = cleared, "grade deleted");
        Ok(())
    }

    async fn list_majors(&self) -> AppResult<Vec<Major>> {
        self.uow.structure().list_majors().await
    }

    async fn create_major(&self, name: String) -> AppResult<Major> {
        self.uow.structure().create_major(name).await
    }

    async fn delete_major(&self, id: Uuid) -> AppResult<()> {
        let removed = self.uow.structure().delete_major(id).await?;
        let cleared = self.uow.users().clear_major(&removed.name).await?;
        tracing::info!(major = %removed.name, users = cleared, "major deleted");
        Ok(())
    }

    async fn list_classes(&self) -> AppResult<Vec<Class>> {
        self.uow.structure().list_classes().await
    }

    async fn create_class(&self, name: String, grade: String, major: String) -> AppResult<Class> {
        self.uow.structure().create_class(name, grade, major).await
    }

    async fn delete_class(&self, id: Uuid) -> AppResult<()> {
        let removed = self.uow.structure().delete_class(id).await?;
        let cleared = self.uow.users().clear_class(&removed.name).await?;
        tracing::info!(class = %removed.name, users = cleared, "class deleted");
        Ok(())
    }
}
