//! Grade/major/class directory repository.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::{class, grade, major};
use crate::domain::{Class, Grade, Major};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Structure repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait StructureRepository: Send + Sync {
    async fn list_grades(&self) -> AppResult<Vec<Grade>>;
    async fn create_grade(&self, name: String) -> AppResult<Grade>;
    /// Delete by id, returning the removed record so callers can null
    /// denormalized user fields by name
    async fn delete_grade(&self, id: Uuid) -> AppResult<Grade>;

    async fn list_majors(&self) -> AppResult<Vec<Major>>;
    async fn create_major(&self, name: String) -> AppResult<Major>;
    async fn delete_major(&self, id: Uuid) -> AppResult<Major>;

    async fn list_classes(&self) -> AppResult<Vec<Class>>;
    async fn find_class_by_name(&self, name: &str) -> AppResult<Option<Class>>;
    async fn create_class(&self, name: String, grade: String, major: String) -> AppResult<Class>;
    async fn delete_class(&self, id: Uuid) -> AppResult<Class>;
}

/// Concrete implementation of StructureRepository
pub struct StructureStore {
    db: DatabaseConnection,
}

impl StructureStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl StructureRepository for StructureStore {
    async fn list_grades(&self) -> AppResult<Vec<Grade>> {
        let models = grade::Entity::find()
            .order_by_asc(grade::Column::Name)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Grade::from).collect())
    }

    async fn create_grade(&self, name: String) -> AppResult<Grade> {
        let exists = grade::Entity::find()
            .filter(grade::Column::Name.eq(&name))
            .one(&self.db)
            .await?;
        if exists.is_some() {
            return Err(AppError::conflict("Grade"));
        }

        let model = grade::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            created_at: Set(chrono::Utc::now()),
        }
        .insert(&self.db)
        .await
        .map_err(AppError::from)?;

        Ok(Grade::from(model))
    }

    async fn delete_grade(&self, id: Uuid) -> AppResult<Grade> {
        let found = grade::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        grade::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(Grade::from(found))
    }

    async fn list_majors(&self) -> AppResult<Vec<Major>> {
        let models = major::Entity::find()
            .order_by_asc(major::Column::Name)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Major::from).collect())
    }

    async fn create_major(&self, name: String) -> AppResult<Major> {
        let exists = major::Entity::find()
            .filter(major::Column::Name.eq(&name))
            .one(&self.db)
            .await?;
        if exists.is_some() {
            return Err(AppError::conflict("Major"));
        }

        let model = major::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            created_at: Set(chrono::Utc::now()),
        }
        .insert(&self.db)
        .await
        .map_err(AppError::from)?;

        Ok(Major::from(model))
    }

    async fn delete_major(&self, id: Uuid) -> AppResult<Major> {
        let found = major::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        major::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(Major::from(found))
    }

    async fn list_classes(&self) -> AppResult<Vec<Class>> {
        let models = class::Entity::find()
            .order_by_asc(class::Column::Name)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Class::from).collect())
    }

    async fn find_class_by_name(&self, name: &str) -> AppResult<Option<Class>> {
        let model = class::Entity::find()
            .filter(class::Column::Name.eq(name))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(model.map(Class::from))
    }

    async fn create_class(&self, name: String, grade: String, major: String) -> AppResult<Class> {
        let exists = class::Entity::find()
            .filter(class::Column::Name.eq(&name))
            .one(&self.db)
            .await?;
        if exists.is_some() {
            return Err(AppError::conflict("Class"));
        }

        let model = class::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            grade: Set(grade),
            major: Set(major),
            created_at: Set(chrono::Utc::now()),
        }
        .insert(&self.db)
        .await
        .map_err(AppError::from)?;

        Ok(Class::from(model))
    }

    async fn delete_class(&self, id: Uuid) -> AppResult<Class> {
        let found = class::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        class::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(Class::from(found))
    }
}
