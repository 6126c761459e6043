//! User repository.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use crate::domain::{UpdateUser, User};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find user by username (student number)
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// List all users
    async fn list(&self) -> AppResult<Vec<User>>;

    /// List users belonging to one class
    async fn list_by_class(&self, class: &str) -> AppResult<Vec<User>>;

    /// Insert a fully-built user
    async fn create(&self, user: User) -> AppResult<User>;

    /// Update profile fields
    async fn update(&self, id: Uuid, changes: UpdateUser) -> AppResult<User>;

    /// Replace the stored password hash
    async fn set_password_hash(&self, id: Uuid, password_hash: String) -> AppResult<()>;

    /// Hard delete; owned claims and proofs cascade at the database level
    async fn delete(&self, id: Uuid) -> AppResult<()>;

    /// Null the class field on every user in the named class
    async fn clear_class(&self, class: &str) -> AppResult<u64>;

    /// Null the grade field on every user in the named grade
    async fn clear_grade(&self, grade: &str) -> AppResult<u64>;

    /// Null the major field on every user in the named major
    async fn clear_major(&self, major: &str) -> AppResult<u64>;
}

/// Concrete implementation of UserRepository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let result = UserEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let models = UserEntity::find()
            .order_by_asc(user::Column::Username)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(User::from).collect())
    }

    async fn list_by_class(&self, class: &str) -> AppResult<Vec<User>> {
        let models = UserEntity::find()
            .filter(user::Column::Class.eq(class))
            .order_by_asc(user::Column::Username)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(User::from).collect())
    }

    async fn create(&self, new: User) -> AppResult<User> {
        let active_model = ActiveModel {
            id: Set(new.id),
            username: Set(new.username),
            name: Set(new.name),
            password_hash: Set(new.password_hash),
            role: Set(new.role),
            class: Set(new.class),
            grade: Set(new.grade),
            major: Set(new.major),
            created_at: Set(new.created_at),
            updated_at: Set(new.updated_at),
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(User::from(model))
    }

    async fn update(&self, id: Uuid, changes: UpdateUser) -> AppResult<User> {
        let found = UserEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: ActiveModel = found.into();

        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(role) = changes.role {
            active.role = Set(role);
        }
        if let Some(class) = changes.class {
            active.class = Set(Some(class));
        }
        if let Some(grade) = changes.grade {
            active.grade = Set(Some(grade));
        }
        if let Some(major) = changes.major {
            active.major = Set(Some(major));
        }
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await.map_err(AppError::from)?;

        Ok(User::from(model))
    }

    async fn set_password_hash(&self, id: Uuid, password_hash: String) -> AppResult<()> {
        let found = UserEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: ActiveModel = found.into();
        active.password_hash = Set(password_hash);
        active.updated_at = Set(chrono::Utc::now());

        active.update(&self.db).await.map_err(AppError::from)?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = UserEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    async fn clear_class(&self, class: &str) -> AppResult<u64> {
        let result = UserEntity::update_many()
            .col_expr(user::Column::Class, sea_orm::sea_query::Expr::value(Option::<String>::None))
            .filter(user::Column::Class.eq(class))
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.rows_affected)
    }

    async fn clear_grade(&self, grade: &str) -> AppResult<u64> {
        let result = UserEntity::update_many()
            .col_expr(user::Column::Grade, sea_orm::sea_query::Expr::value(Option::<String>::None))
            .filter(user::Column::Grade.eq(grade))
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.rows_affected)
    }

    async fn clear_major(&self, major: &str) -> AppResult<u64> {
        let result = UserEntity::update_many()
            .col_expr(user::Column::Major, sea_orm::sea_query::Expr::value(Option::<String>::None))
            .filter(user::Column::Major.eq(major))
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.rows_affected)
    }
}
