//! User service - account management and bulk import.
//!
//! Accounts are created by administrators or imported in bulk from
//! pre-parsed tabular rows; each row yields an individual outcome so one
//! bad record never aborts the batch.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::{DEFAULT_IMPORT_PASSWORD, ROLE_STUDENT};
use crate::domain::{CreateUser, ImportOutcome, ImportUserRow, Password, UpdateUser, User};
use crate::errors::{AppError, AppResult};
use crate::infra::{LoginAttempts, UnitOfWork};

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// Get user by ID
    async fn get_user(&self, id: Uuid) -> AppResult<User>;

    /// List all users
    async fn list_users(&self) -> AppResult<Vec<User>>;

    /// Create a new user account
    async fn create_user(&self, payload: CreateUser) -> AppResult<User>;

    /// Update profile fields
    async fn update_user(&self, id: Uuid, changes: UpdateUser) -> AppResult<User>;

    /// Hard delete; owned claims and proofs cascade
    async fn delete_user(&self, id: Uuid) -> AppResult<()>;

    /// Admin password reset (no old-password check)
    async fn reset_password(&self, id: Uuid, new_password: String) -> AppResult<()>;

    /// Clear a locked account's failure counter
    async fn unlock(&self, username: &str) -> AppResult<()>;

    /// Validate and persist pre-parsed import rows, one outcome per row
    async fn import(&self, rows: Vec<ImportUserRow>) -> AppResult<Vec<ImportOutcome>>;
}

/// Concrete implementation of UserService using Unit of Work.
pub struct UserManager<U: UnitOfWork> {
    uow: Arc<U>,
    attempts: Arc<dyn LoginAttempts>,
}

impl<U: UnitOfWork> UserManager<U> {
    /// Create new user service instance with Unit of Work
    pub fn new(uow: Arc<U>, attempts: Arc<dyn LoginAttempts>) -> Self {
        Self { uow, attempts }
    }

    async fn insert_user(
        &self,
        username: String,
        name: String,
        password: &str,
        role: Option<String>,
        class: Option<String>,
        grade: Option<String>,
        major: Option<String>,
    ) -> AppResult<User> {
        if self
            .uow
            .users()
            .find_by_username(&username)
            .await?
            .is_some()
        {
            return Err(AppError::conflict("User"));
        }

        let password_hash = Password::new(password)?.into_string();
        let now = Utc::now();

        self.uow
            .users()
            .create(User {
                id: Uuid::new_v4(),
                username,
                name,
                password_hash,
                role: role.unwrap_or_else(|| ROLE_STUDENT.to_string()),
                class,
                grade,
                major,
                created_at: now,
                updated_at: now,
            })
            .await
    }
}

#[async_trait]
impl<U: UnitOfWork> UserService for UserManager<U> {
    async fn get_user(&self, id: Uuid) -> AppResult<User> {
        self.uow
            .users()
            .find_by_id(id)
            .await?
            .ok_or(AppError::NotFound)
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        self.uow.users().list().await
    }

    async fn create_user(&self, payload: CreateUser) -> AppResult<User> {
        self.insert_user(
            payload.username,
            payload.name,
            &payload.password,
            payload.role,
            payload.class,
            payload.grade,
            payload.major,
        )
        .await
    }

    async fn update_user(&self, id: Uuid, changes: UpdateUser) -> AppResult<User> {
        self.uow.users().update(id, changes).await
    }

    async fn delete_user(&self, id: Uuid) -> AppResult<()> {
        self.uow.users().delete(id).await
    }

    async fn reset_password(&self, id: Uuid, new_password: String) -> AppResult<()> {
        let hash = Password::new(&new_password)?.into_string();
        self.uow.users().set_password_hash(id, hash).await
    }

    async fn unlock(&self, username: &str) -> AppResult<()> {
        // Verify the account exists so a typo'd unlock is visible
        self.uow
            .users()
            .find_by_username(username)
            .await?
            .ok_or(AppError::NotFound)?;

        self.attempts.reset(username).await?;
        tracing::info!(username = %username, "account unlocked");
        Ok(())
    }

    async fn import(&self, rows: Vec<ImportUserRow>) -> AppResult<Vec<ImportOutcome>> {
        let mut outcomes = Vec::with_capacity(rows.len());

        for row in rows {
            let username = row.username.trim().to_string();
            let password = row
                .password
                .clone()
                .unwrap_or_else(|| DEFAULT_IMPORT_PASSWORD.to_string());

            let result = if username.len() < 2 {
                Err(AppError::validation("username must be at least 2 characters"))
            } else if row.name.trim().len() < 2 {
                Err(AppError::validation("name must be at least 2 characters"))
            } else {
                self.insert_user(
                    username.clone(),
                    row.name.trim().to_string(),
                    &password,
                    row.role,
                    row.class,
                    row.grade,
                    row.major,
                )
                .await
                .map(|_| ())
            };

            outcomes.push(match result {
                Ok(()) => ImportOutcome {
                    username,
                    success: true,
                    message: "imported".to_string(),
                },
                Err(e) => ImportOutcome {
                    username,
                    success: false,
                    message: e.to_string(),
                },
            });
        }

        Ok(outcomes)
    }
}
