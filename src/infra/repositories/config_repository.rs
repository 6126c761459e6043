//! Config store repository.
//!
//! Insert-or-replace keyed on `(category, config_key)`; rows are never
//! removed, soft deletion flips `is_active`.

use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::app_config::{self, ActiveModel, Entity as ConfigEntity};
use crate::domain::{ConfigCategory, ConfigEntry};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Config repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ConfigRepository: Send + Sync {
    /// All rows in a category, active and inactive, in key order
    async fn list(&self, category: ConfigCategory) -> AppResult<Vec<ConfigEntry>>;

    /// Single row by category and key
    async fn get(&self, category: ConfigCategory, key: &str) -> AppResult<Option<ConfigEntry>>;

    /// Atomic insert-or-update of the JSON payload for a key
    async fn upsert(
        &self,
        category: ConfigCategory,
        key: &str,
        value: serde_json::Value,
    ) -> AppResult<ConfigEntry>;

    /// Flip the active flag; returns false when the row does not exist
    async fn set_active(&self, category: ConfigCategory, key: &str, active: bool)
        -> AppResult<bool>;
}

fn entry_from(model: app_config::Model) -> AppResult<ConfigEntry> {
    let category = model
        .category
        .parse::<ConfigCategory>()
        .map_err(|_| AppError::internal(format!("corrupt config category: {}", model.category)))?;

    Ok(ConfigEntry {
        category,
        key: model.config_key,
        value: model.value,
        is_active: model.is_active,
    })
}

/// Concrete implementation of ConfigRepository
pub struct ConfigStore {
    db: DatabaseConnection,
}

impl ConfigStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ConfigRepository for ConfigStore {
    async fn list(&self, category: ConfigCategory) -> AppResult<Vec<ConfigEntry>> {
        let models = ConfigEntity::find()
            .filter(app_config::Column::Category.eq(category.as_str()))
            .order_by_asc(app_config::Column::ConfigKey)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        models.into_iter().map(entry_from).collect()
    }

    async fn get(&self, category: ConfigCategory, key: &str) -> AppResult<Option<ConfigEntry>> {
        let model = ConfigEntity::find()
            .filter(app_config::Column::Category.eq(category.as_str()))
            .filter(app_config::Column::ConfigKey.eq(key))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        model.map(entry_from).transpose()
    }

    async fn upsert(
        &self,
        category: ConfigCategory,
        key: &str,
        value: serde_json::Value,
    ) -> AppResult<ConfigEntry> {
        let now = chrono::Utc::now();
        let active_model = ActiveModel {
            id: Set(Uuid::new_v4()),
            category: Set(category.as_str().to_string()),
            config_key: Set(key.to_string()),
            value: Set(value.clone()),
            is_active: Set(true),
            updated_at: Set(now),
        };

        // Single-statement insert-or-update; an upsert also reactivates a
        // previously soft-deleted key.
        ConfigEntity::insert(active_model)
            .on_conflict(
                OnConflict::columns([app_config::Column::Category, app_config::Column::ConfigKey])
                    .update_columns([
                        app_config::Column::Value,
                        app_config::Column::IsActive,
                        app_config::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(ConfigEntry {
            category,
            key: key.to_string(),
            value,
            is_active: true,
        })
    }

    async fn set_active(
        &self,
        category: ConfigCategory,
        key: &str,
        active: bool,
    ) -> AppResult<bool> {
        let result = ConfigEntity::update_many()
            .col_expr(
                app_config::Column::IsActive,
                sea_orm::sea_query::Expr::value(active),
            )
            .col_expr(
                app_config::Column::UpdatedAt,
                sea_orm::sea_query::Expr::value(chrono::Utc::now()),
            )
            .filter(app_config::Column::Category.eq(category.as_str()))
            .filter(app_config::Column::ConfigKey.eq(key))
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.rows_affected > 0)
    }
}
