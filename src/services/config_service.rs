//! Config store service.
//!
//! Roles, credit types, statuses and form fields are runtime data edited by
//! administrators. This service owns the contract around the keyed JSON
//! rows: payloads are validated per category before upsert, keys are
//! immutable identity, deletion is a soft flag flip, and display lookups
//! tolerate missing or inactive rows by falling back to the raw key.

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::PROTECTED_ROLE_KEYS;
use crate::domain::{
    ConfigCategory, ConfigEntry, CreditTypeConfig, FieldConfig, FieldRef, RoleConfig, StatusConfig,
};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Config service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ConfigService: Send + Sync {
    /// Every row in a category, inactive included (admin screens)
    async fn list(&self, category: ConfigCategory) -> AppResult<Vec<ConfigEntry>>;

    /// Active rows only (submission forms, permission checks)
    async fn list_active(&self, category: ConfigCategory) -> AppResult<Vec<ConfigEntry>>;

    /// Validate and insert-or-update one record. The key never changes an
    /// existing record's identity; only secondary attributes are edited.
    async fn upsert(
        &self,
        category: ConfigCategory,
        key: &str,
        value: serde_json::Value,
    ) -> AppResult<ConfigEntry>;

    /// Flip the row inactive. Idempotent; the row stays resolvable for
    /// historical display.
    async fn soft_delete(&self, category: ConfigCategory, key: &str) -> AppResult<()>;

    /// Active role config by key
    async fn role(&self, key: &str) -> AppResult<Option<RoleConfig>>;

    /// All active role configs
    async fn roles(&self) -> AppResult<Vec<RoleConfig>>;

    /// Active credit type config by key
    async fn credit_type(&self, key: &str) -> AppResult<Option<CreditTypeConfig>>;

    /// All active credit type configs
    async fn credit_types(&self) -> AppResult<Vec<CreditTypeConfig>>;

    /// The shared field registry (active fields)
    async fn field_registry(&self) -> AppResult<Vec<FieldConfig>>;

    /// Resolve a credit type's field list against the registry. Registry
    /// keys that no longer resolve are skipped with a warning.
    async fn resolve_fields(&self, ty: &CreditTypeConfig) -> AppResult<Vec<FieldConfig>>;

    /// Display label for a key; missing or inactive rows show the raw key.
    async fn label_for(&self, category: ConfigCategory, key: &str) -> AppResult<String>;
}

/// Parse a category payload into its typed form, enforcing invariants and
/// that the embedded key matches the row key.
fn validate_payload(
    category: ConfigCategory,
    key: &str,
    value: &serde_json::Value,
) -> AppResult<()> {
    let embedded_key = match category {
        ConfigCategory::Roles => {
            let parsed: RoleConfig = serde_json::from_value(value.clone())
                .map_err(|e| AppError::validation(format!("invalid role config: {}", e)))?;
            parsed.key
        }
        ConfigCategory::CreditTypes => {
            let parsed: CreditTypeConfig = serde_json::from_value(value.clone())
                .map_err(|e| AppError::validation(format!("invalid credit type config: {}", e)))?;
            parsed.validate()?;
            parsed.key
        }
        ConfigCategory::Statuses => {
            let parsed: StatusConfig = serde_json::from_value(value.clone())
                .map_err(|e| AppError::validation(format!("invalid status config: {}", e)))?;
            parsed.key
        }
        ConfigCategory::Fields => {
            let parsed: FieldConfig = serde_json::from_value(value.clone())
                .map_err(|e| AppError::validation(format!("invalid field config: {}", e)))?;
            parsed.key
        }
    };

    if embedded_key != key {
        return Err(AppError::validation(format!(
            "config key mismatch: row is '{}', payload says '{}'",
            key, embedded_key
        )));
    }

    Ok(())
}

/// Concrete implementation of ConfigService using Unit of Work.
pub struct ConfigManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> ConfigManager<U> {
    /// Create new config service instance with Unit of Work
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn typed_active<T: serde::de::DeserializeOwned>(
        &self,
        category: ConfigCategory,
    ) -> AppResult<Vec<T>> {
        let entries = self.list_active(category).await?;
        let mut parsed = Vec::with_capacity(entries.len());
        for entry in entries {
            match serde_json::from_value::<T>(entry.value) {
                Ok(value) => parsed.push(value),
                Err(e) => {
                    // A corrupt row must not take the whole category down
                    tracing::warn!(
                        category = %category,
                        key = %entry.key,
                        error = %e,
                        "skipping unparseable config row"
                    );
                }
            }
        }
        Ok(parsed)
    }
}

#[async_trait]
impl<U: UnitOfWork> ConfigService for ConfigManager<U> {
    async fn list(&self, category: ConfigCategory) -> AppResult<Vec<ConfigEntry>> {
        self.uow.configs().list(category).await
    }

    async fn list_active(&self, category: ConfigCategory) -> AppResult<Vec<ConfigEntry>> {
        let entries = self.uow.configs().list(category).await?;
        Ok(entries.into_iter().filter(|e| e.is_active).collect())
    }

    async fn upsert(
        &self,
        category: ConfigCategory,
        key: &str,
        value: serde_json::Value,
    ) -> AppResult<ConfigEntry> {
        if key.trim().is_empty() {
            return Err(AppError::validation("config key must not be empty"));
        }

        validate_payload(category, key, &value)?;

        self.uow.configs().upsert(category, key, value).await
    }

    async fn soft_delete(&self, category: ConfigCategory, key: &str) -> AppResult<()> {
        if category == ConfigCategory::Roles && PROTECTED_ROLE_KEYS.contains(&key) {
            return Err(AppError::validation(format!(
                "role '{}' is protected and cannot be deleted",
                key
            )));
        }

        let found = self.uow.configs().set_active(category, key, false).await?;
        if !found {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    async fn role(&self, key: &str) -> AppResult<Option<RoleConfig>> {
        let entry = self.uow.configs().get(ConfigCategory::Roles, key).await?;
        Ok(entry
            .filter(|e| e.is_active)
            .and_then(|e| serde_json::from_value(e.value).ok()))
    }

    async fn roles(&self) -> AppResult<Vec<RoleConfig>> {
        self.typed_active(ConfigCategory::Roles).await
    }

    async fn credit_type(&self, key: &str) -> AppResult<Option<CreditTypeConfig>> {
        let entry = self
            .uow
            .configs()
            .get(ConfigCategory::CreditTypes, key)
            .await?;
        Ok(entry
            .filter(|e| e.is_active)
            .and_then(|e| serde_json::from_value(e.value).ok()))
    }

    async fn credit_types(&self) -> AppResult<Vec<CreditTypeConfig>> {
        self.typed_active(ConfigCategory::CreditTypes).await
    }

    async fn field_registry(&self) -> AppResult<Vec<FieldConfig>> {
        self.typed_active(ConfigCategory::Fields).await
    }

    async fn resolve_fields(&self, ty: &CreditTypeConfig) -> AppResult<Vec<FieldConfig>> {
        let registry = self.field_registry().await?;

        let mut resolved = Vec::with_capacity(ty.fields.len());
        for field_ref in &ty.fields {
            match field_ref {
                FieldRef::Inline(field) => resolved.push(field.clone()),
                FieldRef::Key(key) => match registry.iter().find(|f| &f.key == key) {
                    Some(field) => resolved.push(field.clone()),
                    None => {
                        tracing::warn!(
                            credit_type = %ty.key,
                            field = %key,
                            "credit type references unknown field key"
                        );
                    }
                },
            }
        }

        Ok(resolved)
    }

    async fn label_for(&self, category: ConfigCategory, key: &str) -> AppResult<String> {
        let entry = self.uow.configs().get(category, key).await?;

        Ok(entry
            .and_then(|e| {
                e.value
                    .get("label")
                    .and_then(|l| l.as_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| key.to_string()))
    }
}
