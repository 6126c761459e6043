//! Configurable role, credit-type, status and field definitions.
//!
//! These records are data, not code: admins edit them at runtime and the
//! authorization engine, submission validation and scoring all interpret
//! them on each request. Wire shape is camelCase JSON, one record per row
//! in the config store.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::{AppError, AppResult};

/// Closed set of config-store categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConfigCategory {
    Roles,
    CreditTypes,
    Statuses,
    Fields,
}

impl ConfigCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigCategory::Roles => "roles",
            ConfigCategory::CreditTypes => "credit_types",
            ConfigCategory::Statuses => "statuses",
            ConfigCategory::Fields => "fields",
        }
    }
}

impl std::str::FromStr for ConfigCategory {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "roles" => Ok(ConfigCategory::Roles),
            "credit_types" => Ok(ConfigCategory::CreditTypes),
            "statuses" => Ok(ConfigCategory::Statuses),
            "fields" => Ok(ConfigCategory::Fields),
            other => Err(AppError::validation(format!(
                "unknown config category: {}",
                other
            ))),
        }
    }
}

impl std::fmt::Display for ConfigCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A raw config row: category + key identify it, the value is the JSON
/// payload, and soft deletion flips `is_active` without losing the row.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ConfigEntry {
    pub category: ConfigCategory,
    pub key: String,
    #[schema(value_type = Object)]
    pub value: serde_json::Value,
    pub is_active: bool,
}

/// Role definition with its permission strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleConfig {
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub card_color: String,
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// Dynamic form field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Number,
    Date,
    File,
}

/// Reusable field definition shared across credit types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldConfig {
    pub key: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub description: String,
}

/// A credit type's field declaration: either a key into the shared field
/// registry or an inline definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum FieldRef {
    Key(String),
    Inline(FieldConfig),
}

/// How the suggested score for a credit type is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScoreCalculation {
    /// No suggestion; the approver enters the score
    Manual,
    /// Every approved claim is worth `default_score`
    Fixed,
    /// Hours × `score_per_hour`
    TimeBased,
}

/// Credit type definition: dynamic field schema, scoring rule and the role
/// keys allowed to approve claims of this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreditTypeConfig {
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub card_color: String,
    #[serde(default)]
    pub fields: Vec<FieldRef>,
    pub score_calculation: ScoreCalculation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_per_hour: Option<f64>,
    /// None/empty means any approver in the claimant's class may act
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approver_roles: Option<Vec<String>>,
}

impl CreditTypeConfig {
    /// Validate the scoring invariants before the record is persisted.
    pub fn validate(&self) -> AppResult<()> {
        match self.score_calculation {
            ScoreCalculation::TimeBased => match self.score_per_hour {
                Some(rate) if rate > 0.0 => Ok(()),
                _ => Err(AppError::validation(
                    "time_based credit types require scorePerHour > 0",
                )),
            },
            ScoreCalculation::Fixed => {
                if self.default_score.is_none() {
                    tracing::warn!(
                        credit_type = %self.key,
                        "fixed credit type without defaultScore, 0 assumed"
                    );
                }
                Ok(())
            }
            ScoreCalculation::Manual => Ok(()),
        }
    }

    /// True when the given role may approve claims of this type. An absent
    /// or empty approver list means no restriction.
    pub fn approvable_by(&self, role: &str) -> bool {
        match &self.approver_roles {
            Some(roles) if !roles.is_empty() => roles.iter().any(|r| r == role),
            _ => true,
        }
    }
}

/// Claim status display definition (label and color only; the lifecycle
/// itself is fixed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusConfig {
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub color: String,
}
