//! Organizational structure entities: grades, majors and classes.
//!
//! Users reference these by denormalized name; deleting one nulls the
//! matching field on affected users rather than cascading.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Academic year / cohort
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Grade {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Field of study
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Major {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A class belongs to one grade and one major (by name).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Class {
    pub id: Uuid,
    pub name: String,
    pub grade: String,
    pub major: String,
    pub created_at: DateTime<Utc>,
}

/// Create payload for grades and majors
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateNamed {
    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    #[schema(example = "2023")]
    pub name: String,
}

/// Create payload for classes
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateClass {
    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    #[schema(example = "3A")]
    pub name: String,
    #[validate(length(min = 1, message = "Grade is required"))]
    #[schema(example = "2023")]
    pub grade: String,
    #[validate(length(min = 1, message = "Major is required"))]
    #[schema(example = "Computer Science")]
    pub major: String,
}
