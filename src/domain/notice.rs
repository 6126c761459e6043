//! Notice (announcement) domain entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Published announcement
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Notice {
    pub id: Uuid,
    pub title: String,
    pub body: String,
    pub author_id: Uuid,
    pub published_at: DateTime<Utc>,
}

/// Notice creation payload
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateNotice {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    #[schema(example = "学分申报截止提醒")]
    pub title: String,
    #[validate(length(min = 1, message = "Body is required"))]
    pub body: String,
}
