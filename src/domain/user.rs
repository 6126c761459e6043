//! User domain entity and related types.
//!
//! Roles are open-ended string keys resolved against the role config store;
//! there is no fixed role enum. Class/grade/major are denormalized names so
//! structure deletions null them instead of cascading.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::config::{ROLE_ADMIN, ROLE_STUDENT};

/// User domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// Student number or staff login, unique
    pub username: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Role key into the role config store
    pub role: String,
    pub class: Option<String>,
    pub grade: Option<String>,
    pub major: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Check if this user carries the legacy admin role key
    pub fn is_admin_role(&self) -> bool {
        self.role == ROLE_ADMIN
    }

    /// Check if this user carries the default student role key
    pub fn is_student_role(&self) -> bool {
        self.role == ROLE_STUDENT
    }
}

/// User creation data transfer object (admin only)
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    /// Student number or staff login
    #[validate(length(min = 2, max = 50, message = "Username must be 2-50 characters"))]
    #[schema(example = "20230101")]
    pub username: String,
    /// Display name
    #[validate(length(min = 2, max = 100, message = "Name must be 2-100 characters"))]
    #[schema(example = "张三")]
    pub name: String,
    /// Initial password (minimum 8 characters)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(example = "SecurePass123!", min_length = 8)]
    pub password: String,
    /// Role key (defaults to student)
    #[schema(example = "student")]
    pub role: Option<String>,
    #[schema(example = "3A")]
    pub class: Option<String>,
    #[schema(example = "2023")]
    pub grade: Option<String>,
    #[schema(example = "Computer Science")]
    pub major: Option<String>,
}

/// User update data transfer object (admin only)
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateUser {
    /// New display name
    pub name: Option<String>,
    /// New role key
    pub role: Option<String>,
    pub class: Option<String>,
    pub grade: Option<String>,
    pub major: Option<String>,
}

/// A pre-parsed bulk-import row. Tabular parsing happens upstream; the
/// service only validates and persists each row.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ImportUserRow {
    pub username: String,
    pub name: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub grade: Option<String>,
    #[serde(default)]
    pub major: Option<String>,
}

/// Per-row import outcome
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ImportOutcome {
    pub username: String,
    pub success: bool,
    pub message: String,
}

/// User response (safe to return to client)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    /// Unique user identifier
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    #[schema(example = "20230101")]
    pub username: String,
    #[schema(example = "张三")]
    pub name: String,
    #[schema(example = "student")]
    pub role: String,
    pub class: Option<String>,
    pub grade: Option<String>,
    pub major: Option<String>,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            name: user.name,
            role: user.role,
            class: user.class,
            grade: user.grade,
            major: user.major,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user(role: &str) -> User {
        User {
            id: Uuid::new_v4(),
            username: "20230101".to_string(),
            name: "张三".to_string(),
            password_hash: "hashed".to_string(),
            role: role.to_string(),
            class: Some("3A".to_string()),
            grade: Some("2023".to_string()),
            major: Some("CS".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_role_key_predicates() {
        assert!(sample_user("admin").is_admin_role());
        assert!(!sample_user("monitor").is_admin_role());
        assert!(sample_user("student").is_student_role());
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let json = serde_json::to_value(sample_user("student")).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("username").is_some());
    }
}
