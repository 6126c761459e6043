//! Config store handlers.
//!
//! Active entries are readable by any authenticated user (submission forms
//! need them); mutation and the inactive-inclusive listing are gated.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, put},
    Extension, Router,
};
use std::str::FromStr;

use super::require_admin_or;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{Capability, ConfigCategory, ConfigEntry};
use crate::errors::AppResult;
use crate::types::NoContent;

/// Create config routes
pub fn config_routes() -> Router<AppState> {
    Router::new()
        .route("/:category", get(list_active))
        .route("/:category/all", get(list_all))
        .route("/:category/:key", put(upsert).delete(soft_delete))
}

/// Active entries in a category
#[utoipa::path(
    get,
    path = "/configs/{category}",
    tag = "Configuration",
    params(("category" = String, Path, description = "roles | credit_types | statuses | fields")),
    responses((status = 200, description = "Active config entries", body = [ConfigEntry])),
    security(("bearer_auth" = []))
)]
pub async fn list_active(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> AppResult<Json<Vec<ConfigEntry>>> {
    let category = ConfigCategory::from_str(&category)?;
    let entries = state.config_service.list_active(category).await?;
    Ok(Json(entries))
}

/// Every entry in a category, soft-deleted included
#[utoipa::path(
    get,
    path = "/configs/{category}/all",
    tag = "Configuration",
    params(("category" = String, Path, description = "roles | credit_types | statuses | fields")),
    responses((status = 200, description = "All config entries", body = [ConfigEntry])),
    security(("bearer_auth" = []))
)]
pub async fn list_all(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(category): Path<String>,
) -> AppResult<Json<Vec<ConfigEntry>>> {
    require_admin_or(&state, &user, Capability::ConfigManage).await?;

    let category = ConfigCategory::from_str(&category)?;
    let entries = state.config_service.list(category).await?;
    Ok(Json(entries))
}

/// Insert or update one config record
#[utoipa::path(
    put,
    path = "/configs/{category}/{key}",
    tag = "Configuration",
    params(
        ("category" = String, Path, description = "roles | credit_types | statuses | fields"),
        ("key" = String, Path, description = "Immutable record key")
    ),
    responses(
        (status = 200, description = "Record upserted", body = ConfigEntry),
        (status = 400, description = "Payload fails the category's schema or invariants")
    ),
    security(("bearer_auth" = []))
)]
pub async fn upsert(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((category, key)): Path<(String, String)>,
    Json(value): Json<serde_json::Value>,
) -> AppResult<Json<ConfigEntry>> {
    require_admin_or(&state, &user, Capability::ConfigManage).await?;

    let category = ConfigCategory::from_str(&category)?;
    let entry = state.config_service.upsert(category, &key, value).await?;
    Ok(Json(entry))
}

/// Soft-delete one config record
#[utoipa::path(
    delete,
    path = "/configs/{category}/{key}",
    tag = "Configuration",
    params(
        ("category" = String, Path, description = "roles | credit_types | statuses | fields"),
        ("key" = String, Path, description = "Record key")
    ),
    responses(
        (status = 204, description = "Record flagged inactive"),
        (status = 400, description = "Protected role keys cannot be deleted")
    ),
    security(("bearer_auth" = []))
)]
pub async fn soft_delete(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path((category, key)): Path<(String, String)>,
) -> AppResult<NoContent> {
    require_admin_or(&state, &user, Capability::ConfigManage).await?;

    let category = ConfigCategory::from_str(&category)?;
    state.config_service.soft_delete(category, &key).await?;
    Ok(NoContent)
}
