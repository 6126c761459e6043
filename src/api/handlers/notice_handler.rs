//! Notice board handlers.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::get,
    Extension, Router,
};
use uuid::Uuid;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{CreateNotice, Notice};
use crate::errors::AppResult;
use crate::types::{Created, NoContent};

/// Create notice routes
pub fn notice_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notices).post(publish_notice))
        .route("/:id", axum::routing::delete(delete_notice))
}

/// List notices
#[utoipa::path(
    get,
    path = "/notices",
    tag = "Notices",
    responses((status = 200, description = "Notices, newest first", body = [Notice])),
    security(("bearer_auth" = []))
)]
pub async fn list_notices(State(state): State<AppState>) -> AppResult<Json<Vec<Notice>>> {
    Ok(Json(state.notice_service.list().await?))
}

/// Publish a notice (capability gated)
#[utoipa::path(
    post,
    path = "/notices",
    tag = "Notices",
    request_body = CreateNotice,
    responses((status = 201, description = "Notice published", body = Notice)),
    security(("bearer_auth" = []))
)]
pub async fn publish_notice(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreateNotice>,
) -> AppResult<Created<Notice>> {
    let notice = state
        .notice_service
        .publish(&user.principal(), payload)
        .await?;
    Ok(Created(notice))
}

/// Delete a notice (capability gated)
#[utoipa::path(
    delete,
    path = "/notices/{id}",
    tag = "Notices",
    params(("id" = Uuid, Path, description = "Notice id")),
    responses((status = 204, description = "Notice removed")),
    security(("bearer_auth" = []))
)]
pub async fn delete_notice(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    state.notice_service.delete(&user.principal(), id).await?;
    Ok(NoContent)
}
