//! Export handlers.

use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Extension, Router,
};

use super::approval_handler::HistoryQuery;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::errors::AppResult;
use crate::services::ExportBundle;

/// Create export routes
pub fn export_routes() -> Router<AppState> {
    Router::new().route("/credits", get(export_credits))
}

/// Permission-scoped claim set plus per-user aggregates for the archive
/// collaborator
#[utoipa::path(
    get,
    path = "/export/credits",
    tag = "Export",
    responses(
        (status = 200, description = "Scoped claims and per-user statistics"),
        (status = 403, description = "Missing credits.export capability")
    ),
    security(("bearer_auth" = []))
)]
pub async fn export_credits(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<ExportBundle>> {
    let filter = query.into_filter()?;
    let bundle = state
        .export_service
        .export(&user.principal(), filter)
        .await?;
    Ok(Json(bundle))
}
