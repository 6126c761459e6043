//! Approval workflow handlers: pending queue, resolution, history.

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, post, put},
    Extension, Router,
};
use serde::Deserialize;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{Claim, ClaimStatus, ClaimWithOwner};
use crate::errors::{AppError, AppResult};
use crate::infra::HistoryFilter;

/// Create approval routes (mounted under /credits)
pub fn approval_routes() -> Router<AppState> {
    Router::new()
        .route("/pending", get(pending))
        .route("/history", get(history))
        .route("/:id/approve", post(approve))
        .route("/:id/reject", post(reject))
        .route("/:id/score", put(correct_score))
}

/// Approve request body
#[derive(Debug, Deserialize, ToSchema)]
pub struct ApproveRequest {
    /// Final score, 0..=1000
    #[schema(example = 60.0)]
    pub score: f64,
}

/// Reject request body
#[derive(Debug, Deserialize, ToSchema)]
pub struct RejectRequest {
    /// Non-empty rejection reason shown to the claimant
    #[schema(example = "证明材料不完整")]
    pub reason: String,
}

/// Score correction request body
#[derive(Debug, Deserialize, ToSchema)]
pub struct CorrectScoreRequest {
    /// Replacement score, 0..=3000
    #[schema(example = 120.0)]
    pub score: f64,
}

/// History query parameters
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub status: Option<String>,
    pub credit_type: Option<String>,
    pub user_id: Option<Uuid>,
    pub class: Option<String>,
}

impl HistoryQuery {
    pub fn into_filter(self) -> AppResult<HistoryFilter> {
        let status = self
            .status
            .map(|s| ClaimStatus::from_str(&s).map_err(AppError::validation))
            .transpose()?;

        Ok(HistoryFilter {
            class: self.class,
            credit_type: self.credit_type,
            user_id: self.user_id,
            status,
        })
    }
}

/// Pending claims the caller may act on
#[utoipa::path(
    get,
    path = "/credits/pending",
    tag = "Approvals",
    responses(
        (status = 200, description = "Pending claims scoped by class and credit type"),
        (status = 403, description = "Caller holds no approval capability")
    ),
    security(("bearer_auth" = []))
)]
pub async fn pending(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<ClaimWithOwner>>> {
    let claims = state.approval_service.pending(&user.principal()).await?;
    Ok(Json(claims))
}

/// Approve a pending claim with a finalized score
#[utoipa::path(
    post,
    path = "/credits/{id}/approve",
    tag = "Approvals",
    params(("id" = Uuid, Path, description = "Claim id")),
    request_body = ApproveRequest,
    responses(
        (status = 200, description = "Claim approved"),
        (status = 400, description = "Score out of range or claim not pending"),
        (status = 403, description = "Admin role, missing capability, or cross-class attempt")
    ),
    security(("bearer_auth" = []))
)]
pub async fn approve(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ApproveRequest>,
) -> AppResult<Json<Claim>> {
    let claim = state
        .approval_service
        .approve(&user.principal(), id, payload.score)
        .await?;
    Ok(Json(claim))
}

/// Reject a pending claim with a reason
#[utoipa::path(
    post,
    path = "/credits/{id}/reject",
    tag = "Approvals",
    params(("id" = Uuid, Path, description = "Claim id")),
    request_body = RejectRequest,
    responses(
        (status = 200, description = "Claim rejected"),
        (status = 400, description = "Empty reason or claim not pending")
    ),
    security(("bearer_auth" = []))
)]
pub async fn reject(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RejectRequest>,
) -> AppResult<Json<Claim>> {
    let claim = state
        .approval_service
        .reject(&user.principal(), id, payload.reason)
        .await?;
    Ok(Json(claim))
}

/// Correct the score of an approved claim
#[utoipa::path(
    put,
    path = "/credits/{id}/score",
    tag = "Approvals",
    params(("id" = Uuid, Path, description = "Claim id")),
    request_body = CorrectScoreRequest,
    responses(
        (status = 200, description = "Score corrected"),
        (status = 400, description = "Score out of range or claim not approved")
    ),
    security(("bearer_auth" = []))
)]
pub async fn correct_score(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CorrectScoreRequest>,
) -> AppResult<Json<Claim>> {
    let claim = state
        .approval_service
        .correct_score(&user.principal(), id, payload.score)
        .await?;
    Ok(Json(claim))
}

/// Resolved claims visible to the caller
#[utoipa::path(
    get,
    path = "/credits/history",
    tag = "Approvals",
    responses((status = 200, description = "Resolved claims; pending never appears")),
    security(("bearer_auth" = []))
)]
pub async fn history(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<Vec<ClaimWithOwner>>> {
    let filter = query.into_filter()?;
    let claims = state
        .approval_service
        .history(&user.principal(), filter)
        .await?;
    Ok(Json(claims))
}
