//! Credit claim handlers: submission, own history, proof download.

use axum::{
    body::Bytes,
    extract::{Multipart, Path, State},
    http::header,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Extension, Router,
};
use uuid::Uuid;

use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{ClaimResponse, ProofUpload, SubmitClaim};
use crate::errors::{AppError, AppResult};
use crate::types::{Created, NoContent};

/// Create claim routes
pub fn claim_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(submit_claim))
        .route("/mine", get(my_claims))
        .route("/:id", get(get_claim).delete(delete_claim))
        .route("/:id/suggested-score", get(suggested_score))
}

/// Proof download route (separate prefix)
pub fn proof_routes() -> Router<AppState> {
    Router::new().route("/:id", get(download_proof))
}

/// Pull the JSON payload part and the file parts out of the multipart body.
async fn read_submission(mut multipart: Multipart) -> AppResult<(SubmitClaim, Vec<ProofUpload>)> {
    let mut payload: Option<SubmitClaim> = None;
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("malformed multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == "payload" {
            let text = field
                .text()
                .await
                .map_err(|e| AppError::validation(format!("unreadable payload part: {}", e)))?;
            payload = Some(
                serde_json::from_str(&text)
                    .map_err(|e| AppError::validation(format!("invalid payload JSON: {}", e)))?,
            );
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .unwrap_or_else(|| name.clone());
        let mime_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::validation(format!("unreadable file '{}': {}", filename, e)))?;

        files.push(ProofUpload {
            filename,
            mime_type,
            data,
        });
    }

    let payload =
        payload.ok_or_else(|| AppError::validation("multipart body is missing the payload part"))?;

    Ok((payload, files))
}

/// Submit a new credit claim with proof files
#[utoipa::path(
    post,
    path = "/credits",
    tag = "Credits",
    responses(
        (status = 201, description = "Claim created with pending status", body = ClaimResponse),
        (status = 400, description = "Validation error naming the offending field or file"),
        (status = 403, description = "Missing credits.submit capability")
    ),
    security(("bearer_auth" = []))
)]
pub async fn submit_claim(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    multipart: Multipart,
) -> AppResult<Created<ClaimResponse>> {
    let (payload, files) = read_submission(multipart).await?;

    let claim = state
        .claim_service
        .submit(&user.principal(), payload, files)
        .await?;

    Ok(Created(claim))
}

/// List the caller's own claims
#[utoipa::path(
    get,
    path = "/credits/mine",
    tag = "Credits",
    responses((status = 200, description = "Own claims, newest first", body = [ClaimResponse])),
    security(("bearer_auth" = []))
)]
pub async fn my_claims(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<ClaimResponse>>> {
    let claims = state.claim_service.my_claims(&user.principal()).await?;
    Ok(Json(claims))
}

/// Get one claim
#[utoipa::path(
    get,
    path = "/credits/{id}",
    tag = "Credits",
    params(("id" = Uuid, Path, description = "Claim id")),
    responses(
        (status = 200, description = "Claim detail", body = ClaimResponse),
        (status = 403, description = "Claim is outside the caller's visibility"),
        (status = 404, description = "No such claim")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_claim(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ClaimResponse>> {
    let claim = state.claim_service.get(&user.principal(), id).await?;
    Ok(Json(claim))
}

/// Advisory suggested score from the type's scoring rule
#[utoipa::path(
    get,
    path = "/credits/{id}/suggested-score",
    tag = "Credits",
    params(("id" = Uuid, Path, description = "Claim id")),
    responses((status = 200, description = "Suggested score, null for manual types")),
    security(("bearer_auth" = []))
)]
pub async fn suggested_score(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let score = state
        .claim_service
        .suggested_score(&user.principal(), id)
        .await?;
    Ok(Json(serde_json::json!({ "suggested_score": score })))
}

/// Delete a claim (approver/admin, no recovery)
#[utoipa::path(
    delete,
    path = "/credits/{id}",
    tag = "Credits",
    params(("id" = Uuid, Path, description = "Claim id")),
    responses(
        (status = 204, description = "Claim and proofs removed"),
        (status = 403, description = "Caller may not delete this claim")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_claim(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    state.claim_service.delete(&user.principal(), id).await?;
    Ok(NoContent)
}

/// Download proof bytes
#[utoipa::path(
    get,
    path = "/proofs/{id}",
    tag = "Credits",
    params(("id" = Uuid, Path, description = "Proof id")),
    responses(
        (status = 200, description = "Proof bytes with original content type"),
        (status = 503, description = "File unavailable")
    ),
    security(("bearer_auth" = []))
)]
pub async fn download_proof(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    let (filename, mime_type, bytes) = state
        .claim_service
        .proof_bytes(&user.principal(), id)
        .await?;

    let disposition = format!("inline; filename=\"{}\"", filename.replace('"', "_"));

    Ok((
        [
            (header::CONTENT_TYPE, mime_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Bytes::from(bytes),
    )
        .into_response())
}
