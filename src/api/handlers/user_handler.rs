//! User management handlers.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post, put},
    Extension, Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::require_admin_or;
use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{
    Capability, CreateUser, ImportOutcome, ImportUserRow, UpdateUser, UserResponse,
};
use crate::errors::AppResult;
use crate::types::{Created, MessageResponse, NoContent};

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(me))
        .route("/me/password", put(change_password))
        .route("/", get(list_users).post(create_user))
        .route("/import", post(import_users))
        .route("/unlock", post(unlock))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
        .route("/:id/reset-password", put(reset_password))
}

/// Own-password change request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

/// Admin password reset request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Account unlock request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UnlockRequest {
    #[validate(length(min = 2, message = "Username is required"))]
    pub username: String,
}

/// Current user's profile
#[utoipa::path(
    get,
    path = "/users/me",
    tag = "Users",
    responses((status = 200, description = "Own profile", body = UserResponse)),
    security(("bearer_auth" = []))
)]
pub async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<UserResponse>> {
    let profile = state.user_service.get_user(user.id).await?;
    Ok(Json(UserResponse::from(profile)))
}

/// Change own password
#[utoipa::path(
    put,
    path = "/users/me/password",
    tag = "Users",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 401, description = "Old password does not match")
    ),
    security(("bearer_auth" = []))
)]
pub async fn change_password(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<ChangePasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    state
        .auth_service
        .change_password(user.id, payload.old_password, payload.new_password)
        .await?;

    Ok(Json(MessageResponse::new("Password changed")))
}

/// List all users (admin)
#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    responses((status = 200, description = "All users", body = [UserResponse])),
    security(("bearer_auth" = []))
)]
pub async fn list_users(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<UserResponse>>> {
    require_admin_or(&state, &user, Capability::UsersManage).await?;

    let users = state.user_service.list_users().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Create a user (admin)
#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 409, description = "Username already exists")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_user(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreateUser>,
) -> AppResult<Created<UserResponse>> {
    require_admin_or(&state, &user, Capability::UsersManage).await?;

    let created = state.user_service.create_user(payload).await?;
    Ok(Created(UserResponse::from(created)))
}

/// Bulk import pre-parsed rows (admin)
#[utoipa::path(
    post,
    path = "/users/import",
    tag = "Users",
    responses((status = 200, description = "Per-row outcomes", body = [ImportOutcome])),
    security(("bearer_auth" = []))
)]
pub async fn import_users(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(rows): Json<Vec<ImportUserRow>>,
) -> AppResult<Json<Vec<ImportOutcome>>> {
    require_admin_or(&state, &user, Capability::UsersManage).await?;

    let outcomes = state.user_service.import(rows).await?;
    Ok(Json(outcomes))
}

/// Clear a locked account's failure counter (admin)
#[utoipa::path(
    post,
    path = "/users/unlock",
    tag = "Users",
    request_body = UnlockRequest,
    responses((status = 200, description = "Account unlocked")),
    security(("bearer_auth" = []))
)]
pub async fn unlock(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<UnlockRequest>,
) -> AppResult<Json<MessageResponse>> {
    require_admin_or(&state, &user, Capability::UsersManage).await?;

    state.user_service.unlock(&payload.username).await?;
    Ok(Json(MessageResponse::new("Account unlocked")))
}

/// Get one user (admin)
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User id")),
    responses((status = 200, description = "User detail", body = UserResponse)),
    security(("bearer_auth" = []))
)]
pub async fn get_user(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<UserResponse>> {
    require_admin_or(&state, &user, Capability::UsersManage).await?;

    let found = state.user_service.get_user(id).await?;
    Ok(Json(UserResponse::from(found)))
}

/// Update a user (admin)
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = UpdateUser,
    responses((status = 200, description = "User updated", body = UserResponse)),
    security(("bearer_auth" = []))
)]
pub async fn update_user(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(changes): Json<UpdateUser>,
) -> AppResult<Json<UserResponse>> {
    require_admin_or(&state, &user, Capability::UsersManage).await?;

    let updated = state.user_service.update_user(id, changes).await?;
    Ok(Json(UserResponse::from(updated)))
}

/// Delete a user and their claims (admin)
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User id")),
    responses((status = 204, description = "User removed, owned claims cascade")),
    security(("bearer_auth" = []))
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    require_admin_or(&state, &user, Capability::UsersManage).await?;

    state.user_service.delete_user(id).await?;
    Ok(NoContent)
}

/// Reset a user's password (admin)
#[utoipa::path(
    put,
    path = "/users/{id}/reset-password",
    tag = "Users",
    params(("id" = Uuid, Path, description = "User id")),
    request_body = ResetPasswordRequest,
    responses((status = 200, description = "Password reset")),
    security(("bearer_auth" = []))
)]
pub async fn reset_password(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<ResetPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    require_admin_or(&state, &user, Capability::UsersManage).await?;

    state.user_service.reset_password(id, payload.password).await?;
    Ok(Json(MessageResponse::new("Password reset")))
}
