//! Structure directory handlers: grades, majors, classes.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::get,
    Extension, Router,
};
use uuid::Uuid;

use super::require_admin_or;
use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{Capability, Class, CreateClass, CreateNamed, Grade, Major};
use crate::errors::AppResult;
use crate::types::{Created, NoContent};

/// Create structure routes
pub fn structure_routes() -> Router<AppState> {
    Router::new()
        .route("/grades", get(list_grades).post(create_grade))
        .route("/grades/:id", axum::routing::delete(delete_grade))
        .route("/majors", get(list_majors).post(create_major))
        .route("/majors/:id", axum::routing::delete(delete_major))
        .route("/classes", get(list_classes).post(create_class))
        .route("/classes/:id", axum::routing::delete(delete_class))
}

/// List grades
#[utoipa::path(
    get,
    path = "/structure/grades",
    tag = "Structure",
    responses((status = 200, description = "All grades", body = [Grade])),
    security(("bearer_auth" = []))
)]
pub async fn list_grades(State(state): State<AppState>) -> AppResult<Json<Vec<Grade>>> {
    Ok(Json(state.structure_service.list_grades().await?))
}

/// Create a grade (admin)
#[utoipa::path(
    post,
    path = "/structure/grades",
    tag = "Structure",
    request_body = CreateNamed,
    responses((status = 201, description = "Grade created", body = Grade)),
    security(("bearer_auth" = []))
)]
pub async fn create_grade(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreateNamed>,
) -> AppResult<Created<Grade>> {
    require_admin_or(&state, &user, Capability::StructureManage).await?;
    Ok(Created(state.structure_service.create_grade(payload.name).await?))
}

/// Delete a grade; affected users keep their account with a nulled grade
#[utoipa::path(
    delete,
    path = "/structure/grades/{id}",
    tag = "Structure",
    params(("id" = Uuid, Path, description = "Grade id")),
    responses((status = 204, description = "Grade removed")),
    security(("bearer_auth" = []))
)]
pub async fn delete_grade(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    require_admin_or(&state, &user, Capability::StructureManage).await?;
    state.structure_service.delete_grade(id).await?;
    Ok(NoContent)
}

/// List majors
#[utoipa::path(
    get,
    path = "/structure/majors",
    tag = "Structure",
    responses((status = 200, description = "All majors", body = [Major])),
    security(("bearer_auth" = []))
)]
pub async fn list_majors(State(state): State<AppState>) -> AppResult<Json<Vec<Major>>> {
    Ok(Json(state.structure_service.list_majors().await?))
}

/// Create a major (admin)
#[utoipa::path(
    post,
    path = "/structure/majors",
    tag = "Structure",
    request_body = CreateNamed,
    responses((status = 201, description = "Major created", body = Major)),
    security(("bearer_auth" = []))
)]
pub async fn create_major(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreateNamed>,
) -> AppResult<Created<Major>> {
    require_admin_or(&state, &user, Capability::StructureManage).await?;
    Ok(Created(state.structure_service.create_major(payload.name).await?))
}

/// Delete a major; affected users keep their account with a nulled major
#[utoipa::path(
    delete,
    path = "/structure/majors/{id}",
    tag = "Structure",
    params(("id" = Uuid, Path, description = "Major id")),
    responses((status = 204, description = "Major removed")),
    security(("bearer_auth" = []))
)]
pub async fn delete_major(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    require_admin_or(&state, &user, Capability::StructureManage).await?;
    state.structure_service.delete_major(id).await?;
    Ok(NoContent)
}

/// List classes
#[utoipa::path(
    get,
    path = "/structure/classes",
    tag = "Structure",
    responses((status = 200, description = "All classes", body = [Class])),
    security(("bearer_auth" = []))
)]
pub async fn list_classes(State(state): State<AppState>) -> AppResult<Json<Vec<Class>>> {
    Ok(Json(state.structure_service.list_classes().await?))
}

/// Create a class bound to one grade and one major (admin)
#[utoipa::path(
    post,
    path = "/structure/classes",
    tag = "Structure",
    request_body = CreateClass,
    responses((status = 201, description = "Class created", body = Class)),
    security(("bearer_auth" = []))
)]
pub async fn create_class(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreateClass>,
) -> AppResult<Created<Class>> {
    require_admin_or(&state, &user, Capability::StructureManage).await?;
    Ok(Created(
        state
            .structure_service
            .create_class(payload.name, payload.grade, payload.major)
            .await?,
    ))
}

/// Delete a class; affected users keep their account with a nulled class
#[utoipa::path(
    delete,
    path = "/structure/classes/{id}",
    tag = "Structure",
    params(("id" = Uuid, Path, description = "Class id")),
    responses((status = 204, description = "Class removed")),
    security(("bearer_auth" = []))
)]
pub async fn delete_class(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> AppResult<NoContent> {
    require_admin_or(&state, &user, Capability::StructureManage).await?;
    state.structure_service.delete_class(id).await?;
    Ok(NoContent)
}
