//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{
    approval_handler, auth_handler, claim_handler, config_handler, export_handler, notice_handler,
    structure_handler, user_handler,
};
use crate::domain::{
    Class, ClaimResponse, ClaimStatus, ConfigCategory, ConfigEntry, CreateClass, CreateNamed,
    CreateNotice, CreateUser, FieldType, Grade, ImportOutcome, ImportUserRow, Major, Notice,
    ProofSummary, ScoreCalculation, UpdateUser, UserResponse,
};
use crate::services::TokenResponse;

/// OpenAPI documentation for the Quality Credits platform
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Quality Credits API",
        version = "0.1.0",
        description = "Role-based student quality-credit application and approval platform",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        // Authentication
        auth_handler::login,
        // Users
        user_handler::me,
        user_handler::change_password,
        user_handler::list_users,
        user_handler::create_user,
        user_handler::import_users,
        user_handler::unlock,
        user_handler::get_user,
        user_handler::update_user,
        user_handler::delete_user,
        user_handler::reset_password,
        // Credits
        claim_handler::submit_claim,
        claim_handler::my_claims,
        claim_handler::get_claim,
        claim_handler::suggested_score,
        claim_handler::delete_claim,
        claim_handler::download_proof,
        // Approvals
        approval_handler::pending,
        approval_handler::approve,
        approval_handler::reject,
        approval_handler::correct_score,
        approval_handler::history,
        // Configuration
        config_handler::list_active,
        config_handler::list_all,
        config_handler::upsert,
        config_handler::soft_delete,
        // Structure
        structure_handler::list_grades,
        structure_handler::create_grade,
        structure_handler::delete_grade,
        structure_handler::list_majors,
        structure_handler::create_major,
        structure_handler::delete_major,
        structure_handler::list_classes,
        structure_handler::create_class,
        structure_handler::delete_class,
        // Notices
        notice_handler::list_notices,
        notice_handler::publish_notice,
        notice_handler::delete_notice,
        // Export
        export_handler::export_credits,
    ),
    components(
        schemas(
            // Domain types
            UserResponse,
            CreateUser,
            UpdateUser,
            ImportUserRow,
            ImportOutcome,
            ClaimResponse,
            ClaimStatus,
            ProofSummary,
            ConfigCategory,
            ConfigEntry,
            FieldType,
            ScoreCalculation,
            Grade,
            Major,
            Class,
            CreateNamed,
            CreateClass,
            Notice,
            CreateNotice,
            // Auth types
            auth_handler::LoginRequest,
            TokenResponse,
            // Handler types
            user_handler::ChangePasswordRequest,
            user_handler::ResetPasswordRequest,
            user_handler::UnlockRequest,
            approval_handler::ApproveRequest,
            approval_handler::RejectRequest,
            approval_handler::CorrectScoreRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Login and lockout handling"),
        (name = "Users", description = "Account management and bulk import"),
        (name = "Credits", description = "Claim submission and proofs"),
        (name = "Approvals", description = "Pending queue and claim resolution"),
        (name = "Configuration", description = "Roles, credit types, statuses, fields"),
        (name = "Structure", description = "Grades, majors, classes"),
        (name = "Notices", description = "Announcement board"),
        (name = "Export", description = "Claim exports and statistics")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT token obtained from /auth/login"))
                        .build(),
                ),
            );
        }
    }
}
