//! HTTP request handlers.

pub mod approval_handler;
pub mod auth_handler;
pub mod claim_handler;
pub mod config_handler;
pub mod export_handler;
pub mod notice_handler;
pub mod structure_handler;
pub mod user_handler;

pub use approval_handler::approval_routes;
pub use auth_handler::auth_routes;
pub use claim_handler::{claim_routes, proof_routes};
pub use config_handler::config_routes;
pub use export_handler::export_routes;
pub use notice_handler::notice_routes;
pub use structure_handler::structure_routes;
pub use user_handler::user_routes;

use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::Capability;
use crate::errors::AppResult;
use crate::services::Principal;

/// Shared gate for management endpoints: super users pass, everyone else
/// needs the named capability.
pub(crate) async fn require_admin_or(
    state: &AppState,
    user: &CurrentUser,
    capability: Capability,
) -> AppResult<Principal> {
    let principal = user.principal();

    if state.authz.is_super_user(&principal.role).await? {
        return Ok(principal);
    }

    state.authz.require(&principal, capability).await?;
    Ok(principal)
}
