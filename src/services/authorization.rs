//! Authorization engine.
//!
//! Resolves role permission sets from the config store and answers the
//! capability, visibility and approval-scoping questions the rest of the
//! application asks. Resolution is fail-closed: a role without a config row
//! has no permissions at all.

use std::sync::Arc;

use uuid::Uuid;

use super::config_service::ConfigService;
use crate::config::{ROLE_ADMIN, ROLE_CLASS_LEADER};
use crate::domain::{Capability, CapabilitySet, ClaimWithOwner};
use crate::errors::{AppError, AppResult};

/// The acting identity, as supplied by the identity collaborator (JWT
/// claims). The engine never re-derives identity beyond capability checks.
#[derive(Debug, Clone)]
pub struct Principal {
    pub id: Uuid,
    pub username: String,
    pub role: String,
    pub class: Option<String>,
}

/// Concrete authorization engine over the config store.
pub struct AuthorizationEngine {
    configs: Arc<dyn ConfigService>,
}

impl AuthorizationEngine {
    pub fn new(configs: Arc<dyn ConfigService>) -> Self {
        Self { configs }
    }

    /// Load the permission set for a role key. A missing or inactive role
    /// config resolves to the empty set.
    pub async fn resolve_permissions(&self, role: &str) -> AppResult<CapabilitySet> {
        match self.configs.role(role).await? {
            Some(config) => Ok(CapabilitySet::from_strings(&config.permissions)),
            None => {
                tracing::warn!(role = %role, "no role config found, resolving to no permissions");
                Ok(CapabilitySet::empty())
            }
        }
    }

    /// True when the role holds the wildcard or the exact capability.
    pub async fn can(&self, role: &str, cap: Capability) -> AppResult<bool> {
        Ok(self.resolve_permissions(role).await?.contains(cap))
    }

    /// Capability gate; Forbidden when the check fails.
    pub async fn require(&self, principal: &Principal, cap: Capability) -> AppResult<()> {
        if self.can(&principal.role, cap).await? {
            Ok(())
        } else {
            Err(AppError::Forbidden(None))
        }
    }

    /// The unified super-user predicate. Two legacy checks coexist in the
    /// platform, the hardcoded admin role key and the wildcard capability,
    /// and both must keep granting.
    pub async fn is_super_user(&self, role: &str) -> AppResult<bool> {
        if role == ROLE_ADMIN {
            return Ok(true);
        }
        Ok(self.resolve_permissions(role).await?.has_wildcard())
    }

    /// Super-user gate; Forbidden when the check fails.
    pub async fn require_super_user(&self, principal: &Principal) -> AppResult<()> {
        if self.is_super_user(&principal.role).await? {
            Ok(())
        } else {
            Err(AppError::Forbidden(None))
        }
    }

    /// Whether the principal may read one claim: owners always can, so can
    /// org-wide roles; everyone else needs `credits.view` and the same class
    /// as the claim's owner.
    pub async fn can_view_claim(
        &self,
        principal: &Principal,
        owner_id: Uuid,
        owner_class: Option<&str>,
    ) -> AppResult<bool> {
        if principal.id == owner_id {
            return Ok(true);
        }
        if self.is_super_user(&principal.role).await? {
            return Ok(true);
        }

        let caps = self.resolve_permissions(&principal.role).await?;
        if caps.is_org_wide() {
            return Ok(true);
        }
        if !caps.contains(Capability::CreditsView) {
            return Ok(false);
        }

        match (&principal.class, owner_class) {
            (Some(own), Some(theirs)) => Ok(own == theirs),
            _ => Ok(false),
        }
    }

    /// Restrict a pending-claim list to what one approver may act on.
    ///
    /// Org-wide roles (wildcard or `system.admin`) see everything. Everyone
    /// else is confined to their own class (an approver without a class is
    /// a configuration error, surfaced explicitly) and to the credit types
    /// whose approver list names their role. The class-leader role bypasses
    /// the type filter inside its class.
    pub async fn scope_claims_for_approver(
        &self,
        principal: &Principal,
        claims: Vec<ClaimWithOwner>,
    ) -> AppResult<Vec<ClaimWithOwner>> {
        let caps = self.resolve_permissions(&principal.role).await?;
        if caps.is_org_wide() {
            return Ok(claims);
        }

        let class = principal.class.as_deref().ok_or_else(|| {
            AppError::forbidden("approver has no class assigned; contact an administrator")
        })?;

        let is_class_leader = principal.role == ROLE_CLASS_LEADER;
        let types = self.configs.credit_types().await?;

        Ok(claims
            .into_iter()
            .filter(|item| {
                if item.owner_class.as_deref() != Some(class) {
                    return false;
                }
                if is_class_leader {
                    return true;
                }
                match types.iter().find(|t| t.key == item.claim.credit_type) {
                    Some(ty) => ty.approvable_by(&principal.role),
                    // A claim whose type config is gone stays visible only
                    // to the class leader
                    None => false,
                }
            })
            .collect())
    }

    /// Whether one approver role may act on one credit type key, honoring
    /// the class-leader bypass.
    pub async fn may_approve_type(&self, role: &str, credit_type: &str) -> AppResult<bool> {
        if role == ROLE_CLASS_LEADER {
            return Ok(true);
        }
        match self.configs.credit_type(credit_type).await? {
            Some(ty) => Ok(ty.approvable_by(role)),
            None => Ok(false),
        }
    }
}
