//! Approval workflow - the claim state machine.
//!
//! `pending → approved` and `pending → rejected` are the only transitions,
//! executed as single conditional updates so a claim can never be observed
//! half-resolved. Administrators are barred from approving by policy even
//! though their capabilities would allow it; cross-class approval is
//! forbidden regardless of capability. Approved claims accept a later
//! privileged score correction with its own, wider bound.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use super::authorization::{AuthorizationEngine, Principal};
use crate::config::{MAX_APPROVAL_SCORE, MAX_CORRECTION_SCORE, ROLE_ADMIN};
use crate::domain::{Capability, Claim, ClaimWithOwner};
use crate::errors::{AppError, AppResult};
use crate::infra::{HistoryFilter, UnitOfWork};

/// Approval service trait for dependency injection.
#[async_trait]
pub trait ApprovalService: Send + Sync {
    /// Pending claims the approver may act on, scoped by class and
    /// per-type approver lists
    async fn pending(&self, principal: &Principal) -> AppResult<Vec<ClaimWithOwner>>;

    /// pending → approved with a finalized score
    async fn approve(&self, principal: &Principal, claim_id: Uuid, score: f64)
        -> AppResult<Claim>;

    /// pending → rejected with a reason
    async fn reject(
        &self,
        principal: &Principal,
        claim_id: Uuid,
        reason: String,
    ) -> AppResult<Claim>;

    /// Replace the score of an already-approved claim
    async fn correct_score(
        &self,
        principal: &Principal,
        claim_id: Uuid,
        score: f64,
    ) -> AppResult<Claim>;

    /// Resolved claims visible to the caller; pending claims never appear
    async fn history(
        &self,
        principal: &Principal,
        filter: HistoryFilter,
    ) -> AppResult<Vec<ClaimWithOwner>>;
}

/// Concrete implementation of ApprovalService.
pub struct ApprovalManager<U: UnitOfWork> {
    uow: Arc<U>,
    authz: Arc<AuthorizationEngine>,
}

impl<U: UnitOfWork> ApprovalManager<U> {
    pub fn new(uow: Arc<U>, authz: Arc<AuthorizationEngine>) -> Self {
        Self { uow, authz }
    }

    /// Shared preconditions for approve/reject: not the admin role, holds
    /// the capability, same class as the claim owner, and the type's
    /// approver list names the role. Returns the claim row.
    async fn check_resolution(
        &self,
        principal: &Principal,
        claim_id: Uuid,
        capability: Capability,
    ) -> AppResult<ClaimWithOwner> {
        // Policy decision, not an oversight: the organization-wide admin
        // role does not perform approvals
        if principal.role == ROLE_ADMIN {
            return Err(AppError::forbidden(
                "administrators cannot approve or reject claims",
            ));
        }

        self.authz.require(principal, capability).await?;

        let item = self
            .uow
            .claims()
            .find_with_owner(claim_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let approver_class = principal.class.as_deref().ok_or_else(|| {
            AppError::forbidden("approver has no class assigned; contact an administrator")
        })?;

        // Cross-class resolution is forbidden regardless of capability
        if item.owner_class.as_deref() != Some(approver_class) {
            return Err(AppError::forbidden(
                "claims can only be resolved within your own class",
            ));
        }

        if !self
            .authz
            .may_approve_type(&principal.role, &item.claim.credit_type)
            .await?
        {
            return Err(AppError::forbidden(
                "your role may not resolve claims of this credit type",
            ));
        }

        Ok(item)
    }

    async fn reload(&self, claim_id: Uuid) -> AppResult<Claim> {
        self.uow
            .claims()
            .find_by_id(claim_id)
            .await?
            .ok_or(AppError::NotFound)
    }
}

#[async_trait]
impl<U: UnitOfWork> ApprovalService for ApprovalManager<U> {
    async fn pending(&self, principal: &Principal) -> AppResult<Vec<ClaimWithOwner>> {
        // Approvers, and org-wide viewers (admins may look, not act)
        let caps = self.authz.resolve_permissions(&principal.role).await?;
        let is_super = self.authz.is_super_user(&principal.role).await?;
        if !is_super
            && !caps.is_org_wide()
            && !caps.contains(Capability::CreditsApprove)
            && !caps.contains(Capability::CreditsReject)
        {
            return Err(AppError::Forbidden(None));
        }

        let all = self.uow.claims().list_pending_with_owners().await?;
        self.authz.scope_claims_for_approver(principal, all).await
    }

    async fn approve(
        &self,
        principal: &Principal,
        claim_id: Uuid,
        score: f64,
    ) -> AppResult<Claim> {
        if !(0.0..=MAX_APPROVAL_SCORE).contains(&score) {
            return Err(AppError::validation(format!(
                "score must be between 0 and {}",
                MAX_APPROVAL_SCORE
            )));
        }

        self.check_resolution(principal, claim_id, Capability::CreditsApprove)
            .await?;

        let transitioned = self
            .uow
            .claims()
            .approve_pending(claim_id, score, principal.id, Utc::now())
            .await?;

        if !transitioned {
            return Err(AppError::validation("claim is not pending"));
        }

        tracing::info!(
            claim = %claim_id,
            approver = %principal.username,
            score = score,
            "claim approved"
        );

        self.reload(claim_id).await
    }

    async fn reject(
        &self,
        principal: &Principal,
        claim_id: Uuid,
        reason: String,
    ) -> AppResult<Claim> {
        let reason = reason.trim().to_string();
        if reason.is_empty() {
            return Err(AppError::validation("a rejection reason is required"));
        }

        self.check_resolution(principal, claim_id, Capability::CreditsReject)
            .await?;

        let transitioned = self
            .uow
            .claims()
            .reject_pending(claim_id, reason, principal.id, Utc::now())
            .await?;

        if !transitioned {
            return Err(AppError::validation("claim is not pending"));
        }

        tracing::info!(claim = %claim_id, approver = %principal.username, "claim rejected");

        self.reload(claim_id).await
    }

    async fn correct_score(
        &self,
        principal: &Principal,
        claim_id: Uuid,
        score: f64,
    ) -> AppResult<Claim> {
        // Wider bound than initial approval; a distinct business rule, not
        // a bug to unify
        if !(0.0..=MAX_CORRECTION_SCORE).contains(&score) {
            return Err(AppError::validation(format!(
                "corrected score must be between 0 and {}",
                MAX_CORRECTION_SCORE
            )));
        }

        // Capability-gated: super users or approval holders
        if !self.authz.is_super_user(&principal.role).await? {
            self.authz
                .require(principal, Capability::CreditsApprove)
                .await?;
        }

        let exists = self
            .uow
            .claims()
            .find_by_id(claim_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let corrected = self
            .uow
            .claims()
            .correct_approved_score(claim_id, score)
            .await?;

        if !corrected {
            return Err(AppError::validation(format!(
                "only approved claims can be re-scored (claim is {})",
                exists.status
            )));
        }

        tracing::info!(
            claim = %claim_id,
            by = %principal.username,
            score = score,
            "claim score corrected"
        );

        self.reload(claim_id).await
    }

    async fn history(
        &self,
        principal: &Principal,
        mut filter: HistoryFilter,
    ) -> AppResult<Vec<ClaimWithOwner>> {
        if !self.authz.is_super_user(&principal.role).await? {
            self.authz.require(principal, Capability::CreditsView).await?;

            let caps = self.authz.resolve_permissions(&principal.role).await?;
            if !caps.is_org_wide() {
                // Class-scoped viewers only ever see their own class
                let class = principal.class.clone().ok_or_else(|| {
                    AppError::forbidden("viewer has no class assigned; contact an administrator")
                })?;
                filter.class = Some(class);
            }
        }

        self.uow.claims().list_resolved_with_owners(filter).await
    }
}
