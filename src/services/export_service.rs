//! Export service.
//!
//! The export collaborator turns claim sets into downloadable archives;
//! this service supplies its input contract: the permission-scoped claim
//! set plus per-user aggregate statistics. Archive bytes are produced
//! elsewhere.

use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::authorization::{AuthorizationEngine, Principal};
use super::config_service::ConfigService;
use super::container::parallel;
use crate::domain::{scoring, Capability, ClaimStatus, ClaimWithOwner, ScoreCalculation};
use crate::errors::{AppError, AppResult};
use crate::infra::{HistoryFilter, UnitOfWork};

/// Per-user aggregate statistics for the export archive.
#[derive(Debug, Clone, Serialize)]
pub struct UserCreditStats {
    pub user_id: Uuid,
    pub username: String,
    pub name: String,
    pub class: Option<String>,
    /// All submissions, pending included
    pub submitted: u64,
    pub approved: u64,
    /// Summed approved score per credit type key
    pub score_by_type: HashMap<String, f64>,
    /// Summed hours across approved time-based claims
    pub volunteer_hours: f64,
}

/// The export collaborator's input: scoped claims plus statistics.
#[derive(Debug, Clone, Serialize)]
pub struct ExportBundle {
    pub claims: Vec<ClaimWithOwner>,
    pub stats: Vec<UserCreditStats>,
}

/// Export service trait for dependency injection.
#[async_trait]
pub trait ExportService: Send + Sync {
    /// Build the permission-scoped claim set and per-user aggregates
    async fn export(&self, principal: &Principal, filter: HistoryFilter)
        -> AppResult<ExportBundle>;
}

/// Concrete implementation of ExportService.
pub struct ExportManager<U: UnitOfWork> {
    uow: Arc<U>,
    configs: Arc<dyn ConfigService>,
    authz: Arc<AuthorizationEngine>,
}

impl<U: UnitOfWork> ExportManager<U> {
    pub fn new(
        uow: Arc<U>,
        configs: Arc<dyn ConfigService>,
        authz: Arc<AuthorizationEngine>,
    ) -> Self {
        Self {
            uow,
            configs,
            authz,
        }
    }
}

#[async_trait]
impl<U: UnitOfWork> ExportService for ExportManager<U> {
    async fn export(
        &self,
        principal: &Principal,
        mut filter: HistoryFilter,
    ) -> AppResult<ExportBundle> {
        if !self.authz.is_super_user(&principal.role).await? {
            self.authz
                .require(principal, Capability::CreditsExport)
                .await?;

            let caps = self.authz.resolve_permissions(&principal.role).await?;
            if !caps.is_org_wide() {
                // Class-scoped exporters are pinned to their own class
                let class = principal.class.clone().ok_or_else(|| {
                    AppError::forbidden("exporter has no class assigned; contact an administrator")
                })?;
                filter.class = Some(class);
            }
        }

        let scope_class = filter.class.clone();

        // The resolved set is the export payload; pending claims only feed
        // the submission counters
        let claims_repo = self.uow.claims();
        let (resolved, pending) = parallel::join2(
            claims_repo.list_resolved_with_owners(filter),
            claims_repo.list_pending_with_owners(),
        )
        .await?;

        let pending: Vec<ClaimWithOwner> = match &scope_class {
            Some(class) => pending
                .into_iter()
                .filter(|c| c.owner_class.as_deref() == Some(class.as_str()))
                .collect(),
            None => pending,
        };

        let types = self.configs.credit_types().await?;
        let mut resolved_fields = HashMap::new();
        for ty in &types {
            resolved_fields.insert(ty.key.clone(), self.configs.resolve_fields(ty).await?);
        }

        let mut stats: HashMap<Uuid, UserCreditStats> = HashMap::new();

        let mut tally = |item: &ClaimWithOwner| {
            let entry = stats
                .entry(item.claim.user_id)
                .or_insert_with(|| UserCreditStats {
                    user_id: item.claim.user_id,
                    username: item.owner_username.clone(),
                    name: item.owner_name.clone(),
                    class: item.owner_class.clone(),
                    submitted: 0,
                    approved: 0,
                    score_by_type: HashMap::new(),
                    volunteer_hours: 0.0,
                });
            entry.submitted += 1;

            if item.claim.status != ClaimStatus::Approved {
                return;
            }
            entry.approved += 1;

            if let Some(score) = item.claim.score {
                *entry
                    .score_by_type
                    .entry(item.claim.credit_type.clone())
                    .or_insert(0.0) += score;
            }

            let ty = types.iter().find(|t| t.key == item.claim.credit_type);
            if let Some(ty) = ty {
                if ty.score_calculation == ScoreCalculation::TimeBased {
                    let fields = resolved_fields.get(&ty.key).map(Vec::as_slice).unwrap_or(&[]);
                    if let Some(hours) = scoring::hours_value(fields, &item.claim.fields) {
                        if hours > 0.0 {
                            entry.volunteer_hours += hours;
                        }
                    }
                }
            }
        };

        for item in resolved.iter().chain(pending.iter()) {
            tally(item);
        }

        let mut stats: Vec<UserCreditStats> = stats.into_values().collect();
        stats.sort_by(|a, b| a.username.cmp(&b.username));

        tracing::info!(
            by = %principal.username,
            claims = resolved.len(),
            users = stats.len(),
            "export bundle built"
        );

        Ok(ExportBundle {
            claims: resolved,
            stats,
        })
    }
}
