//! Credit claim repository.
//!
//! Status transitions are single conditional updates keyed on the claim id
//! and the expected current status, so no caller ever observes a
//! half-applied resolution.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use uuid::Uuid;

use super::entities::credit::{self, ActiveModel, Entity as CreditEntity};
use super::entities::credit_proof::ActiveModel as ProofActiveModel;
use super::entities::user::{self as user_entity, Entity as UserEntity};
use crate::domain::{Claim, ClaimStatus, ClaimWithOwner, Proof};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Filters for history queries. Pending claims are always excluded.
#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    pub class: Option<String>,
    pub credit_type: Option<String>,
    pub user_id: Option<Uuid>,
    pub status: Option<ClaimStatus>,
}

/// Claim repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ClaimRepository: Send + Sync {
    /// Find claim by ID
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Claim>>;

    /// Find claim joined with its owner's identity fields
    async fn find_with_owner(&self, id: Uuid) -> AppResult<Option<ClaimWithOwner>>;

    /// All claims of one user, newest first
    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Claim>>;

    /// Every pending claim joined with its owner, oldest first
    async fn list_pending_with_owners(&self) -> AppResult<Vec<ClaimWithOwner>>;

    /// Resolved claims (approved/rejected) matching the filter, newest first
    async fn list_resolved_with_owners(
        &self,
        filter: HistoryFilter,
    ) -> AppResult<Vec<ClaimWithOwner>>;

    /// Insert a claim and all its proof rows in one transaction
    async fn insert_with_proofs(&self, claim: Claim, proofs: Vec<Proof>) -> AppResult<Claim>;

    /// pending → approved. Returns false when the claim was not pending.
    async fn approve_pending(
        &self,
        id: Uuid,
        score: f64,
        approver_id: Uuid,
        approved_at: DateTime<Utc>,
    ) -> AppResult<bool>;

    /// pending → rejected. Returns false when the claim was not pending.
    async fn reject_pending(
        &self,
        id: Uuid,
        reason: String,
        approver_id: Uuid,
        rejected_at: DateTime<Utc>,
    ) -> AppResult<bool>;

    /// Replace the score of an approved claim. Returns false when the claim
    /// was not approved.
    async fn correct_approved_score(&self, id: Uuid, score: f64) -> AppResult<bool>;

    /// Hard delete; proof rows cascade at the database level
    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

fn with_owner((claim, owner): (credit::Model, Option<user_entity::Model>)) -> ClaimWithOwner {
    let (owner_username, owner_name, owner_class) = match owner {
        Some(u) => (u.username, u.name, u.class),
        // FK guarantees an owner; guard anyway so a torn read cannot panic
        None => (String::new(), String::new(), None),
    };

    ClaimWithOwner {
        claim: Claim::from(claim),
        owner_username,
        owner_name,
        owner_class,
    }
}

/// Concrete implementation of ClaimRepository
pub struct ClaimStore {
    db: DatabaseConnection,
}

impl ClaimStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ClaimRepository for ClaimStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Claim>> {
        let result = CreditEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Claim::from))
    }

    async fn find_with_owner(&self, id: Uuid) -> AppResult<Option<ClaimWithOwner>> {
        let result = CreditEntity::find_by_id(id)
            .find_also_related(UserEntity)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(with_owner))
    }

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Claim>> {
        let models = CreditEntity::find()
            .filter(credit::Column::UserId.eq(user_id))
            .order_by_desc(credit::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Claim::from).collect())
    }

    async fn list_pending_with_owners(&self) -> AppResult<Vec<ClaimWithOwner>> {
        let rows = CreditEntity::find()
            .filter(credit::Column::Status.eq(ClaimStatus::Pending.as_str()))
            .find_also_related(UserEntity)
            .order_by_asc(credit::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(rows.into_iter().map(with_owner).collect())
    }

    async fn list_resolved_with_owners(
        &self,
        filter: HistoryFilter,
    ) -> AppResult<Vec<ClaimWithOwner>> {
        // The join must be in place before filtering on owner columns
        let mut query = CreditEntity::find()
            .find_also_related(UserEntity)
            .filter(credit::Column::Status.ne(ClaimStatus::Pending.as_str()));

        if let Some(status) = filter.status {
            query = query.filter(credit::Column::Status.eq(status.as_str()));
        }
        if let Some(credit_type) = filter.credit_type {
            query = query.filter(credit::Column::CreditType.eq(credit_type));
        }
        if let Some(user_id) = filter.user_id {
            query = query.filter(credit::Column::UserId.eq(user_id));
        }
        if let Some(class) = filter.class {
            query = query.filter(user_entity::Column::Class.eq(class));
        }

        let rows = query
            .order_by_desc(credit::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(rows.into_iter().map(with_owner).collect())
    }

    async fn insert_with_proofs(&self, claim: Claim, proofs: Vec<Proof>) -> AppResult<Claim> {
        let txn = self.db.begin().await.map_err(AppError::from)?;

        let claim_model = ActiveModel {
            id: Set(claim.id),
            user_id: Set(claim.user_id),
            credit_type: Set(claim.credit_type.clone()),
            score: Set(claim.score),
            status: Set(claim.status.as_str().to_string()),
            fields: Set(claim.fields.clone()),
            reject_reason: Set(claim.reject_reason.clone()),
            approver_id: Set(claim.approver_id),
            approved_at: Set(claim.approved_at),
            created_at: Set(claim.created_at),
        };

        let inserted = match claim_model.insert(&txn).await {
            Ok(model) => model,
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                return Err(AppError::from(e));
            }
        };

        for proof in proofs {
            let proof_model = ProofActiveModel {
                id: Set(proof.id),
                credit_id: Set(proof.credit_id),
                filename: Set(proof.filename),
                mime_type: Set(proof.mime_type),
                data: Set(proof.data),
                storage_key: Set(proof.storage_key),
                created_at: Set(proof.created_at),
            };

            if let Err(e) = proof_model.insert(&txn).await {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                return Err(AppError::from(e));
            }
        }

        txn.commit().await.map_err(AppError::from)?;

        Ok(Claim::from(inserted))
    }

    async fn approve_pending(
        &self,
        id: Uuid,
        score: f64,
        approver_id: Uuid,
        approved_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        use sea_orm::sea_query::Expr;

        let result = CreditEntity::update_many()
            .col_expr(credit::Column::Status, Expr::value(ClaimStatus::Approved.as_str()))
            .col_expr(credit::Column::Score, Expr::value(Some(score)))
            .col_expr(credit::Column::ApproverId, Expr::value(Some(approver_id)))
            .col_expr(credit::Column::ApprovedAt, Expr::value(Some(approved_at)))
            .col_expr(credit::Column::RejectReason, Expr::value(Option::<String>::None))
            .filter(credit::Column::Id.eq(id))
            .filter(credit::Column::Status.eq(ClaimStatus::Pending.as_str()))
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.rows_affected > 0)
    }

    async fn reject_pending(
        &self,
        id: Uuid,
        reason: String,
        approver_id: Uuid,
        rejected_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        use sea_orm::sea_query::Expr;

        let result = CreditEntity::update_many()
            .col_expr(credit::Column::Status, Expr::value(ClaimStatus::Rejected.as_str()))
            .col_expr(credit::Column::Score, Expr::value(Option::<f64>::None))
            .col_expr(credit::Column::RejectReason, Expr::value(Some(reason)))
            .col_expr(credit::Column::ApproverId, Expr::value(Some(approver_id)))
            .col_expr(credit::Column::ApprovedAt, Expr::value(Some(rejected_at)))
            .filter(credit::Column::Id.eq(id))
            .filter(credit::Column::Status.eq(ClaimStatus::Pending.as_str()))
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.rows_affected > 0)
    }

    async fn correct_approved_score(&self, id: Uuid, score: f64) -> AppResult<bool> {
        use sea_orm::sea_query::Expr;

        let result = CreditEntity::update_many()
            .col_expr(credit::Column::Score, Expr::value(Some(score)))
            .filter(credit::Column::Id.eq(id))
            .filter(credit::Column::Status.eq(ClaimStatus::Approved.as_str()))
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.rows_affected > 0)
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = CreditEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }
}
