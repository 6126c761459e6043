//! Credit proof repository.

use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use uuid::Uuid;

use super::entities::credit_proof::{self, Entity as ProofEntity};
use crate::domain::Proof;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Proof repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ProofRepository: Send + Sync {
    /// Find proof by ID
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Proof>>;

    /// All proofs attached to one claim
    async fn list_by_credit(&self, credit_id: Uuid) -> AppResult<Vec<Proof>>;

    /// Proofs still carrying non-empty inline bytes, oldest first.
    /// Rows with an emptied data column are already migrated and excluded.
    async fn list_unmigrated(&self, limit: u64) -> AppResult<Vec<Proof>>;

    /// Record the storage key of a migrated proof and zero its inline bytes
    async fn mark_migrated(&self, id: Uuid, storage_key: String) -> AppResult<()>;
}

/// Concrete implementation of ProofRepository
pub struct ProofStore {
    db: DatabaseConnection,
}

impl ProofStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProofRepository for ProofStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Proof>> {
        let result = ProofEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Proof::from))
    }

    async fn list_by_credit(&self, credit_id: Uuid) -> AppResult<Vec<Proof>> {
        let models = ProofEntity::find()
            .filter(credit_proof::Column::CreditId.eq(credit_id))
            .order_by_asc(credit_proof::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Proof::from).collect())
    }

    async fn list_unmigrated(&self, limit: u64) -> AppResult<Vec<Proof>> {
        use sea_orm::sea_query::Expr;

        let models = ProofEntity::find()
            .filter(credit_proof::Column::Data.is_not_null())
            .filter(Expr::cust("octet_length(data) > 0"))
            .order_by_asc(credit_proof::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(models.into_iter().map(Proof::from).collect())
    }

    async fn mark_migrated(&self, id: Uuid, storage_key: String) -> AppResult<()> {
        use sea_orm::sea_query::Expr;

        let result = ProofEntity::update_many()
            .col_expr(credit_proof::Column::StorageKey, Expr::value(Some(storage_key)))
            .col_expr(
                credit_proof::Column::Data,
                Expr::value(Some(Vec::<u8>::new())),
            )
            .filter(credit_proof::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }
}
