//! Credit claim database entity.

use sea_orm::entity::prelude::*;
use std::str::FromStr;

use crate::domain::{self, ClaimStatus};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "credits")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub credit_type: String,
    pub score: Option<f64>,
    pub status: String,
    pub fields: Json,
    pub reject_reason: Option<String>,
    pub approver_id: Option<Uuid>,
    pub approved_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(has_many = "super::credit_proof::Entity")]
    Proofs,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::credit_proof::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Proofs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for domain::Claim {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            credit_type: model.credit_type,
            score: model.score,
            // Unknown status strings cannot occur through the repository;
            // treat them as pending rather than panicking on read.
            status: ClaimStatus::from_str(&model.status).unwrap_or(ClaimStatus::Pending),
            fields: model.fields,
            reject_reason: model.reject_reason,
            approver_id: model.approver_id,
            approved_at: model.approved_at,
            created_at: model.created_at,
        }
    }
}
