//! Credit proof database entity.
//!
//! `data` holds legacy inline bytes; migrated rows carry a `storage_key`
//! and an emptied `data` column.

use sea_orm::entity::prelude::*;

use crate::domain;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "credit_proofs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub credit_id: Uuid,
    pub filename: String,
    pub mime_type: String,
    pub data: Option<Vec<u8>>,
    pub storage_key: Option<String>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::credit::Entity",
        from = "Column::CreditId",
        to = "super::credit::Column::Id"
    )]
    Credit,
}

impl Related<super::credit::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Credit.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for domain::Proof {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            credit_id: model.credit_id,
            filename: model.filename,
            mime_type: model.mime_type,
            data: model.data,
            storage_key: model.storage_key,
            created_at: model.created_at,
        }
    }
}
