//! Migration: Create the core platform tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::Name).string().not_null())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::Role).string().not_null())
                    .col(ColumnDef::new(Users::Class).string().null())
                    .col(ColumnDef::new(Users::Grade).string().null())
                    .col(ColumnDef::new(Users::Major).string().null())
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Users::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AppConfigs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AppConfigs::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AppConfigs::Category).string().not_null())
                    .col(ColumnDef::new(AppConfigs::ConfigKey).string().not_null())
                    .col(ColumnDef::new(AppConfigs::Value).json_binary().not_null())
                    .col(
                        ColumnDef::new(AppConfigs::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(AppConfigs::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // (category, config_key) is the row identity for upserts
        manager
            .create_index(
                Index::create()
                    .name("idx_app_configs_category_key")
                    .table(AppConfigs::Table)
                    .col(AppConfigs::Category)
                    .col(AppConfigs::ConfigKey)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Credits::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Credits::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Credits::UserId).uuid().not_null())
                    .col(ColumnDef::new(Credits::CreditType).string().not_null())
                    .col(ColumnDef::new(Credits::Score).double().null())
                    .col(ColumnDef::new(Credits::Status).string().not_null())
                    .col(ColumnDef::new(Credits::Fields).json_binary().not_null())
                    .col(ColumnDef::new(Credits::RejectReason).string().null())
                    .col(ColumnDef::new(Credits::ApproverId).uuid().null())
                    .col(
                        ColumnDef::new(Credits::ApprovedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Credits::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_credits_user")
                            .from(Credits::Table, Credits::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_credits_status")
                    .table(Credits::Table)
                    .col(Credits::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_credits_user_id")
                    .table(Credits::Table)
                    .col(Credits::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CreditProofs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CreditProofs::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CreditProofs::CreditId).uuid().not_null())
                    .col(ColumnDef::new(CreditProofs::Filename).string().not_null())
                    .col(ColumnDef::new(CreditProofs::MimeType).string().not_null())
                    .col(ColumnDef::new(CreditProofs::Data).binary().null())
                    .col(ColumnDef::new(CreditProofs::StorageKey).string().null())
                    .col(
                        ColumnDef::new(CreditProofs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_credit_proofs_credit")
                            .from(CreditProofs::Table, CreditProofs::CreditId)
                            .to(Credits::Table, Credits::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Grades::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Grades::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Grades::Name).string().not_null().unique_key())
                    .col(
                        ColumnDef::new(Grades::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Majors::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Majors::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Majors::Name).string().not_null().unique_key())
                    .col(
                        ColumnDef::new(Majors::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Classes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Classes::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Classes::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Classes::Grade).string().not_null())
                    .col(ColumnDef::new(Classes::Major).string().not_null())
                    .col(
                        ColumnDef::new(Classes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Notices::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Notices::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Notices::Title).string().not_null())
                    .col(ColumnDef::new(Notices::Body).text().not_null())
                    .col(ColumnDef::new(Notices::AuthorId).uuid().not_null())
                    .col(
                        ColumnDef::new(Notices::PublishedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Notices::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Classes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Majors::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Grades::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CreditProofs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Credits::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AppConfigs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Username,
    Name,
    PasswordHash,
    Role,
    Class,
    Grade,
    Major,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum AppConfigs {
    Table,
    Id,
    Category,
    ConfigKey,
    Value,
    IsActive,
    UpdatedAt,
}

#[derive(Iden)]
enum Credits {
    Table,
    Id,
    UserId,
    CreditType,
    Score,
    Status,
    Fields,
    RejectReason,
    ApproverId,
    ApprovedAt,
    CreatedAt,
}

#[derive(Iden)]
enum CreditProofs {
    Table,
    Id,
    CreditId,
    Filename,
    MimeType,
    Data,
    StorageKey,
    CreatedAt,
}

#[derive(Iden)]
enum Grades {
    Table,
    Id,
    Name,
    CreatedAt,
}

#[derive(Iden)]
enum Majors {
    Table,
    Id,
    Name,
    CreatedAt,
}

#[derive(Iden)]
enum Classes {
    Table,
    Id,
    Name,
    Grade,
    Major,
    CreatedAt,
}

#[derive(Iden)]
enum Notices {
    Table,
    Id,
    Title,
    Body,
    AuthorId,
    PublishedAt,
}
