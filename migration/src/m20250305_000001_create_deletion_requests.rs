use sea_orm_migration::prelude::extension::postgres::Type;
use sea_orm_migration::prelude::*;

use super::m20250301_000001_create_campuses_careers_users::Users;

#[derive(DeriveIden)]
enum DeletionRequests {
    Table,
    Id,
    RequestedBy,
    TargetKind,
    TargetId,
    Reason,
    Status,
    DecidedBy,
    DecidedAt,
    DecisionNotes,
    Snapshot,
    CreatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("deletion_target_kind"))
                    .values(vec![
                        Alias::new("student"),
                        Alias::new("payment"),
                        Alias::new("expense"),
                        Alias::new("career"),
                        Alias::new("staff_member"),
                    ])
                    .to_owned(),
            )
            .await?;
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("deletion_status"))
                    .values(vec![
                        Alias::new("pending"),
                        Alias::new("approved"),
                        Alias::new("rejected"),
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DeletionRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DeletionRequests::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DeletionRequests::RequestedBy)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DeletionRequests::TargetKind)
                            .custom(Alias::new("deletion_target_kind"))
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(DeletionRequests::TargetId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(DeletionRequests::Reason).text().not_null())
                    .col(
                        ColumnDef::new(DeletionRequests::Status)
                            .custom(Alias::new("deletion_status"))
                            .not_null()
                            .default(Expr::cust("'pending'::deletion_status")),
                    )
                    .col(ColumnDef::new(DeletionRequests::DecidedBy).big_integer().null())
                    .col(
                        ColumnDef::new(DeletionRequests::DecidedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(DeletionRequests::DecisionNotes).text().null())
                    .col(ColumnDef::new(DeletionRequests::Snapshot).json_binary().not_null())
                    .col(
                        ColumnDef::new(DeletionRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_deletion_requests_requested_by")
                            .from(DeletionRequests::Table, DeletionRequests::RequestedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_deletion_requests_decided_by")
                            .from(DeletionRequests::Table, DeletionRequests::DecidedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_deletion_requests_target")
                    .table(DeletionRequests::Table)
                    .col(DeletionRequests::TargetKind)
                    .col(DeletionRequests::TargetId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(DeletionRequests::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_type(Type::drop().name(Alias::new("deletion_status")).to_owned())
            .await?;
        manager
            .drop_type(
                Type::drop()
                    .name(Alias::new("deletion_target_kind"))
                    .to_owned(),
            )
            .await?;
        Ok(())
    }
}
