use sea_orm_migration::prelude::*;

use super::m20250301_000001_create_campuses_careers_users::Careers;
use super::m20250302_000001_create_staff_expenses::StaffMembers;

#[derive(DeriveIden)]
enum Subjects {
    Table,
    Id,
    CareerId,
    Name,
    ClassroomLink,
    Term,
    Position,
    TeacherId,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Subjects::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Subjects::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Subjects::CareerId).big_integer().not_null())
                    .col(ColumnDef::new(Subjects::Name).string_len(200).not_null())
                    .col(
                        ColumnDef::new(Subjects::ClassroomLink)
                            .string_len(500)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Subjects::Term)
                            .integer()
                            .null()
                            .check(Expr::col(Subjects::Term).gte(1)),
                    )
                    .col(
                        ColumnDef::new(Subjects::Position)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Subjects::TeacherId).big_integer().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_subjects_career")
                            .from(Subjects::Table, Subjects::CareerId)
                            .to(Careers::Table, Careers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_subjects_teacher")
                            .from(Subjects::Table, Subjects::TeacherId)
                            .to(StaffMembers::Table, StaffMembers::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_subjects_career_position")
                    .table(Subjects::Table)
                    .col(Subjects::CareerId)
                    .col(Subjects::Position)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(Subjects::Table).to_owned())
            .await
    }
}
