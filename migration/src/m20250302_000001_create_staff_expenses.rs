use sea_orm_migration::prelude::extension::postgres::Type;
use sea_orm_migration::prelude::*;

use super::m20250301_000001_create_campuses_careers_users::{Campuses, Users};

#[derive(DeriveIden)]
pub enum StaffMembers {
    Table,
    Id,
    CampusId,
    FirstName,
    LastName,
    NationalId,
    Role,
    Phone,
    HiredOn,
    Active,
}

#[derive(DeriveIden)]
enum StaffAttendance {
    Table,
    Id,
    StaffMemberId,
    Date,
    Present,
    Notes,
}

#[derive(DeriveIden)]
enum Expenses {
    Table,
    Id,
    CampusId,
    Category,
    Amount,
    ExpenseDate,
    ReceiptNumber,
    StaffMemberId,
    Description,
    RegisteredBy,
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
                    .as_enum(Alias::new("staff_role"))
                    .values(vec![
                        Alias::new("teaching"),
                        Alias::new("administrative"),
                        Alias::new("management"),
                        Alias::new("other"),
                    ])
                    .to_owned(),
            )
            .await?;
        manager
            .create_type(
                Type::create()
                    .as_enum(Alias::new("expense_category"))
                    .values(vec![
                        Alias::new("salary"),
                        Alias::new("rent"),
                        Alias::new("utilities"),
                        Alias::new("supplies"),
                        Alias::new("maintenance"),
                        Alias::new("other"),
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(StaffMembers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StaffMembers::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(StaffMembers::CampusId).big_integer().not_null())
                    .col(ColumnDef::new(StaffMembers::FirstName).string_len(100).not_null())
                    .col(ColumnDef::new(StaffMembers::LastName).string_len(100).not_null())
                    .col(
                        ColumnDef::new(StaffMembers::NationalId)
                            .string_len(20)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(StaffMembers::Role)
                            .custom(Alias::new("staff_role"))
                            .not_null(),
                    )
                    .col(ColumnDef::new(StaffMembers::Phone).string_len(20).not_null())
                    .col(ColumnDef::new(StaffMembers::HiredOn).date().not_null())
                    .col(
                        ColumnDef::new(StaffMembers::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_staff_members_campus")
                            .from(StaffMembers::Table, StaffMembers::CampusId)
                            .to(Campuses::Table, Campuses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(StaffAttendance::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(StaffAttendance::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(StaffAttendance::StaffMemberId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(StaffAttendance::Date).date().not_null())
                    .col(
                        ColumnDef::new(StaffAttendance::Present)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(StaffAttendance::Notes)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_staff_attendance_member")
                            .from(StaffAttendance::Table, StaffAttendance::StaffMemberId)
                            .to(StaffMembers::Table, StaffMembers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_staff_attendance_member_date")
                    .table(StaffAttendance::Table)
                    .col(StaffAttendance::StaffMemberId)
                    .col(StaffAttendance::Date)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Expenses::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Expenses::CampusId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Expenses::Category)
                            .custom(Alias::new("expense_category"))
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Expenses::Amount)
                            .big_integer()
                            .not_null()
                            .check(Expr::col(Expenses::Amount).gte(0)),
                    )
                    .col(ColumnDef::new(Expenses::ExpenseDate).date().not_null())
                    .col(ColumnDef::new(Expenses::ReceiptNumber).string_len(50).null())
                    .col(ColumnDef::new(Expenses::StaffMemberId).big_integer().null())
                    .col(ColumnDef::new(Expenses::Description).text().null())
                    .col(ColumnDef::new(Expenses::RegisteredBy).big_integer().null())
                    .col(
                        ColumnDef::new(Expenses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_expenses_campus")
                            .from(Expenses::Table, Expenses::CampusId)
                            .to(Campuses::Table, Campuses::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_expenses_staff_member")
                            .from(Expenses::Table, Expenses::StaffMemberId)
                            .to(StaffMembers::Table, StaffMembers::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_expenses_registered_by")
                            .from(Expenses::Table, Expenses::RegisteredBy)
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
                    .name("idx_expenses_campus_date")
                    .table(Expenses::Table)
                    .col(Expenses::CampusId)
                    .col(Expenses::ExpenseDate)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(Expenses::Table).to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .if_exists()
                    .table(StaffAttendance::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(StaffMembers::Table).to_owned())
            .await?;
        manager
            .drop_type(Type::drop().name(Alias::new("expense_category")).to_owned())
            .await?;
        manager
            .drop_type(Type::drop().name(Alias::new("staff_role")).to_owned())
            .await?;
        Ok(())
    }
}
