use sea_orm_migration::prelude::extension::postgres::Type;
use sea_orm_migration::prelude::*;

use super::m20250301_000001_create_campuses_careers_users::{Campuses, Careers, Users};

#[derive(DeriveIden)]
pub enum Students {
    Table,
    Id,
    CampusId,
    CareerId,
    FirstName,
    LastName,
    NationalId,
    Phone,
    BirthDate,
    StartDate,
    CurrentCourse,
    EmergencyContact,
    Active,
    CreatedAt,
}

#[derive(DeriveIden)]
enum BankAccounts {
    Table,
    Id,
    BankName,
    AccountNumber,
    Holder,
    Active,
}

#[derive(DeriveIden)]
enum Payments {
    Table,
    Id,
    CampusId,
    ReferenceCode,
    StudentId,
    CareerId,
    IsEnrollmentFee,
    ClientName,
    PaymentMethod,
    BankAccountId,
    PaymentDate,
    DueDate,
    ValidUntil,
    UnitAmount,
    InstallmentCount,
    AmountPaid,
    InstallmentNumbers,
    Points,
    HasPenalty,
    Concept,
    Notes,
    RegisteredBy,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Redemptions {
    Table,
    Id,
    StudentId,
    PointsSpent,
    Reason,
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
                    .as_enum(Alias::new("payment_method"))
                    .values(vec![Alias::new("cash"), Alias::new("transfer")])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Students::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Students::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Students::CampusId).big_integer().not_null())
                    .col(ColumnDef::new(Students::CareerId).big_integer().not_null())
                    .col(ColumnDef::new(Students::FirstName).string_len(100).not_null())
                    .col(ColumnDef::new(Students::LastName).string_len(100).not_null())
                    .col(
                        ColumnDef::new(Students::NationalId)
                            .string_len(20)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Students::Phone).string_len(20).not_null())
                    .col(ColumnDef::new(Students::BirthDate).date().null())
                    .col(ColumnDef::new(Students::StartDate).date().null())
                    .col(
                        ColumnDef::new(Students::CurrentCourse)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ColumnDef::new(Students::EmergencyContact).string_len(200).null())
                    .col(
                        ColumnDef::new(Students::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Students::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_students_campus")
                            .from(Students::Table, Students::CampusId)
                            .to(Campuses::Table, Campuses::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_students_career")
                            .from(Students::Table, Students::CareerId)
                            .to(Careers::Table, Careers::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BankAccounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BankAccounts::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BankAccounts::BankName).string_len(100).not_null())
                    .col(
                        ColumnDef::new(BankAccounts::AccountNumber)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(ColumnDef::new(BankAccounts::Holder).string_len(200).not_null())
                    .col(
                        ColumnDef::new(BankAccounts::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Payments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Payments::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Payments::CampusId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Payments::ReferenceCode)
                            .string_len(50)
                            .null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Payments::StudentId).big_integer().null())
                    .col(ColumnDef::new(Payments::CareerId).big_integer().null())
                    .col(
                        ColumnDef::new(Payments::IsEnrollmentFee)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Payments::ClientName).string_len(200).null())
                    .col(
                        ColumnDef::new(Payments::PaymentMethod)
                            .custom(Alias::new("payment_method"))
                            .not_null()
                            .default(Expr::cust("'cash'::payment_method")),
                    )
                    .col(ColumnDef::new(Payments::BankAccountId).big_integer().null())
                    .col(ColumnDef::new(Payments::PaymentDate).date().not_null())
                    .col(ColumnDef::new(Payments::DueDate).date().null())
                    .col(ColumnDef::new(Payments::ValidUntil).date().null())
                    .col(ColumnDef::new(Payments::UnitAmount).big_integer().null())
                    .col(
                        ColumnDef::new(Payments::InstallmentCount)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(Payments::AmountPaid)
                            .big_integer()
                            .not_null()
                            .check(Expr::col(Payments::AmountPaid).gt(0)),
                    )
                    .col(
                        ColumnDef::new(Payments::InstallmentNumbers)
                            .string_len(50)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Payments::Points)
                            .integer()
                            .not_null()
                            .default(0)
                            .check(Expr::col(Payments::Points).between(0, 3)),
                    )
                    .col(
                        ColumnDef::new(Payments::HasPenalty)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Payments::Concept).text().null())
                    .col(ColumnDef::new(Payments::Notes).text().null())
                    .col(ColumnDef::new(Payments::RegisteredBy).big_integer().null())
                    .col(
                        ColumnDef::new(Payments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payments_campus")
                            .from(Payments::Table, Payments::CampusId)
                            .to(Campuses::Table, Campuses::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payments_student")
                            .from(Payments::Table, Payments::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payments_career")
                            .from(Payments::Table, Payments::CareerId)
                            .to(Careers::Table, Careers::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payments_bank_account")
                            .from(Payments::Table, Payments::BankAccountId)
                            .to(BankAccounts::Table, BankAccounts::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payments_registered_by")
                            .from(Payments::Table, Payments::RegisteredBy)
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
                    .name("idx_payments_student_due")
                    .table(Payments::Table)
                    .col(Payments::StudentId)
                    .col(Payments::DueDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_payments_campus_date")
                    .table(Payments::Table)
                    .col(Payments::CampusId)
                    .col(Payments::PaymentDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Redemptions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Redemptions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Redemptions::StudentId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Redemptions::PointsSpent)
                            .integer()
                            .not_null()
                            .check(Expr::col(Redemptions::PointsSpent).gt(0)),
                    )
                    .col(ColumnDef::new(Redemptions::Reason).text().not_null())
                    .col(ColumnDef::new(Redemptions::RegisteredBy).big_integer().null())
                    .col(
                        ColumnDef::new(Redemptions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_redemptions_student")
                            .from(Redemptions::Table, Redemptions::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_redemptions_registered_by")
                            .from(Redemptions::Table, Redemptions::RegisteredBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(Redemptions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Payments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(BankAccounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Students::Table).to_owned())
            .await?;
        manager
            .drop_type(Type::drop().name(Alias::new("payment_method")).to_owned())
            .await?;
        Ok(())
    }
}
