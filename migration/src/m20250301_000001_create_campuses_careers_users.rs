use sea_orm_migration::prelude::extension::postgres::Type;
use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
pub enum Campuses {
    Table,
    Id,
    Name,
    Address,
    Phone,
    Active,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum Careers {
    Table,
    Id,
    Name,
    Kind,
    DurationMonths,
    Description,
    EnrollmentFee,
    MonthlyFee,
    Active,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum Users {
    Table,
    Id,
    Username,
    PasswordHash,
    FullName,
    IsAdmin,
    CampusId,
    Active,
    LastLoginAt,
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
                    .as_enum(Alias::new("career_kind"))
                    .values(vec![
                        Alias::new("technical"),
                        Alias::new("vocational_training"),
                    ])
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Campuses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Campuses::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Campuses::Name).string_len(200).not_null())
                    .col(ColumnDef::new(Campuses::Address).text().not_null())
                    .col(ColumnDef::new(Campuses::Phone).string_len(20).not_null())
                    .col(
                        ColumnDef::new(Campuses::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Campuses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Careers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Careers::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Careers::Name).string_len(200).not_null())
                    .col(
                        ColumnDef::new(Careers::Kind)
                            .custom(Alias::new("career_kind"))
                            .not_null(),
                    )
                    .col(ColumnDef::new(Careers::DurationMonths).integer().not_null())
                    .col(
                        ColumnDef::new(Careers::Description)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Careers::EnrollmentFee)
                            .big_integer()
                            .not_null()
                            .default(0)
                            .check(Expr::col(Careers::EnrollmentFee).gte(0)),
                    )
                    .col(
                        ColumnDef::new(Careers::MonthlyFee)
                            .big_integer()
                            .not_null()
                            .default(0)
                            .check(Expr::col(Careers::MonthlyFee).gte(0)),
                    )
                    .col(
                        ColumnDef::new(Careers::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Careers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Username)
                            .string_len(150)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::PasswordHash).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Users::FullName)
                            .string_len(200)
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Users::IsAdmin)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Users::CampusId).big_integer().null())
                    .col(
                        ColumnDef::new(Users::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Users::LastLoginAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("NOW()")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_users_campus")
                            .from(Users::Table, Users::CampusId)
                            .to(Campuses::Table, Campuses::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().if_exists().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Careers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().if_exists().table(Campuses::Table).to_owned())
            .await?;
        manager
            .drop_type(Type::drop().name(Alias::new("career_kind")).to_owned())
            .await?;
        Ok(())
    }
}
