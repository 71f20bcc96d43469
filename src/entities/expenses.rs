use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    PartialEq,
    Eq,
    ToSchema,
    DeriveActiveEnum,
    EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "expense_category")]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    #[sea_orm(string_value = "salary")]
    Salary,
    #[sea_orm(string_value = "rent")]
    Rent,
    #[sea_orm(string_value = "utilities")]
    Utilities,
    #[sea_orm(string_value = "supplies")]
    Supplies,
    #[sea_orm(string_value = "maintenance")]
    Maintenance,
    #[sea_orm(string_value = "other")]
    Other,
}

impl std::fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExpenseCategory::Salary => write!(f, "salary"),
            ExpenseCategory::Rent => write!(f, "rent"),
            ExpenseCategory::Utilities => write!(f, "utilities"),
            ExpenseCategory::Supplies => write!(f, "supplies"),
            ExpenseCategory::Maintenance => write!(f, "maintenance"),
            ExpenseCategory::Other => write!(f, "other"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub campus_id: i64,
    pub category: ExpenseCategory,
    pub amount: i64,
    pub expense_date: NaiveDate,
    pub receipt_number: Option<String>,
    /// Only kept for `Salary` expenses
    pub staff_member_id: Option<i64>,
    pub description: Option<String>,
    pub registered_by: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
