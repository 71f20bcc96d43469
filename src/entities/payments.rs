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
    Default,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "payment_method")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    #[sea_orm(string_value = "cash")]
    Cash,
    #[sea_orm(string_value = "transfer")]
    #[serde(alias = "transfer")]
    BankTransfer,
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Cash => write!(f, "cash"),
            PaymentMethod::BankTransfer => write!(f, "transfer"),
        }
    }
}

/// Payment record.
///
/// `points` and `has_penalty` are derived by the ledger before every save and
/// are never written from user input. Exactly one of `student_id` and
/// `client_name` is set.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub campus_id: i64,
    #[sea_orm(unique)]
    pub reference_code: Option<String>,
    pub student_id: Option<i64>,
    pub career_id: Option<i64>,
    pub is_enrollment_fee: bool,
    /// Walk-in payer name, set only when there is no student
    pub client_name: Option<String>,
    pub payment_method: PaymentMethod,
    pub bank_account_id: Option<i64>,
    pub payment_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub valid_until: Option<NaiveDate>,
    pub unit_amount: Option<i64>,
    pub installment_count: i32,
    pub amount_paid: i64,
    /// Comma-joined ascending installment numbers, e.g. "3,4,5"
    pub installment_numbers: Option<String>,
    pub points: i32,
    pub has_penalty: bool,
    pub concept: Option<String>,
    pub notes: Option<String>,
    pub registered_by: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
