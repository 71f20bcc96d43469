use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Program kind. Only `Technical` careers carry a late-payment penalty.
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
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "career_kind")]
#[serde(rename_all = "snake_case")]
pub enum CareerKind {
    #[sea_orm(string_value = "technical")]
    Technical,
    #[sea_orm(string_value = "vocational_training")]
    VocationalTraining,
}

impl std::fmt::Display for CareerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CareerKind::Technical => write!(f, "technical"),
            CareerKind::VocationalTraining => write!(f, "vocational_training"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "careers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub kind: CareerKind,
    pub duration_months: i32,
    pub description: String,
    /// One-time enrollment fee, whole currency units
    pub enrollment_fee: i64,
    /// Monthly installment fee, whole currency units
    pub monthly_fee: i64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
