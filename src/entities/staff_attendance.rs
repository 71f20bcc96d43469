use chrono::NaiveDate;
use sea_orm::entity::prelude::*;

/// One row per staff member per day, enforced by a unique index.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "staff_attendance")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub staff_member_id: i64,
    pub date: NaiveDate,
    pub present: bool,
    pub notes: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
