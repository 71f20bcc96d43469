use sea_orm::entity::prelude::*;

/// Course within a career's study plan.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "subjects")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub career_id: i64,
    pub name: String,
    pub classroom_link: String,
    /// Two-month term, used by technical careers
    pub term: Option<i32>,
    /// Place in the study plan
    pub position: i32,
    pub teacher_id: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
