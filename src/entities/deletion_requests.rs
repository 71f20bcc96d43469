use chrono::{DateTime, Utc};
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
    Hash,
    ToSchema,
    DeriveActiveEnum,
    EnumIter,
)]
#[sea_orm(
    rs_type = "String",
    db_type = "Enum",
    enum_name = "deletion_target_kind"
)]
#[serde(rename_all = "snake_case")]
pub enum DeletionTargetKind {
    #[sea_orm(string_value = "student")]
    Student,
    #[sea_orm(string_value = "payment")]
    Payment,
    #[sea_orm(string_value = "expense")]
    Expense,
    #[sea_orm(string_value = "career")]
    Career,
    #[sea_orm(string_value = "staff_member")]
    StaffMember,
}

impl std::fmt::Display for DeletionTargetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeletionTargetKind::Student => write!(f, "student"),
            DeletionTargetKind::Payment => write!(f, "payment"),
            DeletionTargetKind::Expense => write!(f, "expense"),
            DeletionTargetKind::Career => write!(f, "career"),
            DeletionTargetKind::StaffMember => write!(f, "staff_member"),
        }
    }
}

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
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "deletion_status")]
#[serde(rename_all = "snake_case")]
pub enum DeletionStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "approved")]
    Approved,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

impl DeletionStatus {
    /// Pending is the only state that accepts a decision; both outcomes are terminal.
    pub fn can_transition_to(self, next: DeletionStatus) -> bool {
        matches!(
            (self, next),
            (DeletionStatus::Pending, DeletionStatus::Approved)
                | (DeletionStatus::Pending, DeletionStatus::Rejected)
        )
    }

    pub fn is_terminal(self) -> bool {
        self != DeletionStatus::Pending
    }
}

impl std::fmt::Display for DeletionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeletionStatus::Pending => write!(f, "pending"),
            DeletionStatus::Approved => write!(f, "approved"),
            DeletionStatus::Rejected => write!(f, "rejected"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "deletion_requests")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub requested_by: i64,
    pub target_kind: DeletionTargetKind,
    pub target_id: i64,
    pub reason: String,
    pub status: DeletionStatus,
    pub decided_by: Option<i64>,
    pub decided_at: Option<DateTime<Utc>>,
    pub decision_notes: Option<String>,
    /// Display fields of the target captured when the request was made
    pub snapshot: Json,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_can_be_decided() {
        assert!(DeletionStatus::Pending.can_transition_to(DeletionStatus::Approved));
        assert!(DeletionStatus::Pending.can_transition_to(DeletionStatus::Rejected));
    }

    #[test]
    fn test_decided_requests_are_terminal() {
        for from in [DeletionStatus::Approved, DeletionStatus::Rejected] {
            assert!(from.is_terminal());
            assert!(!from.can_transition_to(DeletionStatus::Pending));
            assert!(!from.can_transition_to(DeletionStatus::Approved));
            assert!(!from.can_transition_to(DeletionStatus::Rejected));
        }
        assert!(!DeletionStatus::Pending.can_transition_to(DeletionStatus::Pending));
    }
}
