use crate::entities::{
    CareerKind, DeletionStatus, DeletionTargetKind, ExpenseCategory, StaffRole,
    deletion_request_entity,
};
use crate::error::AppResult;
use crate::models::PaginationParams;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Record a deletion refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum DeletionTarget {
    Student(i64),
    Payment(i64),
    Expense(i64),
    Career(i64),
    StaffMember(i64),
}

impl DeletionTarget {
    pub fn from_parts(kind: DeletionTargetKind, id: i64) -> Self {
        match kind {
            DeletionTargetKind::Student => DeletionTarget::Student(id),
            DeletionTargetKind::Payment => DeletionTarget::Payment(id),
            DeletionTargetKind::Expense => DeletionTarget::Expense(id),
            DeletionTargetKind::Career => DeletionTarget::Career(id),
            DeletionTargetKind::StaffMember => DeletionTarget::StaffMember(id),
        }
    }

    pub fn kind(&self) -> DeletionTargetKind {
        match self {
            DeletionTarget::Student(_) => DeletionTargetKind::Student,
            DeletionTarget::Payment(_) => DeletionTargetKind::Payment,
            DeletionTarget::Expense(_) => DeletionTargetKind::Expense,
            DeletionTarget::Career(_) => DeletionTargetKind::Career,
            DeletionTarget::StaffMember(_) => DeletionTargetKind::StaffMember,
        }
    }

    pub fn id(&self) -> i64 {
        match *self {
            DeletionTarget::Student(id)
            | DeletionTarget::Payment(id)
            | DeletionTarget::Expense(id)
            | DeletionTarget::Career(id)
            | DeletionTarget::StaffMember(id) => id,
        }
    }
}

impl std::fmt::Display for DeletionTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} #{}", self.kind(), self.id())
    }
}

/// Display copy of the target taken when the request is filed, so reviewers
/// can see what they are approving even after the row changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DeletionSnapshot {
    Student {
        full_name: String,
        national_id: String,
        campus_id: i64,
        career_id: i64,
    },
    Payment {
        reference_code: Option<String>,
        payer_name: String,
        amount_paid: i64,
        payment_date: NaiveDate,
        campus_id: i64,
    },
    Expense {
        category: ExpenseCategory,
        amount: i64,
        expense_date: NaiveDate,
        campus_id: i64,
    },
    Career {
        name: String,
        career_kind: CareerKind,
    },
    StaffMember {
        full_name: String,
        national_id: String,
        role: StaffRole,
        campus_id: i64,
    },
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct DeleteRequest {
    /// Mandatory unless the caller is an administrator
    pub reason: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct DecisionRequest {
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeletionRequestQuery {
    pub status: Option<DeletionStatus>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

impl DeletionRequestQuery {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams::new(self.page, self.page_size)
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeletionRequestResponse {
    pub id: i64,
    pub requested_by: i64,
    pub target: DeletionTarget,
    pub reason: String,
    pub status: DeletionStatus,
    pub decided_by: Option<i64>,
    pub decided_at: Option<DateTime<Utc>>,
    pub decision_notes: Option<String>,
    pub snapshot: DeletionSnapshot,
    pub created_at: DateTime<Utc>,
}

impl DeletionRequestResponse {
    pub fn from_model(m: deletion_request_entity::Model) -> AppResult<Self> {
        let snapshot: DeletionSnapshot = serde_json::from_value(m.snapshot)?;
        Ok(Self {
            id: m.id,
            requested_by: m.requested_by,
            target: DeletionTarget::from_parts(m.target_kind, m.target_id),
            reason: m.reason,
            status: m.status,
            decided_by: m.decided_by,
            decided_at: m.decided_at,
            decision_notes: m.decision_notes,
            snapshot,
            created_at: m.created_at,
        })
    }
}

/// Result of a delete call: administrators delete at once, everyone else
/// files a request.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DeletionOutcome {
    Deleted { target: DeletionTarget },
    Requested { request: DeletionRequestResponse },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_round_trips_through_parts() {
        let target = DeletionTarget::StaffMember(12);
        assert_eq!(
            DeletionTarget::from_parts(target.kind(), target.id()),
            target
        );
        assert_eq!(target.to_string(), "staff_member #12");
    }

    #[test]
    fn test_snapshot_is_tagged_by_kind() {
        let snapshot = DeletionSnapshot::Career {
            name: "Cosmetología".into(),
            career_kind: CareerKind::VocationalTraining,
        };
        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["kind"], "career");
        assert_eq!(value["career_kind"], "vocational_training");
        assert_eq!(
            serde_json::from_value::<DeletionSnapshot>(value).unwrap(),
            snapshot
        );
    }
}
