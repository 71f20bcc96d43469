//! Deletion-approval workflow.
//!
//! Administrators delete records directly. Everyone else files a request that
//! an administrator approves or rejects; approval deletes the target in the
//! same transaction that marks the request approved.

use crate::entities::{
    DeletionStatus, career_entity as careers, deletion_request_entity as requests,
    expense_entity as expenses, payment_entity as payments, staff_member_entity as staff,
    student_entity as students,
};
use crate::error::{AppError, AppResult, ValidationError};
use crate::models::*;
use crate::services::lookup;
use crate::services::payment_service::student_names;
use crate::utils::SharedClock;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DeleteResult, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

#[derive(Clone)]
pub struct DeletionRequestService {
    pool: DatabaseConnection,
    clock: SharedClock,
}

impl DeletionRequestService {
    pub fn new(pool: DatabaseConnection, clock: SharedClock) -> Self {
        Self { pool, clock }
    }

    pub async fn delete_or_request(
        &self,
        actor: &Actor,
        target: DeletionTarget,
        request: DeleteRequest,
    ) -> AppResult<DeletionOutcome> {
        let scope = actor.campus_scope()?;
        let snapshot = snapshot_of(&self.pool, &scope, target).await?;

        if actor.is_admin {
            let txn = self.pool.begin().await?;
            delete_target(&txn, target).await?;
            txn.commit().await?;
            log::info!("{target} deleted directly by {}", actor.username);
            return Ok(DeletionOutcome::Deleted { target });
        }

        let reason = request
            .reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .ok_or_else(|| ValidationError::new("reason", "a reason is required"))?
            .to_string();

        let pending = requests::Entity::find()
            .filter(requests::Column::TargetKind.eq(target.kind()))
            .filter(requests::Column::TargetId.eq(target.id()))
            .filter(requests::Column::Status.eq(DeletionStatus::Pending))
            .one(&self.pool)
            .await?;
        if pending.is_some() {
            return Err(AppError::Conflict(format!(
                "a deletion request for {target} is already pending"
            )));
        }

        let created = requests::ActiveModel {
            requested_by: Set(actor.user_id),
            target_kind: Set(target.kind()),
            target_id: Set(target.id()),
            reason: Set(reason),
            status: Set(DeletionStatus::Pending),
            decided_by: Set(None),
            decided_at: Set(None),
            decision_notes: Set(None),
            snapshot: Set(serde_json::to_value(&snapshot)?),
            created_at: Set(self.clock.now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!(
            "Deletion request {} for {target} filed by {}",
            created.id,
            actor.username
        );
        Ok(DeletionOutcome::Requested {
            request: DeletionRequestResponse::from_model(created)?,
        })
    }

    /// Deletes the target and marks the request approved atomically. When the
    /// deletion fails nothing is written and the request stays pending.
    pub async fn approve(
        &self,
        actor: &Actor,
        id: i64,
        request: DecisionRequest,
    ) -> AppResult<DeletionRequestResponse> {
        actor.require_admin()?;
        let txn = self.pool.begin().await?;
        let pending = pending_for_decision(&txn, id, DeletionStatus::Approved).await?;
        let target = DeletionTarget::from_parts(pending.target_kind, pending.target_id);

        if let Err(err) = delete_target(&txn, target).await {
            txn.rollback().await?;
            log::warn!("Approval of deletion request {id} rolled back: {err}");
            return Err(err);
        }

        let mut am = pending.into_active_model();
        am.status = Set(DeletionStatus::Approved);
        am.decided_by = Set(Some(actor.user_id));
        am.decided_at = Set(Some(self.clock.now()));
        am.decision_notes = Set(notes(request));
        let approved = am.update(&txn).await?;
        txn.commit().await?;

        log::info!(
            "Deletion request {id} approved by {}; {target} deleted",
            actor.username
        );
        DeletionRequestResponse::from_model(approved)
    }

    pub async fn reject(
        &self,
        actor: &Actor,
        id: i64,
        request: DecisionRequest,
    ) -> AppResult<DeletionRequestResponse> {
        actor.require_admin()?;
        let pending = pending_for_decision(&self.pool, id, DeletionStatus::Rejected).await?;

        let mut am = pending.into_active_model();
        am.status = Set(DeletionStatus::Rejected);
        am.decided_by = Set(Some(actor.user_id));
        am.decided_at = Set(Some(self.clock.now()));
        am.decision_notes = Set(notes(request));
        let rejected = am.update(&self.pool).await?;

        log::info!("Deletion request {id} rejected by {}", actor.username);
        DeletionRequestResponse::from_model(rejected)
    }

    /// Administrators see every request; other users only their own.
    pub async fn list_requests(
        &self,
        actor: &Actor,
        query: DeletionRequestQuery,
    ) -> AppResult<PaginatedResponse<DeletionRequestResponse>> {
        let params = query.pagination();
        let mut base_query = requests::Entity::find()
            .order_by_desc(requests::Column::CreatedAt)
            .order_by_desc(requests::Column::Id);
        if !actor.is_admin {
            base_query = base_query.filter(requests::Column::RequestedBy.eq(actor.user_id));
        }
        if let Some(status) = query.status {
            base_query = base_query.filter(requests::Column::Status.eq(status));
        }

        let total = base_query.clone().count(&self.pool).await?;
        let rows = base_query
            .limit(params.page_size())
            .offset(params.page_index() * params.page_size())
            .all(&self.pool)
            .await?;
        let data = rows
            .into_iter()
            .map(DeletionRequestResponse::from_model)
            .collect::<AppResult<Vec<_>>>()?;
        Ok(PaginatedResponse::new(data, &params, total))
    }

    pub async fn get_request(&self, actor: &Actor, id: i64) -> AppResult<DeletionRequestResponse> {
        let found = requests::Entity::find_by_id(id)
            .one(&self.pool)
            .await?
            .filter(|r| actor.is_admin || r.requested_by == actor.user_id)
            .ok_or_else(|| AppError::NotFound("Deletion request not found".to_string()))?;
        DeletionRequestResponse::from_model(found)
    }
}

async fn pending_for_decision<C: ConnectionTrait>(
    conn: &C,
    id: i64,
    next: DeletionStatus,
) -> AppResult<requests::Model> {
    let found = requests::Entity::find_by_id(id)
        .lock_exclusive()
        .one(conn)
        .await?
        .ok_or_else(|| AppError::NotFound("Deletion request not found".to_string()))?;
    if !found.status.can_transition_to(next) {
        return Err(AppError::Conflict(format!(
            "deletion request {id} was already {}",
            found.status
        )));
    }
    Ok(found)
}

fn notes(request: DecisionRequest) -> Option<String> {
    request
        .notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
}

/// Loads the target inside the actor's scope and captures its display fields.
async fn snapshot_of<C: ConnectionTrait>(
    conn: &C,
    scope: &CampusScope,
    target: DeletionTarget,
) -> AppResult<DeletionSnapshot> {
    Ok(match target {
        DeletionTarget::Student(id) => {
            let s = lookup::student_in_scope(conn, scope, id).await?;
            DeletionSnapshot::Student {
                full_name: s.full_name(),
                national_id: s.national_id,
                campus_id: s.campus_id,
                career_id: s.career_id,
            }
        }
        DeletionTarget::Payment(id) => {
            let p = lookup::payment_in_scope(conn, scope, id).await?;
            let names = student_names(conn, std::slice::from_ref(&p)).await?;
            let payer_name = p
                .client_name
                .clone()
                .or_else(|| p.student_id.and_then(|sid| names.get(&sid).cloned()))
                .unwrap_or_default();
            DeletionSnapshot::Payment {
                reference_code: p.reference_code,
                payer_name,
                amount_paid: p.amount_paid,
                payment_date: p.payment_date,
                campus_id: p.campus_id,
            }
        }
        DeletionTarget::Expense(id) => {
            let e = lookup::expense_in_scope(conn, scope, id).await?;
            DeletionSnapshot::Expense {
                category: e.category,
                amount: e.amount,
                expense_date: e.expense_date,
                campus_id: e.campus_id,
            }
        }
        DeletionTarget::Career(id) => {
            let c = lookup::career_by_id(conn, id).await?;
            DeletionSnapshot::Career {
                name: c.name,
                career_kind: c.kind,
            }
        }
        DeletionTarget::StaffMember(id) => {
            let m = lookup::staff_member_in_scope(conn, scope, id).await?;
            DeletionSnapshot::StaffMember {
                full_name: m.full_name(),
                national_id: m.national_id,
                role: m.role,
                campus_id: m.campus_id,
            }
        }
    })
}

/// Careers with enrolled students are never removed.
async fn delete_target<C: ConnectionTrait>(conn: &C, target: DeletionTarget) -> AppResult<()> {
    let result: DeleteResult = match target {
        DeletionTarget::Student(id) => students::Entity::delete_by_id(id).exec(conn).await?,
        DeletionTarget::Payment(id) => payments::Entity::delete_by_id(id).exec(conn).await?,
        DeletionTarget::Expense(id) => expenses::Entity::delete_by_id(id).exec(conn).await?,
        DeletionTarget::StaffMember(id) => staff::Entity::delete_by_id(id).exec(conn).await?,
        DeletionTarget::Career(id) => {
            let enrolled = students::Entity::find()
                .filter(students::Column::CareerId.eq(id))
                .count(conn)
                .await?;
            if enrolled > 0 {
                return Err(AppError::Conflict(format!(
                    "career has {enrolled} enrolled students and cannot be deleted"
                )));
            }
            careers::Entity::delete_by_id(id).exec(conn).await?
        }
    };
    if result.rows_affected == 0 {
        return Err(AppError::NotFound(format!("{target} no longer exists")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::CareerKind;
    use crate::ledger::testing::{career, date, payment};
    use crate::models::actor::tests::{admin, clerk};
    use crate::utils::FixedClock;
    use chrono::{TimeZone, Utc};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn service(db: DatabaseConnection) -> DeletionRequestService {
        DeletionRequestService::new(db, Arc::new(FixedClock::on(date(2024, 6, 1))))
    }

    fn stored_request(status: DeletionStatus, target: DeletionTarget) -> requests::Model {
        let snapshot = DeletionSnapshot::Career {
            name: "Enfermería".into(),
            career_kind: CareerKind::Technical,
        };
        requests::Model {
            id: 8,
            requested_by: 2,
            target_kind: target.kind(),
            target_id: target.id(),
            reason: "Duplicated by mistake".into(),
            status,
            decided_by: None,
            decided_at: None,
            decision_notes: None,
            snapshot: serde_json::to_value(snapshot).unwrap(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 30, 8, 0, 0).unwrap(),
        }
    }

    fn count(value: i64) -> BTreeMap<&'static str, sea_orm::Value> {
        BTreeMap::from([("num_items", sea_orm::Value::BigInt(Some(value)))])
    }

    #[tokio::test]
    async fn test_staff_request_requires_reason() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[payment(3, date(2024, 5, 2))]])
            .append_query_results([[crate::ledger::testing::student(10, None)]])
            .into_connection();
        let result = service(db)
            .delete_or_request(&clerk(1), DeletionTarget::Payment(3), DeleteRequest::default())
            .await;
        match result {
            Err(AppError::InvalidField(err)) => assert_eq!(err.field, "reason"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_staff_request_is_filed_as_pending() {
        let target = DeletionTarget::Career(10);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[career(CareerKind::Technical, 300_000, 500_000)]])
            .append_query_results([Vec::<requests::Model>::new()])
            .append_query_results([[stored_request(DeletionStatus::Pending, target)]])
            .into_connection();
        let outcome = service(db)
            .delete_or_request(
                &clerk(1),
                target,
                DeleteRequest {
                    reason: Some("Duplicated by mistake".into()),
                },
            )
            .await
            .unwrap();
        match outcome {
            DeletionOutcome::Requested { request } => {
                assert_eq!(request.status, DeletionStatus::Pending);
                assert_eq!(request.target, target);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_second_pending_request_conflicts() {
        let target = DeletionTarget::Career(10);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[career(CareerKind::Technical, 300_000, 500_000)]])
            .append_query_results([[stored_request(DeletionStatus::Pending, target)]])
            .into_connection();
        let result = service(db)
            .delete_or_request(
                &clerk(1),
                target,
                DeleteRequest {
                    reason: Some("again".into()),
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_admin_deletes_directly() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[payment(3, date(2024, 5, 2))]])
            .append_query_results([[crate::ledger::testing::student(10, None)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();
        let outcome = service(db)
            .delete_or_request(&admin(), DeletionTarget::Payment(3), DeleteRequest::default())
            .await
            .unwrap();
        assert!(matches!(
            outcome,
            DeletionOutcome::Deleted {
                target: DeletionTarget::Payment(3)
            }
        ));
    }

    #[tokio::test]
    async fn test_failed_approval_leaves_request_pending() {
        let target = DeletionTarget::Career(10);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[stored_request(DeletionStatus::Pending, target)]])
            .append_query_results([[count(4)]])
            .into_connection();
        let log_handle = db.clone();
        let result = service(db)
            .approve(&admin(), 8, DecisionRequest::default())
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));

        // the request was never written as approved
        let statements = format!("{:?}", log_handle.into_transaction_log());
        assert!(!statements.contains("approved"));
    }

    #[tokio::test]
    async fn test_approval_deletes_target_and_records_decision() {
        let target = DeletionTarget::Payment(3);
        let mut approved = stored_request(DeletionStatus::Approved, target);
        approved.decided_by = Some(1);
        approved.decided_at = Some(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
        approved.decision_notes = Some("Confirmed with the cashier".into());
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[stored_request(DeletionStatus::Pending, target)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .append_query_results([[approved]])
            .into_connection();
        let log_handle = db.clone();
        let response = service(db)
            .approve(
                &admin(),
                8,
                DecisionRequest {
                    notes: Some("  Confirmed with the cashier ".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(response.status, DeletionStatus::Approved);
        assert_eq!(response.decided_by, Some(1));
        assert!(response.decided_at.is_some());

        let statements = format!("{:?}", log_handle.into_transaction_log());
        assert!(statements.contains(r#"DELETE FROM \"payments\""#));
        assert!(statements.contains(r#"UPDATE \"deletion_requests\""#));
        assert!(statements.contains("approved"));
        assert!(statements.contains("decided_by"));
        assert!(statements.contains("2024-06-01"));
        assert!(statements.contains(r#"String(Some("Confirmed with the cashier"))"#));
    }

    #[tokio::test]
    async fn test_decided_request_cannot_be_decided_again() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[stored_request(
                DeletionStatus::Rejected,
                DeletionTarget::Student(1),
            )]])
            .into_connection();
        let result = service(db)
            .reject(&admin(), 8, DecisionRequest::default())
            .await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_only_admins_decide() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let result = service(db)
            .approve(&clerk(1), 8, DecisionRequest::default())
            .await;
        assert!(matches!(result, Err(AppError::PermissionDenied)));
    }
}
