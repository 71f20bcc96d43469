use crate::entities::{
    payment_entity as payments, redemption_entity as redemptions, student_entity as students,
};
use crate::error::{AppError, AppResult};
use crate::ledger::{available_points, validate_redemption};
use crate::models::*;
use crate::services::lookup;
use crate::utils::SharedClock;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};

#[derive(Clone)]
pub struct RedemptionService {
    pool: DatabaseConnection,
    clock: SharedClock,
}

impl RedemptionService {
    pub fn new(pool: DatabaseConnection, clock: SharedClock) -> Self {
        Self { pool, clock }
    }

    /// Spends loyalty points of a student.
    ///
    /// The student row is locked for the duration of the check-then-insert so
    /// concurrent redemptions serialize and cannot overspend. An overspend is
    /// returned to the caller and is never retried here.
    pub async fn create_redemption(
        &self,
        actor: &Actor,
        student_id: i64,
        request: CreateRedemptionRequest,
    ) -> AppResult<RedemptionResponse> {
        let scope = actor.campus_scope()?;
        let txn = self.pool.begin().await?;

        let student = students::Entity::find_by_id(student_id)
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound("Student not found".to_string()))?;
        scope.ensure_visible(student.campus_id, "Student")?;

        let paid = payments::Entity::find()
            .filter(payments::Column::StudentId.eq(student.id))
            .all(&txn)
            .await?;
        let redeemed = redemptions::Entity::find()
            .filter(redemptions::Column::StudentId.eq(student.id))
            .all(&txn)
            .await?;
        let available = available_points(&paid, &redeemed);

        if let Err(err) = validate_redemption(request.points_spent, &request.reason, available) {
            log::info!(
                "Redemption of {} points for student {} rejected: {}",
                request.points_spent,
                student.id,
                err.message
            );
            return Err(err.into());
        }

        let redemption = redemptions::ActiveModel {
            student_id: Set(student.id),
            points_spent: Set(request.points_spent),
            reason: Set(request.reason.trim().to_string()),
            registered_by: Set(Some(actor.user_id)),
            created_at: Set(self.clock.now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        log::info!(
            "Student {} redeemed {} points ({}), registered by {}",
            student.id,
            redemption.points_spent,
            redemption.reason,
            actor.username
        );
        Ok(redemption.into())
    }

    pub async fn list_redemptions(
        &self,
        actor: &Actor,
        student_id: i64,
    ) -> AppResult<Vec<RedemptionResponse>> {
        let scope = actor.campus_scope()?;
        let student = lookup::student_in_scope(&self.pool, &scope, student_id).await?;
        let list = redemptions::Entity::find()
            .filter(redemptions::Column::StudentId.eq(student.id))
            .order_by_desc(redemptions::Column::CreatedAt)
            .all(&self.pool)
            .await?;
        Ok(list.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::CareerKind;
    use crate::ledger::testing::{career, date, payment, redemption, student};
    use crate::ledger::{PaymentContext, PaymentDraft, resolve_and_validate_payment};
    use crate::models::actor::tests::clerk;
    use crate::utils::FixedClock;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn service(db: DatabaseConnection) -> RedemptionService {
        RedemptionService::new(db, Arc::new(FixedClock::on(date(2024, 6, 1))))
    }

    fn request(points_spent: i32) -> CreateRedemptionRequest {
        CreateRedemptionRequest {
            points_spent,
            reason: "Uniform discount".into(),
        }
    }

    /// Technical career, monthly fee 500000, start 2024-03-01: one early and
    /// one late installment leave two points.
    fn technical_payments() -> Vec<payments::Model> {
        let career = career(CareerKind::Technical, 300_000, 500_000);
        let enrolled = student(career.id, Some(date(2024, 3, 1)));
        let ctx = PaymentContext {
            student: Some(&enrolled),
            career: Some(&career),
        };

        [
            (1, date(2024, 4, 1), date(2024, 3, 25)),
            (2, date(2024, 5, 1), date(2024, 5, 10)),
        ]
        .into_iter()
        .map(|(id, due, paid_on)| {
            let draft = PaymentDraft {
                student_id: Some(enrolled.id),
                due_date: Some(due),
                payment_date: Some(paid_on),
                ..Default::default()
            };
            let resolved = resolve_and_validate_payment(&draft, &ctx, paid_on).unwrap();
            let mut stored = payment(id, paid_on);
            stored.due_date = resolved.due_date;
            stored.points = resolved.points;
            stored.has_penalty = resolved.has_penalty;
            stored
        })
        .collect()
    }

    #[test]
    fn test_scenario_payments_score_as_expected() {
        let scored = technical_payments();
        assert_eq!((scored[0].points, scored[0].has_penalty), (2, false));
        assert_eq!((scored[1].points, scored[1].has_penalty), (0, true));
        assert_eq!(available_points(&scored, &[]), 2);
    }

    #[tokio::test]
    async fn test_overspend_is_rejected_then_exact_balance_succeeds() {
        let scored = technical_payments();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // first attempt: 3 points against a balance of 2
            .append_query_results([[student(10, Some(date(2024, 3, 1)))]])
            .append_query_results([scored.clone()])
            .append_query_results([Vec::<redemptions::Model>::new()])
            // second attempt: 2 points
            .append_query_results([[student(10, Some(date(2024, 3, 1)))]])
            .append_query_results([scored.clone()])
            .append_query_results([Vec::<redemptions::Model>::new()])
            .append_query_results([[redemption(1, 2)]])
            .into_connection();
        let svc = service(db);

        match svc.create_redemption(&clerk(1), 1, request(3)).await {
            Err(AppError::InvalidField(err)) => {
                assert_eq!(err.field, "points_spent");
                assert!(err.message.contains("2 available"));
            }
            other => panic!("unexpected result: {other:?}"),
        }

        let created = svc.create_redemption(&clerk(1), 1, request(2)).await.unwrap();
        assert_eq!(created.points_spent, 2);
        assert_eq!(
            available_points(&scored, &[redemption(1, created.points_spent)]),
            0
        );
    }

    #[tokio::test]
    async fn test_blank_reason_is_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[student(10, None)]])
            .append_query_results([technical_payments()])
            .append_query_results([Vec::<redemptions::Model>::new()])
            .into_connection();
        let result = service(db)
            .create_redemption(
                &clerk(1),
                1,
                CreateRedemptionRequest {
                    points_spent: 1,
                    reason: "  ".into(),
                },
            )
            .await;
        match result {
            Err(AppError::InvalidField(err)) => assert_eq!(err.field, "reason"),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
