use crate::entities::{
    PaymentMethod, career_entity as careers, payment_entity as payments,
    student_entity as students,
};
use crate::error::{AppError, AppResult, ValidationError};
use crate::ledger::{
    PaymentContext, PaymentDraft, ResolvedPayment, draft_from_stored, effective_career_id,
    loyalty_inputs_changed, resolve_and_validate_payment,
};
use crate::models::*;
use crate::services::lookup;
use crate::utils::{SharedClock, next_receipt_number};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
    TransactionTrait,
};
use std::collections::HashMap;

/// Generated receipt numbers are retried this many times on collision.
const RECEIPT_RETRIES: usize = 1;

/// Digits only, short enough to fit a BIGINT.
const NUMERIC_REFERENCE_CODE: &str = r#""payments"."reference_code" ~ '^[0-9]{1,18}$'"#;
const REFERENCE_CODE_VALUE: &str = r#"CAST("payments"."reference_code" AS BIGINT)"#;

#[derive(Clone)]
pub struct PaymentService {
    pool: DatabaseConnection,
    clock: SharedClock,
    receipt_number_width: usize,
}

/// Records loaded for a draft before it is resolved.
struct LoadedContext {
    student: Option<students::Model>,
    career: Option<careers::Model>,
}

impl PaymentService {
    pub fn new(pool: DatabaseConnection, clock: SharedClock, receipt_number_width: usize) -> Self {
        Self {
            pool,
            clock,
            receipt_number_width,
        }
    }

    pub async fn create_payment(
        &self,
        actor: &Actor,
        request: CreatePaymentRequest,
    ) -> AppResult<PaymentResponse> {
        let scope = actor.campus_scope()?;
        let requested_campus = request.campus_id;
        let draft = request.into_draft();

        let loaded = self.load_context(&scope, &draft).await?;
        let campus_id = match &loaded.student {
            Some(student) => {
                if requested_campus.is_some_and(|c| c != student.campus_id) {
                    return Err(ValidationError::new(
                        "campus_id",
                        "payment campus must match the student's campus",
                    )
                    .into());
                }
                student.campus_id
            }
            None => scope.campus_for_write(requested_campus)?,
        };

        let ctx = PaymentContext {
            student: loaded.student.as_ref(),
            career: loaded.career.as_ref(),
        };
        let resolved = resolve_and_validate_payment(&draft, &ctx, self.clock.today())?;

        let payment = self.insert_numbered(actor, campus_id, &resolved).await?;
        log::info!(
            "Payment {} registered at campus {} by {}: amount {}, points {}, penalty {}",
            payment.reference_code.as_deref().unwrap_or("-"),
            payment.campus_id,
            actor.username,
            payment.amount_paid,
            payment.points,
            payment.has_penalty
        );
        Ok(PaymentResponse::new(
            payment,
            loaded.student.map(|s| s.full_name()),
        ))
    }

    /// Merges `request` over the stored payment and re-resolves it. Points and
    /// penalty are recomputed only when their inputs changed.
    pub async fn update_payment(
        &self,
        actor: &Actor,
        id: i64,
        request: UpdatePaymentRequest,
    ) -> AppResult<PaymentResponse> {
        let scope = actor.campus_scope()?;
        let stored = lookup::payment_in_scope(&self.pool, &scope, id).await?;

        let mut draft = draft_from_stored(&stored);
        request.apply_to(&mut draft);

        let loaded = self.load_context(&scope, &draft).await?;
        if let Some(student) = &loaded.student
            && student.campus_id != stored.campus_id
        {
            return Err(ValidationError::new(
                "student_id",
                "student belongs to another campus",
            )
            .into());
        }

        let ctx = PaymentContext {
            student: loaded.student.as_ref(),
            career: loaded.career.as_ref(),
        };
        let mut resolved = resolve_and_validate_payment(&draft, &ctx, self.clock.today())?;
        if !loyalty_inputs_changed(&stored, &resolved) {
            resolved.points = stored.points;
            resolved.has_penalty = stored.has_penalty;
        }

        let mut am = stored.into_active_model();
        write_resolved(&mut am, &resolved);
        let updated = am.update(&self.pool).await.map_err(|e| {
            lookup::unique_violation_as_conflict(e, "reference code is already in use")
        })?;

        log::info!(
            "Payment {} updated by {}: points {}, penalty {}",
            updated.id,
            actor.username,
            updated.points,
            updated.has_penalty
        );
        Ok(PaymentResponse::new(
            updated,
            loaded.student.map(|s| s.full_name()),
        ))
    }

    pub async fn get_payment(&self, actor: &Actor, id: i64) -> AppResult<PaymentResponse> {
        let scope = actor.campus_scope()?;
        let payment = lookup::payment_in_scope(&self.pool, &scope, id).await?;
        let names = student_names(&self.pool, std::slice::from_ref(&payment)).await?;
        let student_name = payment.student_id.and_then(|sid| names.get(&sid).cloned());
        Ok(PaymentResponse::new(payment, student_name))
    }

    pub async fn list_payments(
        &self,
        actor: &Actor,
        query: PaymentQuery,
    ) -> AppResult<PaginatedResponse<PaymentResponse>> {
        let scope = actor.campus_scope()?;
        let params = query.pagination();

        let mut condition = Condition::all();
        if let Some(campus_id) = scope.filter(query.campus_id) {
            condition = condition.add(payments::Column::CampusId.eq(campus_id));
        }
        if let Some(student_id) = query.student_id {
            condition = condition.add(payments::Column::StudentId.eq(student_id));
        }
        if let Some(from) = query.from {
            condition = condition.add(payments::Column::PaymentDate.gte(from));
        }
        if let Some(to) = query.to {
            condition = condition.add(payments::Column::PaymentDate.lte(to));
        }
        if let Some(flag) = query.is_enrollment_fee {
            condition = condition.add(payments::Column::IsEnrollmentFee.eq(flag));
        }

        let base_query = payments::Entity::find()
            .filter(condition)
            .order_by_desc(payments::Column::PaymentDate)
            .order_by_desc(payments::Column::Id);
        let total = base_query.clone().count(&self.pool).await?;
        let rows = base_query
            .limit(params.page_size())
            .offset(params.page_index() * params.page_size())
            .all(&self.pool)
            .await?;

        let names = student_names(&self.pool, &rows).await?;
        let data = rows
            .into_iter()
            .map(|p| {
                let name = p.student_id.and_then(|sid| names.get(&sid).cloned());
                PaymentResponse::new(p, name)
            })
            .collect();
        Ok(PaginatedResponse::new(data, &params, total))
    }

    async fn load_context(
        &self,
        scope: &CampusScope,
        draft: &PaymentDraft,
    ) -> AppResult<LoadedContext> {
        let student = match draft.payer_student_id() {
            Some(id) => Some(lookup::student_in_scope(&self.pool, scope, id).await?),
            None => None,
        };
        let career = match effective_career_id(draft.career_id, student.as_ref()) {
            Some(id) => Some(lookup::career_by_id(&self.pool, id).await?),
            None => None,
        };
        if draft.payment_method == PaymentMethod::BankTransfer
            && let Some(account_id) = draft.bank_account_id
        {
            lookup::bank_account_by_id(&self.pool, account_id).await?;
        }
        Ok(LoadedContext {
            student,
            career,
        })
    }

    /// Inserts the payment, assigning the next receipt number when none was
    /// given. Each attempt runs in its own transaction.
    async fn insert_numbered(
        &self,
        actor: &Actor,
        campus_id: i64,
        resolved: &ResolvedPayment,
    ) -> AppResult<payments::Model> {
        let mut attempt = 0;
        loop {
            let txn = self.pool.begin().await?;
            let generated = resolved.reference_code.is_none();
            let reference_code = match &resolved.reference_code {
                Some(code) => code.clone(),
                None => self.next_reference_code(&txn).await?,
            };

            let mut am = payments::ActiveModel {
                campus_id: Set(campus_id),
                registered_by: Set(Some(actor.user_id)),
                created_at: Set(self.clock.now()),
                ..Default::default()
            };
            write_resolved(&mut am, resolved);
            am.reference_code = Set(Some(reference_code.clone()));

            match am.insert(&txn).await {
                Ok(payment) => {
                    txn.commit().await?;
                    return Ok(payment);
                }
                Err(err) => {
                    let collision = matches!(
                        err.sql_err(),
                        Some(SqlErr::UniqueConstraintViolation(_))
                    );
                    txn.rollback().await?;
                    if !collision {
                        return Err(err.into());
                    }
                    if generated && attempt < RECEIPT_RETRIES {
                        attempt += 1;
                        log::warn!(
                            "Receipt number {reference_code} was taken concurrently, retrying"
                        );
                        continue;
                    }
                    return Err(AppError::Conflict(format!(
                        "reference code {reference_code} is already in use"
                    )));
                }
            }
        }
    }

    /// Follows the highest all-digit code, so free-text or older manual codes
    /// never pull the sequence back onto numbers already issued.
    async fn next_reference_code<C: ConnectionTrait>(&self, conn: &C) -> AppResult<String> {
        let last = payments::Entity::find()
            .filter(Expr::cust(NUMERIC_REFERENCE_CODE))
            .order_by_desc(Expr::cust(REFERENCE_CODE_VALUE))
            .one(conn)
            .await?;
        Ok(next_receipt_number(
            last.as_ref().and_then(|p| p.reference_code.as_deref()),
            self.receipt_number_width,
        ))
    }
}

fn write_resolved(am: &mut payments::ActiveModel, r: &ResolvedPayment) {
    am.reference_code = Set(r.reference_code.clone());
    am.student_id = Set(r.student_id);
    am.client_name = Set(r.client_name.clone());
    am.career_id = Set(r.career_id);
    am.is_enrollment_fee = Set(r.is_enrollment_fee);
    am.payment_method = Set(r.payment_method);
    am.bank_account_id = Set(r.bank_account_id);
    am.payment_date = Set(r.payment_date);
    am.due_date = Set(r.due_date);
    am.valid_until = Set(r.valid_until);
    am.unit_amount = Set(r.unit_amount);
    am.installment_count = Set(r.installment_count);
    am.amount_paid = Set(r.amount_paid);
    am.installment_numbers = Set(r.installment_numbers_text());
    am.points = Set(r.points);
    am.has_penalty = Set(r.has_penalty);
    am.concept = Set(r.concept.clone());
    am.notes = Set(r.notes.clone());
}

/// Full names of the students paying for `rows`, keyed by student id.
pub(crate) async fn student_names<C: ConnectionTrait>(
    conn: &C,
    rows: &[payments::Model],
) -> AppResult<HashMap<i64, String>> {
    let mut ids: Vec<i64> = rows.iter().filter_map(|p| p.student_id).collect();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let list = students::Entity::find()
        .filter(students::Column::Id.is_in(ids))
        .all(conn)
        .await?;
    Ok(list.into_iter().map(|s| (s.id, s.full_name())).collect())
}
