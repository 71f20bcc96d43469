use crate::entities::{PaymentMethod, payment_entity};
use crate::ledger::PaymentDraft;
use crate::models::PaginationParams;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Payment intake form. Omitted amounts are derived from the career fees.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct CreatePaymentRequest {
    /// Required for administrators; staff always register at their own campus
    pub campus_id: Option<i64>,
    /// Receipt number; generated when omitted
    #[schema(example = "000124")]
    pub reference_code: Option<String>,
    pub student_id: Option<i64>,
    /// Walk-in ("differentiated") client
    #[serde(default)]
    pub walk_in: bool,
    pub client_name: Option<String>,
    pub career_id: Option<i64>,
    #[serde(default)]
    pub is_enrollment_fee: bool,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    pub bank_account_id: Option<i64>,
    /// Defaults to today
    pub payment_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub valid_until: Option<NaiveDate>,
    pub unit_amount: Option<i64>,
    pub installment_count: Option<i32>,
    pub amount_paid: Option<i64>,
    /// Comma-separated installment numbers, e.g. "3,4"
    #[schema(example = "3,4")]
    pub installment_numbers: Option<String>,
    pub concept: Option<String>,
    pub notes: Option<String>,
}

impl CreatePaymentRequest {
    pub fn into_draft(self) -> PaymentDraft {
        PaymentDraft {
            reference_code: self.reference_code,
            student_id: self.student_id,
            walk_in: self.walk_in,
            client_name: self.client_name,
            career_id: self.career_id,
            is_enrollment_fee: self.is_enrollment_fee,
            payment_method: self.payment_method,
            bank_account_id: self.bank_account_id,
            payment_date: self.payment_date,
            due_date: self.due_date,
            valid_until: self.valid_until,
            unit_amount: self.unit_amount,
            installment_count: self.installment_count,
            amount_paid: self.amount_paid,
            installment_numbers: self.installment_numbers,
            concept: self.concept,
            notes: self.notes,
        }
    }
}

/// Partial edit; absent fields keep their stored value.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdatePaymentRequest {
    pub reference_code: Option<String>,
    /// Switches the payment to this student, dropping any walk-in name
    pub student_id: Option<i64>,
    /// Switches the payment to a walk-in client
    pub client_name: Option<String>,
    pub career_id: Option<i64>,
    pub is_enrollment_fee: Option<bool>,
    pub payment_method: Option<PaymentMethod>,
    pub bank_account_id: Option<i64>,
    pub payment_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub valid_until: Option<NaiveDate>,
    pub unit_amount: Option<i64>,
    pub installment_count: Option<i32>,
    pub amount_paid: Option<i64>,
    pub installment_numbers: Option<String>,
    pub concept: Option<String>,
    pub notes: Option<String>,
}

impl UpdatePaymentRequest {
    pub fn apply_to(self, draft: &mut PaymentDraft) {
        if let Some(student_id) = self.student_id {
            draft.student_id = Some(student_id);
            draft.client_name = None;
            draft.walk_in = false;
        }
        if let Some(name) = self.client_name {
            draft.client_name = Some(name);
            draft.walk_in = true;
        }
        if self.reference_code.is_some() {
            draft.reference_code = self.reference_code;
        }
        if self.career_id.is_some() {
            draft.career_id = self.career_id;
        }
        if let Some(flag) = self.is_enrollment_fee {
            draft.is_enrollment_fee = flag;
        }
        if let Some(method) = self.payment_method {
            draft.payment_method = method;
        }
        if self.bank_account_id.is_some() {
            draft.bank_account_id = self.bank_account_id;
        }
        if self.payment_date.is_some() {
            draft.payment_date = self.payment_date;
        }
        if self.due_date.is_some() {
            draft.due_date = self.due_date;
        }
        if self.valid_until.is_some() {
            draft.valid_until = self.valid_until;
        }
        if self.unit_amount.is_some() {
            draft.unit_amount = self.unit_amount;
        }
        if self.installment_count.is_some() {
            draft.installment_count = self.installment_count;
        }
        if self.amount_paid.is_some() {
            draft.amount_paid = self.amount_paid;
        }
        if self.installment_numbers.is_some() {
            draft.installment_numbers = self.installment_numbers;
        }
        if self.concept.is_some() {
            draft.concept = self.concept;
        }
        if self.notes.is_some() {
            draft.notes = self.notes;
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaymentQuery {
    /// Ignored for campus-bound staff
    pub campus_id: Option<i64>,
    pub student_id: Option<i64>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub is_enrollment_fee: Option<bool>,
    pub page: Option<u64>,
    pub page_size: Option<u64>,
}

impl PaymentQuery {
    pub fn pagination(&self) -> PaginationParams {
        PaginationParams::new(self.page, self.page_size)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaymentResponse {
    pub id: i64,
    pub campus_id: i64,
    pub reference_code: Option<String>,
    pub student_id: Option<i64>,
    pub client_name: Option<String>,
    /// Walk-in client name or the student's full name
    pub payer_name: String,
    pub career_id: Option<i64>,
    pub is_enrollment_fee: bool,
    pub payment_method: PaymentMethod,
    pub bank_account_id: Option<i64>,
    pub payment_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub valid_until: Option<NaiveDate>,
    pub unit_amount: Option<i64>,
    pub installment_count: i32,
    pub amount_paid: i64,
    pub installment_numbers: Option<String>,
    pub points: i32,
    pub has_penalty: bool,
    pub concept: Option<String>,
    pub notes: Option<String>,
    pub registered_by: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl PaymentResponse {
    pub fn new(m: payment_entity::Model, student_name: Option<String>) -> Self {
        let payer_name = m
            .client_name
            .clone()
            .or(student_name)
            .unwrap_or_default();
        Self {
            id: m.id,
            campus_id: m.campus_id,
            reference_code: m.reference_code,
            student_id: m.student_id,
            client_name: m.client_name,
            payer_name,
            career_id: m.career_id,
            is_enrollment_fee: m.is_enrollment_fee,
            payment_method: m.payment_method,
            bank_account_id: m.bank_account_id,
            payment_date: m.payment_date,
            due_date: m.due_date,
            valid_until: m.valid_until,
            unit_amount: m.unit_amount,
            installment_count: m.installment_count,
            amount_paid: m.amount_paid,
            installment_numbers: m.installment_numbers,
            points: m.points,
            has_penalty: m.has_penalty,
            concept: m.concept,
            notes: m.notes,
            registered_by: m.registered_by,
            created_at: m.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::draft_from_stored;
    use crate::ledger::testing::{date, payment};

    #[test]
    fn test_update_switches_payer_to_walk_in() {
        let stored = payment(4, date(2024, 5, 2));
        let mut draft = draft_from_stored(&stored);
        UpdatePaymentRequest {
            client_name: Some("Carlos Gómez".into()),
            ..Default::default()
        }
        .apply_to(&mut draft);
        assert!(draft.is_walk_in());
        assert_eq!(draft.payer_student_id(), None);
        assert_eq!(draft.payment_date, Some(date(2024, 5, 2)));
    }

    #[test]
    fn test_payer_name_prefers_client_name() {
        let mut walk_in = payment(5, date(2024, 5, 2));
        walk_in.student_id = None;
        walk_in.client_name = Some("Carlos Gómez".into());
        assert_eq!(PaymentResponse::new(walk_in, None).payer_name, "Carlos Gómez");

        let student_payment = payment(6, date(2024, 5, 2));
        assert_eq!(
            PaymentResponse::new(student_payment, Some("Ana Benítez".into())).payer_name,
            "Ana Benítez"
        );
    }
}
