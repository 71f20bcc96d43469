use crate::entities::{CareerKind, PaymentMethod, career_entity, payment_entity, student_entity};
use crate::error::ValidationError;
use crate::ledger::InstallmentNumbers;
use chrono::NaiveDate;

/// Highest score a single installment payment can earn.
pub const MAX_POINTS: i32 = 3;

/// Payment as submitted by the intake form, before any defaulting.
#[derive(Debug, Clone, Default)]
pub struct PaymentDraft {
    pub reference_code: Option<String>,
    pub student_id: Option<i64>,
    /// Explicit "differentiated client" flag from the form
    pub walk_in: bool,
    pub client_name: Option<String>,
    pub career_id: Option<i64>,
    pub is_enrollment_fee: bool,
    pub payment_method: PaymentMethod,
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

impl PaymentDraft {
    /// A payment is walk-in when flagged as such or when a client name is supplied.
    pub fn is_walk_in(&self) -> bool {
        self.walk_in || non_blank(self.client_name.as_deref()).is_some()
    }

    /// Student reference that survives payer resolution.
    pub fn payer_student_id(&self) -> Option<i64> {
        if self.is_walk_in() {
            None
        } else {
            self.student_id
        }
    }
}

/// Records the resolution step depends on, fetched by the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct PaymentContext<'a> {
    pub student: Option<&'a student_entity::Model>,
    /// Career loaded for [`effective_career_id`]
    pub career: Option<&'a career_entity::Model>,
}

/// Fully resolved payment, ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPayment {
    pub reference_code: Option<String>,
    pub student_id: Option<i64>,
    pub client_name: Option<String>,
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
    pub installment_numbers: Option<InstallmentNumbers>,
    pub points: i32,
    pub has_penalty: bool,
    pub concept: Option<String>,
    pub notes: Option<String>,
}

impl ResolvedPayment {
    pub fn installment_numbers_text(&self) -> Option<String> {
        self.installment_numbers.as_ref().map(ToString::to_string)
    }
}

/// Explicit career first, then the payer student's enrolled career.
pub fn effective_career_id(
    explicit: Option<i64>,
    student: Option<&student_entity::Model>,
) -> Option<i64> {
    explicit.or_else(|| student.map(|s| s.career_id))
}

/// Loyalty points for an installment paid on `payment_date` against `due_date`.
///
/// | days ahead of due | points |
/// |-------------------|--------|
/// | >= 30             | 3      |
/// | 3..=29            | 2      |
/// | -3..=2            | 1      |
/// | < -3              | 0      |
///
/// Without a due date the score is 0.
pub fn compute_points(due_date: Option<NaiveDate>, payment_date: NaiveDate) -> i32 {
    let Some(due) = due_date else {
        return 0;
    };
    let days_ahead = (due - payment_date).num_days();
    if days_ahead >= 30 {
        3
    } else if days_ahead >= 3 {
        2
    } else if days_ahead >= -3 {
        1
    } else {
        0
    }
}

/// Technical careers flag any payment made after its due date, grace window or not.
pub fn compute_penalty(
    kind: Option<CareerKind>,
    due_date: Option<NaiveDate>,
    payment_date: NaiveDate,
) -> bool {
    match (kind, due_date) {
        (Some(CareerKind::Technical), Some(due)) => payment_date > due,
        _ => false,
    }
}

/// Resolves payer, career, amounts and schedule fields of a draft and scores it.
///
/// Enrollment fees never carry a due date, an installment list, points or a
/// penalty. Every rejection names the offending field.
pub fn resolve_and_validate_payment(
    draft: &PaymentDraft,
    ctx: &PaymentContext<'_>,
    today: NaiveDate,
) -> Result<ResolvedPayment, ValidationError> {
    // payer
    let (student_id, client_name) = if draft.is_walk_in() {
        let name = non_blank(draft.client_name.as_deref()).ok_or_else(|| {
            ValidationError::new("client_name", "client name is required for walk-in payments")
        })?;
        (None, Some(name.to_string()))
    } else {
        let student = match (draft.student_id, ctx.student) {
            (Some(id), Some(student)) if student.id == id => student,
            _ => {
                return Err(ValidationError::new(
                    "student_id",
                    "must select a student or supply a client name",
                ));
            }
        };
        (Some(student.id), None)
    };

    let student = student_id.and(ctx.student);
    let career_id = effective_career_id(draft.career_id, student);
    let career = ctx.career.filter(|c| Some(c.id) == career_id);

    let unit_amount = draft.unit_amount.or_else(|| {
        career.map(|c| {
            if draft.is_enrollment_fee {
                c.enrollment_fee
            } else {
                c.monthly_fee
            }
        })
    });
    if unit_amount.is_some_and(|u| u < 0) {
        return Err(ValidationError::new(
            "unit_amount",
            "unit amount cannot be negative",
        ));
    }

    let installment_count = if draft.is_enrollment_fee {
        1
    } else {
        match draft.installment_count {
            Some(n) if n < 1 => {
                return Err(ValidationError::new(
                    "installment_count",
                    "installment count must be at least 1",
                ));
            }
            Some(n) => n,
            None => 1,
        }
    };

    let amount_paid = draft
        .amount_paid
        .or_else(|| unit_amount.and_then(|u| u.checked_mul(i64::from(installment_count))))
        .unwrap_or(0);
    if amount_paid <= 0 {
        return Err(ValidationError::new(
            "amount_paid",
            "amount paid must be greater than 0",
        ));
    }

    let payment_date = draft.payment_date.unwrap_or(today);
    let bank_account_id = match draft.payment_method {
        PaymentMethod::BankTransfer => draft.bank_account_id,
        PaymentMethod::Cash => None,
    };

    let (due_date, installment_numbers, points, has_penalty) = if draft.is_enrollment_fee {
        (None, None, 0, false)
    } else {
        let numbers = InstallmentNumbers::parse_optional(draft.installment_numbers.as_deref())?;
        let points = compute_points(draft.due_date, payment_date);
        let penalty = compute_penalty(career.map(|c| c.kind), draft.due_date, payment_date);
        (draft.due_date, numbers, points, penalty)
    };

    Ok(ResolvedPayment {
        reference_code: non_blank(draft.reference_code.as_deref()).map(str::to_string),
        student_id,
        client_name,
        career_id,
        is_enrollment_fee: draft.is_enrollment_fee,
        payment_method: draft.payment_method,
        bank_account_id,
        payment_date,
        due_date,
        valid_until: draft.valid_until,
        unit_amount,
        installment_count,
        amount_paid,
        installment_numbers,
        points,
        has_penalty,
        concept: non_blank(draft.concept.as_deref()).map(str::to_string),
        notes: non_blank(draft.notes.as_deref()).map(str::to_string),
    })
}

/// Whether an edit touched anything the points/penalty outcome depends on.
pub fn loyalty_inputs_changed(stored: &payment_entity::Model, resolved: &ResolvedPayment) -> bool {
    stored.payment_date != resolved.payment_date
        || stored.due_date != resolved.due_date
        || stored.is_enrollment_fee != resolved.is_enrollment_fee
        || stored.career_id != resolved.career_id
}

/// Rebuilds an editable draft from a stored payment.
pub fn draft_from_stored(stored: &payment_entity::Model) -> PaymentDraft {
    PaymentDraft {
        reference_code: stored.reference_code.clone(),
        student_id: stored.student_id,
        walk_in: stored.client_name.is_some(),
        client_name: stored.client_name.clone(),
        career_id: stored.career_id,
        is_enrollment_fee: stored.is_enrollment_fee,
        payment_method: stored.payment_method,
        bank_account_id: stored.bank_account_id,
        payment_date: Some(stored.payment_date),
        due_date: stored.due_date,
        valid_until: stored.valid_until,
        unit_amount: stored.unit_amount,
        installment_count: Some(stored.installment_count),
        amount_paid: Some(stored.amount_paid),
        installment_numbers: stored.installment_numbers.clone(),
        concept: stored.concept.clone(),
        notes: stored.notes.clone(),
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::testing::{career, date, payment, student};

    fn installment_draft(due: NaiveDate, paid: NaiveDate) -> PaymentDraft {
        PaymentDraft {
            student_id: Some(1),
            payment_date: Some(paid),
            due_date: Some(due),
            ..Default::default()
        }
    }

    #[test]
    fn test_points_boundaries() {
        let due = date(2024, 6, 30);
        let cases = [(30, 3), (29, 2), (3, 2), (2, 1), (-3, 1), (-4, 0)];
        for (days_ahead, expected) in cases {
            let paid = due - chrono::Duration::days(days_ahead);
            assert_eq!(
                compute_points(Some(due), paid),
                expected,
                "days_ahead = {days_ahead}"
            );
        }
    }

    #[test]
    fn test_points_never_increase_as_payment_moves_later() {
        let due = date(2024, 6, 30);
        let mut previous = MAX_POINTS;
        for offset in -60..60 {
            let paid = due + chrono::Duration::days(offset);
            let points = compute_points(Some(due), paid);
            assert!(points <= previous);
            assert!((0..=MAX_POINTS).contains(&points));
            previous = points;
        }
    }

    #[test]
    fn test_points_fail_closed_without_due_date() {
        assert_eq!(compute_points(None, date(2024, 1, 1)), 0);
    }

    #[test]
    fn test_enrollment_forces_zero_loyalty() {
        let c = career(CareerKind::Technical, 300_000, 500_000);
        let s = student(c.id, None);
        let draft = PaymentDraft {
            student_id: Some(1),
            is_enrollment_fee: true,
            payment_date: Some(date(2024, 5, 10)),
            due_date: Some(date(2024, 4, 1)),
            installment_numbers: Some("1,2".into()),
            installment_count: Some(4),
            ..Default::default()
        };
        let ctx = PaymentContext {
            student: Some(&s),
            career: Some(&c),
        };
        let resolved = resolve_and_validate_payment(&draft, &ctx, date(2024, 5, 10)).unwrap();
        assert_eq!(resolved.points, 0);
        assert!(!resolved.has_penalty);
        assert_eq!(resolved.due_date, None);
        assert_eq!(resolved.installment_numbers, None);
        assert_eq!(resolved.installment_count, 1);
        assert_eq!(resolved.unit_amount, Some(300_000));
        assert_eq!(resolved.amount_paid, 300_000);
    }

    #[test]
    fn test_penalty_is_independent_of_grace_window() {
        let due = date(2024, 5, 1);
        let paid = date(2024, 5, 2);
        let s = student(10, None);

        let technical = career(CareerKind::Technical, 0, 500_000);
        let ctx = PaymentContext {
            student: Some(&s),
            career: Some(&technical),
        };
        let resolved =
            resolve_and_validate_payment(&installment_draft(due, paid), &ctx, paid).unwrap();
        assert_eq!(resolved.points, 1);
        assert!(resolved.has_penalty);

        let vocational = career(CareerKind::VocationalTraining, 0, 500_000);
        let ctx = PaymentContext {
            student: Some(&s),
            career: Some(&vocational),
        };
        let resolved =
            resolve_and_validate_payment(&installment_draft(due, paid), &ctx, paid).unwrap();
        assert_eq!(resolved.points, 1);
        assert!(!resolved.has_penalty);
    }

    #[test]
    fn test_amount_defaults_from_career_and_count() {
        let c = career(CareerKind::VocationalTraining, 150_000, 400_000);
        let s = student(c.id, None);
        let draft = PaymentDraft {
            student_id: Some(1),
            installment_count: Some(3),
            installment_numbers: Some("3,4,5".into()),
            due_date: Some(date(2024, 6, 1)),
            ..Default::default()
        };
        let ctx = PaymentContext {
            student: Some(&s),
            career: Some(&c),
        };
        let resolved = resolve_and_validate_payment(&draft, &ctx, date(2024, 5, 20)).unwrap();
        assert_eq!(resolved.career_id, Some(10));
        assert_eq!(resolved.unit_amount, Some(400_000));
        assert_eq!(resolved.amount_paid, 1_200_000);
        assert_eq!(resolved.payment_date, date(2024, 5, 20));
        assert_eq!(resolved.installment_numbers_text().as_deref(), Some("3,4,5"));
        assert_eq!(resolved.points, 2);
    }

    #[test]
    fn test_explicit_amount_wins_over_defaults() {
        let c = career(CareerKind::VocationalTraining, 150_000, 400_000);
        let s = student(c.id, None);
        let draft = PaymentDraft {
            student_id: Some(1),
            amount_paid: Some(250_000),
            ..Default::default()
        };
        let ctx = PaymentContext {
            student: Some(&s),
            career: Some(&c),
        };
        let resolved = resolve_and_validate_payment(&draft, &ctx, date(2024, 5, 20)).unwrap();
        assert_eq!(resolved.amount_paid, 250_000);
        assert_eq!(resolved.unit_amount, Some(400_000));
    }

    #[test]
    fn test_walk_in_drops_student_reference() {
        let draft = PaymentDraft {
            student_id: Some(1),
            client_name: Some("  Juan Pérez ".into()),
            amount_paid: Some(80_000),
            ..Default::default()
        };
        let resolved =
            resolve_and_validate_payment(&draft, &PaymentContext::default(), date(2024, 5, 20))
                .unwrap();
        assert_eq!(resolved.student_id, None);
        assert_eq!(resolved.client_name.as_deref(), Some("Juan Pérez"));
        assert_eq!(resolved.career_id, None);
        assert!(!resolved.has_penalty);
    }

    #[test]
    fn test_validation_failures_name_the_field() {
        let today = date(2024, 5, 20);
        let ctx = PaymentContext::default();

        let flagged_without_name = PaymentDraft {
            walk_in: true,
            amount_paid: Some(10),
            ..Default::default()
        };
        assert_eq!(
            resolve_and_validate_payment(&flagged_without_name, &ctx, today)
                .unwrap_err()
                .field,
            "client_name"
        );

        let no_payer = PaymentDraft {
            amount_paid: Some(10),
            ..Default::default()
        };
        assert_eq!(
            resolve_and_validate_payment(&no_payer, &ctx, today)
                .unwrap_err()
                .field,
            "student_id"
        );

        let no_amount = PaymentDraft {
            client_name: Some("Walk-in".into()),
            ..Default::default()
        };
        assert_eq!(
            resolve_and_validate_payment(&no_amount, &ctx, today)
                .unwrap_err()
                .field,
            "amount_paid"
        );

        let bad_numbers = PaymentDraft {
            client_name: Some("Walk-in".into()),
            amount_paid: Some(10),
            installment_numbers: Some("1,0".into()),
            ..Default::default()
        };
        assert_eq!(
            resolve_and_validate_payment(&bad_numbers, &ctx, today)
                .unwrap_err()
                .field,
            "installment_numbers"
        );

        let zero_count = PaymentDraft {
            client_name: Some("Walk-in".into()),
            amount_paid: Some(10),
            installment_count: Some(0),
            ..Default::default()
        };
        assert_eq!(
            resolve_and_validate_payment(&zero_count, &ctx, today)
                .unwrap_err()
                .field,
            "installment_count"
        );
    }

    #[test]
    fn test_cash_payment_drops_bank_account() {
        let draft = PaymentDraft {
            client_name: Some("Walk-in".into()),
            amount_paid: Some(10),
            payment_method: PaymentMethod::Cash,
            bank_account_id: Some(4),
            ..Default::default()
        };
        let resolved =
            resolve_and_validate_payment(&draft, &PaymentContext::default(), date(2024, 5, 20))
                .unwrap();
        assert_eq!(resolved.bank_account_id, None);
    }

    #[test]
    fn test_loyalty_inputs_changed_detects_date_edits() {
        let c = career(CareerKind::Technical, 0, 500_000);
        let s = student(c.id, None);
        let ctx = PaymentContext {
            student: Some(&s),
            career: Some(&c),
        };
        let draft = installment_draft(date(2024, 4, 1), date(2024, 3, 25));
        let resolved = resolve_and_validate_payment(&draft, &ctx, date(2024, 3, 25)).unwrap();

        let mut stored = payment(7, resolved.payment_date);
        stored.due_date = resolved.due_date;
        stored.unit_amount = resolved.unit_amount;
        stored.amount_paid = resolved.amount_paid;
        stored.points = resolved.points;
        stored.has_penalty = resolved.has_penalty;
        assert!(!loyalty_inputs_changed(&stored, &resolved));

        let mut edited = draft_from_stored(&stored);
        edited.payment_date = Some(date(2024, 4, 10));
        let re_resolved = resolve_and_validate_payment(&edited, &ctx, date(2024, 4, 10)).unwrap();
        assert!(loyalty_inputs_changed(&stored, &re_resolved));
        assert_eq!(re_resolved.points, 0);
        assert!(re_resolved.has_penalty);
    }
}
