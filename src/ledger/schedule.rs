use crate::entities::{payment_entity, student_entity};
use crate::ledger::InstallmentMatch;
use chrono::{Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const SCHEDULE_SLOTS: u32 = 12;

/// Half-width of the due-date window used for the primary match.
const MATCH_WINDOW_DAYS: i64 = 15;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SlotState {
    Paid,
    Pending,
    Overdue,
}

/// Where the matched payment landed relative to the slot's due date.
/// Display only; the match itself ignores it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentTiming {
    /// Paid 3 to 29 days before the due date
    TwoPointWindow,
    /// Paid between 2 days before and 5 days after the due date
    OnePointWindow,
    Outside,
}

impl PaymentTiming {
    pub fn classify(due_date: NaiveDate, payment_date: NaiveDate) -> Self {
        let offset = (payment_date - due_date).num_days();
        match offset {
            -29..=-3 => PaymentTiming::TwoPointWindow,
            -2..=5 => PaymentTiming::OnePointWindow,
            _ => PaymentTiming::Outside,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct ScheduleSlot {
    /// 1-based installment number
    pub installment: u32,
    pub due_date: NaiveDate,
    pub state: SlotState,
    pub payment_id: Option<i64>,
    pub reference_code: Option<String>,
    pub payment_date: Option<NaiveDate>,
    pub points: Option<i32>,
    pub timing: Option<PaymentTiming>,
}

/// Projects the 12 monthly installments from the student's start date and
/// reconciles each against the recorded payments.
///
/// A payment whose `due_date` lies within 15 days of the slot wins; the
/// earliest such due date is taken. Otherwise the stored installment list is
/// consulted. Returns an empty schedule when the start date is unknown.
pub fn build_installment_schedule(
    student: &student_entity::Model,
    payments: &[payment_entity::Model],
    today: NaiveDate,
    mode: InstallmentMatch,
) -> Vec<ScheduleSlot> {
    let Some(start_date) = student.start_date else {
        return Vec::new();
    };

    let installments: Vec<&payment_entity::Model> = payments
        .iter()
        .filter(|p| !p.is_enrollment_fee)
        .collect();

    let mut slots = Vec::with_capacity(SCHEDULE_SLOTS as usize);
    for installment in 1..=SCHEDULE_SLOTS {
        let Some(due_date) = start_date.checked_add_months(Months::new(installment)) else {
            continue;
        };
        let matched = match_by_window(&installments, due_date)
            .or_else(|| match_by_number(&installments, installment, mode));
        slots.push(slot(installment, due_date, matched, today));
    }
    slots
}

/// Splits a schedule into months 1-6 and 7-12 for side-by-side layout.
pub fn schedule_halves(slots: &[ScheduleSlot]) -> (&[ScheduleSlot], &[ScheduleSlot]) {
    slots.split_at(slots.len().min(6))
}

fn match_by_window<'a>(
    payments: &[&'a payment_entity::Model],
    due_date: NaiveDate,
) -> Option<&'a payment_entity::Model> {
    let from = due_date - Duration::days(MATCH_WINDOW_DAYS);
    let to = due_date + Duration::days(MATCH_WINDOW_DAYS);
    payments
        .iter()
        .copied()
        .filter_map(|p| p.due_date.map(|d| (d, p)))
        .filter(|(d, _)| (from..=to).contains(d))
        .min_by_key(|(d, p)| (*d, p.id))
        .map(|(_, p)| p)
}

fn match_by_number<'a>(
    payments: &[&'a payment_entity::Model],
    installment: u32,
    mode: InstallmentMatch,
) -> Option<&'a payment_entity::Model> {
    payments
        .iter()
        .copied()
        .filter(|p| {
            p.installment_numbers
                .as_deref()
                .is_some_and(|stored| mode.matches(stored, installment))
        })
        .min_by_key(|p| (p.payment_date, p.id))
}

fn slot(
    installment: u32,
    due_date: NaiveDate,
    matched: Option<&payment_entity::Model>,
    today: NaiveDate,
) -> ScheduleSlot {
    match matched {
        Some(p) => ScheduleSlot {
            installment,
            due_date,
            state: SlotState::Paid,
            payment_id: Some(p.id),
            reference_code: p.reference_code.clone(),
            payment_date: Some(p.payment_date),
            points: Some(p.points),
            timing: Some(PaymentTiming::classify(due_date, p.payment_date)),
        },
        None => ScheduleSlot {
            installment,
            due_date,
            state: if due_date < today {
                SlotState::Overdue
            } else {
                SlotState::Pending
            },
            payment_id: None,
            reference_code: None,
            payment_date: None,
            points: None,
            timing: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::testing::{date, payment, student};

    #[test]
    fn test_missing_start_date_yields_empty_schedule() {
        let s = student(10, None);
        let schedule =
            build_installment_schedule(&s, &[], date(2024, 6, 1), InstallmentMatch::Exact);
        assert!(schedule.is_empty());
    }

    #[test]
    fn test_twelve_slots_with_calendar_months() {
        let s = student(10, Some(date(2024, 1, 31)));
        let schedule =
            build_installment_schedule(&s, &[], date(2024, 1, 31), InstallmentMatch::Exact);
        assert_eq!(schedule.len(), 12);
        assert_eq!(schedule[0].due_date, date(2024, 2, 29));
        assert_eq!(schedule[1].due_date, date(2024, 3, 31));
        assert_eq!(schedule[2].due_date, date(2024, 4, 30));
        assert_eq!(schedule[11].due_date, date(2025, 1, 31));
        for (i, slot) in schedule.iter().enumerate() {
            assert_eq!(slot.installment, i as u32 + 1);
            assert_eq!(slot.state, SlotState::Pending);
        }

        let (first, second) = schedule_halves(&schedule);
        assert_eq!(first.len(), 6);
        assert_eq!(second[0].installment, 7);
    }

    #[test]
    fn test_window_match_prefers_earliest_due_date() {
        let s = student(10, Some(date(2024, 3, 10)));
        // slot 1 is due 2024-04-10
        let mut late = payment(1, date(2024, 4, 20));
        late.due_date = Some(date(2024, 4, 20));
        let mut early = payment(2, date(2024, 4, 1));
        early.due_date = Some(date(2024, 4, 5));
        early.points = 2;
        let mut outside = payment(3, date(2024, 3, 20));
        outside.due_date = Some(date(2024, 3, 25));

        let schedule = build_installment_schedule(
            &s,
            &[late, early, outside],
            date(2024, 6, 1),
            InstallmentMatch::Exact,
        );
        let first = &schedule[0];
        assert_eq!(first.state, SlotState::Paid);
        assert_eq!(first.payment_id, Some(2));
        assert_eq!(first.reference_code.as_deref(), Some("000002"));
        assert_eq!(first.points, Some(2));
        assert_eq!(first.timing, Some(PaymentTiming::TwoPointWindow));
        assert_eq!(schedule[1].state, SlotState::Overdue);
    }

    #[test]
    fn test_enrollment_fees_never_fill_a_slot() {
        let s = student(10, Some(date(2024, 3, 10)));
        let mut enrollment = payment(1, date(2024, 4, 10));
        enrollment.is_enrollment_fee = true;
        enrollment.due_date = Some(date(2024, 4, 10));
        enrollment.installment_numbers = Some("1".into());

        let schedule = build_installment_schedule(
            &s,
            &[enrollment],
            date(2024, 3, 10),
            InstallmentMatch::Exact,
        );
        assert_eq!(schedule[0].payment_id, None);
    }

    #[test]
    fn test_fallback_by_installment_list() {
        let s = student(10, Some(date(2024, 3, 10)));
        let mut bulk = payment(5, date(2024, 3, 12));
        bulk.installment_numbers = Some("1,11".into());
        let mut other = payment(6, date(2024, 3, 15));
        other.installment_numbers = Some("11".into());

        let exact = build_installment_schedule(
            &s,
            &[bulk.clone(), other.clone()],
            date(2024, 3, 10),
            InstallmentMatch::Exact,
        );
        assert_eq!(exact[0].payment_id, Some(5));
        assert_eq!(exact[10].payment_id, Some(5));
        assert_eq!(exact[10].timing, Some(PaymentTiming::Outside));

        let mut only_eleven = bulk.clone();
        only_eleven.installment_numbers = Some("11".into());
        let exact = build_installment_schedule(
            &s,
            &[only_eleven.clone()],
            date(2024, 3, 10),
            InstallmentMatch::Exact,
        );
        assert_eq!(exact[0].payment_id, None);

        let substring = build_installment_schedule(
            &s,
            &[only_eleven],
            date(2024, 3, 10),
            InstallmentMatch::Substring,
        );
        assert_eq!(substring[0].payment_id, Some(5));
    }

    #[test]
    fn test_timing_windows() {
        let due = date(2024, 5, 31);
        assert_eq!(
            PaymentTiming::classify(due, due - Duration::days(29)),
            PaymentTiming::TwoPointWindow
        );
        assert_eq!(
            PaymentTiming::classify(due, due - Duration::days(3)),
            PaymentTiming::TwoPointWindow
        );
        assert_eq!(
            PaymentTiming::classify(due, due - Duration::days(2)),
            PaymentTiming::OnePointWindow
        );
        assert_eq!(
            PaymentTiming::classify(due, due + Duration::days(5)),
            PaymentTiming::OnePointWindow
        );
        assert_eq!(
            PaymentTiming::classify(due, due + Duration::days(6)),
            PaymentTiming::Outside
        );
        assert_eq!(
            PaymentTiming::classify(due, due - Duration::days(30)),
            PaymentTiming::Outside
        );
    }
}
