//! Fixture builders shared by ledger and service tests.

use crate::entities::{
    CareerKind, PaymentMethod, career_entity, payment_entity, redemption_entity, student_entity,
};
use chrono::{NaiveDate, TimeZone, Utc};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn career(kind: CareerKind, enrollment_fee: i64, monthly_fee: i64) -> career_entity::Model {
    career_entity::Model {
        id: 10,
        name: "Enfermería".into(),
        kind,
        duration_months: 24,
        description: String::new(),
        enrollment_fee,
        monthly_fee,
        active: true,
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    }
}

pub fn student(career_id: i64, start_date: Option<NaiveDate>) -> student_entity::Model {
    student_entity::Model {
        id: 1,
        campus_id: 1,
        career_id,
        first_name: "Ana".into(),
        last_name: "Benítez".into(),
        national_id: "4567890".into(),
        phone: "+595981123456".into(),
        birth_date: None,
        start_date,
        current_course: 1,
        emergency_contact: None,
        active: true,
        created_at: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
    }
}

/// Installment payment for student 1 with no due date, points or coverage.
pub fn payment(id: i64, payment_date: NaiveDate) -> payment_entity::Model {
    payment_entity::Model {
        id,
        campus_id: 1,
        reference_code: Some(format!("{id:06}")),
        student_id: Some(1),
        career_id: Some(10),
        is_enrollment_fee: false,
        client_name: None,
        payment_method: PaymentMethod::Cash,
        bank_account_id: None,
        payment_date,
        due_date: None,
        valid_until: None,
        unit_amount: Some(500_000),
        installment_count: 1,
        amount_paid: 500_000,
        installment_numbers: None,
        points: 0,
        has_penalty: false,
        concept: None,
        notes: None,
        registered_by: Some(1),
        created_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
    }
}

pub fn scored_payment(id: i64, points: i32) -> payment_entity::Model {
    let mut p = payment(id, date(2024, 3, 1));
    p.points = points;
    p
}

pub fn redemption(id: i64, points_spent: i32) -> redemption_entity::Model {
    redemption_entity::Model {
        id,
        student_id: 1,
        points_spent,
        reason: "Uniform discount".into(),
        registered_by: Some(1),
        created_at: Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap(),
    }
}
