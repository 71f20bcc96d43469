use crate::entities::payment_entity;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// More than this many days of remaining coverage counts as up to date.
pub const DUE_SOON_DAYS: i64 = 10;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CoverageStatus {
    UpToDate,
    DueSoon,
    Overdue,
    NoPayments,
}

impl std::fmt::Display for CoverageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoverageStatus::UpToDate => write!(f, "up_to_date"),
            CoverageStatus::DueSoon => write!(f, "due_soon"),
            CoverageStatus::Overdue => write!(f, "overdue"),
            CoverageStatus::NoPayments => write!(f, "no_payments"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct Coverage {
    pub status: CoverageStatus,
    /// Latest `valid_until` across the student's payments
    pub valid_until: Option<NaiveDate>,
    /// Negative once coverage has lapsed
    pub days_remaining: Option<i64>,
}

impl Coverage {
    pub fn can_take_exam(&self) -> bool {
        matches!(
            self.status,
            CoverageStatus::UpToDate | CoverageStatus::DueSoon
        )
    }
}

/// Derives a student's coverage from the furthest `valid_until` they have paid
/// through. Enrollment fees do not extend coverage.
pub fn coverage_status(payments: &[payment_entity::Model], today: NaiveDate) -> Coverage {
    let latest = payments
        .iter()
        .filter(|p| !p.is_enrollment_fee)
        .filter_map(|p| p.valid_until)
        .max();
    coverage_from(latest, today)
}

/// Classifies an already-aggregated latest `valid_until`.
pub fn coverage_from(latest_valid_until: Option<NaiveDate>, today: NaiveDate) -> Coverage {
    let Some(valid_until) = latest_valid_until else {
        return Coverage {
            status: CoverageStatus::NoPayments,
            valid_until: None,
            days_remaining: None,
        };
    };

    let days_remaining = (valid_until - today).num_days();
    let status = if days_remaining > DUE_SOON_DAYS {
        CoverageStatus::UpToDate
    } else if days_remaining >= 0 {
        CoverageStatus::DueSoon
    } else {
        CoverageStatus::Overdue
    };

    Coverage {
        status,
        valid_until: Some(valid_until),
        days_remaining: Some(days_remaining),
    }
}

/// Exam eligibility follows coverage.
pub fn can_take_exam(payments: &[payment_entity::Model], today: NaiveDate) -> bool {
    coverage_status(payments, today).can_take_exam()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::testing::payment;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 8, 15).unwrap()
    }

    fn covered_until(days: i64) -> payment_entity::Model {
        let mut p = payment(1, today());
        p.valid_until = Some(today() + Duration::days(days));
        p
    }

    #[test]
    fn test_threshold_edges() {
        let cases = [
            (11, CoverageStatus::UpToDate, true),
            (10, CoverageStatus::DueSoon, true),
            (0, CoverageStatus::DueSoon, true),
            (-1, CoverageStatus::Overdue, false),
        ];
        for (days, status, exam) in cases {
            let coverage = coverage_status(&[covered_until(days)], today());
            assert_eq!(coverage.status, status, "days = {days}");
            assert_eq!(coverage.days_remaining, Some(days));
            assert_eq!(coverage.can_take_exam(), exam);
        }
    }

    #[test]
    fn test_no_coverage_dates_means_no_payments() {
        let coverage = coverage_status(&[], today());
        assert_eq!(coverage.status, CoverageStatus::NoPayments);
        assert!(!coverage.can_take_exam());

        let undated = payment(1, today());
        let mut enrollment = covered_until(60);
        enrollment.is_enrollment_fee = true;
        assert_eq!(
            coverage_status(&[undated, enrollment], today()).status,
            CoverageStatus::NoPayments
        );
    }

    #[test]
    fn test_latest_valid_until_wins() {
        let payments = [covered_until(-20), covered_until(40), covered_until(5)];
        let coverage = coverage_status(&payments, today());
        assert_eq!(coverage.status, CoverageStatus::UpToDate);
        assert_eq!(coverage.valid_until, Some(today() + Duration::days(40)));
        assert!(can_take_exam(&payments, today()));
    }
}
