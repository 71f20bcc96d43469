use crate::entities::{payment_entity, redemption_entity};
use crate::error::ValidationError;

/// Points earned on installment payments minus points already redeemed.
///
/// The raw figure may go negative when past payments were edited downwards;
/// guards use it as-is and only the displayed value is clamped.
pub fn available_points(
    payments: &[payment_entity::Model],
    redemptions: &[redemption_entity::Model],
) -> i64 {
    let earned: i64 = payments
        .iter()
        .filter(|p| !p.is_enrollment_fee)
        .map(|p| i64::from(p.points))
        .sum();
    let spent: i64 = redemptions.iter().map(|r| i64::from(r.points_spent)).sum();
    earned - spent
}

/// Balance as shown to staff.
pub fn displayed_points(available: i64) -> i64 {
    available.max(0)
}

/// Checks a redemption request against the current raw balance.
pub fn validate_redemption(
    points_spent: i32,
    reason: &str,
    available: i64,
) -> Result<(), ValidationError> {
    if points_spent <= 0 {
        return Err(ValidationError::new(
            "points_spent",
            "points to redeem must be greater than 0",
        ));
    }
    if reason.trim().is_empty() {
        return Err(ValidationError::new("reason", "a reason is required"));
    }
    if i64::from(points_spent) > available {
        return Err(ValidationError::new(
            "points_spent",
            format!(
                "insufficient points: {} available, {} requested",
                displayed_points(available),
                points_spent
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::testing::{redemption, scored_payment};

    #[test]
    fn test_enrollment_points_are_ignored() {
        let mut enrollment = scored_payment(3, 3);
        enrollment.is_enrollment_fee = true;
        let payments = [scored_payment(1, 3), scored_payment(2, 2), enrollment];
        assert_eq!(available_points(&payments, &[redemption(1, 1)]), 4);
    }

    #[test]
    fn test_balance_walkthrough() {
        let payments = [scored_payment(1, 3), scored_payment(2, 2)];
        assert_eq!(available_points(&payments, &[]), 5);

        assert!(validate_redemption(4, "Book discount", 5).is_ok());
        let after = available_points(&payments, &[redemption(1, 4)]);
        assert_eq!(after, 1);

        let err = validate_redemption(2, "Book discount", after).unwrap_err();
        assert_eq!(err.field, "points_spent");
        assert!(err.message.contains("1 available"));
        assert_eq!(available_points(&payments, &[redemption(1, 4)]), 1);
    }

    #[test]
    fn test_rejects_bad_requests() {
        assert_eq!(validate_redemption(0, "x", 10).unwrap_err().field, "points_spent");
        assert_eq!(validate_redemption(-2, "x", 10).unwrap_err().field, "points_spent");
        assert_eq!(validate_redemption(1, "   ", 10).unwrap_err().field, "reason");
    }

    #[test]
    fn test_negative_raw_balance_blocks_and_displays_zero() {
        let payments = [scored_payment(1, 1)];
        let available = available_points(&payments, &[redemption(1, 3)]);
        assert_eq!(available, -2);
        assert_eq!(displayed_points(available), 0);
        assert!(validate_redemption(1, "Snacks", available).is_err());
    }
}
