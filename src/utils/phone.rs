use crate::error::{AppError, AppResult, ValidationError};
use regex::Regex;

/// Paraguayan numbers in international form: +595 followed by 8 or 9 digits.
const PY_PHONE_PATTERN: &str = r"^\+595\d{8,9}$";

/// Checks that a phone number is already in `+595` international form.
pub fn validate_py_phone(phone: &str) -> AppResult<()> {
    let phone_regex =
        Regex::new(PY_PHONE_PATTERN).map_err(|e| AppError::InternalError(e.to_string()))?;

    if !phone_regex.is_match(phone) {
        return Err(ValidationError::new(
            "phone",
            "invalid phone number, expected a Paraguayan number such as +595981123456",
        )
        .into());
    }

    Ok(())
}

/// Rewrites local formats ("0981 123 456", "981123456", "595981123456") as `+595...`.
/// Anything unrecognised is returned trimmed and left for validation to reject.
pub fn format_py_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.starts_with("595") && (11..=12).contains(&digits.len()) {
        format!("+{digits}")
    } else if let Some(local) = digits.strip_prefix('0')
        && (8..=9).contains(&local.len())
    {
        format!("+595{local}")
    } else if (8..=9).contains(&digits.len()) && !digits.starts_with('0') {
        format!("+595{digits}")
    } else {
        phone.trim().to_string()
    }
}

/// Normalizes then validates.
pub fn normalize_py_phone(phone: &str) -> AppResult<String> {
    let formatted = format_py_phone(phone);
    validate_py_phone(&formatted)?;
    Ok(formatted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_py_phone() {
        assert!(validate_py_phone("+595981123456").is_ok());
        assert!(validate_py_phone("+59521555123").is_ok());
        assert!(validate_py_phone("0981123456").is_err());
        assert!(validate_py_phone("+12345678901").is_err());
    }

    #[test]
    fn test_format_py_phone() {
        assert_eq!(format_py_phone("0981 123 456"), "+595981123456");
        assert_eq!(format_py_phone("981123456"), "+595981123456");
        assert_eq!(format_py_phone("595981123456"), "+595981123456");
        assert_eq!(format_py_phone("+595 981 123-456"), "+595981123456");
        assert_eq!(format_py_phone("(021) 555-123"), "+59521555123");
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        assert!(normalize_py_phone("12").is_err());
        assert_eq!(normalize_py_phone("0981123456").unwrap(), "+595981123456");
    }
}
