use crate::error::{AppError, AppResult, ValidationError};
use bcrypt::{DEFAULT_COST, hash, verify};

/// Checks length (8-128) and that upper case, lower case and a digit are present.
pub fn validate_password(password: &str) -> AppResult<()> {
    let length = password.chars().count();
    if !(8..=128).contains(&length) {
        return Err(ValidationError::new(
            "password",
            "password must be between 8 and 128 characters",
        )
        .into());
    }

    let has_lowercase = password.chars().any(|c| c.is_lowercase());
    let has_uppercase = password.chars().any(|c| c.is_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if !has_lowercase || !has_uppercase || !has_digit {
        return Err(ValidationError::new(
            "password",
            "password must mix upper case, lower case and digits",
        )
        .into());
    }

    Ok(())
}

pub fn hash_password(password: &str) -> AppResult<String> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::InternalError(format!("password hashing failed: {e}")))
}

pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    verify(password, hash)
        .map_err(|e| AppError::InternalError(format!("password verification failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password() {
        assert!(validate_password("Password123").is_ok());
        assert!(validate_password("password123").is_err()); // no upper case
        assert!(validate_password("PASSWORD123").is_err()); // no lower case
        assert!(validate_password("Password").is_err()); // no digit
        assert!(validate_password("Pass123").is_err()); // too short
    }

    #[test]
    fn test_password_error_names_the_field() {
        match validate_password("short") {
            Err(AppError::InvalidField(err)) => assert_eq!(err.field, "password"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_hash_and_verify_password() {
        let password = "Password123";
        let hashed = hash_password(password).unwrap();

        assert!(verify_password(password, &hashed).unwrap());
        assert!(!verify_password("WrongPassword", &hashed).unwrap());
    }
}
