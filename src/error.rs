use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

/// Field-level rejection produced by the ledger and request checks.
///
/// The caller re-presents the submitted input with `message` attached to `field`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Validation error: {0}")]
    InvalidField(#[from] ValidationError),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Auth error: {0}")]
    AuthError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Permission denied")]
    PermissionDenied,

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

impl AppError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) | AppError::InvalidField(_) => "VALIDATION_ERROR",
            AppError::Conflict(_) => "CONFLICT",
            AppError::AuthError(_) | AppError::JwtError(_) => "AUTH_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::PermissionDenied => "FORBIDDEN",
            AppError::ConfigError(_) => "CONFIGURATION_ERROR",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::InternalError(_) | AppError::SerdeJsonError(_) => "INTERNAL_ERROR",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;
        match self {
            AppError::ValidationError(_) | AppError::InvalidField(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::AuthError(_) | AppError::JwtError(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::PermissionDenied | AppError::ConfigError(_) => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let (message, field) = match self {
            AppError::ValidationError(msg) => {
                log::warn!("Validation error: {msg}");
                (msg.clone(), None)
            }
            AppError::InvalidField(err) => {
                log::warn!("Validation error on {}: {}", err.field, err.message);
                (err.message.clone(), Some(err.field))
            }
            AppError::Conflict(msg) => {
                log::warn!("Conflict: {msg}");
                (msg.clone(), None)
            }
            AppError::AuthError(msg) => {
                log::warn!("Authentication error: {msg}");
                (msg.clone(), None)
            }
            AppError::JwtError(err) => {
                log::warn!("Token rejected: {err}");
                ("Invalid or expired token".to_string(), None)
            }
            AppError::NotFound(msg) => (msg.clone(), None),
            AppError::PermissionDenied => {
                log::warn!("Permission denied");
                ("Permission denied".to_string(), None)
            }
            AppError::ConfigError(msg) => {
                log::warn!("Configuration error, operator follow-up required: {msg}");
                (msg.clone(), None)
            }
            AppError::DatabaseError(err) => {
                log::error!("Database error: {err}");
                ("Database error".to_string(), None)
            }
            _ => {
                log::error!("Internal error: {self}");
                ("Internal server error".to_string(), None)
            }
        };

        let mut error = json!({
            "code": self.error_code(),
            "message": message,
        });
        if let Some(field) = field {
            error["field"] = json!(field);
        }

        HttpResponse::build(self.status_code()).json(json!({
            "success": false,
            "error": error
        }))
    }
}
