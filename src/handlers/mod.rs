pub mod auth;
pub mod campus;
pub mod career;
pub mod deletion_request;
pub mod expense;
pub mod health;
pub mod payment;
pub mod report;
pub mod staff;
pub mod student;
pub mod subject;
pub mod user;

pub use auth::auth_config;
pub use campus::campus_config;
pub use career::career_config;
pub use deletion_request::deletion_request_config;
pub use expense::expense_config;
pub use health::health_config;
pub use payment::payment_config;
pub use report::report_config;
pub use staff::staff_config;
pub use student::student_config;
pub use subject::subject_config;
pub use user::user_config;

use crate::models::DeletionOutcome;
use actix_web::HttpResponse;
use serde_json::json;

/// Direct deletions answer 200; filed requests answer 202 since the record
/// stays until an administrator decides.
pub(crate) fn deletion_response(outcome: DeletionOutcome) -> HttpResponse {
    let mut builder = match outcome {
        DeletionOutcome::Deleted { .. } => HttpResponse::Ok(),
        DeletionOutcome::Requested { .. } => HttpResponse::Accepted(),
    };
    builder.json(json!({
        "success": true,
        "data": outcome
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DeletionTarget;
    use actix_web::http::StatusCode;

    #[test]
    fn test_direct_deletion_answers_ok() {
        let response = deletion_response(DeletionOutcome::Deleted {
            target: DeletionTarget::Expense(3),
        });
        assert_eq!(response.status(), StatusCode::OK);
    }
}
