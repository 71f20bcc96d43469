pub mod auth_service;
pub mod campus_service;
pub mod career_service;
pub mod deletion_request_service;
pub mod expense_service;
pub(crate) mod lookup;
pub mod payment_service;
pub mod redemption_service;
pub mod report_service;
pub mod staff_service;
pub mod student_service;
pub mod user_service;

pub use auth_service::*;
pub use campus_service::*;
pub use career_service::*;
pub use deletion_request_service::*;
pub use expense_service::*;
pub use payment_service::PaymentService;
pub use redemption_service::*;
pub use report_service::*;
pub use staff_service::*;
pub use student_service::*;
pub use user_service::*;
