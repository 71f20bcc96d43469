pub mod bank_accounts;
pub mod campuses;
pub mod careers;
pub mod deletion_requests;
pub mod expenses;
pub mod payments;
pub mod redemptions;
pub mod staff_attendance;
pub mod staff_members;
pub mod students;
pub mod subjects;
pub mod users;

pub use bank_accounts as bank_account_entity;
pub use campuses as campus_entity;
pub use careers as career_entity;
pub use deletion_requests as deletion_request_entity;
pub use expenses as expense_entity;
pub use payments as payment_entity;
pub use redemptions as redemption_entity;
pub use staff_attendance as staff_attendance_entity;
pub use staff_members as staff_member_entity;
pub use students as student_entity;
pub use subjects as subject_entity;
pub use users as user_entity;

pub use careers::CareerKind;
pub use deletion_requests::{DeletionStatus, DeletionTargetKind};
pub use expenses::ExpenseCategory;
pub use payments::PaymentMethod;
pub use staff_members::StaffRole;
