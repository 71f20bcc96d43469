pub mod actor;
pub mod campus;
pub mod career;
pub mod common;
pub mod deletion_request;
pub mod expense;
pub mod pagination;
pub mod payment;
pub mod redemption;
pub mod report;
pub mod staff;
pub mod student;
pub mod subject;
pub mod user;

pub use actor::*;
pub use campus::*;
pub use career::*;
pub use common::*;
pub use deletion_request::*;
pub use expense::*;
pub use pagination::*;
pub use payment::*;
pub use redemption::*;
pub use report::*;
pub use staff::*;
pub use student::*;
pub use subject::*;
pub use user::*;
