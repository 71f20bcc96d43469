pub mod clock;
pub mod jwt;
pub mod password;
pub mod phone;
pub mod receipt_number;

pub use clock::*;
pub use jwt::*;
pub use password::*;
pub use phone::*;
pub use receipt_number::next_receipt_number;
