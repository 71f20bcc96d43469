//! Payment & loyalty ledger.
//!
//! Pure, synchronous rules over already-fetched records: payment
//! classification with points/penalty, redemption guards, coverage status
//! and the 12-slot installment schedule. Nothing in here touches the
//! database or reads the wall clock; `today` is always passed in.

pub mod classification;
pub mod coverage;
pub mod installments;
pub mod redemption;
pub mod schedule;

pub use classification::*;
pub use coverage::*;
pub use installments::*;
pub use redemption::*;
pub use schedule::*;

#[cfg(test)]
pub(crate) mod testing;
