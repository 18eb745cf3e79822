//! Supporting utilities shared across models.
//!
//! - [`constraint`]: Type-level numeric invariants (non-negative flows,
//!   unit-interval fractions and damper positions).
//! - [`psychrometrics`]: Moist-air property relations.
//! - [`units`]: Extensions to [`uom`].

pub mod constraint;
pub mod psychrometrics;
pub mod units;
