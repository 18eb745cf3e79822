//! # Twine Air Terminals
//!
//! Zone air terminal models for [Twine](https://github.com/isentropic-dev/twine),
//! starting with the dual-duct family: constant-volume, VAV, and VAV with a
//! dedicated outdoor-air duct.
//!
//! ## Crate layout
//!
//! - [`models`]: Domain-specific [`twine_core::Model`] implementations and the
//!   terminal store that drives them step by step.
//! - [`support`]: Supporting utilities used by models.
//!
//! ## Utility code lifecycle
//!
//! Modules in [`support`] are part of the public API because they're useful,
//! but their APIs are not stable. Breaking changes may occur as needed.
//!
//! Utility code starts in a model's internal `core` module and only moves to
//! [`support`] once it is useful across models (psychrometrics, units,
//! numeric constraints).

pub mod models;
pub mod support;
