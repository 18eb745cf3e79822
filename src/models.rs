//! Public Twine models.
//!
//! Models are the primary public interface of this crate.
//!
//! # Organization
//!
//! Models are organized into domain-specific submodules (currently only
//! `hvac`) based on an opinionated taxonomy. This organization may evolve as
//! more models are added.
//!
//! # Model structure
//!
//! Each model lives in its own module and contains an internal `core` submodule
//! where the actual computation and domain logic lives. The `core` module is an
//! implementation detail; the parent module re-exports the pieces that form
//! the public API.
//!
//! Solvers are exposed as [`twine_core::Model`] implementations that are pure
//! functions of their input. Anything stateful (history buffers, node tables,
//! lazily sized design flows) lives in a store that calls those models.

pub mod hvac;
