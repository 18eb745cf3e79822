//! HVAC air-side models.
//!
//! This module contains zone-level air distribution equipment.

pub mod dual_duct;
