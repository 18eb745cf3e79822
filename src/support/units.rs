//! Extensions to [`uom`].
//!
//! This crate uses [`uom`] for all physical units (flows, temperatures, loads).
//! This module provides extensions that are useful for modeling but aren't included in [`uom`].
//!
//! ## Temperature differences
//!
//! The [`TemperatureDifference`] trait provides a [`minus`](TemperatureDifference::minus) method
//! for subtracting one absolute temperature from another to get a temperature interval:
//!
//! ```
//! use uom::si::f64::ThermodynamicTemperature;
//! use uom::si::thermodynamic_temperature::degree_celsius;
//! use twine_air_terminals::support::units::TemperatureDifference;
//!
//! let supply = ThermodynamicTemperature::new::<degree_celsius>(13.0);
//! let zone = ThermodynamicTemperature::new::<degree_celsius>(24.0);
//! let delta_t = supply.minus(zone);
//! // delta_t is a TemperatureInterval, not a ThermodynamicTemperature
//! ```
//!
//! ## Celsius-referenced quantities
//!
//! Moist-air enthalpy and the sensible heat terms used in terminal energy
//! balances are referenced to 0 °C. [`TemperatureDifference::above_freezing`]
//! returns that offset as an interval.

mod quantities;
mod temperature_difference;

pub use quantities::SpecificEnthalpy;
pub use temperature_difference::TemperatureDifference;
