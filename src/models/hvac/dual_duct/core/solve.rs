//! Per-step flow solvers for the three terminal variants.
//!
//! Each solver is a pure function of its input and a [`SolverConfig`],
//! exposed as a [`twine_core::Model`]. State that persists between steps
//! (the recirculation history, node tables) stays with the caller.

mod constant_volume;
mod outdoor_air;
mod variable_volume;

pub use constant_volume::{ConstantVolumeInput, ConstantVolumeMixer};
pub use outdoor_air::{OutdoorAirInput, OutdoorAirMix, OutdoorAirMixer, RecirculatedInput};
pub use variable_volume::{VariableVolumeInput, VariableVolumeMix, VariableVolumeMixer};

use uom::{
    ConstZero,
    si::f64::{MassRate, Power, Ratio, ThermodynamicTemperature},
};

use crate::support::{
    constraint::{Constrained, UnitInterval},
    psychrometrics,
    units::TemperatureDifference,
};

use super::{
    config::SolverConfig,
    lane::FlowState,
    mixing::{MixedAir, damper_position, sensible},
};

/// Air condition at the zone node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneAir {
    pub temperature: ThermodynamicTemperature,
    pub humidity_ratio: Ratio,
}

/// Solved state of a hot/cold terminal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HotColdMix {
    pub hot_flow: MassRate,
    pub cold_flow: MassRate,
    pub outlet: FlowState,
    pub hot_damper: Constrained<f64, UnitInterval>,
    pub cold_damper: Constrained<f64, UnitInterval>,
}

/// Unclamped cold-duct flow that meets `load` with `total` supply flow.
///
/// Falls back to an all-hot or all-cold split when the duct temperatures
/// are too close to divide by.
fn cold_share(
    load: Power,
    total: MassRate,
    zone: ZoneAir,
    hot: &FlowState,
    cold: &FlowState,
    config: &SolverConfig,
) -> MassRate {
    if cold.temperature.minus(hot.temperature).abs() > config.small_temperature_difference {
        let cp = psychrometrics::specific_heat(zone.humidity_ratio);
        let s_zone = sensible(cp, zone.temperature);
        let s_hot = sensible(cp, hot.temperature);
        let s_cold = sensible(cp, cold.temperature);
        (load + total * (s_zone - s_hot)) / (s_cold - s_hot)
    } else if load > Power::ZERO && hot.mass_flow > MassRate::ZERO {
        MassRate::ZERO
    } else {
        total
    }
}

/// Mixes two lanes at their solved flows.
///
/// At or below the negligible total both lane flows are zeroed and the
/// outlet takes the arithmetic mean of the lanes.
fn settle(a: &mut FlowState, b: &mut FlowState, config: &SolverConfig) -> (MassRate, MixedAir) {
    let total = a.mass_flow + b.mass_flow;
    if total > config.small_mass_flow {
        (total, MixedAir::weighted(a, b, total))
    } else {
        a.mass_flow = MassRate::ZERO;
        b.mass_flow = MassRate::ZERO;
        (MassRate::ZERO, MixedAir::stagnant(a, b))
    }
}

/// Hot and cold damper positions; both zero if either design maximum is zero.
fn hot_cold_dampers(
    hot: &FlowState,
    cold: &FlowState,
) -> (Constrained<f64, UnitInterval>, Constrained<f64, UnitInterval>) {
    if hot.max == MassRate::ZERO || cold.max == MassRate::ZERO {
        (UnitInterval::zero(), UnitInterval::zero())
    } else {
        (
            damper_position(hot.mass_flow, hot.max),
            damper_position(cold.mass_flow, cold.max),
        )
    }
}
