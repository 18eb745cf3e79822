use std::convert::Infallible;

use twine_core::Model;
use uom::{
    ConstZero,
    si::f64::{MassRate, Power, Ratio},
};

use crate::{
    models::hvac::dual_duct::core::{
        config::SolverConfig,
        context::ZoneDemand,
        lane::FlowState,
        mixing::{distinct, flow_for_load, larger, sensible, smaller},
    },
    support::{
        constraint::{Constrained, UnitInterval},
        psychrometrics,
    },
};

use super::{HotColdMix, ZoneAir, cold_share, hot_cold_dampers, settle};

/// Inputs to one variable-volume step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariableVolumeInput {
    /// Availability schedule value; exactly zero turns the unit off.
    pub schedule_value: f64,
    pub demand: ZoneDemand,
    pub zone: ZoneAir,
    pub hot: FlowState,
    pub cold: FlowState,
    pub zone_min_air_fraction: Constrained<f64, UnitInterval>,
    /// Supply flow that carries the zone's outdoor-air requirement.
    pub outdoor_air_floor: MassRate,
    /// Outdoor-air fraction of the serving air loop.
    pub air_loop_outdoor_air_fraction: Ratio,
}

/// Solved state of a variable-volume terminal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariableVolumeMix {
    pub mix: HotColdMix,
    /// Outdoor air carried in the supply, at the air loop's OA fraction.
    pub outdoor_air_flow: MassRate,
}

/// Variable-volume dual-duct mixer.
///
/// Total flow follows the zone load between a minimum-fraction floor and
/// the available maximum of the duct that serves the load, raised to the
/// outdoor-air floor. The split then works as in the constant-volume mixer,
/// with near-zero lanes snapped to zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct VariableVolumeMixer {
    config: SolverConfig,
}

impl VariableVolumeMixer {
    #[must_use]
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }
}

impl Model for VariableVolumeMixer {
    type Input = VariableVolumeInput;
    type Output = VariableVolumeMix;
    type Error = Infallible;

    fn call(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
        Ok(solve(input, &self.config))
    }
}

fn solve(input: &VariableVolumeInput, config: &SolverConfig) -> VariableVolumeMix {
    let mut hot = input.hot;
    let mut cold = input.cold;
    let load = input.demand.remaining_output;
    let total = total_flow(input, config);

    if total > config.small_mass_flow {
        let raw = cold_share(load, total, input.zone, &hot, &cold, config);
        cold.mass_flow = if raw > cold.max_avail {
            cold.max_avail
        } else if raw < MassRate::ZERO {
            MassRate::ZERO
        } else {
            smaller(raw, total)
        };
        hot.mass_flow = total - cold.mass_flow;

        if hot.mass_flow < config.mass_flow_set_tolerance {
            hot.mass_flow = MassRate::ZERO;
            cold.mass_flow = smaller(total, cold.max_avail);
        } else if cold.mass_flow < config.mass_flow_set_tolerance {
            cold.mass_flow = MassRate::ZERO;
            hot.mass_flow = total;
        }
        hot.mass_flow = smaller(hot.mass_flow, hot.max_avail);
    } else {
        hot.mass_flow = MassRate::ZERO;
        cold.mass_flow = MassRate::ZERO;
    }

    let (total, air) = settle(&mut hot, &mut cold, config);
    let (hot_damper, cold_damper) = hot_cold_dampers(&hot, &cold);
    let min_fraction = input.zone_min_air_fraction.into_inner();

    VariableVolumeMix {
        mix: HotColdMix {
            hot_flow: hot.mass_flow,
            cold_flow: cold.mass_flow,
            outlet: air.outlet(total, total, hot.max * min_fraction),
            hot_damper,
            cold_damper,
        },
        // Delivered total, after the hot cap and near-zero snapping.
        outdoor_air_flow: total * input.air_loop_outdoor_air_fraction,
    }
}

/// Total supply flow before the hot/cold split.
fn total_flow(input: &VariableVolumeInput, config: &SolverConfig) -> MassRate {
    let hot = &input.hot;
    let cold = &input.cold;
    let load = input.demand.remaining_output;
    let min_fraction = input.zone_min_air_fraction.into_inner();

    let cp_zone = psychrometrics::specific_heat(input.zone.humidity_ratio);
    let s_zone = sensible(cp_zone, input.zone.temperature);

    if input.schedule_value == 0.0 {
        MassRate::ZERO
    } else if load > Power::ZERO && hot.max_avail > MassRate::ZERO {
        let s_hot = sensible(cp_zone, hot.temperature);
        let flow = if distinct(s_hot, s_zone, cp_zone, config) {
            flow_for_load(load, s_hot, s_zone)
        } else {
            hot.max_avail
        };

        let floor = hot.max * min_fraction;
        let flow = if flow <= floor {
            larger(floor, hot.min_avail)
        } else if flow >= hot.max_avail {
            hot.max_avail
        } else {
            flow
        };
        limit(flow, input, hot.max_avail)
    } else if load < Power::ZERO && cold.max_avail > MassRate::ZERO {
        let s_cold = sensible(cp_zone, cold.temperature);
        let flow = if distinct(s_cold, s_zone, cp_zone, config) {
            flow_for_load(load, s_cold, s_zone)
        } else {
            cold.max_avail
        };

        // A negative flow means the cold deck is warmer than the zone.
        let floor = cold.max * min_fraction;
        let flow = if flow <= floor && flow >= MassRate::ZERO {
            larger(floor, cold.min_avail)
        } else if flow < MassRate::ZERO || flow >= cold.max_avail {
            cold.max_avail
        } else {
            flow
        };
        limit(flow, input, cold.max_avail)
    } else if hot.max_avail > MassRate::ZERO || cold.max_avail > MassRate::ZERO {
        let flow = hot.max / 2.0 * min_fraction + cold.max / 2.0 * min_fraction;
        limit(flow, input, hot.max_avail + cold.max_avail)
    } else {
        MassRate::ZERO
    }
}

/// Applies the supply-air adjustment, the outdoor-air floor and the cap.
fn limit(flow: MassRate, input: &VariableVolumeInput, cap: MassRate) -> MassRate {
    let factor = input.demand.supply_air_adjust_factor;
    let flow = if factor > 1.0 { flow * factor } else { flow };
    smaller(larger(flow, input.outdoor_air_floor), cap)
}
