use std::convert::Infallible;

use twine_core::Model;
use uom::{
    ConstZero,
    si::f64::{MassRate, Power},
};

use crate::models::hvac::dual_duct::core::{
    config::SolverConfig,
    lane::FlowState,
    mixing::{clamp_flow, smaller},
};

use super::{HotColdMix, ZoneAir, cold_share, hot_cold_dampers, settle};

/// Inputs to one constant-volume step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantVolumeInput {
    /// Availability schedule value; the unit runs when positive.
    pub schedule_value: f64,
    /// Remaining zone load, positive for heating.
    pub remaining_load: Power,
    pub zone: ZoneAir,
    pub hot: FlowState,
    pub cold: FlowState,
}

/// Constant-volume dual-duct mixer.
///
/// Total flow is fixed at the mean of the two ducts' available maxima. The
/// cold share comes from an energy balance on the zone and the hot duct
/// takes the rest, each within its availability bounds.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConstantVolumeMixer {
    config: SolverConfig,
}

impl ConstantVolumeMixer {
    #[must_use]
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }
}

impl Model for ConstantVolumeMixer {
    type Input = ConstantVolumeInput;
    type Output = HotColdMix;
    type Error = Infallible;

    fn call(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
        Ok(solve(input, &self.config))
    }
}

fn solve(input: &ConstantVolumeInput, config: &SolverConfig) -> HotColdMix {
    let mut hot = input.hot;
    let mut cold = input.cold;

    let total = if input.schedule_value > 0.0 {
        hot.max_avail / 2.0 + cold.max_avail / 2.0
    } else {
        MassRate::ZERO
    };

    if total > config.small_mass_flow {
        let raw = cold_share(input.remaining_load, total, input.zone, &hot, &cold, config);
        cold.mass_flow = clamp_flow(raw, cold.min_avail, cold.max_avail);
        hot.mass_flow = clamp_flow(total - cold.mass_flow, hot.min_avail, hot.max_avail);
    } else {
        hot.mass_flow = MassRate::ZERO;
        cold.mass_flow = MassRate::ZERO;
    }

    let (total, air) = settle(&mut hot, &mut cold, config);
    let (hot_damper, cold_damper) = hot_cold_dampers(&hot, &cold);

    HotColdMix {
        hot_flow: hot.mass_flow,
        cold_flow: cold.mass_flow,
        outlet: air.outlet(total, total, smaller(hot.min_avail, cold.min_avail)),
        hot_damper,
        cold_damper,
    }
}
