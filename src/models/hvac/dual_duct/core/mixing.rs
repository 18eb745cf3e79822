//! Energy-balance terms and two-stream mixing shared by the solvers.

use uom::{
    ConstZero,
    si::{
        f64::{MassRate, Power, Ratio, SpecificHeatCapacity, ThermodynamicTemperature},
        ratio::ratio,
    },
};

use crate::support::{
    constraint::{Constrained, UnitInterval},
    psychrometrics,
    units::{SpecificEnthalpy, TemperatureDifference},
};

use super::{config::SolverConfig, lane::FlowState};

/// Sensible heat content `cp · T` with `T` measured from 0 °C.
pub(super) fn sensible(cp: SpecificHeatCapacity, t: ThermodynamicTemperature) -> SpecificEnthalpy {
    cp * t.above_freezing()
}

/// Whether two sensible terms differ by more than the degenerate threshold.
///
/// The gap is compared as a temperature by dividing by the zone `cp`.
pub(super) fn distinct(
    supply: SpecificEnthalpy,
    zone: SpecificEnthalpy,
    cp_zone: SpecificHeatCapacity,
    config: &SolverConfig,
) -> bool {
    ((supply - zone) / cp_zone).abs() > config.small_temperature_difference
}

/// Mass flow of supply air that delivers `load` to the zone.
///
/// Callers must check [`distinct`] first.
pub(super) fn flow_for_load(
    load: Power,
    supply: SpecificEnthalpy,
    zone: SpecificEnthalpy,
) -> MassRate {
    load / (supply - zone)
}

/// Caps `flow` at `max`, or raises it to `min` when below.
///
/// `max` wins when the bounds cross.
pub(super) fn clamp_flow(flow: MassRate, min: MassRate, max: MassRate) -> MassRate {
    if flow > max {
        max
    } else if flow < min {
        min
    } else {
        flow
    }
}

pub(super) fn larger(a: MassRate, b: MassRate) -> MassRate {
    if b > a { b } else { a }
}

pub(super) fn smaller(a: MassRate, b: MassRate) -> MassRate {
    if b < a { b } else { a }
}

/// Damper position of a lane: flow over design maximum.
///
/// Zero when the design maximum is zero.
pub(super) fn damper_position(flow: MassRate, max: MassRate) -> Constrained<f64, UnitInterval> {
    if max == MassRate::ZERO {
        UnitInterval::zero()
    } else {
        UnitInterval::saturating((flow / max).get::<ratio>())
    }
}

/// Air condition of a mixed stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct MixedAir {
    pub humidity_ratio: Ratio,
    pub enthalpy: SpecificEnthalpy,
}

impl MixedAir {
    /// Flow-weighted mean of two lanes at their current mass flows.
    pub(super) fn weighted(a: &FlowState, b: &FlowState, total: MassRate) -> Self {
        Self {
            humidity_ratio: (a.humidity_ratio * a.mass_flow + b.humidity_ratio * b.mass_flow)
                / total,
            enthalpy: (a.enthalpy * a.mass_flow + b.enthalpy * b.mass_flow) / total,
        }
    }

    /// Arithmetic mean of two lanes, for a stagnant outlet.
    pub(super) fn stagnant(a: &FlowState, b: &FlowState) -> Self {
        Self {
            humidity_ratio: (a.humidity_ratio + b.humidity_ratio) / 2.0,
            enthalpy: (a.enthalpy + b.enthalpy) / 2.0,
        }
    }

    pub(super) fn temperature(&self) -> ThermodynamicTemperature {
        psychrometrics::dry_bulb(self.enthalpy, self.humidity_ratio)
    }

    /// Outlet state carrying this air at `mass_flow`.
    pub(super) fn outlet(
        &self,
        mass_flow: MassRate,
        max_avail: MassRate,
        min_avail: MassRate,
    ) -> FlowState {
        FlowState {
            mass_flow,
            max_avail,
            min_avail,
            max: MassRate::ZERO,
            temperature: self.temperature(),
            humidity_ratio: self.humidity_ratio,
            enthalpy: self.enthalpy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use uom::si::{
        mass_rate::kilogram_per_second, power::watt,
        specific_heat_capacity::joule_per_kilogram_kelvin,
        thermodynamic_temperature::degree_celsius,
    };

    fn kg_s(value: f64) -> MassRate {
        MassRate::new::<kilogram_per_second>(value)
    }

    fn lane(flow: f64, t: f64, w: f64) -> FlowState {
        FlowState {
            mass_flow: kg_s(flow),
            ..FlowState::default()
        }
        .with_air(
            ThermodynamicTemperature::new::<degree_celsius>(t),
            Ratio::new::<ratio>(w),
        )
    }

    #[test]
    fn clamp_prefers_max_when_bounds_cross() {
        let clamped = clamp_flow(kg_s(2.0), kg_s(1.5), kg_s(1.0));
        assert_relative_eq!(clamped.get::<kilogram_per_second>(), 1.0);

        let raised = clamp_flow(kg_s(-0.1), kg_s(0.2), kg_s(1.0));
        assert_relative_eq!(raised.get::<kilogram_per_second>(), 0.2);
    }

    #[test]
    fn flow_for_load_balances_energy() {
        let cp = SpecificHeatCapacity::new::<joule_per_kilogram_kelvin>(1000.0);
        let supply = sensible(cp, ThermodynamicTemperature::new::<degree_celsius>(35.0));
        let zone = sensible(cp, ThermodynamicTemperature::new::<degree_celsius>(20.0));

        let flow = flow_for_load(Power::new::<watt>(3000.0), supply, zone);
        assert_relative_eq!(flow.get::<kilogram_per_second>(), 0.2);
        assert!(distinct(supply, zone, cp, &SolverConfig::default()));
        assert!(!distinct(zone, zone, cp, &SolverConfig::default()));
    }

    #[test]
    fn damper_position_guards_zero_design() {
        assert_relative_eq!(damper_position(kg_s(0.5), MassRate::ZERO).into_inner(), 0.0);
        assert_relative_eq!(damper_position(kg_s(0.5), kg_s(2.0)).into_inner(), 0.25);
        assert_relative_eq!(damper_position(kg_s(3.0), kg_s(2.0)).into_inner(), 1.0);
    }

    #[test]
    fn weighted_and_stagnant_means() {
        let hot = lane(0.25, 40.0, 0.008);
        let cold = lane(0.75, 13.0, 0.008);

        let mixed = MixedAir::weighted(&hot, &cold, kg_s(1.0));
        assert_relative_eq!(
            mixed.temperature().get::<degree_celsius>(),
            19.75,
            epsilon = 1e-9
        );

        let still = MixedAir::stagnant(&hot, &cold);
        assert_relative_eq!(
            still.temperature().get::<degree_celsius>(),
            26.5,
            epsilon = 1e-9
        );
    }
}
