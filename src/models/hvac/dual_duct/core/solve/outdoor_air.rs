use std::convert::Infallible;

use twine_core::Model;
use uom::{
    ConstZero,
    si::f64::{MassRate, Power},
};

use crate::{
    models::hvac::dual_duct::core::{
        config::SolverConfig,
        context::ZoneDemand,
        lane::{FlowHistory, FlowState},
        mixing::{MixedAir, damper_position, distinct, flow_for_load, sensible},
    },
    support::{
        constraint::{Constrained, UnitInterval},
        psychrometrics,
        units::TemperatureDifference,
    },
};

use super::ZoneAir;

/// The recirculated-air duct and its recent flows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecirculatedInput {
    /// Lane state; `mass_flow` holds the flow from the previous iteration.
    pub state: FlowState,
    pub history: FlowHistory,
    /// Flows closer than this are treated as the same value.
    pub oscillation_threshold: MassRate,
}

/// Inputs to one outdoor-air terminal step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutdoorAirInput {
    /// Availability schedule value; the unit runs when positive.
    pub schedule_value: f64,
    pub demand: ZoneDemand,
    pub zone: ZoneAir,
    pub outdoor_air: FlowState,
    pub recirculated: Option<RecirculatedInput>,
    /// Outdoor-air mass flow required by the zone's ventilation requirement.
    pub required_outdoor_air: MassRate,
}

/// Solved state of an outdoor-air terminal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutdoorAirMix {
    pub outdoor_air_flow: MassRate,
    /// Final recirculated flow; zero without a recirculated duct.
    pub recirculated_flow: MassRate,
    pub outlet: FlowState,
    pub outdoor_air_damper: Constrained<f64, UnitInterval>,
    /// `None` without a recirculated duct.
    pub recirculated_damper: Option<Constrained<f64, UnitInterval>>,
    pub outdoor_air_fraction: Constrained<f64, UnitInterval>,
    /// The oscillation guard replaced the solved recirculated flow.
    pub oscillation_damped: bool,
}

/// Dual-duct terminal with a dedicated outdoor-air duct.
///
/// The outdoor-air duct carries the ventilation requirement. The optional
/// recirculated duct then closes whatever cooling load the outdoor air
/// leaves behind, provided the recirculated air is cool enough to help.
/// Recirculated air never heats.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutdoorAirMixer {
    config: SolverConfig,
}

impl OutdoorAirMixer {
    #[must_use]
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }
}

impl Model for OutdoorAirMixer {
    type Input = OutdoorAirInput;
    type Output = OutdoorAirMix;
    type Error = Infallible;

    fn call(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
        Ok(solve(input, &self.config))
    }
}

fn solve(input: &OutdoorAirInput, config: &SolverConfig) -> OutdoorAirMix {
    let mut oa = input.outdoor_air;
    oa.mass_flow = if input.required_outdoor_air > oa.max_avail {
        oa.max_avail
    } else if input.required_outdoor_air < MassRate::ZERO {
        MassRate::ZERO
    } else {
        input.required_outdoor_air
    };

    let mut oscillation_damped = false;
    let mut ra = match &input.recirculated {
        Some(recirculated) => {
            let mut ra = recirculated.state;
            let target = recirculation_load(input, &oa, config);
            ra.mass_flow = recirculated_flow(target, input.zone, &ra, config);
            ra.mass_flow = if ra.mass_flow > ra.max_avail {
                ra.max_avail
            } else if ra.mass_flow < MassRate::ZERO {
                MassRate::ZERO
            } else {
                ra.mass_flow
            };

            if let Some(previous) = oscillating(ra.mass_flow, recirculated) {
                ra.mass_flow = previous;
                oscillation_damped = true;
            }
            Some(ra)
        }
        None => None,
    };

    let ra_max_avail = ra.map_or(MassRate::ZERO, |ra| ra.max_avail);
    let ra_flow = ra.map_or(MassRate::ZERO, |ra| ra.mass_flow);
    let max_total = oa.max_avail + ra_max_avail;

    let scheduled_total = if input.schedule_value > 0.0 {
        oa.mass_flow + ra_flow
    } else {
        MassRate::ZERO
    };

    let (total, air) = if scheduled_total > config.small_mass_flow {
        if let Some(ra) = ra.as_mut() {
            if scheduled_total > max_total {
                ra.mass_flow = max_total - oa.mass_flow;
            }
        }
        let total = oa.mass_flow + ra.map_or(MassRate::ZERO, |ra| ra.mass_flow);
        let air = match &ra {
            Some(ra) if total > config.small_mass_flow => MixedAir::weighted(&oa, ra, total),
            Some(ra) => MixedAir::stagnant(&oa, ra),
            None => MixedAir {
                humidity_ratio: oa.humidity_ratio,
                enthalpy: oa.enthalpy,
            },
        };
        (total, air)
    } else {
        oa.mass_flow = MassRate::ZERO;
        if let Some(ra) = ra.as_mut() {
            ra.mass_flow = MassRate::ZERO;
        }
        let air = match &ra {
            Some(ra) => MixedAir::stagnant(&oa, ra),
            None => MixedAir {
                humidity_ratio: oa.humidity_ratio,
                enthalpy: oa.enthalpy,
            },
        };
        (MassRate::ZERO, air)
    };

    let recirculated_flow = ra.map_or(MassRate::ZERO, |ra| ra.mass_flow);

    OutdoorAirMix {
        outdoor_air_flow: oa.mass_flow,
        recirculated_flow,
        outlet: air.outlet(total, max_total, MassRate::ZERO),
        outdoor_air_damper: damper_position(oa.mass_flow, oa.max),
        recirculated_damper: ra.map(|ra| damper_position(ra.mass_flow, ra.max)),
        outdoor_air_fraction: outdoor_air_fraction(
            oa.mass_flow,
            ra.is_some().then_some(recirculated_flow),
            total,
        ),
        oscillation_damped,
    }
}

/// Load left for the recirculated duct after crediting the outdoor air.
///
/// Cooling wins over heating; zero in the deadband.
fn recirculation_load(input: &OutdoorAirInput, oa: &FlowState, config: &SolverConfig) -> Power {
    let demand = &input.demand;
    let cp_zone = psychrometrics::specific_heat(input.zone.humidity_ratio);
    let cp_oa = psychrometrics::specific_heat(oa.humidity_ratio);
    let s_oa = sensible(cp_oa, oa.temperature);

    let (to_heating, to_cooling) =
        if distinct(s_oa, sensible(cp_zone, input.zone.temperature), cp_zone, config) {
            (
                oa.mass_flow * (s_oa - sensible(cp_zone, demand.heating_setpoint)),
                oa.mass_flow * (s_oa - sensible(cp_zone, demand.cooling_setpoint)),
            )
        } else {
            (Power::ZERO, Power::ZERO)
        };

    let cooling = demand.output_to_cooling_setpoint - to_cooling;
    let heating = demand.output_to_heating_setpoint - to_heating;
    if cooling < Power::ZERO {
        cooling
    } else if heating > Power::ZERO {
        heating
    } else {
        Power::ZERO
    }
}

/// Recirculated flow for a target load, before clamping.
///
/// Only cooling loads draw recirculated air, and only when it is cooler
/// than the zone by the configured margin.
fn recirculated_flow(
    target: Power,
    zone: ZoneAir,
    ra: &FlowState,
    config: &SolverConfig,
) -> MassRate {
    if target >= Power::ZERO {
        return MassRate::ZERO;
    }
    if ra.temperature.minus(zone.temperature) >= -config.recirculation_cooling_margin {
        return MassRate::ZERO;
    }

    let cp_zone = psychrometrics::specific_heat(zone.humidity_ratio);
    let s_zone = sensible(cp_zone, zone.temperature);
    let s_ra = sensible(psychrometrics::specific_heat(ra.humidity_ratio), ra.temperature);
    if distinct(s_ra, s_zone, cp_zone, config) {
        flow_for_load(target, s_ra, s_zone)
    } else {
        ra.mass_flow
    }
}

/// Returns the previous flow when `flow` repeats an older value instead.
///
/// A flow that matches the value two or three steps back while differing
/// from the last one is bouncing between two solutions.
fn oscillating(flow: MassRate, recirculated: &RecirculatedInput) -> Option<MassRate> {
    let threshold = recirculated.oscillation_threshold;
    let history = &recirculated.history;
    let near = |previous: MassRate| (flow - previous).abs() < threshold;

    let repeats = near(history.back(2)) || near(history.back(3));
    (repeats && !near(history.back(1)) && flow > MassRate::ZERO).then(|| history.back(1))
}

fn outdoor_air_fraction(
    oa: MassRate,
    recirculated: Option<MassRate>,
    total: MassRate,
) -> Constrained<f64, UnitInterval> {
    if total <= MassRate::ZERO {
        return UnitInterval::zero();
    }
    match recirculated {
        None => UnitInterval::one(),
        Some(_) if oa == MassRate::ZERO => UnitInterval::zero(),
        Some(ra) if ra == MassRate::ZERO => UnitInterval::one(),
        Some(_) => UnitInterval::saturating((oa / total).value),
    }
}
