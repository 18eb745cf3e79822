use uom::{
    ConstZero,
    si::{
        f64::{MassRate, Ratio, ThermodynamicTemperature},
        ratio::ratio,
        thermodynamic_temperature::degree_celsius,
    },
};

use crate::support::{psychrometrics, units::SpecificEnthalpy};

/// Thermodynamic and flow state of one duct lane or outlet.
///
/// Bounds (`max_avail`, `min_avail`, `max`) are refreshed at environment
/// start and once per invocation. Point values are refreshed from the
/// upstream node every invocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowState {
    /// Current mass flow.
    pub mass_flow: MassRate,

    /// Largest flow the upstream system can deliver this iteration.
    pub max_avail: MassRate,

    /// Smallest flow the upstream system requires this iteration.
    pub min_avail: MassRate,

    /// Design capacity, fixed after sizing.
    pub max: MassRate,

    pub temperature: ThermodynamicTemperature,
    pub humidity_ratio: Ratio,
    pub enthalpy: SpecificEnthalpy,
}

impl FlowState {
    /// Returns a copy with the given air condition and a consistent enthalpy.
    #[must_use]
    pub fn with_air(self, temperature: ThermodynamicTemperature, humidity_ratio: Ratio) -> Self {
        Self {
            temperature,
            humidity_ratio,
            enthalpy: psychrometrics::enthalpy(temperature, humidity_ratio),
            ..self
        }
    }

    /// Returns a copy with flow, availability and design maximum set.
    #[cfg(test)]
    #[must_use]
    pub(crate) fn with_flows(
        self,
        mass_flow: MassRate,
        max_avail: MassRate,
        max: MassRate,
    ) -> Self {
        Self {
            mass_flow,
            max_avail,
            max,
            ..self
        }
    }
}

impl Default for FlowState {
    fn default() -> Self {
        Self {
            mass_flow: MassRate::ZERO,
            max_avail: MassRate::ZERO,
            min_avail: MassRate::ZERO,
            max: MassRate::ZERO,
            temperature: ThermodynamicTemperature::ZERO,
            humidity_ratio: Ratio::ZERO,
            enthalpy: SpecificEnthalpy::ZERO,
        }
        .with_air(
            ThermodynamicTemperature::new::<degree_celsius>(20.0),
            Ratio::new::<ratio>(0.0),
        )
    }
}

const HISTORY_DEPTH: usize = 3;

/// Recirculated-air flows from the most recent invocations.
///
/// A fixed ring of three slots. [`back(1)`](Self::back) is the newest value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowHistory {
    slots: [MassRate; HISTORY_DEPTH],
    newest: usize,
}

impl FlowHistory {
    /// Returns the flow recorded `steps` invocations ago.
    ///
    /// `steps` must be in `1..=3`; release builds clamp it.
    #[must_use]
    pub fn back(&self, steps: usize) -> MassRate {
        debug_assert!(
            (1..=HISTORY_DEPTH).contains(&steps),
            "history holds {HISTORY_DEPTH} flows, asked for {steps} back"
        );
        let offset = steps.clamp(1, HISTORY_DEPTH) - 1;
        self.slots[(self.newest + HISTORY_DEPTH - offset) % HISTORY_DEPTH]
    }

    /// Drops the oldest value and records `flow` as the newest.
    pub fn push(&mut self, flow: MassRate) {
        self.newest = (self.newest + 1) % HISTORY_DEPTH;
        self.slots[self.newest] = flow;
    }

    /// Resets every slot to zero.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl Default for FlowHistory {
    fn default() -> Self {
        Self {
            slots: [MassRate::ZERO; HISTORY_DEPTH],
            newest: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use uom::si::mass_rate::kilogram_per_second;

    fn kg_s(value: f64) -> MassRate {
        MassRate::new::<kilogram_per_second>(value)
    }

    #[test]
    fn history_keeps_last_three() {
        let mut history = FlowHistory::default();
        for flow in [0.1, 0.2, 0.3, 0.4] {
            history.push(kg_s(flow));
        }

        assert_relative_eq!(history.back(1).get::<kilogram_per_second>(), 0.4);
        assert_relative_eq!(history.back(2).get::<kilogram_per_second>(), 0.3);
        assert_relative_eq!(history.back(3).get::<kilogram_per_second>(), 0.2);

        history.clear();
        for steps in 1..=3 {
            assert_relative_eq!(history.back(steps).get::<kilogram_per_second>(), 0.0);
        }
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "history holds 3 flows")]
    fn history_rejects_steps_beyond_depth() {
        let _ = FlowHistory::default().back(4);
    }

    #[test]
    fn new_history_is_zero() {
        let history = FlowHistory::default();
        assert_eq!(history.back(1), MassRate::ZERO);
        assert_eq!(history.back(3), MassRate::ZERO);
    }

    #[test]
    fn with_air_sets_enthalpy() {
        let t = ThermodynamicTemperature::new::<degree_celsius>(13.0);
        let w = Ratio::new::<ratio>(0.008);
        let state = FlowState::default().with_air(t, w);
        assert_relative_eq!(
            psychrometrics::dry_bulb(state.enthalpy, state.humidity_ratio)
                .get::<degree_celsius>(),
            13.0,
            epsilon = 1e-9
        );
    }
}
