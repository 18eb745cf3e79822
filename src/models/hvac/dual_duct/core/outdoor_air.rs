//! Outdoor-air flow calculations.
//!
//! One design-outdoor-air resolver feeds three entry points: the supply
//! flow implied by an OA requirement and the air-loop OA fraction (VAV
//! floor), the OA-only mass flow of the outdoor-air variant, and the
//! design-level OA volume used when sizing.

use tracing::error;
use uom::{
    ConstZero,
    si::{
        f64::{MassRate, Ratio, VolumeRate},
        ratio::ratio,
    },
};

use super::{
    config::SolverConfig,
    context::{OutdoorAirRequest, OutdoorAirResolver, StepContext},
    definition::PerPersonMode,
    ids::{AirLoopId, OutdoorAirRequirementId, ZoneId},
};

/// Supply flow needed to meet an OA requirement at the loop's OA fraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) struct OutdoorAirSupply {
    pub supply_flow: MassRate,
    pub air_loop_fraction: Ratio,
}

/// The outdoor-air terms of one terminal.
#[derive(Debug, Clone, Copy)]
pub(super) struct Ventilation<'a> {
    pub terminal: &'a str,
    pub requirement: Option<OutdoorAirRequirementId>,
    pub zone: ZoneId,
    pub per_person_mode: Option<PerPersonMode>,
}

impl Ventilation<'_> {
    /// Total supply flow that carries the required outdoor air, given the
    /// fraction of outdoor air in the loop's supply.
    ///
    /// Zero flow when the loop is unresolved, no requirement is configured,
    /// or the loop fraction is negligible.
    pub(super) fn supply_flow_for_oa_fraction(
        &self,
        air_loop: Option<AirLoopId>,
        ctx: &impl StepContext,
        config: &SolverConfig,
    ) -> OutdoorAirSupply {
        let Some(air_loop) = air_loop else {
            return OutdoorAirSupply {
                supply_flow: MassRate::ZERO,
                air_loop_fraction: Ratio::ZERO,
            };
        };

        let status = ctx.air_loop_status(air_loop);
        let fraction = status.outdoor_air_fraction;
        let mut supply = OutdoorAirSupply {
            supply_flow: MassRate::ZERO,
            air_loop_fraction: fraction,
        };

        let Some(requirement) = self.requirement else {
            return supply;
        };

        if fraction.get::<ratio>() > config.outdoor_air_fraction_guard {
            let volume = ctx.outdoor_air_volume_flow(&OutdoorAirRequest {
                requirement,
                zone: self.zone,
                use_occupancy_schedule: status.demand_controlled_ventilation,
                use_min_outdoor_air_schedule: true,
                per_person_not_set: false,
                max_design_level: false,
            });
            supply.supply_flow = volume * ctx.standard_air_density() / fraction;
        }

        supply
    }

    /// Outdoor-air mass flow for the dedicated outdoor-air duct.
    ///
    /// A missing requirement is a configuration defect; it is logged and
    /// the flow is zero.
    pub(super) fn oa_only_mass_flow(&self, ctx: &impl StepContext) -> MassRate {
        match self.request(false) {
            Some(request) => ctx.outdoor_air_volume_flow(&request) * ctx.standard_air_density(),
            None => {
                error!(
                    terminal = self.terminal,
                    "outdoor air terminal has no outdoor air requirement; check the terminal definition"
                );
                MassRate::ZERO
            }
        }
    }

    /// Design-level (maximum) outdoor-air volume flow, for sizing.
    pub(super) fn design_volume_flow(&self, resolver: &impl OutdoorAirResolver) -> VolumeRate {
        match self.request(true) {
            Some(request) => resolver.outdoor_air_volume_flow(&request),
            None => {
                error!(
                    terminal = self.terminal,
                    "outdoor air terminal has no outdoor air requirement; design outdoor air is zero"
                );
                VolumeRate::ZERO
            }
        }
    }

    /// Per-person outdoor air at the zone's design occupancy.
    pub(super) fn per_person_design_level(&self, ctx: &impl StepContext) -> VolumeRate {
        self.requirement.map_or(VolumeRate::ZERO, |requirement| {
            ctx.per_person_rate(requirement) * ctx.zone_design_occupants(self.zone)
        })
    }

    fn request(&self, max_design_level: bool) -> Option<OutdoorAirRequest> {
        let requirement = self.requirement?;
        let use_occupancy_schedule = self.per_person_mode == Some(PerPersonMode::CurrentOccupancy);
        Some(OutdoorAirRequest {
            requirement,
            zone: self.zone,
            use_occupancy_schedule,
            use_min_outdoor_air_schedule: true,
            per_person_not_set: !max_design_level && self.per_person_mode.is_none(),
            max_design_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use uom::si::{mass_rate::kilogram_per_second, volume_rate::cubic_meter_per_second};

    use crate::models::hvac::dual_duct::core::test_support::{TestContext, std_density};

    fn ventilation(requirement: Option<OutdoorAirRequirementId>) -> Ventilation<'static> {
        Ventilation {
            terminal: "DD-1",
            requirement,
            zone: ZoneId::from_index(0),
            per_person_mode: Some(PerPersonMode::CurrentOccupancy),
        }
    }

    #[test]
    fn supply_flow_divides_by_loop_fraction() {
        let mut ctx = TestContext::new();
        let requirement = ctx.add_requirement(0.1, 0.0);
        let air_loop = ctx.add_air_loop(0.25, false);

        let supply = ventilation(Some(requirement)).supply_flow_for_oa_fraction(
            Some(air_loop),
            &ctx,
            &SolverConfig::default(),
        );

        assert_relative_eq!(supply.air_loop_fraction.get::<ratio>(), 0.25);
        assert_relative_eq!(
            supply.supply_flow.get::<kilogram_per_second>(),
            0.1 * std_density() / 0.25,
            epsilon = 1e-12
        );
    }

    #[test]
    fn supply_flow_is_zero_without_loop_or_requirement() {
        let mut ctx = TestContext::new();
        let requirement = ctx.add_requirement(0.1, 0.0);
        let air_loop = ctx.add_air_loop(0.3, false);
        let config = SolverConfig::default();

        let unresolved =
            ventilation(Some(requirement)).supply_flow_for_oa_fraction(None, &ctx, &config);
        assert_eq!(unresolved.supply_flow, MassRate::ZERO);
        assert_eq!(unresolved.air_loop_fraction, Ratio::ZERO);

        let no_requirement =
            ventilation(None).supply_flow_for_oa_fraction(Some(air_loop), &ctx, &config);
        assert_eq!(no_requirement.supply_flow, MassRate::ZERO);
        assert_relative_eq!(no_requirement.air_loop_fraction.get::<ratio>(), 0.3);

        let closed_loop = ctx.add_air_loop(0.0, false);
        let closed = ventilation(Some(requirement)).supply_flow_for_oa_fraction(
            Some(closed_loop),
            &ctx,
            &config,
        );
        assert_eq!(closed.supply_flow, MassRate::ZERO);
    }

    #[test]
    fn oa_only_flow_uses_standard_density() {
        let mut ctx = TestContext::new();
        let requirement = ctx.add_requirement(0.2, 0.0);

        let flow = ventilation(Some(requirement)).oa_only_mass_flow(&ctx);
        assert_relative_eq!(
            flow.get::<kilogram_per_second>(),
            0.2 * std_density(),
            epsilon = 1e-12
        );

        assert_eq!(ventilation(None).oa_only_mass_flow(&ctx), MassRate::ZERO);
    }

    #[test]
    fn design_level_is_a_separate_request() {
        let mut ctx = TestContext::new();
        let requirement = ctx.add_requirement(0.2, 0.0);
        ctx.set_design_level_scale(1.5);

        let source = ventilation(Some(requirement));
        assert_relative_eq!(
            source.design_volume_flow(&ctx).get::<cubic_meter_per_second>(),
            0.3,
            epsilon = 1e-12
        );
        assert_eq!(ventilation(None).design_volume_flow(&ctx), VolumeRate::ZERO);
    }

    #[test]
    fn per_person_design_level_scales_occupants() {
        let mut ctx = TestContext::new();
        let requirement = ctx.add_requirement(0.2, 0.01);
        ctx.set_design_occupants(12.0);

        let level = ventilation(Some(requirement)).per_person_design_level(&ctx);
        assert_relative_eq!(level.get::<cubic_meter_per_second>(), 0.12, epsilon = 1e-12);
    }
}
