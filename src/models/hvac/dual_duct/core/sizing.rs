//! Autosizing of terminal maximum flows from zone design data.

use tracing::info;
use uom::{
    ConstZero,
    si::{
        f64::{MassDensity, MassRate, VolumeRate},
        volume_rate::cubic_meter_per_second,
    },
};

use super::{config::SolverConfig, context::ZoneDesignFlows};

/// Design volume and mass flows of a terminal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DesignFlows {
    pub max_volume: VolumeRate,
    pub outdoor_air_volume: VolumeRate,
    pub recirculated_volume: VolumeRate,
    pub max_mass: MassRate,
}

impl Default for DesignFlows {
    fn default() -> Self {
        Self {
            max_volume: VolumeRate::ZERO,
            outdoor_air_volume: VolumeRate::ZERO,
            recirculated_volume: VolumeRate::ZERO,
            max_mass: MassRate::ZERO,
        }
    }
}

/// What sizing needs to know about a terminal's ducts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum SizingLayout {
    HotCold,
    OutdoorAir { recirculation: bool },
}

/// Sizes a terminal from its zone's design flows.
///
/// The maximum is the larger of the design cooling and heating flows. An
/// outdoor-air terminal gives whatever exceeds its design OA to the
/// recirculated duct, or collapses to the design OA without one. Maxima
/// below the negligible volume flow zero every design flow.
pub(super) fn size(
    terminal: &str,
    layout: SizingLayout,
    zone: ZoneDesignFlows,
    design_outdoor_air: VolumeRate,
    density: MassDensity,
    config: &SolverConfig,
) -> DesignFlows {
    let design_max = if zone.heating > zone.cooling {
        zone.heating
    } else {
        zone.cooling
    };

    let mut flows = match layout {
        SizingLayout::HotCold => DesignFlows {
            max_volume: design_max,
            ..DesignFlows::default()
        },
        SizingLayout::OutdoorAir { recirculation: true } => {
            let remainder = design_max - design_outdoor_air;
            DesignFlows {
                max_volume: design_max,
                outdoor_air_volume: design_outdoor_air,
                recirculated_volume: if remainder > VolumeRate::ZERO {
                    remainder
                } else {
                    VolumeRate::ZERO
                },
                max_mass: MassRate::ZERO,
            }
        }
        SizingLayout::OutdoorAir {
            recirculation: false,
        } => DesignFlows {
            max_volume: design_outdoor_air,
            outdoor_air_volume: design_outdoor_air,
            ..DesignFlows::default()
        },
    };
    flows.max_mass = flows.max_volume * density;

    if flows.max_volume < config.small_volume_flow {
        flows = DesignFlows::default();
    }

    info!(
        terminal,
        max_air_flow_m3_s = flows.max_volume.get::<cubic_meter_per_second>(),
        "sized dual-duct terminal"
    );
    if let SizingLayout::OutdoorAir { recirculation } = layout {
        info!(
            terminal,
            max_outdoor_air_flow_m3_s = flows.outdoor_air_volume.get::<cubic_meter_per_second>(),
            "sized outdoor air duct"
        );
        if recirculation {
            info!(
                terminal,
                max_recirculated_air_flow_m3_s =
                    flows.recirculated_volume.get::<cubic_meter_per_second>(),
                "sized recirculated air duct"
            );
        }
    }

    flows
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use uom::si::{mass_density::kilogram_per_cubic_meter, mass_rate::kilogram_per_second};

    fn m3_s(value: f64) -> VolumeRate {
        VolumeRate::new::<cubic_meter_per_second>(value)
    }

    fn zone(cooling: f64, heating: f64) -> ZoneDesignFlows {
        ZoneDesignFlows {
            cooling: m3_s(cooling),
            heating: m3_s(heating),
        }
    }

    fn density() -> MassDensity {
        MassDensity::new::<kilogram_per_cubic_meter>(1.2)
    }

    #[test]
    fn hot_cold_takes_larger_design_flow() {
        let flows = size(
            "DD",
            SizingLayout::HotCold,
            zone(0.8, 0.5),
            VolumeRate::ZERO,
            density(),
            &SolverConfig::default(),
        );
        assert_relative_eq!(flows.max_volume.get::<cubic_meter_per_second>(), 0.8);
        assert_relative_eq!(flows.max_mass.get::<kilogram_per_second>(), 0.96);
    }

    #[test]
    fn outdoor_air_with_recirculation_splits_remainder() {
        let flows = size(
            "DD",
            SizingLayout::OutdoorAir {
                recirculation: true,
            },
            zone(0.5, 0.6),
            m3_s(0.2),
            density(),
            &SolverConfig::default(),
        );
        assert_relative_eq!(flows.max_volume.get::<cubic_meter_per_second>(), 0.6);
        assert_relative_eq!(flows.outdoor_air_volume.get::<cubic_meter_per_second>(), 0.2);
        assert_relative_eq!(
            flows.recirculated_volume.get::<cubic_meter_per_second>(),
            0.4,
            epsilon = 1e-12
        );

        let starved = size(
            "DD",
            SizingLayout::OutdoorAir {
                recirculation: true,
            },
            zone(0.1, 0.1),
            m3_s(0.2),
            density(),
            &SolverConfig::default(),
        );
        assert_eq!(starved.recirculated_volume, VolumeRate::ZERO);
    }

    #[test]
    fn outdoor_air_only_collapses_to_design_oa() {
        let flows = size(
            "DD",
            SizingLayout::OutdoorAir {
                recirculation: false,
            },
            zone(0.5, 0.6),
            m3_s(0.2),
            density(),
            &SolverConfig::default(),
        );
        assert_relative_eq!(flows.max_volume.get::<cubic_meter_per_second>(), 0.2);
        assert_eq!(flows.recirculated_volume, VolumeRate::ZERO);
        assert_relative_eq!(flows.max_mass.get::<kilogram_per_second>(), 0.24, epsilon = 1e-12);
    }

    #[test]
    fn negligible_maximum_zeroes_everything() {
        let flows = size(
            "DD",
            SizingLayout::OutdoorAir {
                recirculation: true,
            },
            zone(0.0005, 0.0002),
            m3_s(0.0001),
            density(),
            &SolverConfig::default(),
        );
        assert_eq!(flows, DesignFlows::default());
    }
}
