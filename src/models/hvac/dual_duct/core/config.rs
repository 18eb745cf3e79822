use uom::si::{
    f64::{MassRate, TemperatureInterval, VolumeRate},
    mass_rate::kilogram_per_second,
    temperature_interval::kelvin as delta_kelvin,
    volume_rate::cubic_meter_per_second,
};

/// Tolerances and control constants shared by the dual-duct solvers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverConfig {
    /// Total flows at or below this are treated as no flow.
    pub small_mass_flow: MassRate,

    /// Sized maximum volume flows below this zero out the unit.
    pub small_volume_flow: VolumeRate,

    /// Duct temperature gaps at or below this take the degenerate branch.
    pub small_temperature_difference: TemperatureInterval,

    /// Variable-volume lane flows below this snap to zero.
    pub mass_flow_set_tolerance: MassRate,

    /// Oscillation threshold as a fraction of the recirculation design maximum.
    pub oscillation_threshold_fraction: f64,

    /// How much cooler than the zone recirculated air must be to cool it.
    pub recirculation_cooling_margin: TemperatureInterval,

    /// Air-loop outdoor-air fractions at or below this disable the OA floor.
    pub outdoor_air_fraction_guard: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            small_mass_flow: MassRate::new::<kilogram_per_second>(0.001),
            small_volume_flow: VolumeRate::new::<cubic_meter_per_second>(0.001),
            small_temperature_difference: TemperatureInterval::new::<delta_kelvin>(1e-5),
            mass_flow_set_tolerance: MassRate::new::<kilogram_per_second>(0.01 * 1e-5),
            oscillation_threshold_fraction: 1e-10,
            recirculation_cooling_margin: TemperatureInterval::new::<delta_kelvin>(0.5),
            outdoor_air_fraction_guard: 1e-10,
        }
    }
}
