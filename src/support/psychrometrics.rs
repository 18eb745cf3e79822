//! Moist-air property relations.
//!
//! Correlations follow the usual building-simulation forms: dry air and
//! water vapor are treated as ideal gases with constant specific heats, and
//! enthalpy is referenced to dry air and liquid water at 0 °C.
//!
//! Humidity ratios are mass ratios (kg water per kg dry air) carried as
//! [`Ratio`]. Values below [`MIN_HUMIDITY_RATIO`] are raised to it before use.

use uom::si::{
    available_energy::joule_per_kilogram,
    f64::{MassDensity, Pressure, Ratio, SpecificHeatCapacity, ThermodynamicTemperature},
    mass_density::kilogram_per_cubic_meter,
    pressure::pascal,
    ratio::ratio,
    specific_heat_capacity::joule_per_kilogram_kelvin,
    thermodynamic_temperature::{degree_celsius, kelvin},
};

use crate::support::units::SpecificEnthalpy;

/// Smallest humidity ratio used in property evaluations.
pub const MIN_HUMIDITY_RATIO: f64 = 1.0e-5;

const CP_DRY_AIR: f64 = 1.00484e3;
const CP_VAPOR: f64 = 1.85895e3;
const H_FG_0C: f64 = 2.50094e6;
const R_DRY_AIR: f64 = 287.0;
const VAPOR_DENSITY_FACTOR: f64 = 1.607_768_7;

fn humidity(w: Ratio) -> f64 {
    w.get::<ratio>().max(MIN_HUMIDITY_RATIO)
}

/// Specific heat of moist air per unit mass of dry air.
#[must_use]
pub fn specific_heat(w: Ratio) -> SpecificHeatCapacity {
    SpecificHeatCapacity::new::<joule_per_kilogram_kelvin>(CP_DRY_AIR + humidity(w) * CP_VAPOR)
}

/// Enthalpy of moist air at dry-bulb `t` and humidity ratio `w`.
#[must_use]
pub fn enthalpy(t: ThermodynamicTemperature, w: Ratio) -> SpecificEnthalpy {
    let t = t.get::<degree_celsius>();
    let w = humidity(w);
    SpecificEnthalpy::new::<joule_per_kilogram>(
        CP_DRY_AIR * t + w * (H_FG_0C + CP_VAPOR * t),
    )
}

/// Dry-bulb temperature of moist air with enthalpy `h` and humidity ratio `w`.
///
/// Inverse of [`enthalpy`].
#[must_use]
pub fn dry_bulb(h: SpecificEnthalpy, w: Ratio) -> ThermodynamicTemperature {
    let h = h.get::<joule_per_kilogram>();
    let w = humidity(w);
    ThermodynamicTemperature::new::<degree_celsius>((h - H_FG_0C * w) / (CP_DRY_AIR + CP_VAPOR * w))
}

/// Density of moist air at barometric pressure `p`.
#[must_use]
pub fn density(p: Pressure, t: ThermodynamicTemperature, w: Ratio) -> MassDensity {
    let t_abs = t.get::<kelvin>();
    let w = humidity(w);
    MassDensity::new::<kilogram_per_cubic_meter>(
        p.get::<pascal>() / (R_DRY_AIR * t_abs * (1.0 + VAPOR_DENSITY_FACTOR * w)),
    )
}

/// Density of dry air at 101 325 Pa and 20 °C.
#[must_use]
pub fn standard_density() -> MassDensity {
    density(
        Pressure::new::<pascal>(101_325.0),
        ThermodynamicTemperature::new::<degree_celsius>(20.0),
        Ratio::new::<ratio>(0.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use uom::si::available_energy::kilojoule_per_kilogram;

    fn celsius(t: f64) -> ThermodynamicTemperature {
        ThermodynamicTemperature::new::<degree_celsius>(t)
    }

    #[test]
    fn specific_heat_floors_humidity() {
        let dry = specific_heat(Ratio::new::<ratio>(0.0));
        let floor = specific_heat(Ratio::new::<ratio>(MIN_HUMIDITY_RATIO));
        assert_relative_eq!(
            dry.get::<joule_per_kilogram_kelvin>(),
            floor.get::<joule_per_kilogram_kelvin>()
        );

        let humid = specific_heat(Ratio::new::<ratio>(0.01));
        assert_relative_eq!(humid.get::<joule_per_kilogram_kelvin>(), 1023.4295);
    }

    #[test]
    fn enthalpy_at_typical_zone_state() {
        let h = enthalpy(celsius(24.0), Ratio::new::<ratio>(0.008));
        // 1.00484*24 + 0.008*(2500.94 + 1.85895*24)
        assert_relative_eq!(h.get::<kilojoule_per_kilogram>(), 44.480_598_4, epsilon = 1e-6);
    }

    #[test]
    fn dry_bulb_inverts_enthalpy() {
        for (t, w) in [(-20.0, 0.0005), (0.0, 0.0), (13.0, 0.008), (40.0, 0.02)] {
            let w = Ratio::new::<ratio>(w);
            let back = dry_bulb(enthalpy(celsius(t), w), w);
            assert_relative_eq!(back.get::<degree_celsius>(), t, epsilon = 1e-9);
        }
    }

    #[test]
    fn standard_air_density() {
        assert_relative_eq!(
            standard_density().get::<kilogram_per_cubic_meter>(),
            1.204,
            epsilon = 5e-4
        );
    }
}
