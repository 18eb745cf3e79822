use uom::si::{
    f64::{TemperatureInterval, ThermodynamicTemperature},
    temperature_interval::kelvin as delta_kelvin,
    thermodynamic_temperature::{degree_celsius, kelvin as abs_kelvin},
};

/// Extension trait for computing temperature differences.
///
/// Subtracting two [`ThermodynamicTemperature`] values in [`uom`] yields
/// another absolute temperature, which is rarely what an energy balance
/// wants. See [#380](https://github.com/iliekturtles/uom/issues/380).
pub trait TemperatureDifference {
    /// Returns the temperature difference `self - other`.
    fn minus(self, other: Self) -> TemperatureInterval;

    /// Returns the interval between `self` and 0 °C.
    fn above_freezing(self) -> TemperatureInterval;
}

impl TemperatureDifference for ThermodynamicTemperature {
    fn minus(self, other: Self) -> TemperatureInterval {
        TemperatureInterval::new::<delta_kelvin>(
            self.get::<abs_kelvin>() - other.get::<abs_kelvin>(),
        )
    }

    fn above_freezing(self) -> TemperatureInterval {
        TemperatureInterval::new::<delta_kelvin>(self.get::<degree_celsius>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use uom::si::{
        temperature_interval::degree_celsius as delta_celsius,
        thermodynamic_temperature::degree_fahrenheit,
    };

    #[test]
    fn subtract_temperatures() {
        let cold_deck = ThermodynamicTemperature::new::<degree_celsius>(13.0);
        let hot_deck = ThermodynamicTemperature::new::<degree_celsius>(40.0);

        assert_relative_eq!(hot_deck.minus(cold_deck).get::<delta_kelvin>(), 27.0);
        assert_relative_eq!(cold_deck.minus(hot_deck).get::<delta_celsius>(), -27.0);

        let zone_c = ThermodynamicTemperature::new::<degree_celsius>(25.0);
        let zone_f = ThermodynamicTemperature::new::<degree_fahrenheit>(77.0);
        assert_relative_eq!(
            zone_f.minus(zone_c).get::<delta_celsius>(),
            0.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn offset_from_freezing() {
        let t = ThermodynamicTemperature::new::<abs_kelvin>(283.15);
        assert_relative_eq!(t.above_freezing().get::<delta_kelvin>(), 10.0, epsilon = 1e-12);

        let below = ThermodynamicTemperature::new::<degree_celsius>(-5.0);
        assert_relative_eq!(below.above_freezing().get::<delta_kelvin>(), -5.0, epsilon = 1e-12);
    }
}
