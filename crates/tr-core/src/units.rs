// tr-core/src/units.rs

use uom::si::f64::{
    Power as UomPower, ThermodynamicTemperature as UomThermodynamicTemperature, Time as UomTime,
};

// Public canonical unit types (SI, f64)
pub type Power = UomPower;
pub type Temperature = UomThermodynamicTemperature;
pub type Time = UomTime;

#[inline]
pub fn degc(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::degree_celsius;
    Temperature::new::<degree_celsius>(v)
}

#[inline]
pub fn w(v: f64) -> Power {
    use uom::si::power::watt;
    Power::new::<watt>(v)
}

#[inline]
pub fn s(v: f64) -> Time {
    use uom::si::time::second;
    Time::new::<second>(v)
}

#[inline]
pub fn as_degc(t: Temperature) -> f64 {
    use uom::si::thermodynamic_temperature::degree_celsius;
    t.get::<degree_celsius>()
}

#[inline]
pub fn as_kelvin(t: Temperature) -> f64 {
    use uom::si::thermodynamic_temperature::kelvin;
    t.get::<kelvin>()
}

#[inline]
pub fn as_watts(p: Power) -> f64 {
    use uom::si::power::watt;
    p.get::<watt>()
}

#[inline]
pub fn as_seconds(t: Time) -> f64 {
    use uom::si::time::second;
    t.get::<second>()
}

pub mod constants {
    /// Boltzmann constant in eV/K (activation energies are quoted in eV).
    pub const BOLTZMANN_EV_PER_K: f64 = 8.617_333_262e-5;

    /// Offset between the Celsius and Kelvin scales.
    pub const CELSIUS_TO_KELVIN: f64 = 273.15;

    #[inline]
    pub fn celsius_to_kelvin(t_c: f64) -> f64 {
        t_c + CELSIUS_TO_KELVIN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn celsius_round_trip() {
        let t = degc(25.0);
        assert!((as_degc(t) - 25.0).abs() < 1e-9);
        assert!((as_kelvin(t) - 298.15).abs() < 1e-9);
        assert!((constants::celsius_to_kelvin(25.0) - as_kelvin(t)).abs() < 1e-9);
    }

    #[test]
    fn watts_and_seconds_extract() {
        assert_eq!(as_watts(w(5.0)), 5.0);
        assert_eq!(as_seconds(s(0.5)), 0.5);
    }
}
