// gl-core/src/units.rs

use uom::si::f64::{MassRate as UomMassRate, Time as UomTime};

// Public canonical unit types (SI, f64). Temperatures stay plain `Real`
// degrees Celsius throughout: uom's base temperature unit is kelvin, so a
// bare `.value` read would silently shift by 273.15.
pub type MassRate = UomMassRate;
pub type Time = UomTime;

#[inline]
pub fn kgps(v: f64) -> MassRate {
    use uom::si::mass_rate::kilogram_per_second;
    MassRate::new::<kilogram_per_second>(v)
}

#[inline]
pub fn s(v: f64) -> Time {
    use uom::si::time::second;
    Time::new::<second>(v)
}

pub mod constants {
    /// Seconds in one day.
    pub const SECS_PER_DAY: f64 = 86_400.0;

    /// Seconds in the 365-day year used by the far-field sinusoid.
    pub const SECS_PER_YEAR: f64 = 365.0 * SECS_PER_DAY;

    /// Film coefficient applied inside the pipe when the fluid is stagnant,
    /// W/m2-K.
    pub const STAGNANT_FILM_COEFF: f64 = 200.0;

    /// Convection coefficient written to a coupled envelope surface to pin
    /// its temperature to the ground solution, W/m2-K.
    pub const IMPOSED_SURFACE_COEFF: f64 = 10_000.0;

    /// Air density near the ground surface, kg/m3.
    pub const AIR_DENSITY: f64 = 1.22521;

    /// Air specific heat near the ground surface, J/kg-K.
    pub const AIR_SPECIFIC_HEAT: f64 = 1003.0;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_units_are_si() {
        // Callers read `.value` expecting seconds and kg/s.
        assert_eq!(s(900.0).value, 900.0);
        assert_eq!(kgps(0.3).value, 0.3);
    }

    #[test]
    fn year_is_365_days() {
        assert_eq!(constants::SECS_PER_YEAR, 365.0 * 86_400.0);
    }
}
