//! In-pipe forced convection film coefficient.

use crate::fluid::FluidState;
use gl_core::units::constants::STAGNANT_FILM_COEFF;
use gl_core::Real;

/// Film coefficient between the circuit fluid and the pipe inner wall,
/// W/m2-K, via Dittus-Boelter.
///
/// The Prandtl exponent follows the heating/cooling convention: 0.3 when the
/// fluid is warmer than the pipe wall (fluid being cooled), 0.4 otherwise.
/// Exactly zero flow falls back to a fixed stagnant-film coefficient.
pub fn film_coefficient(
    fluid: &FluidState,
    mass_flow: Real,
    pipe_inner_radius: Real,
    fluid_temp: Real,
    pipe_wall_temp: Real,
) -> Real {
    if mass_flow == 0.0 {
        return STAGNANT_FILM_COEFF;
    }

    let diameter = 2.0 * pipe_inner_radius;
    let area = std::f64::consts::PI * pipe_inner_radius * pipe_inner_radius;
    let velocity = mass_flow / (fluid.density * area);
    let reynolds = fluid.density * velocity * diameter / fluid.viscosity;

    let prandtl_exponent = if fluid_temp > pipe_wall_temp { 0.3 } else { 0.4 };
    let nusselt = 0.023 * reynolds.powf(0.8) * fluid.prandtl().powf(prandtl_exponent);

    nusselt * fluid.conductivity / diameter
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fluid::{ConstantFluid, FluidProperties};

    fn water_state() -> FluidState {
        ConstantFluid::water().state(20.0).unwrap()
    }

    #[test]
    fn stagnant_flow_uses_fixed_coefficient() {
        let h = film_coefficient(&water_state(), 0.0, 0.013, 20.0, 10.0);
        assert_eq!(h, STAGNANT_FILM_COEFF);
    }

    #[test]
    fn higher_flow_gives_higher_coefficient() {
        let state = water_state();
        let h_low = film_coefficient(&state, 0.1, 0.013, 20.0, 10.0);
        let h_high = film_coefficient(&state, 0.5, 0.013, 20.0, 10.0);
        assert!(h_high > h_low);
        assert!(h_low > STAGNANT_FILM_COEFF);
    }

    #[test]
    fn cooling_exponent_gives_lower_nusselt_than_heating() {
        let state = water_state();
        // Pr > 1, so the 0.3 exponent (fluid warmer than wall) yields less.
        let h_cooling = film_coefficient(&state, 0.3, 0.013, 20.0, 10.0);
        let h_heating = film_coefficient(&state, 0.3, 0.013, 10.0, 20.0);
        assert!(h_cooling < h_heating);
    }
}
