//! Apparent soil heat capacity across the freeze/thaw transition.
//!
//! Latent heat of the pore water is folded into an effective rho*cp as a
//! smoothed four-zone function of cell temperature, so the conduction solver
//! never tracks phase explicitly.

use crate::material::SoilProps;
use gl_core::Real;

// Pore water / ice properties and transition shape, SI.
const RHO_ICE: Real = 917.0; // kg/m3
const RHO_LIQ: Real = 1000.0; // kg/m3
const CP_LIQ: Real = 4180.0; // J/kg-K
const CP_ICE: Real = 2030.0; // J/kg-K
const LATENT_FUSION: Real = 334_000.0; // J/kg
const TRANSITION_WIDTH: Real = 0.1; // deg C

// Zone boundaries of the smoothed apparent-capacity curve, deg C.
const ALL_ICE: Real = -0.5;
const ICE_TO_TRANSITION: Real = -0.4;
const LIQUID_TO_TRANSITION: Real = -0.1;
const ALL_LIQUID: Real = 0.0;

/// Precomputed volumetric heat capacities of the three soil states.
///
/// These depend only on the soil properties, so they are computed once per
/// domain and reused for every cell and time step.
#[derive(Clone, Copy, Debug)]
pub struct SoilHeatCapacities {
    rho_cp_liquid: Real,
    rho_cp_transient: Real,
    rho_cp_frozen: Real,
    density: Real,
}

impl SoilHeatCapacities {
    pub fn new(soil: &SoilProps) -> Self {
        let theta_liq = soil.moisture_fraction;
        let theta_sat = soil.saturation_fraction;
        // ice fraction when frozen is taken equal to the liquid fraction
        let theta_ice = theta_liq;

        let rho_cp_soil_minerals = soil.base.rho_cp();
        let rho_cp_liquid =
            rho_cp_soil_minerals * (1.0 - theta_sat) + RHO_LIQ * CP_LIQ * theta_liq;
        let rho_cp_transient = rho_cp_soil_minerals * (1.0 - theta_sat)
            + ((RHO_LIQ + RHO_ICE) / 2.0) * CP_LIQ * theta_ice
            + RHO_ICE * (CP_ICE + LATENT_FUSION / TRANSITION_WIDTH) * theta_ice;
        let rho_cp_frozen =
            rho_cp_soil_minerals * (1.0 - theta_sat) + RHO_ICE * CP_ICE * theta_ice;

        Self {
            rho_cp_liquid,
            rho_cp_transient,
            rho_cp_frozen,
            density: soil.base.density,
        }
    }

    /// Apparent volumetric heat capacity rho*cp at the given cell
    /// temperature (deg C), J/m3-K.
    pub fn apparent_rho_cp(&self, temp: Real) -> Real {
        if temp <= ALL_ICE {
            self.rho_cp_frozen
        } else if temp < ICE_TO_TRANSITION {
            self.rho_cp_frozen
                + (self.rho_cp_transient - self.rho_cp_frozen) / (ICE_TO_TRANSITION - ALL_ICE)
                    * (temp - ALL_ICE)
        } else if temp <= LIQUID_TO_TRANSITION {
            self.rho_cp_transient
        } else if temp < ALL_LIQUID {
            self.rho_cp_liquid
                + (self.rho_cp_transient - self.rho_cp_liquid)
                    / (ALL_LIQUID - LIQUID_TO_TRANSITION)
                    * (ALL_LIQUID - temp)
        } else {
            self.rho_cp_liquid
        }
    }

    /// Apparent specific heat at the given temperature, J/kg-K, using the
    /// dry-soil density (density itself is not temperature dependent here).
    pub fn apparent_specific_heat(&self, temp: Real) -> Real {
        self.apparent_rho_cp(temp) / self.density
    }
}
