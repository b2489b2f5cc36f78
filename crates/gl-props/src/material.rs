//! Base thermal properties for solid materials and soil.

use crate::error::{PropsError, PropsResult};
use gl_core::Real;

/// Thermal properties of a solid material.
///
/// All values are SI: W/m-K, kg/m3, J/kg-K.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThermalProps {
    pub conductivity: Real,
    pub density: Real,
    pub specific_heat: Real,
}

impl ThermalProps {
    /// Create a property set, validating that every value is positive and finite.
    pub fn new(conductivity: Real, density: Real, specific_heat: Real) -> PropsResult<Self> {
        if !conductivity.is_finite() || conductivity <= 0.0 {
            return Err(PropsError::NonPhysical {
                what: "conductivity must be positive and finite",
            });
        }
        if !density.is_finite() || density <= 0.0 {
            return Err(PropsError::NonPhysical {
                what: "density must be positive and finite",
            });
        }
        if !specific_heat.is_finite() || specific_heat <= 0.0 {
            return Err(PropsError::NonPhysical {
                what: "specific heat must be positive and finite",
            });
        }
        Ok(Self {
            conductivity,
            density,
            specific_heat,
        })
    }

    /// Volumetric heat capacity rho*cp, J/m3-K.
    pub fn rho_cp(&self) -> Real {
        self.density * self.specific_heat
    }

    /// Thermal diffusivity alpha = k / (rho*cp), m2/s.
    pub fn diffusivity(&self) -> Real {
        self.conductivity / self.rho_cp()
    }
}

/// Soil properties: base thermal properties plus moisture content used by
/// the freeze/thaw apparent heat capacity model.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SoilProps {
    pub base: ThermalProps,
    /// Volumetric moisture content, fraction of total volume [0..1].
    pub moisture_fraction: Real,
    /// Volumetric moisture content at saturation, fraction [0..1].
    pub saturation_fraction: Real,
}

impl SoilProps {
    pub fn new(
        base: ThermalProps,
        moisture_fraction: Real,
        saturation_fraction: Real,
    ) -> PropsResult<Self> {
        if !(0.0..=1.0).contains(&moisture_fraction) {
            return Err(PropsError::InvalidArg {
                what: "moisture fraction must be within [0, 1]",
            });
        }
        if !(0.0..=1.0).contains(&saturation_fraction) {
            return Err(PropsError::InvalidArg {
                what: "saturation fraction must be within [0, 1]",
            });
        }
        if moisture_fraction > saturation_fraction {
            return Err(PropsError::InvalidArg {
                what: "moisture fraction cannot exceed saturation fraction",
            });
        }
        Ok(Self {
            base,
            moisture_fraction,
            saturation_fraction,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn props_reject_non_physical() {
        assert!(ThermalProps::new(1.08, 962.0, 2576.0).is_ok());
        assert!(ThermalProps::new(0.0, 962.0, 2576.0).is_err());
        assert!(ThermalProps::new(1.08, -1.0, 2576.0).is_err());
        assert!(ThermalProps::new(1.08, 962.0, Real::NAN).is_err());
    }

    #[test]
    fn soil_moisture_bounds() {
        let base = ThermalProps::new(1.08, 962.0, 2576.0).unwrap();
        assert!(SoilProps::new(base, 0.3, 0.5).is_ok());
        assert!(SoilProps::new(base, 0.6, 0.5).is_err());
        assert!(SoilProps::new(base, -0.1, 0.5).is_err());
    }

    #[test]
    fn diffusivity_formula() {
        let p = ThermalProps::new(2.0, 1000.0, 2000.0).unwrap();
        assert!((p.diffusivity() - 1e-6).abs() < 1e-18);
    }
}
