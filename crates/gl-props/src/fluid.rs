//! Fluid property seam consumed by the pipe solver.
//!
//! The circuit fluid is described by an external property provider; the
//! solver captures a `FluidState` snapshot once per time step at the current
//! circuit inlet temperature and uses it for the whole step.

use crate::error::{PropsError, PropsResult};
use gl_core::Real;

/// Trait for fluid property providers.
///
/// Implementations must be thread-safe (Send + Sync). Temperatures are in
/// deg C; outputs are SI (kg/m3, J/kg-K, W/m-K, Pa-s).
pub trait FluidProperties: Send + Sync {
    /// Provider name (for debugging/logging).
    fn name(&self) -> &str;

    /// Density at the given temperature, kg/m3.
    fn density(&self, temp: Real) -> PropsResult<Real>;

    /// Specific heat at the given temperature, J/kg-K.
    fn specific_heat(&self, temp: Real) -> PropsResult<Real>;

    /// Thermal conductivity at the given temperature, W/m-K.
    fn conductivity(&self, temp: Real) -> PropsResult<Real>;

    /// Dynamic viscosity at the given temperature, Pa-s.
    fn viscosity(&self, temp: Real) -> PropsResult<Real>;

    /// Capture a snapshot of all properties at one temperature.
    fn state(&self, temp: Real) -> PropsResult<FluidState> {
        Ok(FluidState {
            density: self.density(temp)?,
            specific_heat: self.specific_heat(temp)?,
            conductivity: self.conductivity(temp)?,
            viscosity: self.viscosity(temp)?,
        })
    }
}

/// Fluid properties captured at one temperature.
#[derive(Clone, Copy, Debug)]
pub struct FluidState {
    pub density: Real,
    pub specific_heat: Real,
    pub conductivity: Real,
    pub viscosity: Real,
}

impl FluidState {
    /// Prandtl number cp*mu/k.
    pub fn prandtl(&self) -> Real {
        self.specific_heat * self.viscosity / self.conductivity
    }
}

/// Constant-property fluid, adequate for water-like loops over the narrow
/// temperature spans seen by buried circuits, and for testing.
#[derive(Clone, Debug)]
pub struct ConstantFluid {
    name: String,
    state: FluidState,
}

impl ConstantFluid {
    pub fn new(
        name: impl Into<String>,
        density: Real,
        specific_heat: Real,
        conductivity: Real,
        viscosity: Real,
    ) -> PropsResult<Self> {
        for (v, what) in [
            (density, "density must be positive and finite"),
            (specific_heat, "specific heat must be positive and finite"),
            (conductivity, "conductivity must be positive and finite"),
            (viscosity, "viscosity must be positive and finite"),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(PropsError::NonPhysical { what });
            }
        }
        Ok(Self {
            name: name.into(),
            state: FluidState {
                density,
                specific_heat,
                conductivity,
                viscosity,
            },
        })
    }

    /// Liquid water near 20 deg C.
    pub fn water() -> Self {
        Self::new("water", 998.0, 4182.0, 0.598, 1.002e-3).expect("water properties are physical")
    }
}

impl FluidProperties for ConstantFluid {
    fn name(&self) -> &str {
        &self.name
    }

    fn density(&self, _temp: Real) -> PropsResult<Real> {
        Ok(self.state.density)
    }

    fn specific_heat(&self, _temp: Real) -> PropsResult<Real> {
        Ok(self.state.specific_heat)
    }

    fn conductivity(&self, _temp: Real) -> PropsResult<Real> {
        Ok(self.state.conductivity)
    }

    fn viscosity(&self, _temp: Real) -> PropsResult<Real> {
        Ok(self.state.viscosity)
    }
}
