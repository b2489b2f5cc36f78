//! Kusuda-Achenbach undisturbed ground temperature model.
//!
//! Drives the far-field boundary cells: a damped sinusoid in time whose
//! amplitude decays and whose phase lags with depth below the ground surface.

use crate::error::{PropsError, PropsResult};
use crate::material::ThermalProps;
use gl_core::units::constants::SECS_PER_YEAR;
use gl_core::Real;
use std::f64::consts::PI;

/// Far-field sinusoidal ground temperature parameters.
#[derive(Clone, Copy, Debug)]
pub struct KusudaModel {
    /// Annual average ground surface temperature, deg C.
    pub average_temp: Real,
    /// Annual surface temperature amplitude, deg C.
    pub amplitude: Real,
    /// Phase shift of the minimum surface temperature, seconds into the year.
    pub phase_shift: Real,
    /// Soil thermal diffusivity, m2/s.
    diffusivity: Real,
}

impl KusudaModel {
    pub fn new(
        average_temp: Real,
        amplitude: Real,
        phase_shift: Real,
        soil: &ThermalProps,
    ) -> PropsResult<Self> {
        let diffusivity = soil.diffusivity();
        if !diffusivity.is_finite() || diffusivity <= 0.0 {
            return Err(PropsError::NonPhysical {
                what: "soil diffusivity must be positive and finite",
            });
        }
        if amplitude < 0.0 {
            return Err(PropsError::InvalidArg {
                what: "temperature amplitude cannot be negative",
            });
        }
        Ok(Self {
            average_temp,
            amplitude,
            phase_shift,
            diffusivity,
        })
    }

    /// Undisturbed ground temperature at `depth` meters below the surface,
    /// `time` seconds into the simulation, deg C.
    pub fn ground_temp(&self, depth: Real, time: Real) -> Real {
        let alpha = self.diffusivity;
        let decay = (-depth * (PI / (SECS_PER_YEAR * alpha)).sqrt()).exp();
        let phase = 2.0 * PI / SECS_PER_YEAR * (time - self.phase_shift)
            - (depth / 2.0) * (SECS_PER_YEAR / (PI * alpha)).sqrt();
        self.average_temp - self.amplitude * decay * phase.cos()
    }
}
