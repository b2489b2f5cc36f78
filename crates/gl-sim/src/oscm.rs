//! Other-side conditions exchanged with a coupled building envelope.
//!
//! The envelope side reports the convective flux it saw at each coupled
//! surface; the domain averages those into the imposed boundary fluxes of
//! its next step, and after the step writes back the averaged interface
//! temperatures, pinned with a very large convection coefficient so the
//! envelope surface tracks the ground solution.

use gl_core::units::constants::IMPOSED_SURFACE_COEFF;
use gl_core::Real;
use gl_solver::BoundaryFluxes;

/// Running average of surface convective flux samples, W/m2.
///
/// The caller owns the reset: samples accumulate across however many
/// envelope steps happen between two domain steps.
#[derive(Clone, Copy, Debug, Default)]
pub struct FluxAccumulator {
    sum: Real,
    samples: usize,
}

impl FluxAccumulator {
    pub fn reset(&mut self) {
        self.sum = 0.0;
        self.samples = 0;
    }

    /// Record one convective flux sample, positive out of the domain.
    pub fn record(&mut self, flux: Real) {
        self.sum += flux;
        self.samples += 1;
    }

    pub fn average(&self) -> Real {
        if self.samples == 0 {
            0.0
        } else {
            self.sum / self.samples as Real
        }
    }

    /// The averaged flux with its sign flipped into the domain convention.
    pub fn imposed_flux(&self) -> Real {
        -self.average()
    }
}

/// Boundary condition written back to one coupled envelope surface.
#[derive(Clone, Copy, Debug)]
pub struct CoupledSurface {
    pub temperature: Real,
    pub convection_coefficient: Real,
    pub radiation_coefficient: Real,
}

impl CoupledSurface {
    /// Pin the surface to a ground-side temperature.
    pub fn imposed(temperature: Real) -> Self {
        Self {
            temperature,
            convection_coefficient: IMPOSED_SURFACE_COEFF,
            radiation_coefficient: 0.0,
        }
    }
}

/// Both directions of the envelope coupling for one domain.
#[derive(Clone, Debug, Default)]
pub struct OtherSideConditions {
    /// Fluxes reported by the envelope since the last domain step.
    pub wall: FluxAccumulator,
    pub floor: FluxAccumulator,
    pub zone: FluxAccumulator,
    /// Written after each domain step; `None` for planes the domain lacks.
    pub wall_surface: Option<CoupledSurface>,
    pub floor_surface: Option<CoupledSurface>,
    pub zone_surface: Option<CoupledSurface>,
}

impl OtherSideConditions {
    /// Imposed boundary fluxes for the next domain step.
    pub fn fluxes(&self) -> BoundaryFluxes {
        BoundaryFluxes {
            basement_wall: self.wall.imposed_flux(),
            basement_floor: self.floor.imposed_flux(),
            zone_interface: self.zone.imposed_flux(),
        }
    }
}
