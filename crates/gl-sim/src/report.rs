//! Per-step reporting structures.

use gl_core::Real;
use gl_solver::{ConvergenceStats, SegmentTemps};

/// One circuit's results for the just-completed step.
#[derive(Clone, Debug)]
pub struct CircuitReport {
    pub name: String,
    pub inlet_temp: Real,
    pub outlet_temp: Real,
    /// Delivered mass flow this step, kg/s.
    pub mass_flow: Real,
    /// mdot * cp * (Tin - Tout), W. Positive when the loop rejects heat.
    pub heat_loss: Real,
    pub segments: Vec<SegmentTemps>,
}

/// Everything one domain step produced.
#[derive(Clone, Debug)]
pub struct StepReport {
    pub convergence: ConvergenceStats,
    pub circuits: Vec<CircuitReport>,
    /// Averaged coupled-surface temperatures, where the domain has them.
    pub wall_surface_temp: Option<Real>,
    pub floor_surface_temp: Option<Real>,
    pub zone_surface_temp: Option<Real>,
}
