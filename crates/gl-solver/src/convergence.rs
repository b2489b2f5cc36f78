//! Iteration convergence measurement and post-convergence sanity checks.

use crate::error::{SolverError, SolverResult};
use gl_core::numeric::ensure_finite;
use gl_core::Real;
use gl_mesh::CellGrid;

/// Outcome of one outer iteration loop.
#[derive(Clone, Copy, Debug)]
pub struct ConvergenceStats {
    pub iterations: usize,
    pub max_delta: Real,
    /// False when the loop exhausted its cap; the last iterate is still
    /// accepted and used.
    pub converged: bool,
}

/// Domain-wide maximum absolute temperature change since the last iteration,
/// over all cells and all radial sub-cells.
pub fn max_temperature_delta(grid: &CellGrid) -> Real {
    let mut max_delta: Real = 0.0;
    for cell in grid.iter() {
        if !cell.cell_type.participates() {
            continue;
        }
        max_delta = max_delta.max((cell.temperature - cell.temperature_prev_iteration).abs());
        if let Some(data) = cell.pipe_data() {
            for annulus in &data.soil {
                max_delta =
                    max_delta.max((annulus.temperature - annulus.temperature_prev_iteration).abs());
            }
            if let Some(ins) = &data.insulation {
                max_delta = max_delta.max((ins.temperature - ins.temperature_prev_iteration).abs());
            }
            max_delta =
                max_delta.max((data.pipe.temperature - data.pipe.temperature_prev_iteration).abs());
            max_delta = max_delta
                .max((data.fluid.temperature - data.fluid.temperature_prev_iteration).abs());
        }
    }
    max_delta
}

/// Post-convergence divergence check: every participating cell temperature
/// must be finite and inside the configured sane range.
pub fn check_temperature_bounds(grid: &CellGrid, min: Real, max: Real) -> SolverResult<()> {
    for cell in grid.iter() {
        if !cell.cell_type.participates() {
            continue;
        }
        let (x, y, z) = (cell.index.x, cell.index.y, cell.index.z);
        ensure_finite(cell.temperature, "cell temperature")
            .map_err(|_| SolverError::NonFiniteTemperature { x, y, z })?;
        if cell.temperature < min || cell.temperature > max {
            return Err(SolverError::TemperatureOutOfRange {
                x,
                y,
                z,
                temp: cell.temperature,
                min,
                max,
            });
        }
    }
    Ok(())
}
