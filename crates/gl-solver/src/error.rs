//! Error types for the domain solvers.

use thiserror::Error;

/// Fatal solver failures. Hitting an iteration cap is not one of these; it
/// is reported through [`crate::ConvergenceStats`] instead.
#[derive(Error, Debug)]
pub enum SolverError {
    #[error(
        "Cell ({x},{y},{z}) temperature {temp} outside the sane range [{min}, {max}]: \
         the solution has diverged"
    )]
    TemperatureOutOfRange {
        x: usize,
        y: usize,
        z: usize,
        temp: f64,
        min: f64,
        max: f64,
    },

    #[error("Cell ({x},{y},{z}) temperature is not finite")]
    NonFiniteTemperature { x: usize, y: usize, z: usize },
}

pub type SolverResult<T> = Result<T, SolverError>;
