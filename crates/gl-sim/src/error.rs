//! Error types for domain orchestration.

use thiserror::Error;

/// Errors raised while loading, validating, or stepping a simulation.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid configuration: {what}")]
    InvalidConfig { what: String },

    #[error("Unknown {kind} reference: {name}")]
    UnknownReference { kind: &'static str, name: String },

    #[error("Backend error: {message}")]
    Backend { message: String },
}

pub type SimResult<T> = Result<T, SimError>;

impl From<gl_mesh::MeshError> for SimError {
    fn from(e: gl_mesh::MeshError) -> Self {
        SimError::Backend {
            message: e.to_string(),
        }
    }
}

impl From<gl_solver::SolverError> for SimError {
    fn from(e: gl_solver::SolverError) -> Self {
        SimError::Backend {
            message: e.to_string(),
        }
    }
}

impl From<gl_props::PropsError> for SimError {
    fn from(e: gl_props::PropsError) -> Self {
        SimError::Backend {
            message: e.to_string(),
        }
    }
}
