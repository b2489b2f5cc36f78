//! Error types for property evaluation.

use thiserror::Error;

/// Errors raised while evaluating material or fluid properties.
#[derive(Error, Debug)]
pub enum PropsError {
    #[error("Non-physical property: {what}")]
    NonPhysical { what: &'static str },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },
}

pub type PropsResult<T> = Result<T, PropsError>;
