//! Error types for mesh construction.

use crate::primitives::Axis;
use thiserror::Error;

/// Errors raised while building a domain mesh.
///
/// Every variant here corresponds to geometrically inconsistent input; none
/// are recoverable at runtime.
#[derive(Error, Debug)]
pub enum MeshError {
    #[error("Partition on {axis:?} axis at {center} (half width {half_width}) lies outside the domain [0, {axis_max}]")]
    PartitionOutOfBounds {
        axis: Axis,
        center: f64,
        half_width: f64,
        axis_max: f64,
    },

    #[error("Partitions on {axis:?} axis overlap near {at}: forced cell ranges must not intersect")]
    OverlappingPartitions { axis: Axis, at: f64 },

    #[error("Pipe segments {first} and {second} overlap: their forced cells intersect in the XY plane")]
    PipesOverlap { first: u32, second: u32 },

    #[error("Radial structure does not fit the pipe cell: {what}")]
    RadialStructure { what: &'static str },

    #[error("Invalid mesh input: {what}")]
    InvalidInput { what: &'static str },
}

pub type MeshResult<T> = Result<T, MeshError>;
