//! Mesh regions between forced partitions and their cell-width fills.

use crate::error::{MeshError, MeshResult};
use crate::partition::MeshPartition;
use gl_core::Real;
use tracing::warn;

/// How a gap region between partitions is filled with cells.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MeshDistribution {
    /// Equal cell widths.
    Uniform,
    /// Cells graded by a geometric series, mirrored about the region
    /// midpoint so the finest cells land at both region edges.
    SymmetricGeometric { coefficient: Real },
}

/// One contiguous span of an axis and the cell widths that fill it.
#[derive(Clone, Debug)]
pub struct GridRegion {
    pub min: Real,
    pub max: Real,
    pub cell_widths: Vec<Real>,
}

impl GridRegion {
    /// A partition region: exactly one cell spanning the forced range.
    pub fn from_partition(p: &MeshPartition) -> Self {
        Self {
            min: p.min(),
            max: p.max(),
            cell_widths: vec![p.max() - p.min()],
        }
    }

    /// A gap region filled per the axis distribution rule.
    pub fn from_gap(
        min: Real,
        max: Real,
        count: usize,
        distribution: MeshDistribution,
    ) -> MeshResult<Self> {
        if count == 0 {
            return Err(MeshError::InvalidInput {
                what: "axis mesh count must be positive",
            });
        }
        let width = max - min;
        let cell_widths = match distribution {
            MeshDistribution::Uniform => vec![width / count as Real; count],
            MeshDistribution::SymmetricGeometric { coefficient } => {
                if !coefficient.is_finite() || coefficient < 1.0 {
                    return Err(MeshError::InvalidInput {
                        what: "geometric coefficient must be >= 1",
                    });
                }
                let count = enforce_even(count);
                symmetric_geometric_widths(width, count, coefficient)
            }
        };
        Ok(Self {
            min,
            max,
            cell_widths,
        })
    }
}

/// Symmetric-geometric fills need an even count; an odd request is bumped up
/// by one with a warning rather than rejected (accepted legacy behavior).
fn enforce_even(count: usize) -> usize {
    if count % 2 == 1 {
        warn!(
            requested = count,
            corrected = count + 1,
            "odd mesh count with symmetric-geometric distribution; incrementing to the next even number"
        );
        count + 1
    } else {
        count
    }
}

fn symmetric_geometric_widths(width: Real, count: usize, coefficient: Real) -> Vec<Real> {
    let cells_per_side = count / 2;
    let mut summation = 0.0;
    for i in 0..cells_per_side {
        summation += coefficient.powi(i as i32);
    }

    let mut widths = Vec::with_capacity(count);
    let mut cell_width = (width / 2.0) / summation;
    widths.push(cell_width);
    for _ in 1..cells_per_side {
        cell_width *= coefficient;
        widths.push(cell_width);
    }
    // Mirror the first half so the grading is symmetric about the midpoint.
    for i in (0..cells_per_side).rev() {
        widths.push(widths[i]);
    }
    widths
}
