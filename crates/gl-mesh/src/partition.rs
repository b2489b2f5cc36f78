//! Forced cell boundaries along one axis.
//!
//! A partition records where the mesh must place a cell of fixed width: a
//! pipe center, a basement wall or floor interface, an insulation edge, or a
//! slab edge. Partitions are construction-time values consumed by the
//! builder and discarded.

use crate::error::{MeshError, MeshResult};
use crate::primitives::Axis;
use gl_core::numeric::{nearly_equal, Tolerances};
use gl_core::Real;

/// What kind of feature forces this partition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PartitionKind {
    Pipe,
    WallInterface,
    FloorInterface,
    InsulationEdge,
    SlabEdge,
}

/// One forced cell along an axis: `[center - half_width, center + half_width]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshPartition {
    pub center: Real,
    pub half_width: Real,
    pub kind: PartitionKind,
}

impl MeshPartition {
    pub fn min(&self) -> Real {
        self.center - self.half_width
    }

    pub fn max(&self) -> Real {
        self.center + self.half_width
    }
}

/// Collects partitions for one axis, deduplicates coincident ones, and
/// validates ordering before region generation.
#[derive(Clone, Debug)]
pub struct PartitionSet {
    axis: Axis,
    axis_max: Real,
    partitions: Vec<MeshPartition>,
}

// Two partitions closer than this are treated as the same feature.
const COINCIDENCE_TOL: Real = 1e-9;
const COINCIDENCE: Tolerances = Tolerances {
    abs: COINCIDENCE_TOL,
    rel: 0.0,
};

impl PartitionSet {
    pub fn new(axis: Axis, axis_max: Real) -> Self {
        Self {
            axis,
            axis_max,
            partitions: Vec::new(),
        }
    }

    /// Add a partition. Coincident duplicates (same center, same width) are
    /// merged silently: two pipe segments stacked at the same X produce one
    /// X partition.
    pub fn push(&mut self, partition: MeshPartition) {
        let duplicate = self.partitions.iter().any(|p| {
            nearly_equal(p.center, partition.center, COINCIDENCE)
                && nearly_equal(p.half_width, partition.half_width, COINCIDENCE)
        });
        if !duplicate {
            self.partitions.push(partition);
        }
    }

    /// Sort ascending and validate bounds and non-overlap.
    ///
    /// Both failure modes indicate a geometrically inconsistent model and
    /// poison the whole domain.
    pub fn finalize(mut self) -> MeshResult<Vec<MeshPartition>> {
        self.partitions
            .sort_by(|a, b| a.center.partial_cmp(&b.center).expect("finite centers"));

        for p in &self.partitions {
            let strict = p.kind == PartitionKind::Pipe;
            let below = if strict { p.min() <= 0.0 } else { p.min() < 0.0 };
            let above = if strict {
                p.max() >= self.axis_max
            } else {
                p.max() > self.axis_max
            };
            if below || above {
                return Err(MeshError::PartitionOutOfBounds {
                    axis: self.axis,
                    center: p.center,
                    half_width: p.half_width,
                    axis_max: self.axis_max,
                });
            }
        }

        for pair in self.partitions.windows(2) {
            if pair[0].max() > pair[1].min() + COINCIDENCE_TOL {
                return Err(MeshError::OverlappingPartitions {
                    axis: self.axis,
                    at: pair[1].min(),
                });
            }
        }

        Ok(self.partitions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipe(center: Real, half_width: Real) -> MeshPartition {
        MeshPartition {
            center,
            half_width,
            kind: PartitionKind::Pipe,
        }
    }

    #[test]
    fn sorted_on_finalize() {
        let mut set = PartitionSet::new(Axis::X, 10.0);
        set.push(pipe(7.0, 0.1));
        set.push(pipe(2.0, 0.1));
        let out = set.finalize().unwrap();
        assert_eq!(out[0].center, 2.0);
        assert_eq!(out[1].center, 7.0);
    }

    #[test]
    fn coincident_partitions_merge() {
        let mut set = PartitionSet::new(Axis::X, 10.0);
        set.push(pipe(2.0, 0.1));
        set.push(pipe(2.0, 0.1));
        assert_eq!(set.finalize().unwrap().len(), 1);
    }

    #[test]
    fn near_coincident_partitions_merge() {
        // Float noise below the coincidence tolerance is the same feature.
        let mut set = PartitionSet::new(Axis::X, 10.0);
        set.push(pipe(2.0, 0.1));
        set.push(pipe(2.0 + 1e-12, 0.1 - 1e-12));
        assert_eq!(set.finalize().unwrap().len(), 1);
    }

    #[test]
    fn overlap_is_fatal() {
        let mut set = PartitionSet::new(Axis::X, 10.0);
        set.push(pipe(2.0, 0.2));
        set.push(pipe(2.3, 0.2));
        assert!(matches!(
            set.finalize(),
            Err(MeshError::OverlappingPartitions { .. })
        ));
    }

    #[test]
    fn out_of_bounds_is_fatal() {
        let mut set = PartitionSet::new(Axis::X, 10.0);
        set.push(pipe(9.95, 0.1));
        assert!(matches!(
            set.finalize(),
            Err(MeshError::PartitionOutOfBounds { .. })
        ));

        let mut set = PartitionSet::new(Axis::X, 10.0);
        set.push(pipe(0.05, 0.1));
        assert!(set.finalize().is_err());
    }

    #[test]
    fn interface_partition_may_touch_boundary() {
        let mut set = PartitionSet::new(Axis::Y, 10.0);
        set.push(MeshPartition {
            center: 9.9,
            half_width: 0.1,
            kind: PartitionKind::SlabEdge,
        });
        assert!(set.finalize().is_ok());
    }
}
