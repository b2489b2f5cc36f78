//! gl-mesh: non-uniform Cartesian mesh generation for ground domains.
//!
//! Partitions a 3D box into cells forced to coincide with pipe locations and
//! wall/floor/insulation interfaces, classifies every cell by boundary role,
//! and precomputes the neighbor geometry the conduction solver needs. Pipe
//! cells carry a nested radial sub-structure (soil annuli, optional
//! insulation, pipe wall, fluid core).

pub mod boundary;
pub mod builder;
pub mod cell;
pub mod error;
pub mod partition;
pub mod primitives;
pub mod radial;
pub mod region;

pub use builder::{
    AxisMesh, BasementGeometry, DomainExtents, DomainStructure, Mesh, MeshBuilder, MeshInput,
    PipePlacement, SlabGeometry, StructureIndices,
};
pub use cell::{
    CartesianCell, CellGrid, CellIndex, CellPayload, CellType, CellTypeCounts, DirectionSet,
    NeighborInfo,
};
pub use error::{MeshError, MeshResult};
pub use partition::{MeshPartition, PartitionKind};
pub use primitives::{Axis, CellExtents, Direction, Rect};
pub use radial::{FluidCell, PipeCellData, RadialCell, RadialSpec};
pub use region::{GridRegion, MeshDistribution};
