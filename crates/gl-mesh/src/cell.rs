//! Cartesian cells, the dense cell grid, and neighbor geometry.

use crate::primitives::{CellExtents, Direction};
use crate::radial::PipeCellData;
use gl_core::Real;
use gl_props::ThermalProps;
use nalgebra::Point3;

/// Boundary-condition role of a cell, fixed at mesh build.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellType {
    GeneralField,
    Pipe,
    GroundSurface,
    FarfieldBoundary,
    AdiabaticWall,
    BasementWall,
    BasementFloor,
    BasementCorner,
    /// Inside the basement envelope; excluded from calculation entirely.
    BasementCutaway,
    Slab,
    ZoneGroundInterface,
    HorizInsulation,
    VertInsulation,
}

impl CellType {
    /// Cutaway cells take no part in the solve.
    pub fn participates(self) -> bool {
        self != CellType::BasementCutaway
    }
}

/// Running tally of cell classifications, reported after mesh build.
/// Informational only; nothing in the solve depends on these counts.
#[derive(Clone, Copy, Debug, Default)]
pub struct CellTypeCounts {
    pub general_field: usize,
    pub pipe: usize,
    pub ground_surface: usize,
    pub farfield_boundary: usize,
    pub adiabatic_wall: usize,
    pub basement_wall: usize,
    pub basement_floor: usize,
    pub basement_corner: usize,
    pub basement_cutaway: usize,
    pub slab: usize,
    pub zone_ground_interface: usize,
    pub horiz_insulation: usize,
    pub vert_insulation: usize,
}

impl CellTypeCounts {
    pub fn record(&mut self, cell_type: CellType) {
        match cell_type {
            CellType::GeneralField => self.general_field += 1,
            CellType::Pipe => self.pipe += 1,
            CellType::GroundSurface => self.ground_surface += 1,
            CellType::FarfieldBoundary => self.farfield_boundary += 1,
            CellType::AdiabaticWall => self.adiabatic_wall += 1,
            CellType::BasementWall => self.basement_wall += 1,
            CellType::BasementFloor => self.basement_floor += 1,
            CellType::BasementCorner => self.basement_corner += 1,
            CellType::BasementCutaway => self.basement_cutaway += 1,
            CellType::Slab => self.slab += 1,
            CellType::ZoneGroundInterface => self.zone_ground_interface += 1,
            CellType::HorizInsulation => self.horiz_insulation += 1,
            CellType::VertInsulation => self.vert_insulation += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.general_field
            + self.pipe
            + self.ground_surface
            + self.farfield_boundary
            + self.adiabatic_wall
            + self.basement_wall
            + self.basement_floor
            + self.basement_corner
            + self.basement_cutaway
            + self.slab
            + self.zone_ground_interface
            + self.horiz_insulation
            + self.vert_insulation
    }
}

/// Zero-based grid coordinates of a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellIndex {
    pub x: usize,
    pub y: usize,
    pub z: usize,
}

/// Precomputed geometry toward one neighbor.
///
/// All distances are zero at a domain boundary (there is no neighbor there;
/// boundary cells derive their behavior from virtual half-cell resistances
/// instead).
#[derive(Clone, Copy, Debug)]
pub struct NeighborInfo {
    pub centroid_to_centroid: Real,
    pub this_centroid_to_wall: Real,
    pub wall_to_neighbor_centroid: Real,
    /// 2.0 when the opposite face is a symmetry plane (the neighbor term
    /// stands in for its mirror image), otherwise 1.0.
    pub adiabatic_multiplier: Real,
}

impl Default for NeighborInfo {
    fn default() -> Self {
        Self {
            centroid_to_centroid: 0.0,
            this_centroid_to_wall: 0.0,
            wall_to_neighbor_centroid: 0.0,
            adiabatic_multiplier: 1.0,
        }
    }
}

/// Structural payload of a cell: plain conduction cells carry nothing extra;
/// pipe cells own their radial sub-structure.
#[derive(Clone, Debug)]
pub enum CellPayload {
    Solid,
    Pipe(Box<PipeCellData>),
}

/// One finite-volume control volume in the 3D mesh.
#[derive(Clone, Debug)]
pub struct CartesianCell {
    pub index: CellIndex,
    pub extents: CellExtents,
    pub centroid: Point3<Real>,
    pub cell_type: CellType,
    pub props: ThermalProps,
    pub temperature: Real,
    pub temperature_prev_iteration: Real,
    pub temperature_prev_time_step: Real,
    /// Implicit-scheme coefficient dt / (rho * V * cp); refreshed whenever
    /// the time step or apparent specific heat changes.
    pub beta: Real,
    pub neighbors: [NeighborInfo; 6],
    pub payload: CellPayload,
}

impl CartesianCell {
    pub fn width(&self) -> Real {
        self.extents.width()
    }

    pub fn height(&self) -> Real {
        self.extents.height()
    }

    pub fn depth(&self) -> Real {
        self.extents.depth()
    }

    pub fn volume(&self) -> Real {
        self.extents.volume()
    }

    pub fn normal_area(&self, direction: Direction) -> Real {
        self.extents.normal_area(direction)
    }

    pub fn neighbor(&self, direction: Direction) -> &NeighborInfo {
        &self.neighbors[direction.slot()]
    }

    pub fn is_pipe(&self) -> bool {
        matches!(self.payload, CellPayload::Pipe(_))
    }

    pub fn pipe_data(&self) -> Option<&PipeCellData> {
        match &self.payload {
            CellPayload::Pipe(data) => Some(data),
            CellPayload::Solid => None,
        }
    }

    pub fn pipe_data_mut(&mut self) -> Option<&mut PipeCellData> {
        match &mut self.payload {
            CellPayload::Pipe(data) => Some(data),
            CellPayload::Solid => None,
        }
    }
}

/// Small fixed-capacity set of directions.
///
/// Returned by the neighbor queries so callers never share a mutable scratch
/// buffer between nested evaluations.
#[derive(Clone, Copy, Debug, Default)]
pub struct DirectionSet {
    dirs: [Option<Direction>; 6],
    len: usize,
}

impl DirectionSet {
    pub fn push(&mut self, dir: Direction) {
        self.dirs[self.len] = Some(dir);
        self.len += 1;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Direction> + '_ {
        self.dirs[..self.len].iter().map(|d| d.expect("filled slot"))
    }

    pub fn contains(&self, dir: Direction) -> bool {
        self.iter().any(|d| d == dir)
    }
}

/// Dense 3D cell array stored as a flat arena, X-major then Y then Z.
#[derive(Clone, Debug)]
pub struct CellGrid {
    nx: usize,
    ny: usize,
    nz: usize,
    cells: Vec<CartesianCell>,
}

impl CellGrid {
    pub fn new(nx: usize, ny: usize, nz: usize, cells: Vec<CartesianCell>) -> Self {
        debug_assert_eq!(cells.len(), nx * ny * nz);
        Self { nx, ny, nz, cells }
    }

    pub fn dims(&self) -> (usize, usize, usize) {
        (self.nx, self.ny, self.nz)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn flat_index(&self, index: CellIndex) -> usize {
        (index.z * self.ny + index.y) * self.nx + index.x
    }

    pub fn cell(&self, flat: usize) -> &CartesianCell {
        &self.cells[flat]
    }

    pub fn cell_mut(&mut self, flat: usize) -> &mut CartesianCell {
        &mut self.cells[flat]
    }

    pub fn at(&self, index: CellIndex) -> &CartesianCell {
        &self.cells[self.flat_index(index)]
    }

    pub fn at_mut(&mut self, index: CellIndex) -> &mut CartesianCell {
        let flat = self.flat_index(index);
        &mut self.cells[flat]
    }

    pub fn iter(&self) -> impl Iterator<Item = &CartesianCell> {
        self.cells.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut CartesianCell> {
        self.cells.iter_mut()
    }

    /// Grid index of the neighbor in the given direction, if one exists.
    pub fn neighbor_index(&self, index: CellIndex, direction: Direction) -> Option<CellIndex> {
        let CellIndex { x, y, z } = index;
        let (x, y, z) = match direction {
            Direction::XMinus => (x.checked_sub(1)?, y, z),
            Direction::XPlus => {
                if x + 1 >= self.nx {
                    return None;
                }
                (x + 1, y, z)
            }
            Direction::YMinus => (x, y.checked_sub(1)?, z),
            Direction::YPlus => {
                if y + 1 >= self.ny {
                    return None;
                }
                (x, y + 1, z)
            }
            Direction::ZMinus => (x, y, z.checked_sub(1)?),
            Direction::ZPlus => {
                if z + 1 >= self.nz {
                    return None;
                }
                (x, y, z + 1)
            }
        };
        Some(CellIndex { x, y, z })
    }

    /// Split the six directions around a cell into those with a real
    /// neighbor and those facing a domain boundary.
    pub fn split_directions(&self, index: CellIndex) -> (DirectionSet, DirectionSet) {
        let mut field = DirectionSet::default();
        let mut boundary = DirectionSet::default();
        for dir in Direction::ALL {
            if self.neighbor_index(index, dir).is_some() {
                field.push(dir);
            } else {
                boundary.push(dir);
            }
        }
        (field, boundary)
    }
}
