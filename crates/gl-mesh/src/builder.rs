//! Domain mesh construction.
//!
//! Collects forced partitions per axis (pipe centers, wall/floor interfaces,
//! insulation and slab edges), fills the gaps per the axis distribution rule,
//! flattens everything into boundary-point arrays, then creates and
//! classifies the dense 3D cell array and precomputes neighbor geometry.

use crate::boundary::flatten_regions;
use crate::cell::{
    CartesianCell, CellGrid, CellIndex, CellPayload, CellType, CellTypeCounts, NeighborInfo,
};
use crate::error::{MeshError, MeshResult};
use crate::partition::{MeshPartition, PartitionKind, PartitionSet};
use crate::primitives::{Axis, Direction};
use crate::radial::{PipeCellData, RadialSpec};
use crate::region::{GridRegion, MeshDistribution};
use gl_core::ids::SegmentId;
use gl_core::Real;
use gl_props::ThermalProps;
use tracing::debug;

// Gaps narrower than this between partitions are not meshed.
const MIN_GAP: Real = 1e-9;

/// Outer dimensions of the ground domain, m. The domain occupies
/// `[0, max]` on each axis; Y+ is up, the ground surface is at `y_max`.
#[derive(Clone, Copy, Debug)]
pub struct DomainExtents {
    pub x_max: Real,
    pub y_max: Real,
    pub z_max: Real,
}

impl DomainExtents {
    pub fn validate(&self) -> MeshResult<()> {
        if self.x_max <= 0.0 || self.y_max <= 0.0 || self.z_max <= 0.0 {
            return Err(MeshError::InvalidInput {
                what: "domain extents must be positive",
            });
        }
        Ok(())
    }

    fn along(&self, axis: Axis) -> Real {
        match axis {
            Axis::X => self.x_max,
            Axis::Y => self.y_max,
            Axis::Z => self.z_max,
        }
    }
}

/// Per-axis mesh density: how many cells fill each gap between partitions,
/// and how their widths are distributed.
#[derive(Clone, Copy, Debug)]
pub struct AxisMesh {
    pub count: usize,
    pub distribution: MeshDistribution,
}

/// One pipe segment's placement in the XY plane. The pipe runs the full Z
/// extent of the domain.
#[derive(Clone, Copy, Debug)]
pub struct PipePlacement {
    pub segment: SegmentId,
    pub x: Real,
    pub y: Real,
    pub radial: RadialSpec,
}

/// Basement geometry shared by the in-domain (FHX) and zone-coupled forms.
///
/// `width` is measured from the basement's symmetry side: from `x = 0` for
/// the in-domain basement, from `x = x_max` (and `z = z_max`) for the
/// zone-coupled one.
#[derive(Clone, Copy, Debug)]
pub struct BasementGeometry {
    pub width: Real,
    /// Floor interface depth below the ground surface, m.
    pub depth: Real,
    /// Half-width of the forced wall/floor interface cells.
    pub interface_half_width: Real,
}

/// Zone-coupled slab geometry. The footprint occupies the far corner of the
/// domain, `[x_max - width_x, x_max] x [z_max - width_z, z_max]`, with
/// symmetry planes on the X+ and Z+ faces.
#[derive(Clone, Debug)]
pub struct SlabGeometry {
    pub width_x: Real,
    pub width_z: Real,
    pub interface_half_width: Real,
    /// Slab body directly beneath the interface layer: (thickness, material).
    pub slab: Option<(Real, ThermalProps)>,
    /// Horizontal insulation beneath the slab body: (thickness, material).
    pub horizontal_insulation: Option<(Real, ThermalProps)>,
    /// Vertical insulation along the footprint perimeter, down to the given
    /// depth below the surface: (depth, material).
    pub vertical_insulation: Option<(Real, ThermalProps)>,
}

/// What kind of building coupling, if any, the domain carries.
#[derive(Clone, Debug)]
pub enum DomainStructure {
    /// Plain underground domain: pipes in soil, far-field sides.
    Generic,
    /// Basement carved out of a pipe domain, against the `x = 0` symmetry
    /// plane, with per-surface imposed heat fluxes.
    FhxBasement(BasementGeometry),
    /// Basement in the far corner of a dedicated domain, coupled to the zone
    /// heat balance through averaged wall/floor fluxes.
    ZoneCoupledBasement {
        geometry: BasementGeometry,
        /// Basement extent along Z, measured from `z = z_max`.
        length: Real,
    },
    /// Slab in the far corner of a dedicated domain.
    ZoneCoupledSlab(SlabGeometry),
}

impl DomainStructure {
    /// Domain faces that are symmetry planes rather than far-field sides.
    pub fn symmetry_faces(&self) -> &'static [Direction] {
        match self {
            DomainStructure::Generic => &[],
            DomainStructure::FhxBasement(_) => &[Direction::XMinus],
            DomainStructure::ZoneCoupledBasement { .. } | DomainStructure::ZoneCoupledSlab(_) => {
                &[Direction::XPlus, Direction::ZPlus]
            }
        }
    }
}

/// Grid-index thresholds of the structural features, recorded at build time
/// and consulted by the field solver when evaluating interface cells.
#[derive(Clone, Copy, Debug, Default)]
pub struct StructureIndices {
    /// X index of the basement wall interface cells.
    pub wall_x: Option<usize>,
    /// Z index of the zone-coupled basement's second wall plane.
    pub wall_z: Option<usize>,
    /// Y index of the basement floor interface cells.
    pub floor_y: Option<usize>,
    /// Minimum X/Z indices of the slab footprint.
    pub slab_x: Option<usize>,
    pub slab_z: Option<usize>,
    /// Y index of the slab body layer.
    pub slab_y: Option<usize>,
    /// Y index of the horizontal insulation layer.
    pub horiz_ins_y: Option<usize>,
    /// Minimum Y index reached by vertical insulation.
    pub vert_ins_y: Option<usize>,
}

/// Everything the mesh builder needs to produce a domain grid.
#[derive(Clone, Debug)]
pub struct MeshInput {
    pub extents: DomainExtents,
    pub mesh_x: AxisMesh,
    pub mesh_y: AxisMesh,
    pub mesh_z: AxisMesh,
    pub soil: ThermalProps,
    pub structure: DomainStructure,
    pub pipes: Vec<PipePlacement>,
}

/// A fully built domain mesh.
#[derive(Clone, Debug)]
pub struct Mesh {
    pub grid: CellGrid,
    /// Ascending cell boundary points per axis (X, Y, Z).
    pub boundaries: [Vec<Real>; 3],
    pub counts: CellTypeCounts,
    /// Resolved (X, Y) cell column per pipe segment, in input order.
    pub pipe_columns: Vec<(SegmentId, usize, usize)>,
    pub indices: StructureIndices,
    pub structure: DomainStructure,
}

pub struct MeshBuilder {
    input: MeshInput,
}

impl MeshBuilder {
    pub fn new(input: MeshInput) -> Self {
        Self { input }
    }

    pub fn build(self) -> MeshResult<Mesh> {
        let input = self.input;
        input.extents.validate()?;
        validate_pipes(&input)?;

        let bx = build_axis(&input, Axis::X)?;
        let by = build_axis(&input, Axis::Y)?;
        let bz = build_axis(&input, Axis::Z)?;
        let boundaries = [bx, by, bz];

        let indices = locate_structure(&input, &boundaries);

        let nx = boundaries[0].len() - 1;
        let ny = boundaries[1].len() - 1;
        let nz = boundaries[2].len() - 1;

        let mut pipe_columns: Vec<Option<(SegmentId, usize, usize)>> =
            vec![None; input.pipes.len()];

        let mut counts = CellTypeCounts::default();
        let mut cells = Vec::with_capacity(nx * ny * nz);
        for z in 0..nz {
            for y in 0..ny {
                for x in 0..nx {
                    let index = CellIndex { x, y, z };
                    let extents = crate::primitives::CellExtents {
                        x_min: boundaries[0][x],
                        x_max: boundaries[0][x + 1],
                        y_min: boundaries[1][y],
                        y_max: boundaries[1][y + 1],
                        z_min: boundaries[2][z],
                        z_max: boundaries[2][z + 1],
                    };
                    // Pipe membership: the segment's XY location lands in
                    // this cell's half-open footprint rectangle.
                    let rect = extents.xy_rect();
                    let pipe = input.pipes.iter().position(|p| rect.contains(p.x, p.y));
                    if let Some(i) = pipe {
                        pipe_columns[i] = Some((input.pipes[i].segment, x, y));
                    }
                    let cell_type =
                        classify(&input.structure, &indices, (nx, ny, nz), index, pipe.is_some());
                    counts.record(cell_type);

                    let payload = match pipe {
                        Some(i) if cell_type == CellType::Pipe => {
                            CellPayload::Pipe(Box::new(PipeCellData::new(
                                extents.width(),
                                extents.depth(),
                                &input.pipes[i].radial,
                                input.soil,
                            )?))
                        }
                        _ => CellPayload::Solid,
                    };
                    let props = material_for(&input, cell_type);

                    cells.push(CartesianCell {
                        index,
                        centroid: extents.centroid(),
                        extents,
                        cell_type,
                        props,
                        temperature: 0.0,
                        temperature_prev_iteration: 0.0,
                        temperature_prev_time_step: 0.0,
                        beta: 0.0,
                        neighbors: Default::default(),
                        payload,
                    });
                }
            }
        }

        let pipe_columns: Vec<(SegmentId, usize, usize)> = pipe_columns
            .into_iter()
            .map(|column| {
                column.ok_or(MeshError::InvalidInput {
                    what: "pipe segment lies outside the meshed domain",
                })
            })
            .collect::<MeshResult<_>>()?;

        let mut grid = CellGrid::new(nx, ny, nz, cells);
        setup_neighbors(&mut grid, input.structure.symmetry_faces());

        debug!(
            nx,
            ny,
            nz,
            total = counts.total(),
            pipe = counts.pipe,
            "domain mesh built"
        );

        Ok(Mesh {
            grid,
            boundaries,
            counts,
            pipe_columns,
            indices,
            structure: input.structure,
        })
    }
}

/// Pipes are only meaningful in generic and in-domain-basement meshes, must
/// not intersect each other, and must stay clear of the basement envelope.
fn validate_pipes(input: &MeshInput) -> MeshResult<()> {
    match &input.structure {
        DomainStructure::Generic => {}
        DomainStructure::FhxBasement(geom) => {
            let floor_y = input.extents.y_max - geom.depth;
            for p in &input.pipes {
                let hw = p.radial.forced_half_width();
                if p.x - hw <= geom.width + geom.interface_half_width
                    && p.y + hw >= floor_y - geom.interface_half_width
                {
                    return Err(MeshError::InvalidInput {
                        what: "pipe segment placed inside the basement envelope",
                    });
                }
            }
        }
        DomainStructure::ZoneCoupledBasement { .. } | DomainStructure::ZoneCoupledSlab(_) => {
            if !input.pipes.is_empty() {
                return Err(MeshError::InvalidInput {
                    what: "zone-coupled domains do not carry pipe circuits",
                });
            }
        }
    }

    for (i, a) in input.pipes.iter().enumerate() {
        for b in &input.pipes[i + 1..] {
            let reach = a.radial.forced_half_width() + b.radial.forced_half_width();
            if (a.x - b.x).abs() < reach && (a.y - b.y).abs() < reach {
                return Err(MeshError::PipesOverlap {
                    first: a.segment.index(),
                    second: b.segment.index(),
                });
            }
        }
    }
    Ok(())
}

/// Collect forced partitions for one axis, then fill and flatten.
fn build_axis(input: &MeshInput, axis: Axis) -> MeshResult<Vec<Real>> {
    let axis_max = input.extents.along(axis);
    let mut set = PartitionSet::new(axis, axis_max);

    for p in &input.pipes {
        let (center, applies) = match axis {
            Axis::X => (p.x, true),
            Axis::Y => (p.y, true),
            Axis::Z => (0.0, false),
        };
        if applies {
            set.push(MeshPartition {
                center,
                half_width: p.radial.forced_half_width(),
                kind: PartitionKind::Pipe,
            });
        }
    }

    collect_structure_partitions(&input.structure, &input.extents, axis, &mut set);

    let partitions = set.finalize()?;
    let mesh = match axis {
        Axis::X => input.mesh_x,
        Axis::Y => input.mesh_y,
        Axis::Z => input.mesh_z,
    };

    let mut regions: Vec<GridRegion> = Vec::new();
    let mut cursor = 0.0;
    for p in &partitions {
        if p.min() - cursor > MIN_GAP {
            regions.push(GridRegion::from_gap(
                cursor,
                p.min(),
                mesh.count,
                mesh.distribution,
            )?);
        }
        regions.push(GridRegion::from_partition(p));
        cursor = p.max();
    }
    if axis_max - cursor > MIN_GAP {
        regions.push(GridRegion::from_gap(
            cursor,
            axis_max,
            mesh.count,
            mesh.distribution,
        )?);
    }

    Ok(flatten_regions(&regions))
}

fn collect_structure_partitions(
    structure: &DomainStructure,
    extents: &DomainExtents,
    axis: Axis,
    set: &mut PartitionSet,
) {
    match structure {
        DomainStructure::Generic => {}
        DomainStructure::FhxBasement(geom) => match axis {
            Axis::X => set.push(MeshPartition {
                center: geom.width,
                half_width: geom.interface_half_width,
                kind: PartitionKind::WallInterface,
            }),
            Axis::Y => set.push(MeshPartition {
                center: extents.y_max - geom.depth,
                half_width: geom.interface_half_width,
                kind: PartitionKind::FloorInterface,
            }),
            Axis::Z => {}
        },
        DomainStructure::ZoneCoupledBasement { geometry, length } => match axis {
            Axis::X => set.push(MeshPartition {
                center: extents.x_max - geometry.width,
                half_width: geometry.interface_half_width,
                kind: PartitionKind::WallInterface,
            }),
            Axis::Y => set.push(MeshPartition {
                center: extents.y_max - geometry.depth,
                half_width: geometry.interface_half_width,
                kind: PartitionKind::FloorInterface,
            }),
            Axis::Z => set.push(MeshPartition {
                center: extents.z_max - length,
                half_width: geometry.interface_half_width,
                kind: PartitionKind::WallInterface,
            }),
        },
        DomainStructure::ZoneCoupledSlab(geom) => match axis {
            Axis::X => set.push(MeshPartition {
                center: extents.x_max - geom.width_x,
                half_width: geom.interface_half_width,
                kind: PartitionKind::SlabEdge,
            }),
            Axis::Z => set.push(MeshPartition {
                center: extents.z_max - geom.width_z,
                half_width: geom.interface_half_width,
                kind: PartitionKind::SlabEdge,
            }),
            Axis::Y => {
                // Interface layer is the top cell; deeper layers stack
                // beneath it in order: slab body, then horizontal insulation.
                let ihw = geom.interface_half_width;
                set.push(MeshPartition {
                    center: extents.y_max - ihw,
                    half_width: ihw,
                    kind: PartitionKind::SlabEdge,
                });
                let mut bottom = extents.y_max - 2.0 * ihw;
                if let Some((thickness, _)) = geom.slab {
                    set.push(MeshPartition {
                        center: bottom - thickness / 2.0,
                        half_width: thickness / 2.0,
                        kind: PartitionKind::SlabEdge,
                    });
                    bottom -= thickness;
                }
                if let Some((thickness, _)) = geom.horizontal_insulation {
                    set.push(MeshPartition {
                        center: bottom - thickness / 2.0,
                        half_width: thickness / 2.0,
                        kind: PartitionKind::InsulationEdge,
                    });
                }
                if let Some((depth, _)) = geom.vertical_insulation {
                    set.push(MeshPartition {
                        center: extents.y_max - depth,
                        half_width: ihw,
                        kind: PartitionKind::InsulationEdge,
                    });
                }
            }
        },
    }
}

/// Cell index whose `[min, max)` range contains the coordinate.
fn index_of(boundaries: &[Real], coord: Real) -> usize {
    for i in 0..boundaries.len() - 1 {
        if coord >= boundaries[i] && coord < boundaries[i + 1] {
            return i;
        }
    }
    boundaries.len() - 2
}

fn locate_structure(input: &MeshInput, boundaries: &[Vec<Real>; 3]) -> StructureIndices {
    let mut indices = StructureIndices::default();
    let extents = &input.extents;
    match &input.structure {
        DomainStructure::Generic => {}
        DomainStructure::FhxBasement(geom) => {
            indices.wall_x = Some(index_of(&boundaries[0], geom.width));
            indices.floor_y = Some(index_of(&boundaries[1], extents.y_max - geom.depth));
        }
        DomainStructure::ZoneCoupledBasement { geometry, length } => {
            indices.wall_x = Some(index_of(&boundaries[0], extents.x_max - geometry.width));
            indices.wall_z = Some(index_of(&boundaries[2], extents.z_max - length));
            indices.floor_y = Some(index_of(&boundaries[1], extents.y_max - geometry.depth));
        }
        DomainStructure::ZoneCoupledSlab(geom) => {
            indices.slab_x = Some(index_of(&boundaries[0], extents.x_max - geom.width_x));
            indices.slab_z = Some(index_of(&boundaries[2], extents.z_max - geom.width_z));
            let ihw = geom.interface_half_width;
            let mut bottom = extents.y_max - 2.0 * ihw;
            if let Some((thickness, _)) = geom.slab {
                indices.slab_y = Some(index_of(&boundaries[1], bottom - thickness / 2.0));
                bottom -= thickness;
            }
            if let Some((thickness, _)) = geom.horizontal_insulation {
                indices.horiz_ins_y = Some(index_of(&boundaries[1], bottom - thickness / 2.0));
            }
            if let Some((depth, _)) = geom.vertical_insulation {
                indices.vert_ins_y = Some(index_of(&boundaries[1], extents.y_max - depth));
            }
        }
    }
    indices
}

fn classify(
    structure: &DomainStructure,
    indices: &StructureIndices,
    dims: (usize, usize, usize),
    index: CellIndex,
    is_pipe: bool,
) -> CellType {
    let (nx, ny, nz) = dims;
    let CellIndex { x, y, z } = index;

    match structure {
        DomainStructure::FhxBasement(_) => {
            let wx = indices.wall_x.unwrap_or(0);
            let fy = indices.floor_y.unwrap_or(0);
            if x < wx && y > fy {
                return CellType::BasementCutaway;
            }
            if x == wx && y > fy {
                return CellType::BasementWall;
            }
            if x < wx && y == fy {
                return CellType::BasementFloor;
            }
            if x == wx && y == fy {
                return CellType::BasementCorner;
            }
        }
        DomainStructure::ZoneCoupledBasement { .. } => {
            let wx = indices.wall_x.unwrap_or(0);
            let wz = indices.wall_z.unwrap_or(0);
            let fy = indices.floor_y.unwrap_or(0);
            let in_footprint = x >= wx && z >= wz;
            if in_footprint {
                let on_edge = x == wx || z == wz;
                if y > fy {
                    return if on_edge {
                        CellType::BasementWall
                    } else {
                        CellType::BasementCutaway
                    };
                }
                if y == fy {
                    return if on_edge {
                        CellType::BasementCorner
                    } else {
                        CellType::BasementFloor
                    };
                }
            }
        }
        DomainStructure::ZoneCoupledSlab(_) => {
            let sx = indices.slab_x.unwrap_or(0);
            let sz = indices.slab_z.unwrap_or(0);
            if x >= sx && z >= sz {
                if y == ny - 1 {
                    return CellType::ZoneGroundInterface;
                }
                if Some(y) == indices.slab_y {
                    return CellType::Slab;
                }
                if Some(y) == indices.horiz_ins_y {
                    return CellType::HorizInsulation;
                }
                if let Some(vy) = indices.vert_ins_y {
                    if (x == sx || z == sz) && y >= vy && y < ny - 1 {
                        return CellType::VertInsulation;
                    }
                }
            }
        }
        DomainStructure::Generic => {}
    }

    if is_pipe {
        return CellType::Pipe;
    }
    if y == ny - 1 {
        return CellType::GroundSurface;
    }
    for face in structure.symmetry_faces() {
        let on_face = match face {
            Direction::XMinus => x == 0,
            Direction::XPlus => x == nx - 1,
            Direction::ZMinus => z == 0,
            Direction::ZPlus => z == nz - 1,
            Direction::YMinus => y == 0,
            Direction::YPlus => y == ny - 1,
        };
        if on_face {
            return CellType::AdiabaticWall;
        }
    }
    if x == 0 || x == nx - 1 || y == 0 || z == 0 || z == nz - 1 {
        return CellType::FarfieldBoundary;
    }
    CellType::GeneralField
}

fn material_for(input: &MeshInput, cell_type: CellType) -> ThermalProps {
    if let DomainStructure::ZoneCoupledSlab(geom) = &input.structure {
        match cell_type {
            CellType::ZoneGroundInterface | CellType::Slab => {
                if let Some((_, props)) = geom.slab {
                    return props;
                }
            }
            CellType::HorizInsulation => {
                if let Some((_, props)) = geom.horizontal_insulation {
                    return props;
                }
            }
            CellType::VertInsulation => {
                if let Some((_, props)) = geom.vertical_insulation {
                    return props;
                }
            }
            _ => {}
        }
    }
    input.soil
}

/// Precompute per-direction centroid/wall distances for every cell. Faces at
/// the domain boundary keep zero distances; symmetry faces set a 2x
/// multiplier on the direction facing away from the mirror plane.
fn setup_neighbors(grid: &mut CellGrid, symmetry_faces: &[Direction]) {
    let (nx, ny, nz) = grid.dims();
    for z in 0..nz {
        for y in 0..ny {
            for x in 0..nx {
                let index = CellIndex { x, y, z };
                let this = grid.at(index);
                let this_centroid = this.centroid;
                let this_half = |dir: Direction| match dir.axis() {
                    Axis::X => this.width() / 2.0,
                    Axis::Y => this.height() / 2.0,
                    Axis::Z => this.depth() / 2.0,
                };

                let mut neighbors: [NeighborInfo; 6] = Default::default();
                for dir in Direction::ALL {
                    if let Some(n_index) = grid.neighbor_index(index, dir) {
                        let neighbor = grid.at(n_index);
                        let axis_delta = match dir.axis() {
                            Axis::X => neighbor.centroid.x - this_centroid.x,
                            Axis::Y => neighbor.centroid.y - this_centroid.y,
                            Axis::Z => neighbor.centroid.z - this_centroid.z,
                        };
                        let info = &mut neighbors[dir.slot()];
                        info.centroid_to_centroid = axis_delta.abs();
                        info.this_centroid_to_wall = this_half(dir);
                        info.wall_to_neighbor_centroid = match dir.axis() {
                            Axis::X => neighbor.width() / 2.0,
                            Axis::Y => neighbor.height() / 2.0,
                            Axis::Z => neighbor.depth() / 2.0,
                        };
                    }
                }

                for face in symmetry_faces {
                    let on_face = match face {
                        Direction::XMinus => x == 0,
                        Direction::XPlus => x == nx - 1,
                        Direction::YMinus => y == 0,
                        Direction::YPlus => y == ny - 1,
                        Direction::ZMinus => z == 0,
                        Direction::ZPlus => z == nz - 1,
                    };
                    if on_face {
                        neighbors[face.opposite().slot()].adiabatic_multiplier = 2.0;
                    }
                }

                grid.at_mut(index).neighbors = neighbors;
            }
        }
    }
}
