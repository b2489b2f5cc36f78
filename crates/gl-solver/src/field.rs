//! The per-iteration field temperature update.
//!
//! Every participating non-pipe cell is recomputed once per call, in flat
//! scan order, from a resistance-network energy balance: a history term
//! (previous time step), one conduction term per active neighbor, and
//! cell-type-specific boundary terms. Cells updated earlier in the pass are
//! seen at their new temperatures by later cells.

use crate::iteration::IterationReady;
use crate::surface::{net_surface_flux, surface_convection_resistance, SitePosition, SolarTime, Weather};
use gl_core::Real;
use gl_mesh::{
    Axis, CartesianCell, CellGrid, CellType, Direction, DomainStructure, Mesh, StructureIndices,
};
use gl_props::KusudaModel;

/// Imposed coupled-surface heat fluxes, W/m2, positive into the domain.
/// Averaged and sign-adjusted by the caller before the outer loop starts.
#[derive(Clone, Copy, Debug, Default)]
pub struct BoundaryFluxes {
    pub basement_wall: Real,
    pub basement_floor: Real,
    pub zone_interface: Real,
}

/// Ground-surface weather bundle. Absent for domains whose surface balance
/// is not being driven (tests, fully covered domains).
#[derive(Clone, Copy, Debug)]
pub struct SurfaceConditions {
    pub weather: Weather,
    pub site: SitePosition,
    pub time: SolarTime,
    pub ground_cover_coefficient: Real,
}

/// Everything the field update needs beyond the mesh itself.
pub struct FieldConditions<'a> {
    pub farfield: &'a KusudaModel,
    /// Seconds into the simulation year.
    pub sim_time: Real,
    /// Ground surface elevation; cell depth is measured down from here.
    pub y_max: Real,
    pub surface: Option<SurfaceConditions>,
    pub fluxes: BoundaryFluxes,
}

/// One Gauss-Seidel pass over all non-pipe cells.
pub fn update_field(mesh: &mut Mesh, conditions: &FieldConditions, _ready: &IterationReady) {
    let indices = mesh.indices;
    let structure = mesh.structure.clone();
    let grid = &mut mesh.grid;

    for flat in 0..grid.len() {
        let cell_type = grid.cell(flat).cell_type;
        let new_temp = match cell_type {
            CellType::Pipe | CellType::BasementCutaway => continue,
            CellType::GeneralField
            | CellType::Slab
            | CellType::HorizInsulation
            | CellType::VertInsulation => update_general(grid, flat),
            CellType::GroundSurface => update_ground_surface(grid, flat, conditions),
            CellType::FarfieldBoundary => update_farfield(grid, flat, conditions),
            CellType::AdiabaticWall => update_adiabatic(grid, flat, &structure, conditions),
            CellType::BasementWall | CellType::BasementFloor | CellType::BasementCorner => {
                update_basement(grid, flat, cell_type, &structure, &indices, conditions)
            }
            CellType::ZoneGroundInterface => update_zone_interface(grid, flat, conditions),
        };
        grid.cell_mut(flat).temperature = new_temp;
    }
}

/// Accumulates `sum(coeff * value) / sum(coeff)` with the history term
/// seeded at coefficient 1.
pub(crate) struct TermAccumulator {
    numerator: Real,
    denominator: Real,
}

impl TermAccumulator {
    pub(crate) fn new(history_temp: Real) -> Self {
        Self {
            numerator: history_temp,
            denominator: 1.0,
        }
    }

    pub(crate) fn add(&mut self, coeff: Real, value: Real) {
        self.numerator += coeff * value;
        self.denominator += coeff;
    }

    /// Direct heat input, pre-multiplied by Beta (so it lands in kelvin).
    pub(crate) fn add_source(&mut self, amount: Real) {
        self.numerator += amount;
    }

    pub(crate) fn finish(self) -> Real {
        self.numerator / self.denominator
    }
}

/// Conduction characteristics toward one neighbor: (resistance, neighbor
/// temperature, adiabatic multiplier). `None` at domain boundaries and
/// toward cutaway cells.
///
/// The half-length on a pipe-cell side is zero: the interface node of a
/// pipe cell sits conceptually at its lateral faces, and the radial network
/// carries the rest of the path.
pub(crate) fn neighbor_conduction(
    grid: &CellGrid,
    cell: &CartesianCell,
    dir: Direction,
) -> Option<(Real, Real, Real)> {
    let n_index = grid.neighbor_index(cell.index, dir)?;
    let neighbor = grid.at(n_index);
    if !neighbor.cell_type.participates() {
        return None;
    }

    let area = cell.normal_area(dir);
    let info = cell.neighbor(dir);
    let this_half = if cell.is_pipe() {
        0.0
    } else {
        info.this_centroid_to_wall
    };
    let neighbor_half = if neighbor.is_pipe() {
        0.0
    } else {
        info.wall_to_neighbor_centroid
    };
    let resistance = this_half / (cell.props.conductivity * area)
        + neighbor_half / (neighbor.props.conductivity * area);
    Some((resistance, neighbor.temperature, info.adiabatic_multiplier))
}

fn add_neighbor(acc: &mut TermAccumulator, grid: &CellGrid, cell: &CartesianCell, dir: Direction) {
    if let Some((resistance, temp, mult)) = neighbor_conduction(grid, cell, dir) {
        acc.add(cell.beta / resistance * mult, temp);
    }
}

/// Far-field boundary term: conduction through a virtual half-cell to the
/// undisturbed ground temperature at the cell's depth.
fn add_farfield(acc: &mut TermAccumulator, cell: &CartesianCell, dir: Direction, conditions: &FieldConditions) {
    let area = cell.normal_area(dir);
    let half = match dir.axis() {
        Axis::X => cell.width() / 2.0,
        Axis::Y => cell.height() / 2.0,
        Axis::Z => cell.depth() / 2.0,
    };
    let resistance = (half / 2.0) / (cell.props.conductivity * area);
    let depth = conditions.y_max - cell.centroid.y;
    let temp = conditions.farfield.ground_temp(depth, conditions.sim_time);
    acc.add(cell.beta / resistance, temp);
}

fn update_general(grid: &CellGrid, flat: usize) -> Real {
    let cell = grid.cell(flat);
    let mut acc = TermAccumulator::new(cell.temperature_prev_time_step);
    for dir in Direction::ALL {
        add_neighbor(&mut acc, grid, cell, dir);
    }
    acc.finish()
}

fn update_ground_surface(grid: &CellGrid, flat: usize, conditions: &FieldConditions) -> Real {
    let cell = grid.cell(flat);
    let mut acc = TermAccumulator::new(cell.temperature_prev_time_step);

    let (field, boundary) = grid.split_directions(cell.index);
    for dir in field.iter() {
        add_neighbor(&mut acc, grid, cell, dir);
    }
    for dir in boundary.iter() {
        if dir != Direction::YPlus {
            add_farfield(&mut acc, cell, dir, conditions);
        }
    }

    if let Some(surface) = &conditions.surface {
        let area_top = cell.normal_area(Direction::YPlus);
        if let Some(resistance) =
            surface_convection_resistance(surface.weather.wind_speed, area_top)
        {
            acc.add(cell.beta / resistance, surface.weather.air_temp);
        }
        let flux = net_surface_flux(
            &surface.weather,
            &surface.site,
            &surface.time,
            surface.ground_cover_coefficient,
            cell.temperature_prev_time_step,
        );
        acc.add_source(cell.beta * flux * area_top);
    }
    acc.finish()
}

fn update_farfield(grid: &CellGrid, flat: usize, conditions: &FieldConditions) -> Real {
    let cell = grid.cell(flat);
    let mut acc = TermAccumulator::new(cell.temperature_prev_time_step);
    let (field, boundary) = grid.split_directions(cell.index);
    for dir in field.iter() {
        add_neighbor(&mut acc, grid, cell, dir);
    }
    for dir in boundary.iter() {
        if dir != Direction::YPlus {
            add_farfield(&mut acc, cell, dir, conditions);
        }
    }
    acc.finish()
}

/// Symmetry-plane cells: plain conduction, with the mirrored half-cell
/// multiplier already baked into the neighbor geometry. Boundary faces that
/// are not the symmetry plane still see the far field.
fn update_adiabatic(
    grid: &CellGrid,
    flat: usize,
    structure: &DomainStructure,
    conditions: &FieldConditions,
) -> Real {
    let cell = grid.cell(flat);
    let mut acc = TermAccumulator::new(cell.temperature_prev_time_step);
    let (field, boundary) = grid.split_directions(cell.index);
    for dir in field.iter() {
        add_neighbor(&mut acc, grid, cell, dir);
    }
    for dir in boundary.iter() {
        if dir != Direction::YPlus && !structure.symmetry_faces().contains(&dir) {
            add_farfield(&mut acc, cell, dir, conditions);
        }
    }
    acc.finish()
}

fn update_basement(
    grid: &CellGrid,
    flat: usize,
    cell_type: CellType,
    structure: &DomainStructure,
    indices: &StructureIndices,
    conditions: &FieldConditions,
) -> Real {
    let cell = grid.cell(flat);
    let mut acc = TermAccumulator::new(cell.temperature_prev_time_step);

    match structure {
        DomainStructure::FhxBasement(_) => match cell_type {
            CellType::BasementWall => {
                add_neighbor(&mut acc, grid, cell, Direction::XPlus);
                acc.add_source(
                    cell.beta
                        * conditions.fluxes.basement_wall
                        * cell.normal_area(Direction::XMinus),
                );
            }
            CellType::BasementFloor => {
                add_neighbor(&mut acc, grid, cell, Direction::YMinus);
                acc.add_source(
                    cell.beta
                        * conditions.fluxes.basement_floor
                        * cell.normal_area(Direction::YPlus),
                );
            }
            _ => {
                // Corner: conduction only, through both exposed halves.
                add_neighbor(&mut acc, grid, cell, Direction::XPlus);
                add_neighbor(&mut acc, grid, cell, Direction::YMinus);
            }
        },
        DomainStructure::ZoneCoupledBasement { .. } => {
            let on_x_wall = indices.wall_x == Some(cell.index.x);
            let on_z_wall = indices.wall_z == Some(cell.index.z);
            match cell_type {
                CellType::BasementWall => {
                    if on_x_wall {
                        add_neighbor(&mut acc, grid, cell, Direction::XMinus);
                        acc.add_source(
                            cell.beta
                                * conditions.fluxes.basement_wall
                                * cell.normal_area(Direction::XPlus),
                        );
                    }
                    if on_z_wall {
                        add_neighbor(&mut acc, grid, cell, Direction::ZMinus);
                        acc.add_source(
                            cell.beta
                                * conditions.fluxes.basement_wall
                                * cell.normal_area(Direction::ZPlus),
                        );
                    }
                }
                CellType::BasementFloor => {
                    add_neighbor(&mut acc, grid, cell, Direction::YMinus);
                    acc.add_source(
                        cell.beta
                            * conditions.fluxes.basement_floor
                            * cell.normal_area(Direction::YPlus),
                    );
                }
                _ => {
                    if on_x_wall {
                        add_neighbor(&mut acc, grid, cell, Direction::XMinus);
                    }
                    if on_z_wall {
                        add_neighbor(&mut acc, grid, cell, Direction::ZMinus);
                    }
                    add_neighbor(&mut acc, grid, cell, Direction::YMinus);
                }
            }
        }
        // Basement cell types only occur in basement structures.
        _ => {
            for dir in Direction::ALL {
                add_neighbor(&mut acc, grid, cell, dir);
            }
        }
    }
    acc.finish()
}

fn update_zone_interface(grid: &CellGrid, flat: usize, conditions: &FieldConditions) -> Real {
    let cell = grid.cell(flat);
    let mut acc = TermAccumulator::new(cell.temperature_prev_time_step);
    let (field, _) = grid.split_directions(cell.index);
    for dir in field.iter() {
        add_neighbor(&mut acc, grid, cell, dir);
    }
    acc.add_source(
        cell.beta * conditions.fluxes.zone_interface * cell.normal_area(Direction::YPlus),
    );
    acc.finish()
}
