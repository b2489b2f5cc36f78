//! The radial network solve inside one pipe cell.
//!
//! An inner fixed-point loop resolves, in strict order: the interface cell
//! (the Cartesian cell temperature, linking the field to the radial
//! network), the soil annuli outward-to-inward, the optional insulation,
//! the pipe wall, and finally the fluid. Annulus-to-annulus conduction uses
//! symmetric log-mean resistances; the pipe wall couples to the fluid
//! through conduction in series with the film convection.

use crate::field::{neighbor_conduction, TermAccumulator};
use crate::iteration::shift_radial_for_new_iteration;
use gl_core::Real;
use gl_mesh::{CellGrid, Direction, PipeCellData, RadialCell};
use std::f64::consts::PI;
use tracing::trace;

/// Fluid-side quantities fixed for the whole time step.
#[derive(Clone, Copy, Debug)]
pub struct PipeFlow {
    /// Circuit mass flow, kg/s. Zero means stagnant fluid.
    pub mass_flow: Real,
    /// Fluid specific heat at the current inlet temperature, J/kg-K.
    pub specific_heat: Real,
    /// Film coefficient at the pipe inner wall, W/m2-K.
    pub film_coefficient: Real,
}

/// Resistance of the outer half of an annulus, centroid to outer edge.
fn outward_half(cell: &RadialCell, depth: Real) -> Real {
    (cell.outer_radius / cell.radial_centroid).ln() / (2.0 * PI * depth * cell.props.conductivity)
}

/// Resistance of the inner half of an annulus, inner edge to centroid.
fn inward_half(cell: &RadialCell, depth: Real) -> Real {
    (cell.radial_centroid / cell.inner_radius).ln() / (2.0 * PI * depth * cell.props.conductivity)
}

/// Pipe-wall-to-fluid series resistance: wall conduction plus film.
fn fluid_resistance(data: &PipeCellData, depth: Real, film_coefficient: Real) -> Real {
    inward_half(&data.pipe, depth)
        + 1.0 / (film_coefficient * 2.0 * PI * data.pipe.inner_radius * depth)
}

/// Solve one pipe cell to its inner tolerance and return the fluid
/// temperature leaving it.
///
/// `upstream_temp` is the fluid temperature entering this cell along the
/// pipe axis; at zero flow it is ignored and the fluid exchanges heat with
/// the wall only.
pub fn simulate_pipe_cell(
    grid: &mut CellGrid,
    flat: usize,
    flow: &PipeFlow,
    upstream_temp: Real,
    max_iterations: usize,
    tolerance: Real,
) -> Real {
    let mut converged = false;
    for _ in 0..max_iterations {
        let interface_prev = {
            let cell = grid.cell_mut(flat);
            let prev = cell.temperature;
            let data = cell.pipe_data_mut().expect("pipe cell has radial data");
            shift_radial_for_new_iteration(data);
            prev
        };

        update_interface_cell(grid, flat);

        let cell = grid.cell_mut(flat);
        let interface_temp = cell.temperature;
        let depth = cell.depth();
        let data = cell.pipe_data_mut().expect("pipe cell has radial data");

        update_soil_annuli(data, interface_temp, depth);
        update_insulation(data, depth);
        update_pipe_wall(data, depth, flow);
        update_fluid(data, depth, flow, upstream_temp);

        if radial_delta(data, interface_temp - interface_prev) < tolerance {
            converged = true;
            break;
        }
    }
    if !converged {
        trace!(flat, max_iterations, "radial loop hit its cap, accepting last iterate");
    }

    grid.cell(flat)
        .pipe_data()
        .expect("pipe cell has radial data")
        .fluid
        .temperature
}

/// The Cartesian pipe cell itself: history, the four lateral field
/// neighbors (never the pipe-axis neighbors, which belong to fluid
/// advection), and a log resistance to the outermost soil annulus.
fn update_interface_cell(grid: &mut CellGrid, flat: usize) {
    let new_temp = {
        let cell = grid.cell(flat);
        let data = cell.pipe_data().expect("pipe cell has radial data");
        let outer = data.outer_soil();

        let mut acc = TermAccumulator::new(cell.temperature_prev_time_step);
        for dir in Direction::LATERAL {
            if let Some((resistance, temp, mult)) = neighbor_conduction(grid, cell, dir) {
                acc.add(cell.beta / resistance * mult, temp);
            }
        }
        let resistance = outward_half(outer, cell.depth());
        acc.add(cell.beta / resistance, outer.temperature);
        acc.finish()
    };
    grid.cell_mut(flat).temperature = new_temp;
}

/// Soil annuli, outermost first. The outermost couples to the interface
/// cell; each inner one couples to both radial neighbors; the innermost
/// couples inward to the insulation or the pipe wall.
fn update_soil_annuli(data: &mut PipeCellData, interface_temp: Real, depth: Real) {
    let count = data.soil.len();
    for i in (0..count).rev() {
        let this = data.soil[i];
        let mut acc = TermAccumulator::new(this.temperature_prev_time_step);

        if i == count - 1 {
            let resistance = outward_half(&this, depth);
            acc.add(this.beta / resistance, interface_temp);
        } else {
            let outer = data.soil[i + 1];
            let resistance = outward_half(&this, depth) + inward_half(&outer, depth);
            acc.add(this.beta / resistance, outer.temperature);
        }

        if i > 0 {
            let inner = data.soil[i - 1];
            let resistance = inward_half(&this, depth) + outward_half(&inner, depth);
            acc.add(this.beta / resistance, inner.temperature);
        } else {
            let inner = data.insulation.as_ref().unwrap_or(&data.pipe);
            let resistance = inward_half(&this, depth) + outward_half(inner, depth);
            acc.add(this.beta / resistance, inner.temperature);
        }

        data.soil[i].temperature = acc.finish();
    }
}

fn update_insulation(data: &mut PipeCellData, depth: Real) {
    let Some(ins) = data.insulation else {
        return;
    };
    let mut acc = TermAccumulator::new(ins.temperature_prev_time_step);

    let soil = data.soil[0];
    let r_out = outward_half(&ins, depth) + inward_half(&soil, depth);
    acc.add(ins.beta / r_out, soil.temperature);

    let r_in = inward_half(&ins, depth) + outward_half(&data.pipe, depth);
    acc.add(ins.beta / r_in, data.pipe.temperature);

    data.insulation.as_mut().expect("checked above").temperature = acc.finish();
}

fn update_pipe_wall(data: &mut PipeCellData, depth: Real, flow: &PipeFlow) {
    let pipe = data.pipe;
    let mut acc = TermAccumulator::new(pipe.temperature_prev_time_step);

    let outer = data.insulation.as_ref().unwrap_or(&data.soil[0]);
    let r_out = outward_half(&pipe, depth) + inward_half(outer, depth);
    acc.add(pipe.beta / r_out, outer.temperature);

    let r_fluid = fluid_resistance(data, depth, flow.film_coefficient);
    acc.add(pipe.beta / r_fluid, data.fluid.temperature);

    data.pipe.temperature = acc.finish();
}

fn update_fluid(data: &mut PipeCellData, depth: Real, flow: &PipeFlow, upstream_temp: Real) {
    let fluid = data.fluid;
    let mut acc = TermAccumulator::new(fluid.temperature_prev_time_step);

    let r_pipe = fluid_resistance(data, depth, flow.film_coefficient);
    acc.add(fluid.beta / r_pipe, data.pipe.temperature);

    if flow.mass_flow > 0.0 {
        let r_upstream = 1.0 / (flow.mass_flow * flow.specific_heat);
        acc.add(fluid.beta / r_upstream, upstream_temp);
    }

    data.fluid.temperature = acc.finish();
}

/// Max absolute change over the whole radial network this inner iteration.
fn radial_delta(data: &PipeCellData, interface_change: Real) -> Real {
    let mut delta = interface_change.abs();
    for annulus in &data.soil {
        delta = delta.max((annulus.temperature - annulus.temperature_prev_iteration).abs());
    }
    if let Some(ins) = &data.insulation {
        delta = delta.max((ins.temperature - ins.temperature_prev_iteration).abs());
    }
    delta = delta.max((data.pipe.temperature - data.pipe.temperature_prev_iteration).abs());
    delta.max((data.fluid.temperature - data.fluid.temperature_prev_iteration).abs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iteration::shift_for_new_time_step;
    use gl_core::ids::SegmentId;
    use gl_mesh::{
        AxisMesh, CellIndex, DomainExtents, DomainStructure, MeshBuilder, MeshDistribution,
        MeshInput, PipePlacement, RadialSpec,
    };
    use gl_props::ThermalProps;

    const DT: Real = 900.0;

    fn pipe_mesh() -> (gl_mesh::Mesh, usize) {
        let radial = RadialSpec {
            pipe_inner_radius: 0.0127,
            pipe_outer_radius: 0.0167,
            pipe_props: ThermalProps::new(0.389, 950.0, 1900.0).unwrap(),
            insulation: None,
            soil_cell_count: 3,
            radial_extent: 0.06,
        };
        let mesh = MeshBuilder::new(MeshInput {
            extents: DomainExtents {
                x_max: 4.0,
                y_max: 4.0,
                z_max: 4.0,
            },
            mesh_x: AxisMesh {
                count: 2,
                distribution: MeshDistribution::Uniform,
            },
            mesh_y: AxisMesh {
                count: 2,
                distribution: MeshDistribution::Uniform,
            },
            mesh_z: AxisMesh {
                count: 3,
                distribution: MeshDistribution::Uniform,
            },
            soil: ThermalProps::new(1.08, 962.0, 2576.0).unwrap(),
            structure: DomainStructure::Generic,
            pipes: vec![PipePlacement {
                segment: SegmentId::from_index(0),
                x: 2.0,
                y: 2.0,
                radial,
            }],
        })
        .build()
        .unwrap();
        let (_, px, py) = mesh.pipe_columns[0];
        let flat = mesh.grid.flat_index(CellIndex { x: px, y: py, z: 1 });
        (mesh, flat)
    }

    fn init(mesh: &mut gl_mesh::Mesh, soil_temp: Real, fluid_temp: Real) {
        for cell in mesh.grid.iter_mut() {
            cell.temperature = soil_temp;
            cell.temperature_prev_iteration = soil_temp;
            let rho_cp = cell.props.rho_cp();
            cell.beta = DT / (rho_cp * cell.volume());
            let mut interface_beta = None;
            if let Some(data) = cell.pipe_data_mut() {
                data.set_all_temperatures(soil_temp);
                data.fluid.temperature = fluid_temp;
                for annulus in &mut data.soil {
                    annulus.beta = DT / (annulus.props.rho_cp() * annulus.volume);
                }
                data.pipe.beta = DT / (data.pipe.props.rho_cp() * data.pipe.volume);
                // Water-filled core.
                data.fluid.beta = DT / (998.0 * 4182.0 * data.fluid.volume);
                interface_beta = Some(DT / (rho_cp * data.interface_volume));
            }
            if let Some(beta) = interface_beta {
                cell.beta = beta;
            }
        }
        shift_for_new_time_step(&mut mesh.grid);
        // Fluid history reflects the injected fluid temperature.
        for cell in mesh.grid.iter_mut() {
            if let Some(data) = cell.pipe_data_mut() {
                data.fluid.temperature = fluid_temp;
                data.fluid.temperature_prev_time_step = fluid_temp;
            }
        }
    }

    fn stagnant() -> PipeFlow {
        PipeFlow {
            mass_flow: 0.0,
            specific_heat: 4182.0,
            film_coefficient: 200.0,
        }
    }

    #[test]
    fn uniform_network_is_a_fixed_point() {
        let (mut mesh, flat) = pipe_mesh();
        init(&mut mesh, 12.0, 12.0);

        let out = simulate_pipe_cell(&mut mesh.grid, flat, &stagnant(), 12.0, 10, 1e-8);

        assert!((out - 12.0).abs() < 1e-10);
        let data = mesh.grid.cell(flat).pipe_data().unwrap();
        for annulus in &data.soil {
            assert!((annulus.temperature - 12.0).abs() < 1e-10);
        }
        assert!((mesh.grid.cell(flat).temperature - 12.0).abs() < 1e-10);
    }

    #[test]
    fn hot_fluid_warms_outward_through_the_annuli() {
        let (mut mesh, flat) = pipe_mesh();
        init(&mut mesh, 10.0, 40.0);

        simulate_pipe_cell(&mut mesh.grid, flat, &stagnant(), 40.0, 50, 1e-8);

        let data = mesh.grid.cell(flat).pipe_data().unwrap();
        assert!(data.fluid.temperature < 40.0);
        assert!(data.pipe.temperature > 10.0);
        // Temperature decays monotonically outward.
        let mut prev = data.pipe.temperature;
        for annulus in &data.soil {
            assert!(annulus.temperature <= prev + 1e-12);
            assert!(annulus.temperature >= 10.0 - 1e-12);
            prev = annulus.temperature;
        }
    }

    #[test]
    fn flowing_fluid_tracks_upstream_temperature() {
        let (mut mesh, flat) = pipe_mesh();
        init(&mut mesh, 10.0, 10.0);

        let flow = PipeFlow {
            mass_flow: 0.4,
            specific_heat: 4182.0,
            film_coefficient: 1500.0,
        };
        let out = simulate_pipe_cell(&mut mesh.grid, flat, &flow, 35.0, 50, 1e-8);

        // Strong advection pins the fluid near the upstream value, above
        // what wall conduction alone would give.
        assert!(out > 30.0 && out < 35.0, "got {out}");
    }

    #[test]
    fn stagnant_flow_ignores_upstream() {
        let (mut mesh_a, flat) = pipe_mesh();
        init(&mut mesh_a, 10.0, 20.0);
        let out_a = simulate_pipe_cell(&mut mesh_a.grid, flat, &stagnant(), 99.0, 20, 1e-8);

        let (mut mesh_b, _) = pipe_mesh();
        init(&mut mesh_b, 10.0, 20.0);
        let out_b = simulate_pipe_cell(&mut mesh_b.grid, flat, &stagnant(), -40.0, 20, 1e-8);

        assert!((out_a - out_b).abs() < 1e-12);
    }
}
