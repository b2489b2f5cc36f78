//! Temperature history shifts and the iteration-ordering token.
//!
//! One outer iteration has two strictly ordered phases: snapshot every
//! cell's previous-iteration temperature, then recompute. The snapshot
//! functions are the only way to obtain an [`IterationReady`], which the
//! compute phases require, so the phases cannot be silently reordered.

use gl_mesh::{CellGrid, PipeCellData};

/// Proof that previous-iteration temperatures were snapshotted for the
/// current outer iteration. Only constructible by [`shift_for_new_iteration`].
pub struct IterationReady(());

/// Snapshot `temperature` into `temperature_prev_iteration` for every cell,
/// including all radial sub-cells of pipe cells. Must run exactly once at
/// the top of every outer iteration.
pub fn shift_for_new_iteration(grid: &mut CellGrid) -> IterationReady {
    for cell in grid.iter_mut() {
        cell.temperature_prev_iteration = cell.temperature;
        if let Some(data) = cell.pipe_data_mut() {
            shift_radial_for_new_iteration(data);
        }
    }
    IterationReady(())
}

/// Snapshot radial sub-cell temperatures only; the radial solver re-runs
/// this at the top of each of its inner iterations.
pub fn shift_radial_for_new_iteration(data: &mut PipeCellData) {
    for annulus in &mut data.soil {
        annulus.temperature_prev_iteration = annulus.temperature;
    }
    if let Some(ins) = &mut data.insulation {
        ins.temperature_prev_iteration = ins.temperature;
    }
    data.pipe.temperature_prev_iteration = data.pipe.temperature;
    data.fluid.temperature_prev_iteration = data.fluid.temperature;
}

/// Roll the converged temperatures into the previous-time-step slot once per
/// distinct simulation time, before the next step's outer loop starts.
pub fn shift_for_new_time_step(grid: &mut CellGrid) {
    for cell in grid.iter_mut() {
        cell.temperature_prev_time_step = cell.temperature;
        if let Some(data) = cell.pipe_data_mut() {
            for annulus in &mut data.soil {
                annulus.temperature_prev_time_step = annulus.temperature;
            }
            if let Some(ins) = &mut data.insulation {
                ins.temperature_prev_time_step = ins.temperature;
            }
            data.pipe.temperature_prev_time_step = data.pipe.temperature;
            data.fluid.temperature_prev_time_step = data.fluid.temperature;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gl_core::ids::SegmentId;
    use gl_mesh::{
        AxisMesh, CellIndex, DomainExtents, DomainStructure, MeshBuilder, MeshDistribution,
        MeshInput, PipePlacement, RadialSpec,
    };
    use gl_props::ThermalProps;

    fn pipe_mesh() -> gl_mesh::Mesh {
        let radial = RadialSpec {
            pipe_inner_radius: 0.0127,
            pipe_outer_radius: 0.0167,
            pipe_props: ThermalProps::new(0.389, 950.0, 1900.0).unwrap(),
            insulation: None,
            soil_cell_count: 2,
            radial_extent: 0.05,
        };
        MeshBuilder::new(MeshInput {
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
        .unwrap()
    }

    #[test]
    fn shift_snapshots_every_cell_and_radial_sub_cell() {
        let mut mesh = pipe_mesh();
        for (i, cell) in mesh.grid.iter_mut().enumerate() {
            cell.temperature = i as f64;
            if let Some(data) = cell.pipe_data_mut() {
                data.fluid.temperature = 42.0;
                data.soil[0].temperature = 43.0;
            }
        }

        let _ready = shift_for_new_iteration(&mut mesh.grid);

        for cell in mesh.grid.iter() {
            assert_eq!(cell.temperature_prev_iteration, cell.temperature);
            if let Some(data) = cell.pipe_data() {
                assert_eq!(data.fluid.temperature_prev_iteration, data.fluid.temperature);
                assert_eq!(
                    data.soil[0].temperature_prev_iteration,
                    data.soil[0].temperature
                );
            }
        }
    }

    #[test]
    fn time_step_shift_is_independent_of_iteration_shift() {
        let mut mesh = pipe_mesh();
        let idx = CellIndex { x: 0, y: 0, z: 0 };
        mesh.grid.at_mut(idx).temperature = 7.0;

        shift_for_new_time_step(&mut mesh.grid);
        assert_eq!(mesh.grid.at(idx).temperature_prev_time_step, 7.0);
        assert_eq!(mesh.grid.at(idx).temperature_prev_iteration, 0.0);
    }
}
