//! Integration tests for gl-mesh: full builds from input to classified grid.

use gl_core::ids::SegmentId;
use gl_mesh::{
    AxisMesh, BasementGeometry, CellIndex, CellType, DomainExtents, DomainStructure, Direction,
    MeshBuilder, MeshDistribution, MeshInput, PipePlacement, RadialSpec,
};
use gl_props::ThermalProps;
use proptest::prelude::*;

fn soil() -> ThermalProps {
    ThermalProps::new(1.08, 962.0, 2576.0).unwrap()
}

fn radial() -> RadialSpec {
    RadialSpec {
        pipe_inner_radius: 0.0127,
        pipe_outer_radius: 0.0167,
        pipe_props: ThermalProps::new(0.389, 950.0, 1900.0).unwrap(),
        insulation: None,
        soil_cell_count: 2,
        radial_extent: 0.05,
    }
}

fn input(
    mesh: AxisMesh,
    structure: DomainStructure,
    pipes: Vec<PipePlacement>,
) -> MeshInput {
    MeshInput {
        extents: DomainExtents {
            x_max: 6.0,
            y_max: 4.0,
            z_max: 10.0,
        },
        mesh_x: mesh,
        mesh_y: mesh,
        mesh_z: mesh,
        soil: soil(),
        structure,
        pipes,
    }
}

#[test]
fn two_parallel_pipes_share_y_partition() {
    let pipes = vec![
        PipePlacement {
            segment: SegmentId::from_index(0),
            x: 2.0,
            y: 2.0,
            radial: radial(),
        },
        PipePlacement {
            segment: SegmentId::from_index(1),
            x: 4.0,
            y: 2.0,
            radial: radial(),
        },
    ];
    let mesh = MeshBuilder::new(input(
        AxisMesh {
            count: 3,
            distribution: MeshDistribution::Uniform,
        },
        DomainStructure::Generic,
        pipes,
    ))
    .build()
    .unwrap();

    // Two X partitions (three gaps), one shared Y partition (two gaps).
    assert_eq!(mesh.boundaries[0].len(), 3 * 3 + 2 + 1);
    assert_eq!(mesh.boundaries[1].len(), 2 * 3 + 1 + 1);
    assert_eq!(mesh.pipe_columns[0].2, mesh.pipe_columns[1].2);
    assert_ne!(mesh.pipe_columns[0].1, mesh.pipe_columns[1].1);

    let (_, _, nz) = mesh.grid.dims();
    assert_eq!(mesh.counts.pipe, 2 * nz);
}

#[test]
fn symmetric_geometric_axis_keeps_parity_correction() {
    // Odd count requested; each gap region must come out even.
    let mesh = MeshBuilder::new(input(
        AxisMesh {
            count: 5,
            distribution: MeshDistribution::SymmetricGeometric { coefficient: 1.4 },
        },
        DomainStructure::Generic,
        vec![],
    ))
    .build()
    .unwrap();

    let (nx, ny, nz) = mesh.grid.dims();
    assert_eq!((nx, ny, nz), (6, 6, 6));
    for points in &mesh.boundaries {
        for pair in points.windows(2) {
            assert!(pair[1] > pair[0]);
        }
    }
}

#[test]
fn basement_cutaway_cells_do_not_participate() {
    let mesh = MeshBuilder::new(input(
        AxisMesh {
            count: 4,
            distribution: MeshDistribution::Uniform,
        },
        DomainStructure::FhxBasement(BasementGeometry {
            width: 2.0,
            depth: 2.0,
            interface_half_width: 0.05,
        }),
        vec![],
    ))
    .build()
    .unwrap();

    assert!(mesh.counts.basement_cutaway > 0);
    for cell in mesh.grid.iter() {
        if cell.cell_type == CellType::BasementCutaway {
            assert!(!cell.cell_type.participates());
            let wx = mesh.indices.wall_x.unwrap();
            let fy = mesh.indices.floor_y.unwrap();
            assert!(cell.index.x < wx && cell.index.y > fy);
        }
    }
    assert_eq!(mesh.counts.total(), mesh.grid.len());
}

#[test]
fn symmetry_multiplier_only_on_mirrored_direction() {
    let mesh = MeshBuilder::new(input(
        AxisMesh {
            count: 4,
            distribution: MeshDistribution::Uniform,
        },
        DomainStructure::FhxBasement(BasementGeometry {
            width: 2.0,
            depth: 2.0,
            interface_half_width: 0.05,
        }),
        vec![],
    ))
    .build()
    .unwrap();

    for cell in mesh.grid.iter() {
        for dir in Direction::ALL {
            let expected = if cell.index.x == 0 && dir == Direction::XPlus {
                2.0
            } else {
                1.0
            };
            assert_eq!(cell.neighbor(dir).adiabatic_multiplier, expected);
        }
    }
}

#[test]
fn interface_cell_volume_complements_radial_structure() {
    let pipe = PipePlacement {
        segment: SegmentId::from_index(0),
        x: 3.0,
        y: 2.0,
        radial: radial(),
    };
    let mesh = MeshBuilder::new(input(
        AxisMesh {
            count: 4,
            distribution: MeshDistribution::Uniform,
        },
        DomainStructure::Generic,
        vec![pipe],
    ))
    .build()
    .unwrap();

    let (_, px, py) = mesh.pipe_columns[0];
    let cell = mesh.grid.at(CellIndex { x: px, y: py, z: 1 });
    let data = cell.pipe_data().unwrap();

    let mut radial_volume = data.fluid.volume + data.pipe.volume;
    if let Some(ins) = &data.insulation {
        radial_volume += ins.volume;
    }
    for annulus in &data.soil {
        radial_volume += annulus.volume;
    }
    assert!((radial_volume + data.interface_volume - cell.volume()).abs() < 1e-9);
}

proptest! {
    // Boundary arrays must cover [0, max] exactly and strictly increase for
    // any pipe placement and mesh density.
    #[test]
    fn boundary_coverage_holds_for_any_pipe_placement(
        px in 0.5_f64..5.5,
        py in 0.5_f64..3.5,
        count in 1_usize..8,
    ) {
        let pipe = PipePlacement {
            segment: SegmentId::from_index(0),
            x: px,
            y: py,
            radial: radial(),
        };
        let mesh = MeshBuilder::new(input(
            AxisMesh { count, distribution: MeshDistribution::Uniform },
            DomainStructure::Generic,
            vec![pipe],
        ))
        .build()
        .unwrap();

        let maxes = [6.0, 4.0, 10.0];
        for (axis, points) in mesh.boundaries.iter().enumerate() {
            prop_assert_eq!(points[0], 0.0);
            prop_assert_eq!(*points.last().unwrap(), maxes[axis]);
            for pair in points.windows(2) {
                prop_assert!(pair[1] > pair[0]);
            }
            let (nx, ny, nz) = mesh.grid.dims();
            let cells = [nx, ny, nz][axis];
            prop_assert_eq!(points.len(), cells + 1);
        }
    }
}
