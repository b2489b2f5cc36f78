//! Horizontal-trench convenience input.
//!
//! A trench describes a serpentine field of parallel buried pipes in one
//! object; expansion turns it into the equivalent explicit domain, circuit,
//! and segment list. Pipes are spaced evenly across the domain width with a
//! full spacing of soil on either side, and flow alternates direction from
//! one pipe to the next.

use crate::config::{
    ControlsConfig, DomainConfig, ExtentsConfig, FarfieldConfig, FluidConfig, FlowConfig,
    LayerConfig, MeshDensityConfig, PipeConfig, SegmentConfig, SimulationConfig, SiteConfig,
    SoilConfig,
};
use crate::error::{SimError, SimResult};
use gl_core::Real;
use serde::{Deserialize, Serialize};

// Soil margin kept below the pipe plane, m.
const DEPTH_BELOW_PIPES: Real = 2.5;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TrenchConfig {
    pub name: String,
    /// Trench length along the pipe axis, m.
    pub length: Real,
    /// Pipe centerline depth below the ground surface, m.
    pub burial_depth: Real,
    /// Center-to-center distance between adjacent pipes, m.
    pub pipe_spacing: Real,
    pub pipe_count: usize,
    pub soil: SoilConfig,
    pub farfield: FarfieldConfig,
    pub pipe: PipeConfig,
    #[serde(default)]
    pub insulation: Option<LayerConfig>,
    pub fluid: FluidConfig,
    pub design_flow_rate: Real,
    #[serde(default = "default_radial_count")]
    pub radial_mesh_count: usize,
    pub radial_thickness: Real,
    #[serde(default)]
    pub mesh: MeshDensityConfig,
    #[serde(default)]
    pub controls: ControlsConfig,
    #[serde(default = "default_ground_cover")]
    pub ground_cover_coefficient: Real,
}

fn default_radial_count() -> usize {
    2
}

fn default_ground_cover() -> Real {
    0.4
}

/// Expand a trench into the explicit domain/circuit/segment form.
pub fn expand_trench(trench: &TrenchConfig, site: SiteConfig) -> SimResult<SimulationConfig> {
    if trench.pipe_count == 0 {
        return Err(SimError::InvalidConfig {
            what: format!("trench {} has no pipes", trench.name),
        });
    }
    if trench.pipe_spacing <= 0.0 || trench.burial_depth <= 0.0 || trench.length <= 0.0 {
        return Err(SimError::InvalidConfig {
            what: format!("trench {} geometry must be positive", trench.name),
        });
    }

    let x_max = trench.pipe_spacing * (trench.pipe_count + 1) as Real;
    let y_max = trench.burial_depth + DEPTH_BELOW_PIPES;
    let pipe_y = y_max - trench.burial_depth;

    let mut segments = Vec::with_capacity(trench.pipe_count);
    let mut segment_names = Vec::with_capacity(trench.pipe_count);
    for i in 0..trench.pipe_count {
        let name = format!("{}:segment-{}", trench.name, i + 1);
        segments.push(SegmentConfig {
            name: name.clone(),
            x: trench.pipe_spacing * (i + 1) as Real,
            y: pipe_y,
            flow: if i % 2 == 0 {
                FlowConfig::IncreasingZ
            } else {
                FlowConfig::DecreasingZ
            },
        });
        segment_names.push(name);
    }

    let circuit_name = format!("{}:circuit", trench.name);
    let circuit = crate::config::CircuitConfig {
        name: circuit_name.clone(),
        pipe: trench.pipe,
        insulation: trench.insulation,
        radial_mesh_count: trench.radial_mesh_count,
        radial_thickness: trench.radial_thickness,
        fluid: trench.fluid.clone(),
        design_flow_rate: trench.design_flow_rate,
        convergence_tolerance: trench.controls.convergence_tolerance,
        max_iterations: 100,
        segments: segment_names,
    };

    let domain = DomainConfig {
        name: trench.name.clone(),
        extents: ExtentsConfig {
            x: x_max,
            y: y_max,
            z: trench.length,
        },
        mesh: trench.mesh,
        soil: trench.soil,
        farfield: trench.farfield,
        controls: trench.controls,
        ground_cover_coefficient: trench.ground_cover_coefficient,
        structure: crate::config::StructureConfig::Generic,
        circuits: vec![circuit_name],
    };

    let config = SimulationConfig {
        site,
        domains: vec![domain],
        circuits: vec![circuit],
        segments,
    };
    config.validate()?;
    Ok(config)
}
