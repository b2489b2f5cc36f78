//! Serializable simulation configuration.
//!
//! The schema mirrors the input structure: a flat list of domains, circuits,
//! and segments, cross-referenced by name. `SimulationConfig::validate`
//! checks every reference before any mesh is built.

use crate::error::{SimError, SimResult};
use gl_core::Real;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Top-level simulation input.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SimulationConfig {
    pub site: SiteConfig,
    #[serde(default)]
    pub domains: Vec<DomainConfig>,
    #[serde(default)]
    pub circuits: Vec<CircuitConfig>,
    #[serde(default)]
    pub segments: Vec<SegmentConfig>,
}

/// Site constants for solar geometry.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct SiteConfig {
    pub latitude_deg: Real,
    pub longitude_deg: Real,
    pub time_zone_meridian_deg: Real,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DomainConfig {
    pub name: String,
    pub extents: ExtentsConfig,
    pub mesh: MeshDensityConfig,
    pub soil: SoilConfig,
    pub farfield: FarfieldConfig,
    #[serde(default)]
    pub controls: ControlsConfig,
    /// Evapotranspiration ground cover coefficient: 0 for bare sealed
    /// surface, 1 for reference grass, up to 1.5 for dense vegetation.
    #[serde(default = "default_ground_cover")]
    pub ground_cover_coefficient: Real,
    #[serde(default)]
    pub structure: StructureConfig,
    /// Names of the circuits buried in this domain.
    #[serde(default)]
    pub circuits: Vec<String>,
}

fn default_ground_cover() -> Real {
    0.4
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExtentsConfig {
    pub x: Real,
    pub y: Real,
    pub z: Real,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct MeshDensityConfig {
    pub x: AxisConfig,
    pub y: AxisConfig,
    pub z: AxisConfig,
}

impl Default for MeshDensityConfig {
    fn default() -> Self {
        let axis = AxisConfig {
            count: default_axis_count(),
            geometric_coefficient: None,
        };
        Self {
            x: axis,
            y: axis,
            z: axis,
        }
    }
}

/// Cell count per mesh region along one axis, uniform unless a geometric
/// grading coefficient is given.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct AxisConfig {
    #[serde(default = "default_axis_count")]
    pub count: usize,
    /// Successive-width ratio of the symmetric geometric distribution;
    /// omit for uniform spacing.
    #[serde(default)]
    pub geometric_coefficient: Option<Real>,
}

fn default_axis_count() -> usize {
    4
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct SoilConfig {
    pub conductivity: Real,
    pub density: Real,
    pub specific_heat: Real,
    /// Volumetric moisture content, fraction of total volume [0..1].
    pub moisture_fraction: Real,
    /// Volumetric moisture content at saturation, fraction [0..1].
    pub saturation_fraction: Real,
}

/// Kusuda-Achenbach far-field parameters.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct FarfieldConfig {
    /// Annual average ground surface temperature, deg C.
    pub average_temp: Real,
    /// Annual surface temperature amplitude, deg C.
    pub amplitude: Real,
    /// Day of minimum surface temperature.
    pub phase_shift_days: Real,
}

/// Outer-loop iteration controls and the post-convergence sanity range.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ControlsConfig {
    pub convergence_tolerance: Real,
    pub max_iterations: usize,
    pub min_temperature: Real,
    pub max_temperature: Real,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            convergence_tolerance: 0.001,
            max_iterations: 250,
            min_temperature: -100.0,
            max_temperature: 100.0,
        }
    }
}

/// Building coupling carried by the domain.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum StructureConfig {
    #[default]
    Generic,
    /// Basement carved out of a pipe domain against the X- symmetry plane.
    Basement {
        width: Real,
        depth: Real,
        interface_half_width: Real,
    },
    /// Basement in the far corner of a dedicated zone-coupled domain.
    ZoneCoupledBasement {
        width: Real,
        length: Real,
        depth: Real,
        interface_half_width: Real,
    },
    /// Slab in the far corner of a dedicated zone-coupled domain.
    ZoneCoupledSlab {
        width_x: Real,
        width_z: Real,
        interface_half_width: Real,
        #[serde(default)]
        slab: Option<LayerConfig>,
        #[serde(default)]
        horizontal_insulation: Option<LayerConfig>,
        #[serde(default)]
        vertical_insulation: Option<LayerConfig>,
    },
}

/// One material layer: a thickness (or depth, for vertical insulation) and
/// its thermal properties.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct LayerConfig {
    pub thickness: Real,
    pub conductivity: Real,
    pub density: Real,
    pub specific_heat: Real,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CircuitConfig {
    pub name: String,
    pub pipe: PipeConfig,
    #[serde(default)]
    pub insulation: Option<LayerConfig>,
    /// Number of concentric soil annuli around each pipe cell.
    #[serde(default = "default_radial_count")]
    pub radial_mesh_count: usize,
    /// Total radial extent of those annuli, m.
    pub radial_thickness: Real,
    pub fluid: FluidConfig,
    /// Design loop mass flow, kg/s.
    pub design_flow_rate: Real,
    #[serde(default = "default_circuit_tolerance")]
    pub convergence_tolerance: Real,
    #[serde(default = "default_circuit_iterations")]
    pub max_iterations: usize,
    /// Segment names in flow order.
    pub segments: Vec<String>,
}

fn default_radial_count() -> usize {
    2
}

fn default_circuit_tolerance() -> Real {
    0.001
}

fn default_circuit_iterations() -> usize {
    100
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct PipeConfig {
    pub inner_radius: Real,
    pub outer_radius: Real,
    pub conductivity: Real,
    pub density: Real,
    pub specific_heat: Real,
}

/// Constant circuit fluid properties.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FluidConfig {
    pub name: String,
    pub density: Real,
    pub specific_heat: Real,
    pub conductivity: Real,
    pub viscosity: Real,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SegmentConfig {
    pub name: String,
    /// Pipe center in domain coordinates, m.
    pub x: Real,
    pub y: Real,
    pub flow: FlowConfig,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum FlowConfig {
    IncreasingZ,
    DecreasingZ,
}

impl SimulationConfig {
    /// Check name uniqueness and that every cross-reference resolves, each
    /// segment belongs to at most one circuit, and each circuit to at most
    /// one domain.
    pub fn validate(&self) -> SimResult<()> {
        let mut names = HashSet::new();
        for d in &self.domains {
            if !names.insert(d.name.as_str()) {
                return Err(SimError::InvalidConfig {
                    what: format!("duplicate domain name: {}", d.name),
                });
            }
        }
        names.clear();
        for c in &self.circuits {
            if !names.insert(c.name.as_str()) {
                return Err(SimError::InvalidConfig {
                    what: format!("duplicate circuit name: {}", c.name),
                });
            }
        }
        names.clear();
        for s in &self.segments {
            if !names.insert(s.name.as_str()) {
                return Err(SimError::InvalidConfig {
                    what: format!("duplicate segment name: {}", s.name),
                });
            }
        }

        let mut claimed_segments = HashSet::new();
        for circuit in &self.circuits {
            for segment in &circuit.segments {
                if !self.segments.iter().any(|s| &s.name == segment) {
                    return Err(SimError::UnknownReference {
                        kind: "segment",
                        name: segment.clone(),
                    });
                }
                if !claimed_segments.insert(segment.as_str()) {
                    return Err(SimError::InvalidConfig {
                        what: format!("segment {segment} appears in more than one circuit"),
                    });
                }
            }
        }

        let mut claimed_circuits = HashSet::new();
        for domain in &self.domains {
            for circuit in &domain.circuits {
                if !self.circuits.iter().any(|c| &c.name == circuit) {
                    return Err(SimError::UnknownReference {
                        kind: "circuit",
                        name: circuit.clone(),
                    });
                }
                if !claimed_circuits.insert(circuit.as_str()) {
                    return Err(SimError::InvalidConfig {
                        what: format!("circuit {circuit} appears in more than one domain"),
                    });
                }
            }
        }

        Ok(())
    }

    pub fn circuit(&self, name: &str) -> SimResult<&CircuitConfig> {
        self.circuits
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| SimError::UnknownReference {
                kind: "circuit",
                name: name.to_string(),
            })
    }

    pub fn segment(&self, name: &str) -> SimResult<&SegmentConfig> {
        self.segments
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| SimError::UnknownReference {
                kind: "segment",
                name: name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> SimulationConfig {
        serde_json::from_str(
            r#"{
                "site": {
                    "latitude_deg": 39.7,
                    "longitude_deg": -104.9,
                    "time_zone_meridian_deg": -105.0
                },
                "domains": [{
                    "name": "field",
                    "extents": { "x": 5.0, "y": 4.0, "z": 20.0 },
                    "mesh": {
                        "x": { "count": 3 },
                        "y": { "count": 3 },
                        "z": { "count": 8 }
                    },
                    "soil": {
                        "conductivity": 1.08,
                        "density": 962.0,
                        "specific_heat": 2576.0,
                        "moisture_fraction": 0.3,
                        "saturation_fraction": 0.5
                    },
                    "farfield": {
                        "average_temp": 15.5,
                        "amplitude": 12.8,
                        "phase_shift_days": 17.3
                    },
                    "circuits": ["loop"]
                }],
                "circuits": [{
                    "name": "loop",
                    "pipe": {
                        "inner_radius": 0.0127,
                        "outer_radius": 0.0167,
                        "conductivity": 0.389,
                        "density": 950.0,
                        "specific_heat": 1900.0
                    },
                    "radial_thickness": 0.06,
                    "fluid": {
                        "name": "water",
                        "density": 998.0,
                        "specific_heat": 4182.0,
                        "conductivity": 0.598,
                        "viscosity": 0.001002
                    },
                    "design_flow_rate": 0.3,
                    "segments": ["supply"]
                }],
                "segments": [{
                    "name": "supply",
                    "x": 2.5,
                    "y": 2.0,
                    "flow": "IncreasingZ"
                }]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn minimal_config_validates_with_defaults() {
        let config = minimal();
        config.validate().unwrap();
        let domain = &config.domains[0];
        assert_eq!(domain.controls.max_iterations, 250);
        assert_eq!(domain.controls.convergence_tolerance, 0.001);
        assert_eq!(domain.ground_cover_coefficient, 0.4);
        assert_eq!(domain.structure, StructureConfig::Generic);
        let circuit = &config.circuits[0];
        assert_eq!(circuit.radial_mesh_count, 2);
        assert_eq!(circuit.max_iterations, 100);
        assert!(circuit.insulation.is_none());
    }

    #[test]
    fn unknown_segment_reference_is_rejected() {
        let mut config = minimal();
        config.circuits[0].segments.push("return".into());
        assert!(matches!(
            config.validate(),
            Err(SimError::UnknownReference { kind: "segment", .. })
        ));
    }

    #[test]
    fn unknown_circuit_reference_is_rejected() {
        let mut config = minimal();
        config.domains[0].circuits.push("ghost".into());
        assert!(matches!(
            config.validate(),
            Err(SimError::UnknownReference { kind: "circuit", .. })
        ));
    }

    #[test]
    fn shared_segment_is_rejected() {
        let mut config = minimal();
        config.circuits.push(CircuitConfig {
            name: "second".into(),
            segments: vec!["supply".into()],
            ..config.circuits[0].clone()
        });
        assert!(matches!(
            config.validate(),
            Err(SimError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn structure_round_trips_through_json() {
        let structure = StructureConfig::ZoneCoupledSlab {
            width_x: 10.0,
            width_z: 10.0,
            interface_half_width: 0.005,
            slab: Some(LayerConfig {
                thickness: 0.1,
                conductivity: 1.7,
                density: 2300.0,
                specific_heat: 880.0,
            }),
            horizontal_insulation: None,
            vertical_insulation: None,
        };
        let text = serde_json::to_string(&structure).unwrap();
        let back: StructureConfig = serde_json::from_str(&text).unwrap();
        assert_eq!(back, structure);
    }
}
