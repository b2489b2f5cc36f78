//! Radial sub-structure carried by pipe cells.
//!
//! A pipe cell nests a 1D radial network inside its Cartesian volume:
//! concentric soil annuli (innermost to outermost), an optional insulation
//! annulus, the pipe wall annulus, and the fluid core. Each sub-cell keeps
//! its own temperature history and implicit-scheme Beta coefficient.

use crate::error::{MeshError, MeshResult};
use gl_core::Real;
use gl_props::ThermalProps;
use std::f64::consts::PI;

/// Radial sizing and materials for one circuit's pipe cells.
#[derive(Clone, Copy, Debug)]
pub struct RadialSpec {
    pub pipe_inner_radius: Real,
    pub pipe_outer_radius: Real,
    pub pipe_props: ThermalProps,
    /// Insulation thickness and material; `None` for bare pipe.
    pub insulation: Option<(Real, ThermalProps)>,
    /// Number of concentric soil annuli.
    pub soil_cell_count: usize,
    /// Total radial extent of the soil annuli, m.
    pub radial_extent: Real,
}

impl RadialSpec {
    /// Outer radius of the whole radial structure.
    pub fn outer_radius(&self) -> Real {
        self.pipe_outer_radius + self.insulation_thickness() + self.radial_extent
    }

    pub fn insulation_thickness(&self) -> Real {
        self.insulation.map_or(0.0, |(t, _)| t)
    }

    /// Half-width of the Cartesian cell that must be forced around the pipe.
    pub fn forced_half_width(&self) -> Real {
        self.outer_radius()
    }
}

/// One annular sub-cell.
#[derive(Clone, Copy, Debug)]
pub struct RadialCell {
    pub inner_radius: Real,
    pub outer_radius: Real,
    pub radial_centroid: Real,
    /// Annulus cross-sectional area in the XY plane, m2.
    pub cross_section_area: Real,
    pub volume: Real,
    pub props: ThermalProps,
    pub temperature: Real,
    pub temperature_prev_iteration: Real,
    pub temperature_prev_time_step: Real,
    pub beta: Real,
}

impl RadialCell {
    pub fn annulus(inner_radius: Real, outer_radius: Real, depth: Real, props: ThermalProps) -> Self {
        let cross_section_area = PI * (outer_radius.powi(2) - inner_radius.powi(2));
        Self {
            inner_radius,
            outer_radius,
            radial_centroid: (inner_radius + outer_radius) / 2.0,
            cross_section_area,
            volume: cross_section_area * depth,
            props,
            temperature: 0.0,
            temperature_prev_iteration: 0.0,
            temperature_prev_time_step: 0.0,
            beta: 0.0,
        }
    }
}

/// The fluid core of a pipe cell.
///
/// Fluid properties live on the owning circuit (captured once per time step
/// at the inlet temperature), so this holds geometry and history only.
#[derive(Clone, Copy, Debug)]
pub struct FluidCell {
    pub volume: Real,
    pub temperature: Real,
    pub temperature_prev_iteration: Real,
    pub temperature_prev_time_step: Real,
    pub beta: Real,
}

/// Full radial sub-structure of one pipe cell.
#[derive(Clone, Debug)]
pub struct PipeCellData {
    /// Soil annuli, innermost first.
    pub soil: Vec<RadialCell>,
    pub insulation: Option<RadialCell>,
    pub pipe: RadialCell,
    pub fluid: FluidCell,
    /// Cartesian cell volume left over outside the radial structure; this is
    /// the volume attributed to the interface cell.
    pub interface_volume: Real,
}

impl PipeCellData {
    /// Carve the radial structure out of a Cartesian cell of the given width
    /// and depth. Soil annuli take the domain soil properties.
    pub fn new(
        cell_width: Real,
        cell_depth: Real,
        spec: &RadialSpec,
        soil_props: ThermalProps,
    ) -> MeshResult<Self> {
        if spec.soil_cell_count == 0 {
            return Err(MeshError::RadialStructure {
                what: "at least one radial soil cell is required",
            });
        }
        if spec.pipe_inner_radius <= 0.0 || spec.pipe_outer_radius <= spec.pipe_inner_radius {
            return Err(MeshError::RadialStructure {
                what: "pipe radii must satisfy 0 < inner < outer",
            });
        }
        if spec.radial_extent <= 0.0 {
            return Err(MeshError::RadialStructure {
                what: "radial extent must be positive",
            });
        }
        let outer_radius = spec.outer_radius();
        if 2.0 * outer_radius > cell_width * (1.0 + 1e-9) {
            return Err(MeshError::RadialStructure {
                what: "radial structure is wider than its Cartesian cell",
            });
        }

        let insulation = spec.insulation.map(|(thickness, props)| {
            RadialCell::annulus(
                spec.pipe_outer_radius,
                spec.pipe_outer_radius + thickness,
                cell_depth,
                props,
            )
        });

        let soil_inner = spec.pipe_outer_radius + spec.insulation_thickness();
        let radial_width = spec.radial_extent / spec.soil_cell_count as Real;
        let soil = (0..spec.soil_cell_count)
            .map(|i| {
                let inner = soil_inner + i as Real * radial_width;
                RadialCell::annulus(inner, inner + radial_width, cell_depth, soil_props)
            })
            .collect();

        let pipe = RadialCell::annulus(
            spec.pipe_inner_radius,
            spec.pipe_outer_radius,
            cell_depth,
            spec.pipe_props,
        );

        let fluid = FluidCell {
            volume: PI * spec.pipe_inner_radius.powi(2) * cell_depth,
            temperature: 0.0,
            temperature_prev_iteration: 0.0,
            temperature_prev_time_step: 0.0,
            beta: 0.0,
        };

        let interface_volume =
            cell_width * cell_width * cell_depth - PI * outer_radius.powi(2) * cell_depth;

        Ok(Self {
            soil,
            insulation,
            pipe,
            fluid,
            interface_volume,
        })
    }

    /// Outermost soil annulus (always present).
    pub fn outer_soil(&self) -> &RadialCell {
        self.soil.last().expect("at least one soil annulus")
    }

    /// Set every sub-cell temperature (used at initialization).
    pub fn set_all_temperatures(&mut self, temp: Real) {
        for cell in &mut self.soil {
            cell.temperature = temp;
            cell.temperature_prev_iteration = temp;
            cell.temperature_prev_time_step = temp;
        }
        if let Some(ins) = &mut self.insulation {
            ins.temperature = temp;
            ins.temperature_prev_iteration = temp;
            ins.temperature_prev_time_step = temp;
        }
        self.pipe.temperature = temp;
        self.pipe.temperature_prev_iteration = temp;
        self.pipe.temperature_prev_time_step = temp;
        self.fluid.temperature = temp;
        self.fluid.temperature_prev_iteration = temp;
        self.fluid.temperature_prev_time_step = temp;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn soil() -> ThermalProps {
        ThermalProps::new(1.08, 962.0, 2576.0).unwrap()
    }

    fn spec() -> RadialSpec {
        RadialSpec {
            pipe_inner_radius: 0.0127,
            pipe_outer_radius: 0.0167,
            pipe_props: ThermalProps::new(0.389, 950.0, 1900.0).unwrap(),
            insulation: None,
            soil_cell_count: 3,
            radial_extent: 0.06,
        }
    }

    #[test]
    fn annuli_nest_without_gaps() {
        let s = spec();
        let width = 2.0 * s.forced_half_width();
        let data = PipeCellData::new(width, 1.0, &s, soil()).unwrap();

        assert_eq!(data.soil.len(), 3);
        assert!((data.soil[0].inner_radius - s.pipe_outer_radius).abs() < 1e-12);
        for pair in data.soil.windows(2) {
            assert!((pair[0].outer_radius - pair[1].inner_radius).abs() < 1e-12);
        }
        assert!((data.outer_soil().outer_radius - s.outer_radius()).abs() < 1e-12);
        assert!((data.pipe.inner_radius - s.pipe_inner_radius).abs() < 1e-12);
    }

    #[test]
    fn insulated_pipe_inserts_annulus() {
        let mut s = spec();
        s.insulation = Some((0.01, ThermalProps::new(0.03, 40.0, 1400.0).unwrap()));
        let width = 2.0 * s.forced_half_width();
        let data = PipeCellData::new(width, 1.0, &s, soil()).unwrap();

        let ins = data.insulation.unwrap();
        assert!((ins.inner_radius - s.pipe_outer_radius).abs() < 1e-12);
        assert!((data.soil[0].inner_radius - ins.outer_radius).abs() < 1e-12);
    }

    #[test]
    fn interface_volume_is_cell_minus_circle() {
        let s = spec();
        let width = 2.0 * s.forced_half_width();
        let data = PipeCellData::new(width, 2.0, &s, soil()).unwrap();
        let expected = (1.0 - PI / 4.0) * width * width * 2.0;
        assert!((data.interface_volume - expected).abs() < 1e-12);
    }

    #[test]
    fn oversized_structure_rejected() {
        let s = spec();
        let too_narrow = 2.0 * s.forced_half_width() - 0.01;
        assert!(PipeCellData::new(too_narrow, 1.0, &s, soil()).is_err());
    }
}
