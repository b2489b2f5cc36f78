//! Domain runtime: the per-step driver tying mesh, properties, circuits,
//! and the iterative solvers together.
//!
//! One [`Domain::step`] call runs the implicit outer loop for a single time
//! step: refresh Beta coefficients from the apparent soil heat capacity,
//! capture fluid properties and the film coefficient once, then iterate
//! circuit march plus field pass until the largest temperature change falls
//! under the tolerance or the iteration cap is reached. The cap is accepted
//! silently apart from a log line and a counter.

use crate::config::{
    AxisConfig, ControlsConfig, FlowConfig, LayerConfig, SimulationConfig, StructureConfig,
};
use crate::environment::{CircuitInputs, StepContext};
use crate::error::{SimError, SimResult};
use crate::oscm::{CoupledSurface, OtherSideConditions};
use crate::report::{CircuitReport, StepReport};
use gl_core::ids::SegmentId;
use gl_core::units::constants::SECS_PER_DAY;
use gl_core::Real;
use gl_mesh::{
    AxisMesh, BasementGeometry, CellIndex, CellType, DomainExtents, DomainStructure, Mesh,
    MeshBuilder, MeshDistribution, MeshInput, PipePlacement, RadialSpec, SlabGeometry,
};
use gl_props::{
    film_coefficient, ConstantFluid, FluidProperties, KusudaModel, SoilHeatCapacities, SoilProps,
    ThermalProps,
};
use gl_solver::{
    check_temperature_bounds, max_temperature_delta, shift_for_new_iteration,
    shift_for_new_time_step, CircuitState, ConvergenceStats, FieldConditions, FlowDirection,
    SegmentRun, SitePosition, SurfaceConditions,
};
use tracing::{debug, warn};

/// One circuit resolved against the built mesh.
struct CircuitRuntime {
    name: String,
    fluid: ConstantFluid,
    pipe_inner_radius: Real,
    tolerance: Real,
    max_iterations: usize,
    /// Segment runs in flow order, resolved to grid columns.
    segments: Vec<SegmentRun>,
}

/// A ground domain ready to be stepped through time.
pub struct Domain {
    pub name: String,
    pub mesh: Mesh,
    capacities: SoilHeatCapacities,
    farfield: KusudaModel,
    controls: ControlsConfig,
    ground_cover: Real,
    site: SitePosition,
    /// Y of the ground surface; depths are measured down from here.
    surface_y: Real,
    circuits: Vec<CircuitRuntime>,
    initialized: bool,
    last_sim_time: Option<Real>,
    /// Steps whose outer loop exhausted its iteration cap.
    pub capped_steps: u64,
}

impl Domain {
    /// Build the named domain out of a validated configuration.
    pub fn from_config(sim: &SimulationConfig, name: &str) -> SimResult<Self> {
        let config = sim
            .domains
            .iter()
            .find(|d| d.name == name)
            .ok_or_else(|| SimError::UnknownReference {
                kind: "domain",
                name: name.to_string(),
            })?;

        let soil_base = ThermalProps::new(
            config.soil.conductivity,
            config.soil.density,
            config.soil.specific_heat,
        )?;
        let soil = SoilProps::new(
            soil_base,
            config.soil.moisture_fraction,
            config.soil.saturation_fraction,
        )?;
        let capacities = SoilHeatCapacities::new(&soil);
        let farfield = KusudaModel::new(
            config.farfield.average_temp,
            config.farfield.amplitude,
            config.farfield.phase_shift_days * SECS_PER_DAY,
            &soil.base,
        )?;

        let mut placements = Vec::new();
        let mut circuits = Vec::new();
        for circuit_name in &config.circuits {
            let circuit = sim.circuit(circuit_name)?;
            let pipe_props = ThermalProps::new(
                circuit.pipe.conductivity,
                circuit.pipe.density,
                circuit.pipe.specific_heat,
            )?;
            let radial = RadialSpec {
                pipe_inner_radius: circuit.pipe.inner_radius,
                pipe_outer_radius: circuit.pipe.outer_radius,
                pipe_props,
                insulation: match &circuit.insulation {
                    Some(layer) => Some((layer.thickness, layer_props(layer)?)),
                    None => None,
                },
                soil_cell_count: circuit.radial_mesh_count,
                radial_extent: circuit.radial_thickness,
            };
            let fluid = ConstantFluid::new(
                circuit.fluid.name.clone(),
                circuit.fluid.density,
                circuit.fluid.specific_heat,
                circuit.fluid.conductivity,
                circuit.fluid.viscosity,
            )?;

            let mut directions = Vec::new();
            for segment_name in &circuit.segments {
                let segment = sim.segment(segment_name)?;
                placements.push(PipePlacement {
                    segment: SegmentId::from_index(placements.len() as u32),
                    x: segment.x,
                    y: segment.y,
                    radial,
                });
                directions.push(match segment.flow {
                    FlowConfig::IncreasingZ => FlowDirection::IncreasingZ,
                    FlowConfig::DecreasingZ => FlowDirection::DecreasingZ,
                });
            }

            circuits.push((
                CircuitRuntime {
                    name: circuit.name.clone(),
                    fluid,
                    pipe_inner_radius: circuit.pipe.inner_radius,
                    tolerance: circuit.convergence_tolerance,
                    max_iterations: circuit.max_iterations,
                    segments: Vec::new(),
                },
                directions,
            ));
        }

        let mesh = MeshBuilder::new(MeshInput {
            extents: DomainExtents {
                x_max: config.extents.x,
                y_max: config.extents.y,
                z_max: config.extents.z,
            },
            mesh_x: axis_mesh(&config.mesh.x),
            mesh_y: axis_mesh(&config.mesh.y),
            mesh_z: axis_mesh(&config.mesh.z),
            soil: soil.base,
            structure: build_structure(&config.structure)?,
            pipes: placements,
        })
        .build()?;
        let surface_y = mesh.boundaries[1].last().copied().unwrap_or(0.0);

        // Hand each circuit its resolved grid columns, in placement order.
        let mut columns = mesh.pipe_columns.iter();
        let circuits = circuits
            .into_iter()
            .map(|(mut runtime, directions)| {
                runtime.segments = directions
                    .into_iter()
                    .map(|direction| {
                        let &(segment, x, y) = columns.next().expect("one column per placement");
                        SegmentRun {
                            segment,
                            x,
                            y,
                            direction,
                        }
                    })
                    .collect();
                runtime
            })
            .collect();

        Ok(Self {
            name: config.name.clone(),
            mesh,
            capacities,
            farfield,
            controls: config.controls,
            ground_cover: config.ground_cover_coefficient,
            site: SitePosition {
                latitude_deg: sim.site.latitude_deg,
                longitude_deg: sim.site.longitude_deg,
                time_zone_meridian_deg: sim.site.time_zone_meridian_deg,
            },
            surface_y,
            circuits,
            initialized: false,
            last_sim_time: None,
            capped_steps: 0,
        })
    }

    /// Forget the temperature field so the next step re-initializes from the
    /// far-field model (start of a new run period).
    pub fn reset_for_new_environment(&mut self) {
        self.initialized = false;
        self.last_sim_time = None;
    }

    /// Advance the domain through one time step.
    ///
    /// `inputs` is parallel to the configured circuit list. Repeated calls at
    /// the same `sim_time` re-resolve the circuits against the frozen field,
    /// which is how plant-side iteration within one time step behaves.
    pub fn step(
        &mut self,
        ctx: &StepContext,
        inputs: &[CircuitInputs],
        oscm: &mut OtherSideConditions,
    ) -> SimResult<StepReport> {
        if inputs.len() != self.circuits.len() {
            return Err(SimError::InvalidConfig {
                what: format!(
                    "expected {} circuit inputs, got {}",
                    self.circuits.len(),
                    inputs.len()
                ),
            });
        }
        let dt = ctx.time_step.value;
        if !(dt > 0.0) {
            return Err(SimError::InvalidConfig {
                what: "time step must be positive".into(),
            });
        }
        let sim_time = ctx.sim_time.value;

        if !self.initialized {
            self.initialize(sim_time);
            self.initialized = true;
        }
        let advanced = self.last_sim_time != Some(sim_time);
        if advanced {
            shift_for_new_time_step(&mut self.mesh.grid);
            self.last_sim_time = Some(sim_time);
        }

        self.refresh_betas(dt, inputs)?;
        let mut states = self.capture_circuit_states(inputs)?;

        let farfield = self.farfield;
        let conditions = FieldConditions {
            farfield: &farfield,
            sim_time,
            y_max: self.surface_y,
            surface: Some(SurfaceConditions {
                weather: ctx.weather,
                site: self.site,
                time: ctx.solar,
                ground_cover_coefficient: self.ground_cover,
            }),
            fluxes: oscm.fluxes(),
        };

        let mut stats = ConvergenceStats {
            iterations: 0,
            max_delta: 0.0,
            converged: false,
        };
        for iteration in 1..=self.controls.max_iterations {
            let ready = shift_for_new_iteration(&mut self.mesh.grid);
            for (runtime, state) in self.circuits.iter().zip(states.iter_mut()) {
                gl_solver::circuit::simulate_circuit(
                    &mut self.mesh.grid,
                    &runtime.segments,
                    state,
                    &ready,
                );
            }
            if advanced {
                gl_solver::field::update_field(&mut self.mesh, &conditions, &ready);
            }
            stats.iterations = iteration;
            stats.max_delta = max_temperature_delta(&self.mesh.grid);
            if stats.max_delta < self.controls.convergence_tolerance {
                stats.converged = true;
                break;
            }
        }
        if !stats.converged {
            self.capped_steps += 1;
            warn!(
                domain = %self.name,
                iterations = stats.iterations,
                max_delta = stats.max_delta,
                "iteration cap reached, accepting last iterate"
            );
        }
        check_temperature_bounds(
            &self.mesh.grid,
            self.controls.min_temperature,
            self.controls.max_temperature,
        )?;

        let wall_surface_temp = self.average_temp_of(CellType::BasementWall);
        let floor_surface_temp = self.average_temp_of(CellType::BasementFloor);
        let zone_surface_temp = self.average_temp_of(CellType::ZoneGroundInterface);
        oscm.wall_surface = wall_surface_temp.map(CoupledSurface::imposed);
        oscm.floor_surface = floor_surface_temp.map(CoupledSurface::imposed);
        oscm.zone_surface = zone_surface_temp.map(CoupledSurface::imposed);

        let circuits = self
            .circuits
            .iter()
            .zip(states.iter())
            .map(|(runtime, state)| CircuitReport {
                name: runtime.name.clone(),
                inlet_temp: state.inlet_temp,
                outlet_temp: state.outlet_temp,
                mass_flow: state.mass_flow,
                heat_loss: state.heat_loss,
                segments: state.segment_temps.clone(),
            })
            .collect();

        debug!(
            domain = %self.name,
            iterations = stats.iterations,
            converged = stats.converged,
            "domain step complete"
        );
        Ok(StepReport {
            convergence: stats,
            circuits,
            wall_surface_temp,
            floor_surface_temp,
            zone_surface_temp,
        })
    }

    /// Seed every cell (and radial sub-cell) from the undisturbed far-field
    /// profile at its own depth.
    fn initialize(&mut self, sim_time: Real) {
        let surface_y = self.surface_y;
        for cell in self.mesh.grid.iter_mut() {
            let depth = (surface_y - cell.centroid.y).max(0.0);
            let temp = self.farfield.ground_temp(depth, sim_time);
            cell.temperature = temp;
            cell.temperature_prev_iteration = temp;
            cell.temperature_prev_time_step = temp;
            if let Some(data) = cell.pipe_data_mut() {
                data.set_all_temperatures(temp);
            }
        }
        debug!(domain = %self.name, sim_time, "initialized from far-field profile");
    }

    /// Recompute every Beta coefficient for the current step length.
    ///
    /// Soil capacity is the apparent (freeze/thaw) value at the cell's
    /// current temperature; non-soil material cells use their plain rho*cp.
    /// Interface cells straddling a wall or floor only hold soil over part
    /// of their volume, so their effective volume shrinks accordingly.
    fn refresh_betas(&mut self, dt: Real, inputs: &[CircuitInputs]) -> SimResult<()> {
        let caps = self.capacities;
        for cell in self.mesh.grid.iter_mut() {
            let rho_cp = match cell.cell_type {
                CellType::Slab | CellType::HorizInsulation | CellType::VertInsulation => {
                    cell.props.rho_cp()
                }
                _ => caps.apparent_rho_cp(cell.temperature),
            };
            let volume_fraction = match cell.cell_type {
                CellType::BasementWall
                | CellType::BasementFloor
                | CellType::ZoneGroundInterface => 0.5,
                CellType::BasementCorner => 0.75,
                _ => 1.0,
            };
            cell.beta = dt / (rho_cp * cell.volume() * volume_fraction);

            let mut interface_beta = None;
            if let Some(data) = cell.pipe_data_mut() {
                for annulus in &mut data.soil {
                    annulus.beta =
                        dt / (caps.apparent_rho_cp(annulus.temperature) * annulus.volume);
                }
                if let Some(ins) = &mut data.insulation {
                    ins.beta = dt / (ins.props.rho_cp() * ins.volume);
                }
                data.pipe.beta = dt / (data.pipe.props.rho_cp() * data.pipe.volume);
                interface_beta = Some(dt / (rho_cp * data.interface_volume));
            }
            if let Some(beta) = interface_beta {
                cell.beta = beta;
            }
        }

        // Fluid betas need the owning circuit's properties.
        let (_, _, nz) = self.mesh.grid.dims();
        for (runtime, input) in self.circuits.iter().zip(inputs) {
            let state = runtime.fluid.state(input.inlet_temp)?;
            let fluid_rho_cp = state.density * state.specific_heat;
            for run in &runtime.segments {
                for z in 0..nz {
                    let flat = self.mesh.grid.flat_index(CellIndex {
                        x: run.x,
                        y: run.y,
                        z,
                    });
                    if let Some(data) = self.mesh.grid.cell_mut(flat).pipe_data_mut() {
                        data.fluid.beta = dt / (fluid_rho_cp * data.fluid.volume);
                    }
                }
            }
        }
        Ok(())
    }

    /// Snapshot fluid properties and the film coefficient for this step.
    fn capture_circuit_states(&self, inputs: &[CircuitInputs]) -> SimResult<Vec<CircuitState>> {
        let (_, _, nz) = self.mesh.grid.dims();
        self.circuits
            .iter()
            .zip(inputs)
            .map(|(runtime, input)| {
                let state = runtime.fluid.state(input.inlet_temp)?;
                let wall_temp = runtime
                    .segments
                    .first()
                    .map(|run| {
                        let z = match run.direction {
                            FlowDirection::IncreasingZ => 0,
                            FlowDirection::DecreasingZ => nz - 1,
                        };
                        let cell = self.mesh.grid.at(CellIndex {
                            x: run.x,
                            y: run.y,
                            z,
                        });
                        cell.pipe_data()
                            .map(|data| data.pipe.temperature)
                            .unwrap_or(input.inlet_temp)
                    })
                    .unwrap_or(input.inlet_temp);
                let film = film_coefficient(
                    &state,
                    input.mass_flow.value,
                    runtime.pipe_inner_radius,
                    input.inlet_temp,
                    wall_temp,
                );
                Ok(CircuitState::new(
                    input.inlet_temp,
                    input.mass_flow.value,
                    state.specific_heat,
                    film,
                    runtime.max_iterations,
                    runtime.tolerance,
                ))
            })
            .collect()
    }

    /// Mean temperature over cells of one type; `None` if the domain has no
    /// such cells.
    fn average_temp_of(&self, cell_type: CellType) -> Option<Real> {
        let mut sum = 0.0;
        let mut count = 0usize;
        for cell in self.mesh.grid.iter() {
            if cell.cell_type == cell_type {
                sum += cell.temperature;
                count += 1;
            }
        }
        (count > 0).then(|| sum / count as Real)
    }
}

fn axis_mesh(config: &AxisConfig) -> AxisMesh {
    AxisMesh {
        count: config.count,
        distribution: match config.geometric_coefficient {
            Some(coefficient) => MeshDistribution::SymmetricGeometric { coefficient },
            None => MeshDistribution::Uniform,
        },
    }
}

fn layer_props(layer: &LayerConfig) -> SimResult<ThermalProps> {
    Ok(ThermalProps::new(
        layer.conductivity,
        layer.density,
        layer.specific_heat,
    )?)
}

fn layer_pair(layer: &Option<LayerConfig>) -> SimResult<Option<(Real, ThermalProps)>> {
    match layer {
        Some(l) => Ok(Some((l.thickness, layer_props(l)?))),
        None => Ok(None),
    }
}

fn build_structure(config: &StructureConfig) -> SimResult<DomainStructure> {
    Ok(match config {
        StructureConfig::Generic => DomainStructure::Generic,
        StructureConfig::Basement {
            width,
            depth,
            interface_half_width,
        } => DomainStructure::FhxBasement(BasementGeometry {
            width: *width,
            depth: *depth,
            interface_half_width: *interface_half_width,
        }),
        StructureConfig::ZoneCoupledBasement {
            width,
            length,
            depth,
            interface_half_width,
        } => DomainStructure::ZoneCoupledBasement {
            geometry: BasementGeometry {
                width: *width,
                depth: *depth,
                interface_half_width: *interface_half_width,
            },
            length: *length,
        },
        StructureConfig::ZoneCoupledSlab {
            width_x,
            width_z,
            interface_half_width,
            slab,
            horizontal_insulation,
            vertical_insulation,
        } => DomainStructure::ZoneCoupledSlab(SlabGeometry {
            width_x: *width_x,
            width_z: *width_z,
            interface_half_width: *interface_half_width,
            slab: layer_pair(slab)?,
            horizontal_insulation: layer_pair(horizontal_insulation)?,
            vertical_insulation: layer_pair(vertical_insulation)?,
        }),
    })
}
