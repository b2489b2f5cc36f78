//! Circuit-level fluid march along pipe segments.
//!
//! Segments are visited in flow order; within a segment, cells are visited
//! along the segment's own flow direction. The first cell of the circuit
//! receives the circuit inlet temperature; every later cell receives the
//! just-computed fluid temperature of the cell upstream of it, and the last
//! cell of one segment feeds the first cell of the next.

use crate::iteration::IterationReady;
use crate::radial::{simulate_pipe_cell, PipeFlow};
use gl_core::ids::SegmentId;
use gl_core::Real;
use gl_mesh::{CellGrid, CellIndex};

/// Flow sense of one segment along the pipe (Z) axis, fixed at input time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowDirection {
    IncreasingZ,
    DecreasingZ,
}

/// One segment's resolved placement in the grid.
#[derive(Clone, Copy, Debug)]
pub struct SegmentRun {
    pub segment: SegmentId,
    /// X/Y indices of the pipe cell column.
    pub x: usize,
    pub y: usize,
    pub direction: FlowDirection,
}

/// Per-segment bookkeeping, written once per simulation pass.
#[derive(Clone, Copy, Debug, Default)]
pub struct SegmentTemps {
    pub inlet: Real,
    pub outlet: Real,
    /// mdot * cp * (inlet - outlet), W. Positive when the fluid loses heat.
    pub heat_loss: Real,
}

/// Mutable circuit state threaded through the outer iteration loop. Fluid
/// properties and the film coefficient are captured once per time step.
#[derive(Clone, Debug)]
pub struct CircuitState {
    pub inlet_temp: Real,
    pub mass_flow: Real,
    pub specific_heat: Real,
    pub film_coefficient: Real,
    /// Cap on the radial inner loop per pipe cell.
    pub max_radial_iterations: usize,
    pub tolerance: Real,
    pub outlet_temp: Real,
    pub heat_loss: Real,
    /// Parallel to the segment list passed to [`simulate_circuit`].
    pub segment_temps: Vec<SegmentTemps>,
}

impl CircuitState {
    pub fn new(
        inlet_temp: Real,
        mass_flow: Real,
        specific_heat: Real,
        film_coefficient: Real,
        max_radial_iterations: usize,
        tolerance: Real,
    ) -> Self {
        Self {
            inlet_temp,
            mass_flow,
            specific_heat,
            film_coefficient,
            max_radial_iterations,
            tolerance,
            outlet_temp: inlet_temp,
            heat_loss: 0.0,
            segment_temps: Vec::new(),
        }
    }

    fn flow(&self) -> PipeFlow {
        PipeFlow {
            mass_flow: self.mass_flow,
            specific_heat: self.specific_heat,
            film_coefficient: self.film_coefficient,
        }
    }
}

/// March the circuit fluid through every segment once.
pub fn simulate_circuit(
    grid: &mut CellGrid,
    segments: &[SegmentRun],
    circuit: &mut CircuitState,
    _ready: &IterationReady,
) {
    let (_, _, nz) = grid.dims();
    let flow = circuit.flow();
    circuit
        .segment_temps
        .resize(segments.len(), SegmentTemps::default());

    let mut entering = circuit.inlet_temp;
    for (i, segment) in segments.iter().enumerate() {
        let segment_inlet = entering;
        for step in 0..nz {
            let z = match segment.direction {
                FlowDirection::IncreasingZ => step,
                FlowDirection::DecreasingZ => nz - 1 - step,
            };
            let flat = grid.flat_index(CellIndex {
                x: segment.x,
                y: segment.y,
                z,
            });
            entering = simulate_pipe_cell(
                grid,
                flat,
                &flow,
                entering,
                circuit.max_radial_iterations,
                circuit.tolerance,
            );
        }
        circuit.segment_temps[i] = SegmentTemps {
            inlet: segment_inlet,
            outlet: entering,
            heat_loss: circuit.mass_flow * circuit.specific_heat * (segment_inlet - entering),
        };
    }

    circuit.outlet_temp = entering;
    circuit.heat_loss =
        circuit.mass_flow * circuit.specific_heat * (circuit.inlet_temp - circuit.outlet_temp);
}
