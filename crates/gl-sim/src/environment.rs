//! Per-step inputs supplied by the surrounding simulation: clock, weather,
//! and circuit plant conditions.

use gl_core::units::{MassRate, Time};
use gl_core::Real;
use gl_solver::{SolarTime, Weather};

/// Everything the domain needs to know about the current time step.
#[derive(Clone, Copy, Debug)]
pub struct StepContext {
    /// Absolute simulation time, measured from the start of the year.
    pub sim_time: Time,
    pub time_step: Time,
    /// Calendar position matching `sim_time`, for solar geometry.
    pub solar: SolarTime,
    pub weather: Weather,
}

/// Plant-side conditions for one circuit this time step. Temperatures are
/// deg C throughout the model.
#[derive(Clone, Copy, Debug)]
pub struct CircuitInputs {
    pub inlet_temp: Real,
    /// Delivered mass flow; may be less than the circuit's design flow.
    pub mass_flow: MassRate,
}
