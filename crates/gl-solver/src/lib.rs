//! gl-solver: iterative conduction and pipe solvers for ground domains.
//!
//! The field solver advances every non-pipe cell of a [`gl_mesh::Mesh`] one
//! Gauss-Seidel pass per call; the radial solver resolves the 1D network
//! nested inside each pipe cell and marches the circuit fluid along its
//! segments. The shift/compute ordering of one outer iteration is made
//! explicit through [`iteration::IterationReady`].

pub mod circuit;
pub mod convergence;
pub mod error;
pub mod field;
pub mod iteration;
pub mod radial;
pub mod surface;

pub use circuit::{CircuitState, FlowDirection, SegmentRun, SegmentTemps};
pub use convergence::{check_temperature_bounds, max_temperature_delta, ConvergenceStats};
pub use error::{SolverError, SolverResult};
pub use field::{update_field, BoundaryFluxes, FieldConditions, SurfaceConditions};
pub use iteration::{shift_for_new_iteration, shift_for_new_time_step, IterationReady};
pub use surface::{net_surface_flux, surface_convection_resistance, SitePosition, SolarTime, Weather};
