//! gl-props: material, soil and fluid property models for groundloop.
//!
//! Covers the temperature-dependent soil freeze/thaw apparent heat capacity,
//! the fluid property seam consumed by the pipe solver, in-pipe forced
//! convection correlations, and the Kusuda-Achenbach far-field ground
//! temperature model.

pub mod convection;
pub mod error;
pub mod fluid;
pub mod freeze_thaw;
pub mod ground_temp;
pub mod material;

pub use convection::film_coefficient;
pub use error::{PropsError, PropsResult};
pub use fluid::{ConstantFluid, FluidProperties, FluidState};
pub use freeze_thaw::SoilHeatCapacities;
pub use ground_temp::KusudaModel;
pub use material::{SoilProps, ThermalProps};
