//! gl-sim: simulation orchestration for groundloop.
//!
//! Owns the serializable input schema, resolves it into [`Domain`] runtimes,
//! and drives the per-time-step outer iteration: Beta refresh from the
//! apparent soil heat capacity, circuit fluid march, field conduction pass,
//! convergence bookkeeping, and the other-side-condition exchange with a
//! coupled building envelope.

pub mod config;
pub mod domain;
pub mod environment;
pub mod error;
pub mod oscm;
pub mod report;
pub mod trench;

pub use config::{
    AxisConfig, CircuitConfig, ControlsConfig, DomainConfig, ExtentsConfig, FarfieldConfig,
    FlowConfig, FluidConfig, LayerConfig, MeshDensityConfig, PipeConfig, SegmentConfig,
    SimulationConfig, SiteConfig, SoilConfig, StructureConfig,
};
pub use domain::Domain;
pub use environment::{CircuitInputs, StepContext};
pub use error::{SimError, SimResult};
pub use oscm::{CoupledSurface, FluxAccumulator, OtherSideConditions};
pub use report::{CircuitReport, StepReport};
pub use trench::{expand_trench, TrenchConfig};
