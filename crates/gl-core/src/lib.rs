//! gl-core: stable foundation for groundloop.
//!
//! Contains:
//! - units (uom SI types + constructors + thermal constants)
//! - numeric (Real + tolerances + float helpers)
//! - ids (stable compact IDs for pipe segments)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CoreError, CoreResult};
pub use ids::*;
pub use numeric::*;
pub use units::*;
