//! tr-core: shared foundation for thermorel.
//!
//! Contains:
//! - units (uom SI types + constructors for the config boundary)
//! - numeric (Real + float guards)
//! - ids (compact device identifiers)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod units;

pub use error::{TrError, TrResult};
pub use ids::*;
pub use numeric::*;
pub use units::*;
