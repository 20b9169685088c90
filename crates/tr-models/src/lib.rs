//! Pluggable device models for thermorel.
//!
//! A device is described by three models that are picked once at construction:
//! - a power source (instantaneous draw in watts)
//! - a temperature estimator that integrates power over simulated time
//! - a reliability estimator that folds temperature history into cumulative damage
//!
//! Each family is a trait with concrete variants and a tagged "law" enum used to
//! build a boxed model from configuration.

pub mod error;
pub mod power;
pub mod reliability;
pub mod thermal;

pub use error::{ModelError, ModelResult};
pub use power::{ConstantPower, PiecewisePower, PowerProfile, PowerSource, UtilizationPower};
pub use reliability::{
    ArrheniusModel, ArrheniusParams, DegradationState, ReliabilityLaw, ReliabilityModel,
    TddbModel, TddbParams,
};
pub use thermal::{
    LinearThermalModel, TemperatureModel, TemperatureState, ThermalLaw, ThermalRcModel,
    ThermalStamp,
};
