//! Shared application service layer for thermorel.
//!
//! The CLI goes through this crate for scenario loading, compilation to the
//! simulation model, cached run execution and result queries.

pub mod error;
pub mod progress;
pub mod project_service;
pub mod query;
pub mod run_service;
pub mod scenario_compile;

pub use error::{AppError, AppResult};
pub use progress::{RunProgressEvent, RunStage, SamplingProgress};
pub use project_service::{DeviceSummary, list_devices, load_scenario, validate_scenario};
pub use query::{RunSummary, extract_series, get_run_summary};
pub use run_service::{
    ENGINE_VERSION, RunOptions, RunRequest, RunResponse, ensure_run, ensure_run_with_progress,
    list_runs, load_device_series, load_run,
};
pub use scenario_compile::{compile_device, compile_scenario};
