//! Discrete-event co-simulation of device power, temperature and reliability.
//!
//! Provides:
//! - a single-threaded event scheduler acting as the simulated time source
//! - devices owning their power/thermal/reliability models and a series recorder
//! - a sampling adapter that ticks each device at a fixed period and re-arms itself
//! - a scenario runner that drives many devices to a stop time and collects reports

pub mod clock;
pub mod device;
pub mod error;
pub mod recorder;
pub mod sampler;
pub mod scenario;

mod events;

pub use clock::{EventHandle, Simulator, TimeSource};
pub use device::{Device, DeviceSpec, TickReading};
pub use error::{SimError, SimResult};
pub use events::SimEvent;
pub use recorder::{Averages, Sample, SeriesExport, SeriesId, SeriesRecorder};
pub use sampler::{SamplerState, SamplingAdapter, SamplingConfig};
pub use scenario::{
    DeviceReport, ScenarioOutcome, ScenarioSpec, SimProgress, run_scenario,
    run_scenario_with_progress,
};
