//! Error types for simulation operations.

use thiserror::Error;
use tr_core::{DeviceId, TrError};
use tr_models::ModelError;

use crate::recorder::SeriesId;

/// Errors encountered while scheduling, sampling or aggregating.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// A model rejected the tick (tick order, stale read, bad power reading).
    #[error("Device {device}: {source}")]
    Model {
        device: DeviceId,
        #[source]
        source: ModelError,
    },

    /// Averages requested with nothing recorded.
    #[error("No samples recorded{}", series_suffix(.series))]
    NoSamples { series: Option<SeriesId> },

    #[error("Series '{series}' sample at t={requested}s does not follow t={previous}s")]
    NonMonotonicSample {
        series: SeriesId,
        previous: f64,
        requested: f64,
    },

    #[error("Cannot schedule event at t={requested}s before current time t={now}s")]
    ScheduleInPast { now: f64, requested: f64 },

    #[error("Unknown device: {0}")]
    UnknownDevice(DeviceId),

    #[error(transparent)]
    Core(#[from] TrError),
}

fn series_suffix(series: &Option<SeriesId>) -> String {
    match series {
        Some(s) => format!(" for series '{s}'"),
        None => String::new(),
    }
}

pub type SimResult<T> = Result<T, SimError>;

impl SimError {
    /// Wrap a model error with the device it came from.
    pub fn model(device: DeviceId, source: ModelError) -> Self {
        SimError::Model { device, source }
    }

    /// The underlying model error, if any.
    pub fn model_error(&self) -> Option<&ModelError> {
        match self {
            SimError::Model { source, .. } => Some(source),
            _ => None,
        }
    }
}
