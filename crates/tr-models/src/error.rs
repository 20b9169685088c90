//! Device model errors.

use thiserror::Error;
use tr_core::TrError;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised by power, temperature and reliability models.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Temperature update requested for a time that does not advance the estimator.
    #[error("Invalid tick order: update at t={requested}s does not advance past t={previous}s")]
    InvalidTickOrder { previous: f64, requested: f64 },

    /// Reliability update attempted without a fresh temperature update.
    #[error(
        "Stale temperature read: reliability already consumed thermal update #{consumed} (latest #{latest})"
    )]
    StaleTemperatureRead { consumed: u64, latest: u64 },

    /// Power source produced a negative or non-finite reading.
    #[error("Invalid power reading {value} W at t={time}s")]
    InvalidPower { time: f64, value: f64 },

    /// Damage increment would move reliability in the non-degrading direction.
    #[error("Non-monotonic degradation increment: {increment}")]
    NonMonotonicDegradation { increment: f64 },

    /// Invalid model parameter.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error(transparent)]
    Core(#[from] TrError),
}
