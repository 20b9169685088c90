//! Event payloads and time guards for the scheduler.

use tr_core::DeviceId;

use crate::error::{SimError, SimResult};

/// Work item dispatched by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimEvent {
    /// Sampling tick for one device.
    Sample(DeviceId),
}

/// Check that `requested` is a finite time not earlier than `now`.
pub(crate) fn validate_schedule_time(now: f64, requested: f64) -> SimResult<f64> {
    if !requested.is_finite() {
        return Err(SimError::InvalidArg {
            what: "event time must be finite",
        });
    }
    if requested < now {
        return Err(SimError::ScheduleInPast { now, requested });
    }
    Ok(requested)
}
