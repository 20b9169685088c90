//! Periodic sampling adapter.
//!
//! The adapter ticks one device at a fixed period. Each tick reads power, advances the
//! thermal model across the sampling window, updates reliability and records the
//! readings, then re-arms itself on the time source until the end time is reached.
//!
//! Power read at tick `t` is held over the window `[t, t + period]`, so the thermal
//! model is advanced to `t + period` on every tick.
//!
//! Tick `n` fires at `start + n * period`, never at a running sum of periods. A tick
//! within `1e-9 * period` of `end` is placed exactly on `end` so the scheduler's stop
//! bound admits it.

use tracing::{debug, warn};
use tr_core::{DeviceId, Real, ensure_finite, ensure_positive};

use crate::clock::{EventHandle, TimeSource};
use crate::device::{Device, TickReading};
use crate::error::{SimError, SimResult};
use crate::events::SimEvent;

/// Sampling cadence and window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingConfig {
    /// Sample period in seconds.
    pub period: Real,
    /// Time of the first tick.
    pub start: Real,
    /// No tick is scheduled after this time.
    pub end: Real,
}

impl SamplingConfig {
    pub fn new(period: Real, start: Real, end: Real) -> SimResult<Self> {
        let period = ensure_positive(period, "sample period")?;
        let start = ensure_finite(start, "sampling start")?;
        let end = ensure_finite(end, "sampling end")?;
        if end < start {
            return Err(SimError::InvalidArg {
                what: "sampling end must not precede start",
            });
        }
        Ok(Self { period, start, end })
    }

    /// Number of ticks in the window: `floor((end - start) / period) + 1`.
    pub fn expected_ticks(&self) -> u64 {
        ((self.end - self.start) / self.period + 1e-9).floor() as u64 + 1
    }

    /// Time of tick `n`, snapped onto `end` when rounding leaves it just off.
    pub fn tick_time(&self, n: u64) -> Real {
        let t = self.start + n as Real * self.period;
        if (t - self.end).abs() <= 1e-9 * self.period {
            self.end
        } else {
            t
        }
    }
}

/// Adapter lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerState {
    Idle,
    Sampling,
    Stopped,
}

/// Drives the tick sequence of one device.
#[derive(Debug)]
pub struct SamplingAdapter {
    device: DeviceId,
    config: SamplingConfig,
    state: SamplerState,
    pending: Option<EventHandle>,
    ticks: u64,
    failure: Option<SimError>,
}

impl SamplingAdapter {
    pub fn new(device: DeviceId, config: SamplingConfig) -> Self {
        Self {
            device,
            config,
            state: SamplerState::Idle,
            pending: None,
            ticks: 0,
            failure: None,
        }
    }

    pub fn device(&self) -> DeviceId {
        self.device
    }

    pub fn state(&self) -> SamplerState {
        self.state
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// The error that stopped sampling, if any.
    pub fn failure(&self) -> Option<&SimError> {
        self.failure.as_ref()
    }

    pub fn config(&self) -> &SamplingConfig {
        &self.config
    }

    /// Arm the first tick at the configured start time.
    pub fn start(&mut self, clock: &mut dyn TimeSource) -> SimResult<()> {
        if self.state != SamplerState::Idle {
            return Err(SimError::InvalidArg {
                what: "sampling adapter already started",
            });
        }
        self.state = SamplerState::Sampling;
        let handle = clock.schedule_at(self.config.start, SimEvent::Sample(self.device))?;
        self.pending = Some(handle);
        Ok(())
    }

    /// Run one tick at the clock's current time and re-arm if the window allows.
    ///
    /// A failing tick stops the adapter and returns the error; series recorded by
    /// earlier ticks stay on the device.
    pub fn on_tick(
        &mut self,
        device: &mut Device,
        clock: &mut dyn TimeSource,
    ) -> SimResult<TickReading> {
        if device.id() != self.device {
            return Err(SimError::UnknownDevice(device.id()));
        }
        if self.state != SamplerState::Sampling {
            return Err(SimError::InvalidArg {
                what: "tick delivered to an adapter that is not sampling",
            });
        }
        self.pending = None;

        let t = clock.now();
        let next = self.config.tick_time(self.ticks + 1);
        let reading = match device.sample(t, next) {
            Ok(reading) => reading,
            Err(err) => {
                warn!(device = %self.device, time = t, error = %err, "sampling aborted");
                self.state = SamplerState::Stopped;
                self.failure = Some(err.clone());
                return Err(err);
            }
        };
        self.ticks += 1;
        debug!(
            device = %self.device,
            time = t,
            power_w = reading.power_w,
            temperature_c = reading.temperature_c,
            reliability = reading.reliability,
            "tick"
        );

        if next <= self.config.end && clock.is_running() {
            match clock.schedule_at(next, SimEvent::Sample(self.device)) {
                Ok(handle) => self.pending = Some(handle),
                Err(err) => {
                    self.state = SamplerState::Stopped;
                    self.failure = Some(err.clone());
                    return Err(err);
                }
            }
        } else {
            debug!(device = %self.device, time = t, ticks = self.ticks, "sampling window complete");
            self.state = SamplerState::Stopped;
        }
        Ok(reading)
    }

    /// Stop sampling and drop any pending tick.
    pub fn stop(&mut self, clock: &mut dyn TimeSource) {
        if let Some(handle) = self.pending.take() {
            clock.cancel(handle);
        }
        self.state = SamplerState::Stopped;
    }
}
