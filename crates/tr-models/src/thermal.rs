//! Temperature estimators.
//!
//! An estimator starts at ambient temperature at a given simulated start time. Each
//! update carries the simulated time the estimator advances to and the power held
//! over the elapsed interval. Time must strictly advance; a stale or repeated time is
//! rejected with [`ModelError::InvalidTickOrder`] and leaves the state untouched.

use core::fmt;

use tr_core::{Real, Temperature, Time, as_degc, as_seconds, ensure_finite, ensure_positive};

use crate::error::{ModelError, ModelResult};

/// Time and sequence number of the latest temperature update.
///
/// `sequence` is 0 until the first update; reliability models use it to detect
/// stale reads.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThermalStamp {
    pub time: Real,
    pub sequence: u64,
}

/// A pluggable temperature update law.
pub trait TemperatureModel: fmt::Debug {
    /// Short model name for logs and reports.
    fn name(&self) -> &'static str;

    /// Ambient temperature in °C.
    fn ambient(&self) -> Real;

    /// Advance to simulated time `time` with `power_w` held over the elapsed interval.
    fn update_temperature(&mut self, time: Real, power_w: Real) -> ModelResult<()>;

    /// Current temperature in °C.
    fn temperature(&self) -> Real;

    /// Stamp of the latest update.
    fn stamp(&self) -> ThermalStamp;
}

/// Integration state shared by all thermal laws.
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureState {
    pub temperature: Real,
    pub last_time: Real,
    pub sequence: u64,
}

impl TemperatureState {
    pub fn new(ambient: Real, start: Real) -> Self {
        Self {
            temperature: ambient,
            last_time: start,
            sequence: 0,
        }
    }

    /// Elapsed time to `time`, validated without mutating the state.
    fn elapsed_to(&self, time: Real, power_w: Real) -> ModelResult<Real> {
        ensure_finite(power_w, "power")?;
        let dt = time - self.last_time;
        if !time.is_finite() || dt <= 0.0 {
            return Err(ModelError::InvalidTickOrder {
                previous: self.last_time,
                requested: time,
            });
        }
        Ok(dt)
    }

    /// Store the new temperature; a non-finite one leaves the state untouched.
    fn commit(&mut self, time: Real, temperature: Real) -> ModelResult<()> {
        self.temperature = ensure_finite(temperature, "temperature")?;
        self.last_time = time;
        self.sequence += 1;
        Ok(())
    }

    fn stamp(&self) -> ThermalStamp {
        ThermalStamp {
            time: self.last_time,
            sequence: self.sequence,
        }
    }
}

/// Linear self-heating: `T += k * P * dt`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearThermalModel {
    ambient: Real,
    /// Heating coefficient in °C per joule.
    k: Real,
    state: TemperatureState,
}

impl LinearThermalModel {
    pub fn new(ambient: Temperature, start: Time, k: Real) -> ModelResult<Self> {
        let ambient = ensure_finite(as_degc(ambient), "ambient temperature")?;
        let start = ensure_finite(as_seconds(start), "start time")?;
        let k = ensure_finite(k, "heating coefficient")?;
        if k < 0.0 {
            return Err(ModelError::InvalidArg {
                what: "heating coefficient must be non-negative",
            });
        }
        Ok(Self {
            ambient,
            k,
            state: TemperatureState::new(ambient, start),
        })
    }
}

impl TemperatureModel for LinearThermalModel {
    fn name(&self) -> &'static str {
        "linear"
    }

    fn ambient(&self) -> Real {
        self.ambient
    }

    fn update_temperature(&mut self, time: Real, power_w: Real) -> ModelResult<()> {
        let dt = self.state.elapsed_to(time, power_w)?;
        let next = self.state.temperature + self.k * power_w * dt;
        self.state.commit(time, next)
    }

    fn temperature(&self) -> Real {
        self.state.temperature
    }

    fn stamp(&self) -> ThermalStamp {
        self.state.stamp()
    }
}

/// Lumped thermal RC coupled to ambient:
/// `C dT/dt = P - (T - T_amb) / R`.
///
/// Power is held constant over each interval, so the step is the exact exponential
/// relaxation toward `T_amb + P * R` and stays stable for any interval length.
#[derive(Debug, Clone, PartialEq)]
pub struct ThermalRcModel {
    ambient: Real,
    /// Junction-to-ambient resistance, K/W.
    r_k_per_w: Real,
    /// Heat capacity, J/K.
    c_j_per_k: Real,
    state: TemperatureState,
}

impl ThermalRcModel {
    pub fn new(
        ambient: Temperature,
        start: Time,
        r_k_per_w: Real,
        c_j_per_k: Real,
    ) -> ModelResult<Self> {
        let ambient = ensure_finite(as_degc(ambient), "ambient temperature")?;
        let start = ensure_finite(as_seconds(start), "start time")?;
        Ok(Self {
            ambient,
            r_k_per_w: ensure_positive(r_k_per_w, "thermal resistance")?,
            c_j_per_k: ensure_positive(c_j_per_k, "heat capacity")?,
            state: TemperatureState::new(ambient, start),
        })
    }

    /// Thermal time constant `R * C` in seconds.
    pub fn time_constant(&self) -> Real {
        self.r_k_per_w * self.c_j_per_k
    }

    /// Temperature the device settles at under constant `power_w`.
    pub fn steady_state(&self, power_w: Real) -> Real {
        self.ambient + power_w * self.r_k_per_w
    }
}

impl TemperatureModel for ThermalRcModel {
    fn name(&self) -> &'static str {
        "thermal_rc"
    }

    fn ambient(&self) -> Real {
        self.ambient
    }

    fn update_temperature(&mut self, time: Real, power_w: Real) -> ModelResult<()> {
        let dt = self.state.elapsed_to(time, power_w)?;
        let target = self.steady_state(power_w);
        let decay = (-dt / self.time_constant()).exp();
        let next = target + (self.state.temperature - target) * decay;
        self.state.commit(time, next)
    }

    fn temperature(&self) -> Real {
        self.state.temperature
    }

    fn stamp(&self) -> ThermalStamp {
        self.state.stamp()
    }
}

/// Tagged temperature law selection, built once per device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThermalLaw {
    /// `k` in °C per joule.
    Linear { k: Real },
    ThermalRc { r_k_per_w: Real, c_j_per_k: Real },
}

impl ThermalLaw {
    pub fn build(&self, ambient: Temperature, start: Time) -> ModelResult<Box<dyn TemperatureModel>> {
        Ok(match *self {
            ThermalLaw::Linear { k } => Box::new(LinearThermalModel::new(ambient, start, k)?),
            ThermalLaw::ThermalRc {
                r_k_per_w,
                c_j_per_k,
            } => Box::new(ThermalRcModel::new(ambient, start, r_k_per_w, c_j_per_k)?),
        })
    }
}
