//! Per-device series recording and aggregation.

use core::fmt;
use core::str::FromStr;
use std::collections::BTreeMap;

use tr_core::Real;

use crate::error::{SimError, SimResult};

/// Recorded quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SeriesId {
    Power,
    Temperature,
    Reliability,
}

impl SeriesId {
    pub const ALL: [SeriesId; 3] = [SeriesId::Power, SeriesId::Temperature, SeriesId::Reliability];

    pub fn as_str(self) -> &'static str {
        match self {
            SeriesId::Power => "power",
            SeriesId::Temperature => "temperature",
            SeriesId::Reliability => "reliability",
        }
    }

    /// Axis label with unit, for plots.
    pub fn unit_label(self) -> &'static str {
        match self {
            SeriesId::Power => "Power(W)",
            SeriesId::Temperature => "Temperature(°C)",
            SeriesId::Reliability => "Reliability",
        }
    }
}

impl fmt::Display for SeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeriesId {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "power" | "p_w" => Ok(SeriesId::Power),
            "temperature" | "t_c" => Ok(SeriesId::Temperature),
            "reliability" => Ok(SeriesId::Reliability),
            _ => Err(SimError::InvalidArg {
                what: "unknown series (expected power, temperature or reliability)",
            }),
        }
    }
}

/// One immutable `(time, value)` observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub time: Real,
    pub value: Real,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Series {
    samples: Vec<Sample>,
    sum: Real,
}

/// Ordered series plus running sums for averages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesRecorder {
    series: BTreeMap<SeriesId, Series>,
}

/// Per-series averages produced by [`SeriesRecorder::finalize`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Averages {
    pub values: BTreeMap<SeriesId, Real>,
}

impl Averages {
    pub fn get(&self, series: SeriesId) -> Option<Real> {
        self.values.get(&series).copied()
    }

    pub fn power(&self) -> Option<Real> {
        self.get(SeriesId::Power)
    }

    pub fn temperature(&self) -> Option<Real> {
        self.get(SeriesId::Temperature)
    }
}

/// Snapshot of recorded series for plotting/export collaborators.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesExport {
    pub series: BTreeMap<SeriesId, Vec<Sample>>,
}

impl SeriesExport {
    pub fn get(&self, series: SeriesId) -> &[Sample] {
        self.series.get(&series).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `(time, value)` pairs for one series.
    pub fn pairs(&self, series: SeriesId) -> Vec<(Real, Real)> {
        self.get(series).iter().map(|s| (s.time, s.value)).collect()
    }
}

impl SeriesRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `(time, value)` to `series`; times must strictly increase per series.
    pub fn record(&mut self, series: SeriesId, time: Real, value: Real) -> SimResult<()> {
        self.check(series, time, value)?;
        self.push(series, time, value);
        Ok(())
    }

    /// Append one sample per series at `time`, or none of them if any is rejected.
    pub fn record_tick(&mut self, time: Real, values: &[(SeriesId, Real)]) -> SimResult<()> {
        for &(series, value) in values {
            self.check(series, time, value)?;
        }
        for &(series, value) in values {
            self.push(series, time, value);
        }
        Ok(())
    }

    fn check(&self, series: SeriesId, time: Real, value: Real) -> SimResult<()> {
        tr_core::ensure_non_negative(time, "sample time")?;
        tr_core::ensure_finite(value, "sample value")?;
        if let Some(last) = self.last(series)
            && !(time > last.time)
        {
            return Err(SimError::NonMonotonicSample {
                series,
                previous: last.time,
                requested: time,
            });
        }
        Ok(())
    }

    fn push(&mut self, series: SeriesId, time: Real, value: Real) {
        let entry = self.series.entry(series).or_default();
        entry.samples.push(Sample { time, value });
        entry.sum += value;
    }

    /// Number of samples in `series`.
    pub fn count(&self, series: SeriesId) -> usize {
        self.series.get(&series).map_or(0, |s| s.samples.len())
    }

    pub fn is_empty(&self) -> bool {
        self.series.values().all(|s| s.samples.is_empty())
    }

    /// Running sum of `series`.
    pub fn sum(&self, series: SeriesId) -> Real {
        self.series.get(&series).map_or(0.0, |s| s.sum)
    }

    /// Latest sample of `series`.
    pub fn last(&self, series: SeriesId) -> Option<Sample> {
        self.series.get(&series).and_then(|s| s.samples.last().copied())
    }

    /// Average of one series.
    pub fn average(&self, series: SeriesId) -> SimResult<Real> {
        match self.series.get(&series) {
            Some(s) if !s.samples.is_empty() => Ok(s.sum / s.samples.len() as Real),
            _ => Err(SimError::NoSamples {
                series: Some(series),
            }),
        }
    }

    /// Averages of every recorded series.
    pub fn finalize(&self) -> SimResult<Averages> {
        if self.is_empty() {
            return Err(SimError::NoSamples { series: None });
        }
        let mut values = BTreeMap::new();
        for &id in self.series.keys() {
            values.insert(id, self.average(id)?);
        }
        Ok(Averages { values })
    }

    /// Copy of the recorded series. Does not consume or reset anything.
    pub fn export(&self) -> SeriesExport {
        SeriesExport {
            series: self
                .series
                .iter()
                .map(|(id, s)| (*id, s.samples.clone()))
                .collect(),
        }
    }
}
