//! Result data types.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub type RunId = String;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: RunId,
    pub scenario_name: String,
    pub timestamp: String,
    pub engine_version: String,
    pub sampling: SamplingInfo,
    #[serde(default)]
    pub devices: Vec<DeviceSummary>,
}

impl RunManifest {
    /// Manifest stamped with the current UTC time (RFC 3339).
    pub fn stamped(
        run_id: RunId,
        scenario_name: &str,
        engine_version: &str,
        sampling: SamplingInfo,
        devices: Vec<DeviceSummary>,
    ) -> Self {
        Self {
            run_id,
            scenario_name: scenario_name.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            engine_version: engine_version.to_string(),
            sampling,
            devices,
        }
    }

    pub fn device(&self, device_id: &str) -> Option<&DeviceSummary> {
        self.devices.iter().find(|d| d.device_id == device_id)
    }

    /// Devices whose sampling stopped on an error.
    pub fn failed_devices(&self) -> impl Iterator<Item = &DeviceSummary> {
        self.devices.iter().filter(|d| d.failure.is_some())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SamplingInfo {
    pub start_s: f64,
    pub end_s: f64,
    pub period_s: f64,
    pub ticks: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeviceSummary {
    pub device_id: String,
    pub name: String,
    pub power_model: String,
    pub thermal_model: String,
    pub reliability_model: String,
    pub ticks: u64,
    /// `None` when the device recorded nothing.
    pub average_power_w: Option<f64>,
    pub average_temperature_c: Option<f64>,
    pub final_temperature_c: f64,
    pub final_reliability: f64,
    pub damage: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

/// Recorded series of one device, stored as `series/<device_id>.json` in its run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DeviceSeries {
    pub device_id: String,
    /// Series name to `(time_s, value)` points in tick order.
    pub series: BTreeMap<String, Vec<(f64, f64)>>,
}

impl DeviceSeries {
    pub fn new(device_id: impl Into<String>) -> Self {
        Self {
            device_id: device_id.into(),
            series: BTreeMap::new(),
        }
    }

    pub fn push(&mut self, series: &str, time_s: f64, value: f64) {
        self.series
            .entry(series.to_string())
            .or_default()
            .push((time_s, value));
    }

    /// Points of one series; empty when the series was never recorded.
    pub fn points(&self, series: &str) -> &[(f64, f64)] {
        self.series.get(series).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn sample_count(&self) -> usize {
        self.series.values().map(Vec::len).sum()
    }

    /// Earliest and latest sample time across all series.
    pub fn time_range(&self) -> Option<(f64, f64)> {
        self.series
            .values()
            .flatten()
            .map(|&(t, _)| (t, t))
            .reduce(|(lo, hi), (t, _)| (lo.min(t), hi.max(t)))
    }
}
