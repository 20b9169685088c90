//! Scenario loading, validation and device listing.

use std::path::Path;
use tr_project::schema::{PowerDef, ReliabilityDef, Scenario, ThermalDef};

use crate::error::AppResult;

/// One row of a device listing.
#[derive(Debug, Clone)]
pub struct DeviceSummary {
    pub id: String,
    pub name: String,
    pub ambient_c: f64,
    pub power: &'static str,
    pub thermal: &'static str,
    pub reliability: &'static str,
}

/// Load, migrate and validate a scenario (`.json` or YAML).
pub fn load_scenario(path: &Path) -> AppResult<Scenario> {
    Ok(tr_project::load_scenario(path)?)
}

pub fn validate_scenario(scenario: &Scenario) -> AppResult<()> {
    Ok(tr_project::validate_scenario(scenario)?)
}

pub fn list_devices(scenario: &Scenario) -> Vec<DeviceSummary> {
    scenario
        .devices
        .iter()
        .map(|device| DeviceSummary {
            id: device.id.clone(),
            name: device.name.clone(),
            ambient_c: device.ambient_c,
            power: match device.power {
                PowerDef::Constant { .. } => "constant",
                PowerDef::Piecewise { .. } => "piecewise",
                PowerDef::Utilization { .. } => "utilization",
            },
            thermal: match device.thermal {
                ThermalDef::Linear { .. } => "linear",
                ThermalDef::ThermalRc { .. } => "thermal-rc",
            },
            reliability: match device.reliability {
                ReliabilityDef::Tddb { .. } => "tddb",
                ReliabilityDef::Arrhenius { .. } => "arrhenius",
            },
        })
        .collect()
}
