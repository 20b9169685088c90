//! Scenario file schema.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    pub version: u32,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub simulation: SimulationDef,
    #[serde(default)]
    pub devices: Vec<DeviceDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationDef {
    #[serde(default)]
    pub start_s: f64,
    pub stop_s: f64,
    #[serde(default = "default_sample_period_s")]
    pub sample_period_s: f64,
}

fn default_sample_period_s() -> f64 {
    0.5
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeviceDef {
    pub id: String,
    pub name: String,
    #[serde(default = "default_ambient_c")]
    pub ambient_c: f64,
    pub power: PowerDef,
    pub thermal: ThermalDef,
    pub reliability: ReliabilityDef,
}

fn default_ambient_c() -> f64 {
    25.0
}

/// `(time, value)` step of a schedule.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct StepDef {
    pub time_s: f64,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum PowerDef {
    Constant {
        watts: f64,
    },
    /// Absolute draw in watts per step.
    Piecewise {
        steps: Vec<StepDef>,
    },
    /// Utilization in `[0, 1]` per step.
    Utilization {
        idle_watts: f64,
        busy_watts: f64,
        schedule: Vec<StepDef>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ThermalDef {
    Linear {
        k_c_per_j: f64,
    },
    ThermalRc {
        r_k_per_w: f64,
        c_j_per_k: f64,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ReliabilityDef {
    Tddb {
        #[serde(default = "default_tddb_a0_s")]
        a0_s: f64,
        #[serde(default = "default_tddb_gamma")]
        gamma_cm_per_mv: f64,
        #[serde(default = "default_tddb_e_ox")]
        e_ox_mv_per_cm: f64,
        #[serde(default = "default_ea_ev")]
        ea_ev: f64,
        #[serde(default = "default_beta")]
        beta: f64,
    },
    Arrhenius {
        ttf_ref_s: f64,
        #[serde(default = "default_ambient_c")]
        t_ref_c: f64,
        #[serde(default = "default_ea_ev")]
        ea_ev: f64,
        #[serde(default = "default_beta")]
        beta: f64,
    },
}

fn default_tddb_a0_s() -> f64 {
    0.1
}

fn default_tddb_gamma() -> f64 {
    1.1
}

fn default_tddb_e_ox() -> f64 {
    5.0
}

fn default_ea_ev() -> f64 {
    0.7
}

fn default_beta() -> f64 {
    1.5
}

impl ReliabilityDef {
    /// TDDB with the default process constants.
    pub fn tddb_default() -> Self {
        ReliabilityDef::Tddb {
            a0_s: default_tddb_a0_s(),
            gamma_cm_per_mv: default_tddb_gamma(),
            e_ox_mv_per_cm: default_tddb_e_ox(),
            ea_ev: default_ea_ev(),
            beta: default_beta(),
        }
    }
}
