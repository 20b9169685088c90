//! Scenario validation logic.

use std::collections::HashSet;

use crate::schema::{DeviceDef, PowerDef, ReliabilityDef, Scenario, StepDef, ThermalDef};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Scenario '{name}' defines no devices")]
    NoDevices { name: String },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(field: String, value: f64, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn require_positive(field: String, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(field, value, "must be positive and finite"));
    }
    Ok(())
}

fn require_non_negative(field: String, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(invalid(field, value, "must be non-negative and finite"));
    }
    Ok(())
}

pub fn validate_scenario(scenario: &Scenario) -> Result<(), ValidationError> {
    if scenario.version > crate::migrate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: scenario.version,
        });
    }

    let sim = &scenario.simulation;
    require_non_negative("simulation start_s".to_string(), sim.start_s)?;
    if !sim.stop_s.is_finite() || sim.stop_s < sim.start_s {
        return Err(invalid(
            "simulation stop_s".to_string(),
            sim.stop_s,
            "must be finite and not before start_s",
        ));
    }
    require_positive("simulation sample_period_s".to_string(), sim.sample_period_s)?;

    if scenario.devices.is_empty() {
        return Err(ValidationError::NoDevices {
            name: scenario.name.clone(),
        });
    }

    let mut device_ids = HashSet::new();
    for device in &scenario.devices {
        if !device_ids.insert(&device.id) {
            return Err(ValidationError::DuplicateId {
                id: device.id.clone(),
                context: "devices".to_string(),
            });
        }
        validate_device(device)?;
    }

    Ok(())
}

fn validate_device(device: &DeviceDef) -> Result<(), ValidationError> {
    let plain_id = device
        .id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if device.id.is_empty() || device.id.starts_with('.') || !plain_id {
        return Err(ValidationError::InvalidValue {
            field: "device id".to_string(),
            value: format!("'{}'", device.id),
            reason: "must be non-empty ASCII letters, digits, '-', '_' or '.', not starting with '.'"
                .to_string(),
        });
    }
    if !device.ambient_c.is_finite() || device.ambient_c <= -273.15 {
        return Err(invalid(
            format!("device '{}' ambient_c", device.id),
            device.ambient_c,
            "must be finite and above absolute zero",
        ));
    }
    validate_power(&device.id, &device.power)?;
    validate_thermal(&device.id, &device.thermal)?;
    validate_reliability(&device.id, &device.reliability)
}

fn validate_steps(field: String, steps: &[StepDef]) -> Result<(), ValidationError> {
    if steps.is_empty() {
        return Err(ValidationError::InvalidValue {
            field,
            value: "[]".to_string(),
            reason: "must contain at least one step".to_string(),
        });
    }
    for pair in steps.windows(2) {
        if !(pair[1].time_s > pair[0].time_s) {
            return Err(invalid(
                format!("{field} time_s"),
                pair[1].time_s,
                "step times must be strictly increasing",
            ));
        }
    }
    for step in steps {
        if !step.time_s.is_finite() {
            return Err(invalid(format!("{field} time_s"), step.time_s, "must be finite"));
        }
    }
    Ok(())
}

fn validate_power(id: &str, power: &PowerDef) -> Result<(), ValidationError> {
    match power {
        PowerDef::Constant { watts } => {
            require_non_negative(format!("device '{id}' power watts"), *watts)
        }
        PowerDef::Piecewise { steps } => {
            let field = format!("device '{id}' power steps");
            validate_steps(field.clone(), steps)?;
            for step in steps {
                require_non_negative(format!("{field} value"), step.value)?;
            }
            Ok(())
        }
        PowerDef::Utilization {
            idle_watts,
            busy_watts,
            schedule,
        } => {
            require_non_negative(format!("device '{id}' power idle_watts"), *idle_watts)?;
            require_non_negative(format!("device '{id}' power busy_watts"), *busy_watts)?;
            if busy_watts < idle_watts {
                return Err(invalid(
                    format!("device '{id}' power busy_watts"),
                    *busy_watts,
                    "must not be below idle_watts",
                ));
            }
            let field = format!("device '{id}' power schedule");
            validate_steps(field.clone(), schedule)?;
            for step in schedule {
                if !(0.0..=1.0).contains(&step.value) {
                    return Err(invalid(
                        format!("{field} value"),
                        step.value,
                        "utilization must be within [0, 1]",
                    ));
                }
            }
            Ok(())
        }
    }
}

fn validate_thermal(id: &str, thermal: &ThermalDef) -> Result<(), ValidationError> {
    match thermal {
        ThermalDef::Linear { k_c_per_j } => {
            require_non_negative(format!("device '{id}' thermal k_c_per_j"), *k_c_per_j)
        }
        ThermalDef::ThermalRc {
            r_k_per_w,
            c_j_per_k,
        } => {
            require_positive(format!("device '{id}' thermal r_k_per_w"), *r_k_per_w)?;
            require_positive(format!("device '{id}' thermal c_j_per_k"), *c_j_per_k)
        }
    }
}

fn validate_reliability(id: &str, reliability: &ReliabilityDef) -> Result<(), ValidationError> {
    match reliability {
        ReliabilityDef::Tddb {
            a0_s,
            gamma_cm_per_mv,
            e_ox_mv_per_cm,
            ea_ev,
            beta,
        } => {
            require_positive(format!("device '{id}' reliability a0_s"), *a0_s)?;
            if !gamma_cm_per_mv.is_finite() || !e_ox_mv_per_cm.is_finite() {
                return Err(invalid(
                    format!("device '{id}' reliability field acceleration"),
                    gamma_cm_per_mv * e_ox_mv_per_cm,
                    "must be finite",
                ));
            }
            require_positive(format!("device '{id}' reliability ea_ev"), *ea_ev)?;
            require_positive(format!("device '{id}' reliability beta"), *beta)
        }
        ReliabilityDef::Arrhenius {
            ttf_ref_s,
            t_ref_c,
            ea_ev,
            beta,
        } => {
            require_positive(format!("device '{id}' reliability ttf_ref_s"), *ttf_ref_s)?;
            if !t_ref_c.is_finite() || *t_ref_c <= -273.15 {
                return Err(invalid(
                    format!("device '{id}' reliability t_ref_c"),
                    *t_ref_c,
                    "must be finite and above absolute zero",
                ));
            }
            require_positive(format!("device '{id}' reliability ea_ev"), *ea_ev)?;
            require_positive(format!("device '{id}' reliability beta"), *beta)
        }
    }
}
