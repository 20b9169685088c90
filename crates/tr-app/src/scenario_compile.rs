//! Translate scenario schema types into simulation inputs.

use tr_core::units::{degc, s, w};
use tr_models::{ArrheniusParams, PowerProfile, ReliabilityLaw, TddbParams, ThermalLaw};
use tr_project::schema::{DeviceDef, PowerDef, ReliabilityDef, Scenario, StepDef, ThermalDef};
use tr_sim::{DeviceSpec, ScenarioSpec};

use crate::error::AppResult;

fn steps(defs: &[StepDef]) -> Vec<(f64, f64)> {
    defs.iter().map(|st| (st.time_s, st.value)).collect()
}

pub fn compile_device(def: &DeviceDef) -> DeviceSpec {
    let power = match &def.power {
        PowerDef::Constant { watts } => PowerProfile::Constant { power: w(*watts) },
        PowerDef::Piecewise { steps: defs } => PowerProfile::Piecewise {
            steps: steps(defs),
        },
        PowerDef::Utilization {
            idle_watts,
            busy_watts,
            schedule,
        } => PowerProfile::Utilization {
            idle: w(*idle_watts),
            busy: w(*busy_watts),
            schedule: steps(schedule),
        },
    };

    let thermal = match def.thermal {
        ThermalDef::Linear { k_c_per_j } => ThermalLaw::Linear { k: k_c_per_j },
        ThermalDef::ThermalRc {
            r_k_per_w,
            c_j_per_k,
        } => ThermalLaw::ThermalRc {
            r_k_per_w,
            c_j_per_k,
        },
    };

    let reliability = match def.reliability {
        ReliabilityDef::Tddb {
            a0_s,
            gamma_cm_per_mv,
            e_ox_mv_per_cm,
            ea_ev,
            beta,
        } => ReliabilityLaw::Tddb(TddbParams {
            a0_s,
            gamma_cm_per_mv,
            e_ox_mv_per_cm,
            ea_ev,
            beta,
        }),
        ReliabilityDef::Arrhenius {
            ttf_ref_s,
            t_ref_c,
            ea_ev,
            beta,
        } => ReliabilityLaw::Arrhenius(ArrheniusParams {
            ttf_ref_s,
            t_ref: degc(t_ref_c),
            ea_ev,
            beta,
        }),
    };

    DeviceSpec {
        name: def.name.clone(),
        ambient: degc(def.ambient_c),
        power,
        thermal,
        reliability,
    }
}

/// Validates, then maps every device in file order.
pub fn compile_scenario(scenario: &Scenario) -> AppResult<ScenarioSpec> {
    tr_project::validate_scenario(scenario)?;
    let sim = &scenario.simulation;
    Ok(ScenarioSpec {
        start: s(sim.start_s),
        stop: s(sim.stop_s),
        sample_period: s(sim.sample_period_s),
        devices: scenario.devices.iter().map(compile_device).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tr_core::units::{as_degc, as_seconds, as_watts};

    #[test]
    fn constant_linear_tddb_maps_directly() {
        let def = DeviceDef {
            id: "rpi".to_string(),
            name: "RaspberryPi".to_string(),
            ambient_c: 25.0,
            power: PowerDef::Constant { watts: 5.0 },
            thermal: ThermalDef::Linear { k_c_per_j: 0.1 },
            reliability: ReliabilityDef::tddb_default(),
        };
        let spec = compile_device(&def);

        assert_eq!(spec.name, "RaspberryPi");
        assert!((as_degc(spec.ambient) - 25.0).abs() < 1e-9);
        match spec.power {
            PowerProfile::Constant { power } => assert!((as_watts(power) - 5.0).abs() < 1e-12),
            other => panic!("unexpected power profile {other:?}"),
        }
        assert_eq!(spec.thermal, ThermalLaw::Linear { k: 0.1 });
        assert_eq!(spec.reliability, ReliabilityLaw::Tddb(TddbParams::default()));
    }

    #[test]
    fn scenario_window_is_carried_over() {
        let scenario = Scenario {
            version: 1,
            name: "window".to_string(),
            description: None,
            simulation: tr_project::schema::SimulationDef {
                start_s: 1.0,
                stop_s: 3.0,
                sample_period_s: 0.25,
            },
            devices: vec![DeviceDef {
                id: "a".to_string(),
                name: "A".to_string(),
                ambient_c: 20.0,
                power: PowerDef::Constant { watts: 1.0 },
                thermal: ThermalDef::ThermalRc {
                    r_k_per_w: 2.0,
                    c_j_per_k: 3.0,
                },
                reliability: ReliabilityDef::tddb_default(),
            }],
        };
        let spec = compile_scenario(&scenario).unwrap();
        assert_eq!(as_seconds(spec.start), 1.0);
        assert_eq!(as_seconds(spec.stop), 3.0);
        assert_eq!(as_seconds(spec.sample_period), 0.25);
        assert_eq!(spec.devices.len(), 1);
    }

    #[test]
    fn invalid_scenario_is_rejected_before_compiling() {
        let scenario = Scenario {
            version: 1,
            name: "empty".to_string(),
            description: None,
            simulation: tr_project::schema::SimulationDef {
                start_s: 0.0,
                stop_s: 1.0,
                sample_period_s: 0.5,
            },
            devices: vec![],
        };
        assert!(compile_scenario(&scenario).is_err());
    }
}
