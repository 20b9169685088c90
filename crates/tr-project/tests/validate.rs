use tr_project::schema::*;
use tr_project::{ValidationError, validate_scenario};

fn device(id: &str) -> DeviceDef {
    DeviceDef {
        id: id.to_string(),
        name: format!("Device {id}"),
        ambient_c: 25.0,
        power: PowerDef::Constant { watts: 5.0 },
        thermal: ThermalDef::Linear { k_c_per_j: 0.1 },
        reliability: ReliabilityDef::tddb_default(),
    }
}

fn scenario(devices: Vec<DeviceDef>) -> Scenario {
    Scenario {
        version: 1,
        name: "validation".to_string(),
        description: None,
        simulation: SimulationDef {
            start_s: 0.0,
            stop_s: 5.0,
            sample_period_s: 0.5,
        },
        devices,
    }
}

#[test]
fn minimal_scenario_validates() {
    validate_scenario(&scenario(vec![device("a")])).unwrap();
}

#[test]
fn duplicate_device_ids_rejected() {
    let err = validate_scenario(&scenario(vec![device("a"), device("a")])).unwrap_err();
    assert!(matches!(err, ValidationError::DuplicateId { .. }));
}

#[test]
fn device_ids_must_be_plain_names() {
    validate_scenario(&scenario(vec![device("rpi-4_b.0")])).unwrap();
    for bad in ["", " ", "../x", ".hidden", "a/b", "soc 1"] {
        let err = validate_scenario(&scenario(vec![device(bad)])).unwrap_err();
        assert!(
            matches!(&err, ValidationError::InvalidValue { field, .. } if field == "device id"),
            "{bad:?}: {err}"
        );
    }
}

#[test]
fn empty_device_list_rejected() {
    let err = validate_scenario(&scenario(vec![])).unwrap_err();
    assert!(matches!(err, ValidationError::NoDevices { .. }));
}

#[test]
fn stop_before_start_rejected() {
    let mut s = scenario(vec![device("a")]);
    s.simulation.start_s = 4.0;
    s.simulation.stop_s = 1.0;
    assert!(validate_scenario(&s).is_err());
}

#[test]
fn stop_equal_to_start_is_allowed() {
    let mut s = scenario(vec![device("a")]);
    s.simulation.stop_s = s.simulation.start_s;
    validate_scenario(&s).unwrap();
}

#[test]
fn negative_power_rejected() {
    let mut d = device("a");
    d.power = PowerDef::Constant { watts: -1.0 };
    assert!(validate_scenario(&scenario(vec![d])).is_err());
}

#[test]
fn unsorted_piecewise_steps_rejected() {
    let mut d = device("a");
    d.power = PowerDef::Piecewise {
        steps: vec![
            StepDef {
                time_s: 2.0,
                value: 1.0,
            },
            StepDef {
                time_s: 1.0,
                value: 2.0,
            },
        ],
    };
    assert!(validate_scenario(&scenario(vec![d])).is_err());
}

#[test]
fn utilization_out_of_range_rejected() {
    let mut d = device("a");
    d.power = PowerDef::Utilization {
        idle_watts: 1.0,
        busy_watts: 3.0,
        schedule: vec![StepDef {
            time_s: 0.0,
            value: 1.5,
        }],
    };
    assert!(validate_scenario(&scenario(vec![d])).is_err());
}

#[test]
fn busy_below_idle_rejected() {
    let mut d = device("a");
    d.power = PowerDef::Utilization {
        idle_watts: 3.0,
        busy_watts: 1.0,
        schedule: vec![StepDef {
            time_s: 0.0,
            value: 0.5,
        }],
    };
    assert!(validate_scenario(&scenario(vec![d])).is_err());
}

#[test]
fn zero_capacitance_rejected() {
    let mut d = device("a");
    d.thermal = ThermalDef::ThermalRc {
        r_k_per_w: 5.0,
        c_j_per_k: 0.0,
    };
    assert!(validate_scenario(&scenario(vec![d])).is_err());
}

#[test]
fn ambient_below_absolute_zero_rejected() {
    let mut d = device("a");
    d.ambient_c = -300.0;
    assert!(validate_scenario(&scenario(vec![d])).is_err());
}

#[test]
fn future_version_rejected() {
    let mut s = scenario(vec![device("a")]);
    s.version = tr_project::LATEST_VERSION + 1;
    let err = validate_scenario(&s).unwrap_err();
    assert!(matches!(err, ValidationError::UnsupportedVersion { .. }));
}
