use tr_project::schema::*;
use tr_project::{load_json, load_yaml, save_json, save_yaml, validate_scenario};

fn rpi_scenario() -> Scenario {
    Scenario {
        version: 1,
        name: "Raspberry Pi".to_string(),
        description: Some("AdaBoost workload on a Raspberry Pi".to_string()),
        simulation: SimulationDef {
            start_s: 0.0,
            stop_s: 10.0,
            sample_period_s: 0.5,
        },
        devices: vec![
            DeviceDef {
                id: "rpi".to_string(),
                name: "RaspberryPi".to_string(),
                ambient_c: 25.0,
                power: PowerDef::Constant { watts: 5.0 },
                thermal: ThermalDef::Linear { k_c_per_j: 0.1 },
                reliability: ReliabilityDef::tddb_default(),
            },
            DeviceDef {
                id: "soc".to_string(),
                name: "Loaded SoC".to_string(),
                ambient_c: 30.0,
                power: PowerDef::Utilization {
                    idle_watts: 1.0,
                    busy_watts: 4.0,
                    schedule: vec![
                        StepDef {
                            time_s: 0.0,
                            value: 0.2,
                        },
                        StepDef {
                            time_s: 5.0,
                            value: 0.9,
                        },
                    ],
                },
                thermal: ThermalDef::ThermalRc {
                    r_k_per_w: 8.0,
                    c_j_per_k: 2.5,
                },
                reliability: ReliabilityDef::Arrhenius {
                    ttf_ref_s: 3.0e8,
                    t_ref_c: 25.0,
                    ea_ev: 0.7,
                    beta: 2.0,
                },
            },
        ],
    }
}

#[test]
fn roundtrip_yaml_two_devices() {
    let scenario = rpi_scenario();
    validate_scenario(&scenario).unwrap();

    let path = std::env::temp_dir().join("tr_project_roundtrip_two_devices.yaml");
    save_yaml(&path, &scenario).unwrap();
    let loaded = load_yaml(&path).unwrap();

    assert_eq!(scenario, loaded);
}

#[test]
fn roundtrip_json_two_devices() {
    let scenario = rpi_scenario();

    let path = std::env::temp_dir().join("tr_project_roundtrip_two_devices.json");
    save_json(&path, &scenario).unwrap();
    let loaded = load_json(&path).unwrap();

    assert_eq!(scenario, loaded);
}

#[test]
fn save_rejects_invalid_scenario() {
    let mut scenario = rpi_scenario();
    scenario.simulation.sample_period_s = 0.0;

    let path = std::env::temp_dir().join("tr_project_rejected.yaml");
    assert!(save_yaml(&path, &scenario).is_err());
}

#[test]
fn load_migrates_version_zero() {
    let mut scenario = rpi_scenario();
    scenario.version = 0;
    let yaml = serde_yaml::to_string(&scenario).unwrap();

    let path = std::env::temp_dir().join("tr_project_v0.yaml");
    std::fs::write(&path, yaml).unwrap();
    let loaded = load_yaml(&path).unwrap();

    assert_eq!(loaded.version, tr_project::LATEST_VERSION);
    assert_eq!(loaded.devices, scenario.devices);
}
