//! Scenario runner: many devices, one simulated timeline.

use tracing::{info, warn};
use tr_core::{DeviceId, Real, Time, as_seconds};

use crate::clock::{Simulator, TimeSource};
use crate::device::{Device, DeviceSpec};
use crate::error::{SimError, SimResult};
use crate::events::SimEvent;
use crate::recorder::{Averages, SeriesExport};
use crate::sampler::{SamplerState, SamplingAdapter, SamplingConfig};

/// A complete simulation setup.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioSpec {
    pub start: Time,
    /// Simulation stop time; the last tick fires at or before it.
    pub stop: Time,
    pub sample_period: Time,
    pub devices: Vec<DeviceSpec>,
}

/// Progress snapshot emitted after each tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimProgress {
    pub sim_time_s: Real,
    pub t_end_s: Real,
    pub fraction_complete: Real,
    pub ticks: u64,
}

/// Final state and recorded series of one device.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceReport {
    pub id: DeviceId,
    pub name: String,
    pub power_model: &'static str,
    pub thermal_model: &'static str,
    pub reliability_model: &'static str,
    pub ticks: u64,
    /// `None` when no tick succeeded.
    pub averages: Option<Averages>,
    pub final_temperature_c: Real,
    pub final_reliability: Real,
    pub damage: Real,
    /// Error that aborted this device's sampling, if any.
    pub failure: Option<SimError>,
    pub series: SeriesExport,
}

/// Result of a scenario run.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioOutcome {
    pub start_s: Real,
    pub end_s: Real,
    pub ticks: u64,
    pub devices: Vec<DeviceReport>,
}

impl ScenarioOutcome {
    pub fn failed_devices(&self) -> impl Iterator<Item = &DeviceReport> {
        self.devices.iter().filter(|d| d.failure.is_some())
    }
}

/// Run a scenario to its stop time.
pub fn run_scenario(spec: &ScenarioSpec) -> SimResult<ScenarioOutcome> {
    run_scenario_with_progress(spec, None)
}

/// Run a scenario, reporting progress after every tick.
pub fn run_scenario_with_progress(
    spec: &ScenarioSpec,
    mut progress_cb: Option<&mut dyn FnMut(SimProgress)>,
) -> SimResult<ScenarioOutcome> {
    let start = as_seconds(spec.start);
    let stop = as_seconds(spec.stop);
    let config = SamplingConfig::new(as_seconds(spec.sample_period), start, stop)?;
    if spec.devices.is_empty() {
        return Err(SimError::InvalidArg {
            what: "scenario has no devices",
        });
    }

    let mut devices = spec
        .devices
        .iter()
        .enumerate()
        .map(|(i, d)| Device::from_spec(DeviceId::from_index(i as u32), d, spec.start))
        .collect::<SimResult<Vec<_>>>()?;
    let mut adapters: Vec<SamplingAdapter> = devices
        .iter()
        .map(|d| SamplingAdapter::new(d.id(), config))
        .collect();

    let mut sim = Simulator::new(start)?;
    sim.stop_at(stop)?;
    for adapter in &mut adapters {
        adapter.start(&mut sim)?;
    }

    info!(
        devices = devices.len(),
        start_s = start,
        stop_s = stop,
        period_s = config.period,
        "scenario started"
    );

    let span = (stop - start).max(f64::MIN_POSITIVE);
    let mut ticks = 0u64;
    sim.run(|clock, event| match event {
        SimEvent::Sample(id) => {
            let idx = id.index() as usize;
            let (Some(device), Some(adapter)) = (devices.get_mut(idx), adapters.get_mut(idx))
            else {
                warn!(device = %id, "tick for unknown device dropped");
                return;
            };
            // Failures are kept on the adapter and reported per device.
            if adapter.on_tick(device, clock).is_ok() {
                ticks += 1;
            }
            if let Some(cb) = progress_cb.as_deref_mut() {
                let now = clock.now();
                cb(SimProgress {
                    sim_time_s: now,
                    t_end_s: stop,
                    fraction_complete: ((now - start) / span).clamp(0.0, 1.0),
                    ticks,
                });
            }
        }
    });

    for adapter in &mut adapters {
        if adapter.state() != SamplerState::Stopped {
            adapter.stop(&mut sim);
        }
    }

    let reports: Vec<DeviceReport> = devices
        .iter()
        .zip(&adapters)
        .map(|(device, adapter)| report(device, adapter))
        .collect();

    for r in &reports {
        match (&r.averages, &r.failure) {
            (_, Some(err)) => warn!(device = %r.name, ticks = r.ticks, error = %err, "device failed"),
            (Some(avg), None) => info!(
                device = %r.name,
                ticks = r.ticks,
                avg_power_w = avg.power(),
                avg_temperature_c = avg.temperature(),
                reliability = r.final_reliability,
                "device finished"
            ),
            (None, None) => warn!(device = %r.name, "device recorded no samples"),
        }
    }
    let outcome = ScenarioOutcome {
        start_s: start,
        end_s: sim.now(),
        ticks,
        devices: reports,
    };
    info!(
        ticks,
        end_s = outcome.end_s,
        failed = outcome.failed_devices().count(),
        "scenario finished"
    );
    Ok(outcome)
}

fn report(device: &Device, adapter: &SamplingAdapter) -> DeviceReport {
    let (power_model, thermal_model, reliability_model) = device.model_names();
    DeviceReport {
        id: device.id(),
        name: device.name().to_string(),
        power_model,
        thermal_model,
        reliability_model,
        ticks: adapter.ticks(),
        averages: device.finalize().ok(),
        final_temperature_c: device.temperature(),
        final_reliability: device.reliability(),
        damage: device.damage(),
        failure: adapter.failure().cloned(),
        series: device.export(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tr_core::{degc, s, w};
    use tr_models::{PowerProfile, ReliabilityLaw, TddbParams, ThermalLaw};

    fn spec(devices: Vec<DeviceSpec>) -> ScenarioSpec {
        ScenarioSpec {
            start: s(0.0),
            stop: s(2.0),
            sample_period: s(0.5),
            devices,
        }
    }

    fn rpi(name: &str, power: PowerProfile) -> DeviceSpec {
        DeviceSpec {
            name: name.to_string(),
            ambient: degc(25.0),
            power,
            thermal: ThermalLaw::Linear { k: 0.1 },
            reliability: ReliabilityLaw::Tddb(TddbParams::default()),
        }
    }

    #[test]
    fn empty_scenario_is_rejected() {
        assert!(run_scenario(&spec(vec![])).is_err());
    }

    #[test]
    fn every_device_ticks_through_the_window() {
        let outcome = run_scenario(&spec(vec![
            rpi("a", PowerProfile::Constant { power: w(5.0) }),
            rpi("b", PowerProfile::Constant { power: w(2.0) }),
        ]))
        .unwrap();
        assert_eq!(outcome.ticks, 10);
        assert_eq!(outcome.end_s, 2.0);
        for d in &outcome.devices {
            assert_eq!(d.ticks, 5);
            assert!(d.failure.is_none());
        }
        assert!(
            outcome.devices[0].final_temperature_c > outcome.devices[1].final_temperature_c
        );
    }

    #[test]
    fn progress_reaches_completion() {
        let mut last = None;
        let mut cb = |p: SimProgress| last = Some(p);
        run_scenario_with_progress(
            &spec(vec![rpi("a", PowerProfile::Constant { power: w(1.0) })]),
            Some(&mut cb),
        )
        .unwrap();
        let last = last.unwrap();
        assert_eq!(last.ticks, 5);
        assert_eq!(last.fraction_complete, 1.0);
    }
}
