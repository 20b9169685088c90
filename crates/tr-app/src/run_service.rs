//! Run execution and caching service.

use std::path::Path;
use std::time::Instant;

use tr_project::schema::Scenario;
use tr_results::{DeviceSeries, DeviceSummary, RunManifest, RunStore, SamplingInfo};
use tr_sim::{ScenarioOutcome, SeriesId, SimProgress};
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::progress::{RunProgressEvent, RunStage, SamplingProgress};
use crate::{project_service, scenario_compile};

/// Folded into run ids so a model change invalidates cached runs.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub use_cache: bool,
    pub engine_version: String,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            use_cache: true,
            engine_version: ENGINE_VERSION.to_string(),
        }
    }
}

pub struct RunRequest<'a> {
    pub scenario_path: &'a Path,
    pub options: RunOptions,
}

#[derive(Debug, Clone)]
pub struct RunResponse {
    pub run_id: String,
    pub manifest: RunManifest,
    pub loaded_from_cache: bool,
    pub elapsed_wall_s: f64,
}

fn emit_progress(
    progress_cb: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
    stage: RunStage,
    started: Instant,
    message: Option<String>,
    sampling: Option<SamplingProgress>,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(RunProgressEvent {
            stage,
            elapsed_wall_s: started.elapsed().as_secs_f64(),
            message,
            sampling,
        });
    }
}

/// Execute or load a run.
pub fn ensure_run(request: &RunRequest) -> AppResult<RunResponse> {
    ensure_run_with_progress(request, None)
}

/// Execute or load a run and stream progress events.
pub fn ensure_run_with_progress(
    request: &RunRequest,
    mut progress_cb: Option<&mut dyn FnMut(RunProgressEvent)>,
) -> AppResult<RunResponse> {
    let started = Instant::now();

    emit_progress(
        &mut progress_cb,
        RunStage::LoadingScenario,
        started,
        Some("Loading scenario".to_string()),
        None,
    );
    let scenario = project_service::load_scenario(request.scenario_path)?;

    emit_progress(
        &mut progress_cb,
        RunStage::CheckingCache,
        started,
        Some("Checking run cache".to_string()),
        None,
    );
    let run_id = tr_results::compute_run_id(&scenario, &request.options.engine_version);
    let store = RunStore::for_scenario(request.scenario_path)?;

    if request.options.use_cache && store.has_run(&run_id) {
        emit_progress(
            &mut progress_cb,
            RunStage::LoadingCachedResult,
            started,
            Some("Loading cached run".to_string()),
            None,
        );
        let manifest = store.load_manifest(&run_id)?;
        info!(run_id = %run_id, "loaded cached run");

        emit_progress(
            &mut progress_cb,
            RunStage::Completed,
            started,
            Some("Loaded cached run".to_string()),
            None,
        );
        return Ok(RunResponse {
            run_id,
            manifest,
            loaded_from_cache: true,
            elapsed_wall_s: started.elapsed().as_secs_f64(),
        });
    }

    let manifest = execute_run(
        &scenario,
        &store,
        &run_id,
        &request.options.engine_version,
        &mut progress_cb,
        started,
    )?;

    emit_progress(
        &mut progress_cb,
        RunStage::Completed,
        started,
        Some("Run completed".to_string()),
        None,
    );

    Ok(RunResponse {
        run_id,
        manifest,
        loaded_from_cache: false,
        elapsed_wall_s: started.elapsed().as_secs_f64(),
    })
}

fn execute_run(
    scenario: &Scenario,
    store: &RunStore,
    run_id: &str,
    engine_version: &str,
    progress_cb: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
    started: Instant,
) -> AppResult<RunManifest> {
    emit_progress(
        progress_cb,
        RunStage::Compiling,
        started,
        Some("Compiling scenario".to_string()),
        None,
    );
    let spec = scenario_compile::compile_scenario(scenario)?;

    emit_progress(
        progress_cb,
        RunStage::Sampling,
        started,
        Some("Sampling devices".to_string()),
        Some(SamplingProgress {
            sim_time_s: scenario.simulation.start_s,
            t_end_s: scenario.simulation.stop_s,
            fraction_complete: 0.0,
            ticks: 0,
        }),
    );

    let outcome = tr_sim::run_scenario_with_progress(
        &spec,
        Some(&mut |p: SimProgress| {
            emit_progress(
                progress_cb,
                RunStage::Sampling,
                started,
                Some(format!(
                    "Tick {} | t={:.3}/{:.3} s",
                    p.ticks, p.sim_time_s, p.t_end_s
                )),
                Some(SamplingProgress {
                    sim_time_s: p.sim_time_s,
                    t_end_s: p.t_end_s,
                    fraction_complete: p.fraction_complete,
                    ticks: p.ticks,
                }),
            )
        }),
    )?;

    emit_progress(
        progress_cb,
        RunStage::SavingResults,
        started,
        Some("Saving results".to_string()),
        None,
    );

    let (devices, series) = collect_results(scenario, &outcome);
    let manifest = RunManifest::stamped(
        run_id.to_string(),
        &scenario.name,
        engine_version,
        SamplingInfo {
            start_s: outcome.start_s,
            end_s: outcome.end_s,
            period_s: scenario.simulation.sample_period_s,
            ticks: outcome.ticks,
        },
        devices,
    );
    store.save_run(&manifest, &series)?;
    info!(
        run_id = %run_id,
        devices = series.len(),
        failed = manifest.failed_devices().count(),
        "run saved"
    );

    Ok(manifest)
}

/// Device reports come back in scenario order, so ids are matched by position.
fn collect_results(
    scenario: &Scenario,
    outcome: &ScenarioOutcome,
) -> (Vec<DeviceSummary>, Vec<DeviceSeries>) {
    let mut summaries = Vec::with_capacity(outcome.devices.len());
    let mut all_series = Vec::with_capacity(outcome.devices.len());

    for (def, report) in scenario.devices.iter().zip(&outcome.devices) {
        summaries.push(DeviceSummary {
            device_id: def.id.clone(),
            name: report.name.clone(),
            power_model: report.power_model.to_string(),
            thermal_model: report.thermal_model.to_string(),
            reliability_model: report.reliability_model.to_string(),
            ticks: report.ticks,
            average_power_w: report.averages.as_ref().and_then(|a| a.power()),
            average_temperature_c: report.averages.as_ref().and_then(|a| a.temperature()),
            final_temperature_c: report.final_temperature_c,
            final_reliability: report.final_reliability,
            damage: report.damage,
            failure: report.failure.as_ref().map(|e| e.to_string()),
        });

        let mut device_series = DeviceSeries::new(def.id.clone());
        for series in SeriesId::ALL {
            for sample in report.series.get(series) {
                device_series.push(series.as_str(), sample.time, sample.value);
            }
        }
        all_series.push(device_series);
    }

    (summaries, all_series)
}

/// Runs of the scenario at `scenario_path`, most recent first.
pub fn list_runs(scenario_path: &Path) -> AppResult<Vec<RunManifest>> {
    let scenario = project_service::load_scenario(scenario_path)?;
    let store = RunStore::for_scenario(scenario_path)?;

    let mut runs = store.list_runs(&scenario.name)?;
    runs.reverse();
    Ok(runs)
}

/// Manifest and the series of every device.
pub fn load_run(scenario_path: &Path, run_id: &str) -> AppResult<(RunManifest, Vec<DeviceSeries>)> {
    let store = RunStore::for_scenario(scenario_path)?;
    let manifest = store.load_manifest(run_id)?;
    let series = store.load_series(run_id)?;
    Ok((manifest, series))
}

/// Summary and series of one device, without reading the other devices' files.
pub fn load_device_series(
    scenario_path: &Path,
    run_id: &str,
    device_id: &str,
) -> AppResult<(DeviceSummary, DeviceSeries)> {
    let store = RunStore::for_scenario(scenario_path)?;
    let manifest = store.load_manifest(run_id)?;
    let summary = manifest
        .device(device_id)
        .cloned()
        .ok_or_else(|| AppError::DeviceNotFound(device_id.to_string()))?;
    let series = store.load_device_series(run_id, device_id)?;
    Ok((summary, series))
}
