use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tr_app::{
    AppError, AppResult, RunOptions, RunProgressEvent, RunRequest, RunStage, project_service,
    query, run_service,
};
use tr_results::{DeviceSummary, PlotSpec};
use tr_sim::SeriesId;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "thermorel")]
#[command(about = "thermorel - device power, temperature and reliability co-simulation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate scenario file syntax and parameters
    Validate {
        /// Path to the scenario YAML (or JSON) file
        scenario_path: PathBuf,
    },
    /// List devices in a scenario
    Devices {
        /// Path to the scenario file
        scenario_path: PathBuf,
    },
    /// Run a scenario and print per-device averages
    Run {
        /// Path to the scenario file
        scenario_path: PathBuf,
        /// Skip cache and force re-run
        #[arg(long)]
        no_cache: bool,
    },
    /// List cached runs for a scenario
    Runs {
        /// Path to the scenario file
        scenario_path: PathBuf,
    },
    /// Show details of a cached run
    ShowRun {
        /// Path to the scenario file
        scenario_path: PathBuf,
        /// Run ID to display
        run_id: String,
    },
    /// Export one device series from a run as CSV
    ExportSeries {
        /// Path to the scenario file
        scenario_path: PathBuf,
        /// Run ID
        run_id: String,
        /// Device ID
        device_id: String,
        /// Series name (power, temperature, reliability)
        series: String,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write a gnuplot script for one device series
    Plot {
        /// Path to the scenario file
        scenario_path: PathBuf,
        /// Run ID
        run_id: String,
        /// Device ID
        device_id: String,
        /// Series name (power, temperature, reliability)
        series: String,
        /// Output directory for `<series>_plot.plt`
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { scenario_path } => cmd_validate(&scenario_path),
        Commands::Devices { scenario_path } => cmd_devices(&scenario_path),
        Commands::Run {
            scenario_path,
            no_cache,
        } => cmd_run(&scenario_path, !no_cache),
        Commands::Runs { scenario_path } => cmd_runs(&scenario_path),
        Commands::ShowRun {
            scenario_path,
            run_id,
        } => cmd_show_run(&scenario_path, &run_id),
        Commands::ExportSeries {
            scenario_path,
            run_id,
            device_id,
            series,
            output,
        } => cmd_export_series(
            &scenario_path,
            &run_id,
            &device_id,
            &series,
            output.as_deref(),
        ),
        Commands::Plot {
            scenario_path,
            run_id,
            device_id,
            series,
            dir,
        } => cmd_plot(&scenario_path, &run_id, &device_id, &series, &dir),
    }
}

fn cmd_validate(scenario_path: &Path) -> AppResult<()> {
    println!("Validating scenario: {}", scenario_path.display());
    let scenario = project_service::load_scenario(scenario_path)?;
    project_service::validate_scenario(&scenario)?;
    println!("✓ Scenario is valid");
    Ok(())
}

fn cmd_devices(scenario_path: &Path) -> AppResult<()> {
    let scenario = project_service::load_scenario(scenario_path)?;
    let devices = project_service::list_devices(&scenario);

    println!("Devices in scenario '{}':", scenario.name);
    for dev in devices {
        println!(
            "  {} - {} (ambient {:.1} °C, power={}, thermal={}, reliability={})",
            dev.id, dev.name, dev.ambient_c, dev.power, dev.thermal, dev.reliability
        );
    }
    Ok(())
}

fn cmd_run(scenario_path: &Path, use_cache: bool) -> AppResult<()> {
    println!("Running scenario: {}", scenario_path.display());

    let request = RunRequest {
        scenario_path,
        options: RunOptions {
            use_cache,
            ..RunOptions::default()
        },
    };

    let mut last_emit = Instant::now();
    let mut last_stage = None;
    let response = run_service::ensure_run_with_progress(
        &request,
        Some(&mut |event| {
            let emit_now =
                last_stage != Some(event.stage) || last_emit.elapsed().as_millis() >= 100;
            if emit_now {
                render_cli_progress(&event);
                last_stage = Some(event.stage);
                last_emit = Instant::now();
            }
        }),
    )?;
    clear_progress_line();

    if response.loaded_from_cache {
        println!("✓ Loaded from cache: {}", response.run_id);
    } else {
        println!("✓ Simulation completed: {}", response.run_id);
    }

    let sampling = &response.manifest.sampling;
    println!(
        "  Window: {:.3} - {:.3} s, period {:.3} s, {} ticks, {:.2}s wall",
        sampling.start_s, sampling.end_s, sampling.period_s, sampling.ticks, response.elapsed_wall_s
    );
    for device in &response.manifest.devices {
        print_device_summary(device);
    }

    let failed = response.manifest.failed_devices().count();
    if failed > 0 {
        println!("\n{} device(s) stopped early; see above", failed);
    }
    Ok(())
}

fn print_device_summary(device: &DeviceSummary) {
    println!("\n{} ({})", device.name, device.device_id);
    println!(
        "  models: power={} thermal={} reliability={}",
        device.power_model, device.thermal_model, device.reliability_model
    );
    match (device.average_power_w, device.average_temperature_c) {
        (Some(p), Some(t)) => {
            println!("  Average power = {}", p);
            println!("  Average temperature = {}", t);
        }
        _ => println!("  No samples recorded"),
    }
    println!("  Final temperature = {:.4} °C", device.final_temperature_c);
    println!(
        "  Final reliability = {:.6} (damage {:.3e})",
        device.final_reliability, device.damage
    );
    if let Some(failure) = &device.failure {
        println!("  ✗ stopped after {} ticks: {}", device.ticks, failure);
    }
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(120));
    let _ = io::stdout().flush();
}

fn render_cli_progress(event: &RunProgressEvent) {
    match (event.stage, &event.sampling) {
        (RunStage::Sampling, Some(p)) => {
            let width = 28usize;
            let filled = ((p.fraction_complete * width as f64).round() as usize).min(width);
            let bar = format!(
                "{}{}",
                "#".repeat(filled),
                "-".repeat(width.saturating_sub(filled))
            );
            print!(
                "\r[{}] {:>6.2}%  t={:.3}/{:.3}s  ticks={}  elapsed={:.1}s",
                bar,
                p.fraction_complete * 100.0,
                p.sim_time_s,
                p.t_end_s,
                p.ticks,
                event.elapsed_wall_s
            );
        }
        _ => {
            let spinner = ['|', '/', '-', '\\'];
            let spin_idx = ((event.elapsed_wall_s * 10.0) as usize) % spinner.len();
            let mut line = format!(
                "\r{} {}  elapsed={:.2}s",
                spinner[spin_idx],
                event.stage.label(),
                event.elapsed_wall_s
            );
            if let Some(msg) = &event.message {
                line.push_str(&format!("  {}", msg));
            }
            print!("{}", line);
        }
    }
    let _ = io::stdout().flush();
}

fn cmd_runs(scenario_path: &Path) -> AppResult<()> {
    let runs = run_service::list_runs(scenario_path)?;

    if runs.is_empty() {
        println!("No cached runs found for: {}", scenario_path.display());
    } else {
        println!("Cached runs:");
        for manifest in runs {
            println!(
                "  {} ({}, engine {})",
                manifest.run_id, manifest.timestamp, manifest.engine_version
            );
        }
    }
    Ok(())
}

fn cmd_show_run(scenario_path: &Path, run_id: &str) -> AppResult<()> {
    println!("Loading run: {}", run_id);

    let (manifest, series) = run_service::load_run(scenario_path, run_id)?;
    let summary = query::get_run_summary(&series)?;

    println!("\nRun Summary:");
    println!("  Scenario: {}", manifest.scenario_name);
    println!("  Timestamp: {}", manifest.timestamp);
    println!("  Samples: {}", summary.sample_count);
    println!(
        "  Time range: {:.3} - {:.3} s",
        summary.time_range.0, summary.time_range.1
    );
    println!("  Devices: {}", summary.device_count);

    for device in &manifest.devices {
        print_device_summary(device);
    }
    Ok(())
}

fn load_series(
    scenario_path: &Path,
    run_id: &str,
    device_id: &str,
    series: &str,
) -> AppResult<(SeriesId, String, Vec<(f64, f64)>)> {
    let id: SeriesId = series
        .parse()
        .map_err(|_| AppError::InvalidInput(format!("Unknown series: {}", series)))?;
    let (summary, device) = run_service::load_device_series(scenario_path, run_id, device_id)?;
    let points = query::extract_series(&device, series)?;
    let name = summary.name;
    tracing::debug!(run_id, device_id, series = %id, points = points.len(), "series loaded");
    Ok((id, name, points))
}

fn cmd_export_series(
    scenario_path: &Path,
    run_id: &str,
    device_id: &str,
    series: &str,
    output: Option<&Path>,
) -> AppResult<()> {
    let (_, _, points) = load_series(scenario_path, run_id, device_id, series)?;

    let mut csv = Vec::new();
    tr_results::write_csv(&mut csv, &points)?;

    if let Some(path) = output {
        std::fs::write(path, csv)?;
        println!(
            "✓ Exported {} data points to {}",
            points.len(),
            path.display()
        );
    } else {
        io::stdout().write_all(&csv)?;
    }

    Ok(())
}

fn cmd_plot(
    scenario_path: &Path,
    run_id: &str,
    device_id: &str,
    series: &str,
    dir: &Path,
) -> AppResult<()> {
    let (id, name, points) = load_series(scenario_path, run_id, device_id, series)?;

    std::fs::create_dir_all(dir)?;
    let spec = PlotSpec::for_series(id.as_str(), id.unit_label(), &name);
    let path = dir.join(format!("{}_plot.plt", id.as_str()));
    let mut file = std::fs::File::create(&path)?;
    tr_results::write_gnuplot(&mut file, &spec, &points)?;

    println!("✓ Wrote {} ({} points)", path.display(), points.len());
    println!("  Render with: gnuplot {}", path.display());
    Ok(())
}
