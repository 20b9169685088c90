//! On-disk run cache.
//!
//! Layout under the store root:
//!
//! ```text
//! <run_id>/manifest.json
//! <run_id>/series/<device_id>.json
//! ```
//!
//! Each device's series live in their own file so exporting one device never
//! parses the others. The manifest is written last, so a run without one is an
//! interrupted save and is treated as absent.

use std::fs;
use std::path::{Path, PathBuf};

use crate::types::{DeviceSeries, RunManifest};
use crate::{ResultsError, ResultsResult};

const MANIFEST_FILE: &str = "manifest.json";
const SERIES_DIR: &str = "series";

#[derive(Debug, Clone)]
pub struct RunStore {
    root_dir: PathBuf,
}

/// File name for a device's series. Ids must be plain file stems.
fn series_file_name(device_id: &str) -> ResultsResult<String> {
    let plain = !device_id.is_empty()
        && !device_id.starts_with('.')
        && device_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if !plain {
        return Err(ResultsError::InvalidPath {
            message: format!("device id '{device_id}' cannot name a series file"),
        });
    }
    Ok(format!("{device_id}.json"))
}

impl RunStore {
    pub fn new(root_dir: PathBuf) -> ResultsResult<Self> {
        fs::create_dir_all(&root_dir)?;
        Ok(Self { root_dir })
    }

    /// Store under `.thermorel/runs` next to the scenario file.
    pub fn for_scenario(scenario_path: &Path) -> ResultsResult<Self> {
        let scenario_dir = scenario_path
            .parent()
            .ok_or_else(|| ResultsError::InvalidPath {
                message: "scenario path has no parent directory".to_string(),
            })?;
        Self::new(scenario_dir.join(".thermorel").join("runs"))
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn run_dir(&self, run_id: &str) -> PathBuf {
        self.root_dir.join(run_id)
    }

    pub fn has_run(&self, run_id: &str) -> bool {
        self.run_dir(run_id).join(MANIFEST_FILE).is_file()
    }

    /// Write every device's series, then the manifest.
    pub fn save_run(&self, manifest: &RunManifest, series: &[DeviceSeries]) -> ResultsResult<()> {
        let run_dir = self.run_dir(&manifest.run_id);
        let series_dir = run_dir.join(SERIES_DIR);
        fs::create_dir_all(&series_dir)?;

        for device in series {
            let path = series_dir.join(series_file_name(&device.device_id)?);
            fs::write(path, serde_json::to_string(device)?)?;
        }
        fs::write(
            run_dir.join(MANIFEST_FILE),
            serde_json::to_string_pretty(manifest)?,
        )?;
        Ok(())
    }

    pub fn load_manifest(&self, run_id: &str) -> ResultsResult<RunManifest> {
        if !self.has_run(run_id) {
            return Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            });
        }
        let content = fs::read_to_string(self.run_dir(run_id).join(MANIFEST_FILE))?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Series of one device, read from its own file.
    pub fn load_device_series(&self, run_id: &str, device_id: &str) -> ResultsResult<DeviceSeries> {
        if !self.has_run(run_id) {
            return Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            });
        }
        let path = self
            .run_dir(run_id)
            .join(SERIES_DIR)
            .join(series_file_name(device_id)?);
        if !path.is_file() {
            return Err(ResultsError::DeviceNotFound {
                run_id: run_id.to_string(),
                device_id: device_id.to_string(),
            });
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Series of every device, in manifest order.
    pub fn load_series(&self, run_id: &str) -> ResultsResult<Vec<DeviceSeries>> {
        self.load_manifest(run_id)?
            .devices
            .iter()
            .map(|d| self.load_device_series(run_id, &d.device_id))
            .collect()
    }

    /// Runs of one scenario, oldest first.
    pub fn list_runs(&self, scenario_name: &str) -> ResultsResult<Vec<RunManifest>> {
        let mut runs = Vec::new();
        for entry in fs::read_dir(&self.root_dir)? {
            let entry = entry?;
            let run_id = entry.file_name().to_string_lossy().into_owned();
            if entry.file_type()?.is_dir()
                && let Ok(manifest) = self.load_manifest(&run_id)
                && manifest.scenario_name == scenario_name
            {
                runs.push(manifest);
            }
        }
        runs.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then_with(|| a.run_id.cmp(&b.run_id))
        });
        Ok(runs)
    }

    pub fn delete_run(&self, run_id: &str) -> ResultsResult<()> {
        let run_dir = self.run_dir(run_id);
        if run_dir.exists() {
            fs::remove_dir_all(run_dir)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_file_names_are_plain_stems() {
        assert_eq!(series_file_name("rpi-4_b.0").unwrap(), "rpi-4_b.0.json");
        for bad in ["", "../etc", ".hidden", "a/b", "a\\b", "soc 1"] {
            assert!(
                matches!(series_file_name(bad), Err(ResultsError::InvalidPath { .. })),
                "{bad:?} accepted"
            );
        }
    }
}
