//! Query helpers for extracting data from loaded runs.

use tr_results::DeviceSeries;
use tr_sim::SeriesId;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub time_range: (f64, f64),
    pub sample_count: usize,
    pub device_count: usize,
}

pub fn get_run_summary(series: &[DeviceSeries]) -> AppResult<RunSummary> {
    let time_range = series
        .iter()
        .filter_map(DeviceSeries::time_range)
        .reduce(|(lo, hi), (a, b)| (lo.min(a), hi.max(b)))
        .ok_or_else(|| AppError::InvalidInput("No samples in run".to_string()))?;

    Ok(RunSummary {
        time_range,
        sample_count: series.iter().map(DeviceSeries::sample_count).sum(),
        device_count: series.len(),
    })
}

/// `(time, value)` pairs of one series. Accepts the aliases `SeriesId` parses.
pub fn extract_series(device: &DeviceSeries, series: &str) -> AppResult<Vec<(f64, f64)>> {
    let id: SeriesId = series
        .parse()
        .map_err(|_| AppError::InvalidInput(format!("Unknown series: {}", series)))?;
    Ok(device.points(id.as_str()).to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(id: &str, points: &[(&str, f64, f64)]) -> DeviceSeries {
        let mut d = DeviceSeries::new(id);
        for &(series, t, v) in points {
            d.push(series, t, v);
        }
        d
    }

    #[test]
    fn summary_covers_all_devices() {
        let run = vec![
            device("a", &[("power", 0.0, 5.0), ("power", 0.5, 5.0)]),
            device("b", &[("power", 0.25, 1.0)]),
        ];
        let summary = get_run_summary(&run).unwrap();
        assert_eq!(summary.time_range, (0.0, 0.5));
        assert_eq!(summary.sample_count, 3);
        assert_eq!(summary.device_count, 2);
    }

    #[test]
    fn extract_accepts_aliases() {
        let d = device("a", &[("temperature", 0.0, 25.5)]);
        assert_eq!(extract_series(&d, "t_c").unwrap(), vec![(0.0, 25.5)]);
        assert!(extract_series(&d, "power").unwrap().is_empty());
    }

    #[test]
    fn extract_rejects_unknown_series() {
        let d = device("a", &[("power", 0.0, 5.0)]);
        assert!(matches!(
            extract_series(&d, "voltage"),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn run_without_samples_has_no_summary() {
        assert!(get_run_summary(&[]).is_err());
        assert!(get_run_summary(&[DeviceSeries::new("idle")]).is_err());
    }
}
