//! CSV and gnuplot export of a single series.

use std::io::Write;

use crate::{ResultsError, ResultsResult};

/// Labels for a gnuplot script.
#[derive(Debug, Clone)]
pub struct PlotSpec {
    pub title: String,
    pub dataset_title: String,
    pub x_label: String,
    pub y_label: String,
    /// Image written when the script is run.
    pub output_png: String,
}

impl PlotSpec {
    /// Defaults matching `<series>_plot.png` with a `time(s)` x axis.
    pub fn for_series(series: &str, y_label: &str, device_name: &str) -> Self {
        Self {
            title: format!("{device_name} {series} vs time"),
            dataset_title: series.to_string(),
            x_label: "time(s)".to_string(),
            y_label: y_label.to_string(),
            output_png: format!("{series}_plot.png"),
        }
    }
}

/// One series as `time_s,value` rows.
pub fn write_csv<W: Write>(out: &mut W, points: &[(f64, f64)]) -> ResultsResult<()> {
    writeln!(out, "time_s,value")?;
    for (t, v) in points {
        writeln!(out, "{t},{v}")?;
    }
    Ok(())
}

/// Self-contained script with the data inlined after `plot "-"`.
pub fn write_gnuplot<W: Write>(out: &mut W, spec: &PlotSpec, points: &[(f64, f64)]) -> ResultsResult<()> {
    if points.is_empty() {
        return Err(ResultsError::EmptySeries {
            what: spec.dataset_title.clone(),
        });
    }

    writeln!(out, "set terminal png")?;
    writeln!(out, "set output \"{}\"", spec.output_png)?;
    writeln!(out, "set title \"{}\"", spec.title)?;
    writeln!(out, "set xlabel \"{}\"", spec.x_label)?;
    writeln!(out, "set ylabel \"{}\"", spec.y_label)?;
    writeln!(
        out,
        "plot \"-\"  title \"{}\" with linespoints",
        spec.dataset_title
    )?;
    for (t, v) in points {
        writeln!(out, "{t} {v}")?;
    }
    writeln!(out, "e")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_has_header_and_rows() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &[(0.0, 5.0), (0.5, 5.0)]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "time_s,value\n0,5\n0.5,5\n");
    }

    #[test]
    fn gnuplot_script_inlines_data() {
        let spec = PlotSpec::for_series("power", "Power(W)", "RaspberryPi");
        let mut buf = Vec::new();
        write_gnuplot(&mut buf, &spec, &[(0.0, 5.0), (0.5, 5.0)]).unwrap();
        let text = String::from_utf8(buf).unwrap();

        assert!(text.starts_with("set terminal png\n"));
        assert!(text.contains("set output \"power_plot.png\""));
        assert!(text.contains("set xlabel \"time(s)\""));
        assert!(text.contains("set ylabel \"Power(W)\""));
        assert!(text.contains("with linespoints"));
        assert!(text.contains("0 5\n0.5 5\ne\n"));
    }

    #[test]
    fn gnuplot_rejects_empty_series() {
        let spec = PlotSpec::for_series("power", "Power(W)", "x");
        let mut buf = Vec::new();
        assert!(write_gnuplot(&mut buf, &spec, &[]).is_err());
    }
}
