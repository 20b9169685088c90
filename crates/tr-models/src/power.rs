//! Instantaneous power draw sources.
//!
//! Sources are treated as black boxes by the sampling loop: it asks for the draw at
//! the tick time and validates the reading before it reaches the thermal model.

use core::fmt;

use tr_core::{Power, Real, as_watts, ensure_non_negative};

use crate::error::{ModelError, ModelResult};

/// A source of instantaneous power draw for one device.
pub trait PowerSource: fmt::Debug {
    /// Short model name for logs and reports.
    fn name(&self) -> &'static str;

    /// Raw draw in watts at simulated time `time`.
    fn draw_at(&mut self, time: Real) -> Real;

    /// Validated draw in watts at `time`.
    ///
    /// Rejects negative and non-finite readings with [`ModelError::InvalidPower`].
    fn power_at(&mut self, time: Real) -> ModelResult<Real> {
        let value = self.draw_at(time);
        if value.is_finite() && value >= 0.0 {
            Ok(value)
        } else {
            Err(ModelError::InvalidPower { time, value })
        }
    }
}

/// Fixed draw.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantPower {
    watts: Real,
}

impl ConstantPower {
    pub fn new(power: Power) -> ModelResult<Self> {
        let watts = ensure_non_negative(as_watts(power), "constant power")?;
        Ok(Self { watts })
    }
}

impl PowerSource for ConstantPower {
    fn name(&self) -> &'static str {
        "constant"
    }

    fn draw_at(&mut self, _time: Real) -> Real {
        self.watts
    }
}

/// Validate a `(time, value)` step schedule: non-empty, finite, strictly increasing times.
fn check_schedule(steps: &[(Real, Real)], what: &'static str) -> ModelResult<()> {
    if steps.is_empty() {
        return Err(ModelError::InvalidArg { what });
    }
    for pair in steps.windows(2) {
        if !(pair[1].0 > pair[0].0) {
            return Err(ModelError::InvalidArg {
                what: "schedule times must be strictly increasing",
            });
        }
    }
    for &(t, v) in steps {
        tr_core::ensure_finite(t, "schedule time")?;
        tr_core::ensure_finite(v, "schedule value")?;
    }
    Ok(())
}

/// Value of the latest step at or before `time`; the first value before the schedule starts.
fn step_value(steps: &[(Real, Real)], time: Real) -> Real {
    let idx = steps.partition_point(|&(t, _)| t <= time);
    steps[idx.saturating_sub(1)].1
}

/// Step schedule of absolute draws.
#[derive(Debug, Clone, PartialEq)]
pub struct PiecewisePower {
    steps: Vec<(Real, Real)>,
}

impl PiecewisePower {
    /// `steps` are `(time_s, watts)` pairs, strictly increasing in time.
    pub fn new(steps: Vec<(Real, Real)>) -> ModelResult<Self> {
        check_schedule(&steps, "piecewise power needs at least one step")?;
        for &(_, watts) in &steps {
            ensure_non_negative(watts, "piecewise power")?;
        }
        Ok(Self { steps })
    }
}

impl PowerSource for PiecewisePower {
    fn name(&self) -> &'static str {
        "piecewise"
    }

    fn draw_at(&mut self, time: Real) -> Real {
        step_value(&self.steps, time)
    }
}

/// Linear CPU power model driven by a utilization schedule:
/// `P = idle + (busy - idle) * u`, with `u` in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct UtilizationPower {
    idle_watts: Real,
    busy_watts: Real,
    schedule: Vec<(Real, Real)>,
}

impl UtilizationPower {
    pub fn new(idle: Power, busy: Power, schedule: Vec<(Real, Real)>) -> ModelResult<Self> {
        let idle_watts = ensure_non_negative(as_watts(idle), "idle power")?;
        let busy_watts = ensure_non_negative(as_watts(busy), "busy power")?;
        if busy_watts < idle_watts {
            return Err(ModelError::InvalidArg {
                what: "busy power must not be below idle power",
            });
        }
        check_schedule(&schedule, "utilization schedule needs at least one step")?;
        if schedule.iter().any(|&(_, u)| !(0.0..=1.0).contains(&u)) {
            return Err(ModelError::InvalidArg {
                what: "utilization must be within [0, 1]",
            });
        }
        Ok(Self {
            idle_watts,
            busy_watts,
            schedule,
        })
    }

    pub fn utilization_at(&self, time: Real) -> Real {
        step_value(&self.schedule, time)
    }
}

impl PowerSource for UtilizationPower {
    fn name(&self) -> &'static str {
        "utilization"
    }

    fn draw_at(&mut self, time: Real) -> Real {
        let u = self.utilization_at(time);
        self.idle_watts + (self.busy_watts - self.idle_watts) * u
    }
}

/// Tagged power source selection, built once per device.
#[derive(Debug, Clone, PartialEq)]
pub enum PowerProfile {
    Constant {
        power: Power,
    },
    Piecewise {
        steps: Vec<(Real, Real)>,
    },
    Utilization {
        idle: Power,
        busy: Power,
        schedule: Vec<(Real, Real)>,
    },
}

impl PowerProfile {
    pub fn build(&self) -> ModelResult<Box<dyn PowerSource>> {
        Ok(match self {
            PowerProfile::Constant { power } => Box::new(ConstantPower::new(*power)?),
            PowerProfile::Piecewise { steps } => Box::new(PiecewisePower::new(steps.clone())?),
            PowerProfile::Utilization {
                idle,
                busy,
                schedule,
            } => Box::new(UtilizationPower::new(*idle, *busy, schedule.clone())?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tr_core::w;

    #[test]
    fn constant_power_is_constant() {
        let mut src = ConstantPower::new(w(5.0)).unwrap();
        assert_eq!(src.power_at(0.0).unwrap(), 5.0);
        assert_eq!(src.power_at(999.5).unwrap(), 5.0);
    }

    #[test]
    fn constant_power_rejects_negative() {
        assert!(ConstantPower::new(w(-1.0)).is_err());
    }

    #[test]
    fn piecewise_holds_latest_step() {
        let mut src = PiecewisePower::new(vec![(1.0, 2.0), (3.0, 6.0)]).unwrap();
        // Before the first step the first value applies.
        assert_eq!(src.power_at(0.0).unwrap(), 2.0);
        assert_eq!(src.power_at(1.0).unwrap(), 2.0);
        assert_eq!(src.power_at(2.9).unwrap(), 2.0);
        assert_eq!(src.power_at(3.0).unwrap(), 6.0);
        assert_eq!(src.power_at(100.0).unwrap(), 6.0);
    }

    #[test]
    fn piecewise_rejects_unsorted_schedule() {
        let err = PiecewisePower::new(vec![(1.0, 2.0), (1.0, 3.0)]).unwrap_err();
        assert!(matches!(err, ModelError::InvalidArg { .. }));
        assert!(PiecewisePower::new(vec![]).is_err());
    }

    #[test]
    fn utilization_interpolates_between_idle_and_busy() {
        let mut src =
            UtilizationPower::new(w(2.0), w(6.0), vec![(0.0, 0.0), (10.0, 0.5), (20.0, 1.0)])
                .unwrap();
        assert_eq!(src.power_at(5.0).unwrap(), 2.0);
        assert_eq!(src.power_at(10.0).unwrap(), 4.0);
        assert_eq!(src.power_at(25.0).unwrap(), 6.0);
    }

    #[test]
    fn utilization_rejects_out_of_range() {
        assert!(UtilizationPower::new(w(2.0), w(6.0), vec![(0.0, 1.5)]).is_err());
        assert!(UtilizationPower::new(w(6.0), w(2.0), vec![(0.0, 0.5)]).is_err());
    }

    #[derive(Debug)]
    struct Broken;

    impl PowerSource for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn draw_at(&mut self, _time: Real) -> Real {
            -3.0
        }
    }

    #[test]
    fn invalid_reading_is_reported() {
        let err = Broken.power_at(1.5).unwrap_err();
        assert_eq!(
            err,
            ModelError::InvalidPower {
                time: 1.5,
                value: -3.0
            }
        );
    }

    #[test]
    fn profile_builds_boxed_source() {
        let profile = PowerProfile::Constant { power: w(1.25) };
        let mut src = profile.build().unwrap();
        assert_eq!(src.name(), "constant");
        assert_eq!(src.power_at(0.0).unwrap(), 1.25);
    }
}
