//! Reliability estimators driven by temperature history.
//!
//! Degradation is tracked as cumulative damage `D = sum(dt / TTF(T))`, where `TTF` is a
//! temperature-dependent time-to-failure and `dt` is the interval covered by the latest
//! temperature update. Reliability follows a Weibull mapping `R = exp(-D^beta)`, so
//! damage never decreases and reliability never increases.

use core::fmt;

use tr_core::constants::{BOLTZMANN_EV_PER_K, celsius_to_kelvin};
use tr_core::{Real, Temperature, Time, as_kelvin, as_seconds, ensure_finite, ensure_positive};

use crate::error::{ModelError, ModelResult};
use crate::thermal::TemperatureModel;

/// A pluggable degradation law.
///
/// A reliability model is paired with exactly one temperature model for its lifetime;
/// the pairing is held by the owning device, which lends the temperature model
/// read-only on every update.
pub trait ReliabilityModel: fmt::Debug {
    /// Short model name for logs and reports.
    fn name(&self) -> &'static str;

    /// Fold the latest temperature update of `thermal` into the damage metric.
    ///
    /// Fails with [`ModelError::StaleTemperatureRead`] when `thermal` has not been
    /// updated since the previous call.
    fn update_reliability(&mut self, thermal: &dyn TemperatureModel) -> ModelResult<()>;

    /// Current reliability in `[0, 1]`.
    fn reliability(&self) -> Real;

    /// Cumulative damage (non-decreasing).
    fn damage(&self) -> Real;
}

/// Shared damage bookkeeping.
#[derive(Debug, Clone, PartialEq)]
pub struct DegradationState {
    pub damage: Real,
    pub last_time: Real,
    pub consumed_sequence: u64,
    /// Weibull shape parameter.
    pub beta: Real,
}

impl DegradationState {
    pub fn new(start: Real, beta: Real) -> Self {
        Self {
            damage: 0.0,
            last_time: start,
            consumed_sequence: 0,
            beta,
        }
    }

    /// Fold one fresh temperature update into the damage using `ttf`.
    fn fold(
        &mut self,
        thermal: &dyn TemperatureModel,
        ttf: impl Fn(Real) -> Real,
    ) -> ModelResult<()> {
        let stamp = thermal.stamp();
        if stamp.sequence == 0 || stamp.sequence <= self.consumed_sequence {
            return Err(ModelError::StaleTemperatureRead {
                consumed: self.consumed_sequence,
                latest: stamp.sequence,
            });
        }
        let dt = stamp.time - self.last_time;
        if dt <= 0.0 {
            return Err(ModelError::InvalidTickOrder {
                previous: self.last_time,
                requested: stamp.time,
            });
        }
        let kelvin = celsius_to_kelvin(thermal.temperature());
        if !(kelvin > 0.0) {
            return Err(ModelError::InvalidArg {
                what: "temperature below absolute zero",
            });
        }
        let increment = dt / ttf(kelvin);
        if !increment.is_finite() || increment < 0.0 {
            return Err(ModelError::NonMonotonicDegradation { increment });
        }
        self.damage += increment;
        self.last_time = stamp.time;
        self.consumed_sequence = stamp.sequence;
        Ok(())
    }

    pub fn reliability(&self) -> Real {
        (-self.damage.powf(self.beta)).exp()
    }
}

/// E-model TDDB parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TddbParams {
    /// Process prefactor, seconds.
    pub a0_s: Real,
    /// Field acceleration, cm/MV.
    pub gamma_cm_per_mv: Real,
    /// Oxide field, MV/cm.
    pub e_ox_mv_per_cm: Real,
    /// Activation energy, eV.
    pub ea_ev: Real,
    pub beta: Real,
}

impl Default for TddbParams {
    fn default() -> Self {
        Self {
            a0_s: 0.1,
            gamma_cm_per_mv: 1.1,
            e_ox_mv_per_cm: 5.0,
            ea_ev: 0.7,
            beta: 1.5,
        }
    }
}

/// Time-dependent dielectric breakdown (thermochemical E-model):
/// `TTF = A0 * exp(-gamma * E_ox) * exp(Ea / (kB * T))`.
#[derive(Debug, Clone, PartialEq)]
pub struct TddbModel {
    params: TddbParams,
    state: DegradationState,
}

impl TddbModel {
    pub fn new(params: TddbParams, start: Time) -> ModelResult<Self> {
        ensure_positive(params.a0_s, "tddb a0")?;
        ensure_finite(params.gamma_cm_per_mv, "tddb gamma")?;
        ensure_finite(params.e_ox_mv_per_cm, "tddb oxide field")?;
        ensure_positive(params.ea_ev, "tddb activation energy")?;
        ensure_positive(params.beta, "weibull shape")?;
        let start = ensure_finite(as_seconds(start), "start time")?;
        Ok(Self {
            params,
            state: DegradationState::new(start, params.beta),
        })
    }

    /// Time to failure in seconds at absolute temperature `kelvin`.
    pub fn time_to_failure(&self, kelvin: Real) -> Real {
        tddb_ttf(&self.params, kelvin)
    }
}

fn tddb_ttf(p: &TddbParams, kelvin: Real) -> Real {
    p.a0_s
        * (-p.gamma_cm_per_mv * p.e_ox_mv_per_cm).exp()
        * (p.ea_ev / (BOLTZMANN_EV_PER_K * kelvin)).exp()
}

impl ReliabilityModel for TddbModel {
    fn name(&self) -> &'static str {
        "tddb"
    }

    fn update_reliability(&mut self, thermal: &dyn TemperatureModel) -> ModelResult<()> {
        let params = self.params;
        self.state.fold(thermal, |kelvin| tddb_ttf(&params, kelvin))
    }

    fn reliability(&self) -> Real {
        self.state.reliability()
    }

    fn damage(&self) -> Real {
        self.state.damage
    }
}

/// Arrhenius acceleration relative to a reference point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrheniusParams {
    /// Time to failure at the reference temperature, seconds.
    pub ttf_ref_s: Real,
    pub t_ref: Temperature,
    /// Activation energy, eV.
    pub ea_ev: Real,
    pub beta: Real,
}

/// `TTF(T) = TTF_ref * exp(Ea / kB * (1/T - 1/T_ref))`.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrheniusModel {
    ttf_ref_s: Real,
    t_ref_k: Real,
    ea_ev: Real,
    state: DegradationState,
}

impl ArrheniusModel {
    pub fn new(params: ArrheniusParams, start: Time) -> ModelResult<Self> {
        let start = ensure_finite(as_seconds(start), "start time")?;
        Ok(Self {
            ttf_ref_s: ensure_positive(params.ttf_ref_s, "reference time to failure")?,
            t_ref_k: ensure_positive(as_kelvin(params.t_ref), "reference temperature")?,
            ea_ev: ensure_positive(params.ea_ev, "activation energy")?,
            state: DegradationState::new(start, ensure_positive(params.beta, "weibull shape")?),
        })
    }

    pub fn time_to_failure(&self, kelvin: Real) -> Real {
        arrhenius_ttf(self.ttf_ref_s, self.t_ref_k, self.ea_ev, kelvin)
    }
}

fn arrhenius_ttf(ttf_ref_s: Real, t_ref_k: Real, ea_ev: Real, kelvin: Real) -> Real {
    ttf_ref_s * (ea_ev / BOLTZMANN_EV_PER_K * (1.0 / kelvin - 1.0 / t_ref_k)).exp()
}

impl ReliabilityModel for ArrheniusModel {
    fn name(&self) -> &'static str {
        "arrhenius"
    }

    fn update_reliability(&mut self, thermal: &dyn TemperatureModel) -> ModelResult<()> {
        let (ttf_ref_s, t_ref_k, ea_ev) = (self.ttf_ref_s, self.t_ref_k, self.ea_ev);
        self.state
            .fold(thermal, |kelvin| arrhenius_ttf(ttf_ref_s, t_ref_k, ea_ev, kelvin))
    }

    fn reliability(&self) -> Real {
        self.state.reliability()
    }

    fn damage(&self) -> Real {
        self.state.damage
    }
}

/// Tagged reliability law selection, built once per device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReliabilityLaw {
    Tddb(TddbParams),
    Arrhenius(ArrheniusParams),
}

impl ReliabilityLaw {
    pub fn build(&self, start: Time) -> ModelResult<Box<dyn ReliabilityModel>> {
        Ok(match *self {
            ReliabilityLaw::Tddb(params) => Box::new(TddbModel::new(params, start)?),
            ReliabilityLaw::Arrhenius(params) => Box::new(ArrheniusModel::new(params, start)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thermal::{LinearThermalModel, ThermalRcModel};
    use tr_core::{degc, s};

    fn thermal() -> LinearThermalModel {
        LinearThermalModel::new(degc(25.0), s(0.0), 0.1).unwrap()
    }

    fn arrhenius() -> ArrheniusModel {
        ArrheniusModel::new(
            ArrheniusParams {
                ttf_ref_s: 1_000.0,
                t_ref: degc(25.0),
                ea_ev: 0.7,
                beta: 1.0,
            },
            s(0.0),
        )
        .unwrap()
    }

    #[test]
    fn fresh_model_is_fully_reliable() {
        let model = TddbModel::new(TddbParams::default(), s(0.0)).unwrap();
        assert_eq!(model.reliability(), 1.0);
        assert_eq!(model.damage(), 0.0);
    }

    #[test]
    fn update_before_temperature_is_stale() {
        let mut model = TddbModel::new(TddbParams::default(), s(0.0)).unwrap();
        let err = model.update_reliability(&thermal()).unwrap_err();
        assert_eq!(
            err,
            ModelError::StaleTemperatureRead {
                consumed: 0,
                latest: 0
            }
        );
    }

    #[test]
    fn second_update_without_new_temperature_is_stale() {
        let mut th = thermal();
        let mut model = arrhenius();
        th.update_temperature(0.5, 5.0).unwrap();
        model.update_reliability(&th).unwrap();
        let damage = model.damage();

        assert!(matches!(
            model.update_reliability(&th),
            Err(ModelError::StaleTemperatureRead {
                consumed: 1,
                latest: 1
            })
        ));
        assert_eq!(model.damage(), damage);
    }

    #[test]
    fn arrhenius_at_reference_temperature_accumulates_dt_over_ttf() {
        let mut th = LinearThermalModel::new(degc(25.0), s(0.0), 0.0).unwrap();
        let mut model = arrhenius();
        th.update_temperature(10.0, 5.0).unwrap();
        model.update_reliability(&th).unwrap();
        assert!((model.damage() - 0.01).abs() < 1e-12);
        assert!((model.reliability() - (-0.01f64).exp()).abs() < 1e-12);
    }

    #[test]
    fn hotter_device_degrades_faster() {
        let mut cool = LinearThermalModel::new(degc(25.0), s(0.0), 0.0).unwrap();
        let mut hot = ThermalRcModel::new(degc(25.0), s(0.0), 10.0, 0.1).unwrap();
        let mut cool_rel = arrhenius();
        let mut hot_rel = arrhenius();
        for i in 1..=10 {
            let t = i as f64;
            cool.update_temperature(t, 5.0).unwrap();
            hot.update_temperature(t, 5.0).unwrap();
            cool_rel.update_reliability(&cool).unwrap();
            hot_rel.update_reliability(&hot).unwrap();
        }
        assert!(hot_rel.damage() > cool_rel.damage());
        assert!(hot_rel.reliability() < cool_rel.reliability());
    }

    #[test]
    fn tddb_ttf_drops_with_temperature_and_field() {
        let model = TddbModel::new(TddbParams::default(), s(0.0)).unwrap();
        assert!(model.time_to_failure(350.0) < model.time_to_failure(300.0));

        let stressed = TddbModel::new(
            TddbParams {
                e_ox_mv_per_cm: 8.0,
                ..TddbParams::default()
            },
            s(0.0),
        )
        .unwrap();
        assert!(stressed.time_to_failure(300.0) < model.time_to_failure(300.0));
    }

    #[test]
    fn tddb_rejects_bad_parameters() {
        let bad = TddbParams {
            beta: 0.0,
            ..TddbParams::default()
        };
        assert!(TddbModel::new(bad, s(0.0)).is_err());
    }

    #[test]
    fn law_builds_selected_variant() {
        let model = ReliabilityLaw::Tddb(TddbParams::default())
            .build(s(0.0))
            .unwrap();
        assert_eq!(model.name(), "tddb");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::thermal::ThermalRcModel;
    use proptest::prelude::*;
    use tr_core::{degc, s};

    proptest! {
        #[test]
        fn damage_never_decreases(
            inputs in prop::collection::vec((0.01_f64..5.0, 0.0_f64..20.0), 1..40)
        ) {
            let mut th = ThermalRcModel::new(degc(25.0), s(0.0), 3.0, 2.0).unwrap();
            let mut model = TddbModel::new(TddbParams::default(), s(0.0)).unwrap();
            let mut t = 0.0;
            let mut last_damage = model.damage();
            let mut last_rel = model.reliability();
            for (dt, p) in inputs {
                t += dt;
                th.update_temperature(t, p).unwrap();
                model.update_reliability(&th).unwrap();
                prop_assert!(model.damage() >= last_damage);
                prop_assert!(model.reliability() <= last_rel);
                last_damage = model.damage();
                last_rel = model.reliability();
            }
        }
    }
}
