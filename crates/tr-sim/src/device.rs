//! Device: one power source, one thermal model, one reliability model, one recorder.

use tr_core::{DeviceId, Real, Temperature, Time};
use tr_models::{
    PowerProfile, PowerSource, ReliabilityLaw, ReliabilityModel, TemperatureModel, ThermalLaw,
};

use crate::error::{SimError, SimResult};
use crate::recorder::{Averages, SeriesExport, SeriesId, SeriesRecorder};

/// Construction parameters for a device.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceSpec {
    pub name: String,
    pub ambient: Temperature,
    pub power: PowerProfile,
    pub thermal: ThermalLaw,
    pub reliability: ReliabilityLaw,
}

/// Values observed during one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReading {
    pub time: Real,
    pub power_w: Real,
    pub temperature_c: Real,
    pub reliability: Real,
}

/// A simulated device and exclusive owner of its models and recorded series.
#[derive(Debug)]
pub struct Device {
    id: DeviceId,
    name: String,
    power: Box<dyn PowerSource>,
    thermal: Box<dyn TemperatureModel>,
    reliability: Box<dyn ReliabilityModel>,
    recorder: SeriesRecorder,
}

impl Device {
    pub fn new(
        id: DeviceId,
        name: impl Into<String>,
        power: Box<dyn PowerSource>,
        thermal: Box<dyn TemperatureModel>,
        reliability: Box<dyn ReliabilityModel>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            power,
            thermal,
            reliability,
            recorder: SeriesRecorder::new(),
        }
    }

    /// Build a device from its spec, with models starting at `start`.
    pub fn from_spec(id: DeviceId, spec: &DeviceSpec, start: Time) -> SimResult<Self> {
        let wrap = |e| SimError::model(id, e);
        Ok(Self::new(
            id,
            spec.name.clone(),
            spec.power.build().map_err(wrap)?,
            spec.thermal.build(spec.ambient, start).map_err(wrap)?,
            spec.reliability.build(start).map_err(wrap)?,
        ))
    }

    pub fn id(&self) -> DeviceId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn temperature(&self) -> Real {
        self.thermal.temperature()
    }

    pub fn reliability(&self) -> Real {
        self.reliability.reliability()
    }

    pub fn damage(&self) -> Real {
        self.reliability.damage()
    }

    /// Model names as `(power, thermal, reliability)`.
    pub fn model_names(&self) -> (&'static str, &'static str, &'static str) {
        (
            self.power.name(),
            self.thermal.name(),
            self.reliability.name(),
        )
    }

    pub fn recorder(&self) -> &SeriesRecorder {
        &self.recorder
    }

    pub fn export(&self) -> SeriesExport {
        self.recorder.export()
    }

    pub fn finalize(&self) -> SimResult<Averages> {
        self.recorder.finalize()
    }

    /// One tick at `time`: read power, advance temperature to `horizon` with that
    /// power held, fold into reliability, then record.
    ///
    /// Nothing is recorded unless every model step succeeds.
    pub fn sample(&mut self, time: Real, horizon: Real) -> SimResult<TickReading> {
        let power_w = self
            .power
            .power_at(time)
            .map_err(|e| SimError::model(self.id, e))?;
        self.thermal
            .update_temperature(horizon, power_w)
            .map_err(|e| SimError::model(self.id, e))?;
        self.reliability
            .update_reliability(self.thermal.as_ref())
            .map_err(|e| SimError::model(self.id, e))?;

        let reading = TickReading {
            time,
            power_w,
            temperature_c: self.thermal.temperature(),
            reliability: self.reliability.reliability(),
        };
        self.recorder.record_tick(
            time,
            &[
                (SeriesId::Power, reading.power_w),
                (SeriesId::Temperature, reading.temperature_c),
                (SeriesId::Reliability, reading.reliability),
            ],
        )?;
        Ok(reading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tr_core::{degc, s, w};
    use tr_models::{ModelError, TddbParams};

    fn spec() -> DeviceSpec {
        DeviceSpec {
            name: "rpi".to_string(),
            ambient: degc(25.0),
            power: PowerProfile::Constant { power: w(5.0) },
            thermal: ThermalLaw::Linear { k: 0.1 },
            reliability: ReliabilityLaw::Tddb(TddbParams::default()),
        }
    }

    #[test]
    fn sample_records_all_series() {
        let mut dev = Device::from_spec(DeviceId::from_index(0), &spec(), s(0.0)).unwrap();
        let r = dev.sample(0.0, 0.5).unwrap();
        assert_eq!(r.power_w, 5.0);
        assert!((r.temperature_c - 25.25).abs() < 1e-12);
        assert!(r.reliability < 1.0);
        for id in SeriesId::ALL {
            assert_eq!(dev.recorder().count(id), 1);
        }
        assert_eq!(dev.model_names(), ("constant", "linear", "tddb"));
    }

    #[test]
    fn failed_tick_records_nothing() {
        let mut dev = Device::from_spec(DeviceId::from_index(2), &spec(), s(0.0)).unwrap();
        dev.sample(0.0, 0.5).unwrap();
        let err = dev.sample(0.5, 0.5).unwrap_err();
        assert_eq!(
            err.model_error(),
            Some(&ModelError::InvalidTickOrder {
                previous: 0.5,
                requested: 0.5
            })
        );
        assert_eq!(dev.recorder().count(SeriesId::Power), 1);
    }

    #[test]
    fn overflowing_temperature_records_nothing() {
        let mut hot = spec();
        hot.power = PowerProfile::Constant { power: w(1e10) };
        hot.thermal = ThermalLaw::Linear { k: 1e300 };
        let mut dev = Device::from_spec(DeviceId::from_index(3), &hot, s(0.0)).unwrap();
        let err = dev.sample(0.0, 0.5).unwrap_err();
        assert!(matches!(err.model_error(), Some(ModelError::Core(_))));
        assert!(dev.recorder().is_empty());
        assert_eq!(dev.temperature(), 25.0);
        assert_eq!(dev.damage(), 0.0);
    }

    #[test]
    fn invalid_spec_is_tagged_with_device() {
        let mut bad = spec();
        bad.thermal = ThermalLaw::ThermalRc {
            r_k_per_w: -1.0,
            c_j_per_k: 1.0,
        };
        let err = Device::from_spec(DeviceId::from_index(4), &bad, s(0.0)).unwrap_err();
        assert!(matches!(err, SimError::Model { device, .. } if device.index() == 4));
    }
}
