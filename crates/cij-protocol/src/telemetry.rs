//! External metric injection.
//!
//! The engine never invents metric noise. A collaborator (a sensor bridge, a
//! simulator, a test) pushes a [`TelemetryUpdate`] between commands.

use crate::error::TelemetryError;
use crate::state::{FluidLevel, ProtocolState};

/// A partial update: `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TelemetryUpdate {
    pub modulation: Option<u32>,
    pub charge_percent: Option<u32>,
    pub pressure: Option<f64>,
    pub rps: Option<u32>,
    pub phase_quality: Option<u32>,
    pub viscosity: Option<f64>,
    pub printhead_temp: Option<f64>,
    pub electronics_temp: Option<f64>,
    pub ink: Option<FluidLevel>,
    pub makeup: Option<FluidLevel>,
    pub aux: [Option<bool>; 3],
    pub gutter: Option<bool>,
    pub modulator: Option<bool>,
    /// Hours to add to the power-on meter.
    pub power_on_hours: Option<f64>,
    /// Hours to add to the ink-stream meter.
    pub ink_stream_hours: Option<f64>,
}

impl TelemetryUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_modulation(mut self, val: u32) -> Self {
        self.modulation = Some(val);
        self
    }

    pub fn with_charge_percent(mut self, val: u32) -> Self {
        self.charge_percent = Some(val.min(100));
        self
    }

    pub fn with_pressure(mut self, val: f64) -> Self {
        self.pressure = Some(val);
        self
    }

    pub fn with_rps(mut self, val: u32) -> Self {
        self.rps = Some(val);
        self
    }

    pub fn with_phase_quality(mut self, val: u32) -> Self {
        self.phase_quality = Some(val.min(100));
        self
    }

    pub fn with_viscosity(mut self, val: f64) -> Self {
        self.viscosity = Some(val);
        self
    }

    pub fn with_temperatures(mut self, printhead: f64, electronics: f64) -> Self {
        self.printhead_temp = Some(printhead);
        self.electronics_temp = Some(electronics);
        self
    }

    pub fn with_ink(mut self, level: FluidLevel) -> Self {
        self.ink = Some(level);
        self
    }

    pub fn with_makeup(mut self, level: FluidLevel) -> Self {
        self.makeup = Some(level);
        self
    }

    /// Set auxiliary subsystem `slot` (`0..3`). Out-of-range slots are ignored.
    pub fn with_aux(mut self, slot: usize, on: bool) -> Self {
        if let Some(aux) = self.aux.get_mut(slot) {
            *aux = Some(on);
        }
        self
    }

    pub fn with_gutter(mut self, on: bool) -> Self {
        self.gutter = Some(on);
        self
    }

    pub fn with_modulator(mut self, on: bool) -> Self {
        self.modulator = Some(on);
        self
    }

    pub fn with_runtime(mut self, power_on_hours: f64, ink_stream_hours: f64) -> Self {
        self.power_on_hours = Some(power_on_hours);
        self.ink_stream_hours = Some(ink_stream_hours);
        self
    }

    /// Check every field before anything is written.
    fn validate(&self) -> Result<(), TelemetryError> {
        if self.ink == Some(FluidLevel::Good) {
            return Err(TelemetryError::InkLevelGood);
        }
        for delta in [self.power_on_hours, self.ink_stream_hours].into_iter().flatten() {
            if !delta.is_finite() || delta < 0.0 {
                return Err(TelemetryError::InvalidRuntimeDelta(delta));
            }
        }
        let floats = [
            ("pressure", self.pressure),
            ("viscosity", self.viscosity),
            ("printhead_temp", self.printhead_temp),
            ("electronics_temp", self.electronics_temp),
        ];
        for (name, value) in floats {
            if let Some(value) = value {
                if !value.is_finite() {
                    return Err(TelemetryError::NonFiniteMetric { name, value });
                }
            }
        }
        Ok(())
    }
}

impl ProtocolState {
    /// Apply an update atomically: either every field lands or none does.
    pub(crate) fn apply_telemetry(&mut self, update: &TelemetryUpdate) -> Result<(), TelemetryError> {
        update.validate()?;

        let m = &mut self.metrics;
        assign(&mut m.modulation, update.modulation);
        assign(&mut m.charge_percent, update.charge_percent);
        assign(&mut m.pressure, update.pressure);
        assign(&mut m.rps, update.rps);
        assign(&mut m.phase_quality, update.phase_quality);
        assign(&mut m.viscosity, update.viscosity);

        assign(&mut self.temperatures.printhead, update.printhead_temp);
        assign(&mut self.temperatures.electronics, update.electronics_temp);
        assign(&mut self.consumables.ink, update.ink);
        assign(&mut self.consumables.makeup, update.makeup);

        let s = &mut self.subsystems;
        assign(&mut s.aux_1, update.aux[0]);
        assign(&mut s.aux_2, update.aux[1]);
        assign(&mut s.aux_3, update.aux[2]);
        assign(&mut s.gutter, update.gutter);
        assign(&mut s.modulator, update.modulator);

        if let Some(hours) = update.power_on_hours {
            self.runtime.power_on += hours;
        }
        if let Some(hours) = update.ink_stream_hours {
            self.runtime.ink_stream += hours;
        }
        Ok(())
    }
}

fn assign<T>(slot: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *slot = v;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_update_leaves_other_fields() {
        let mut state = ProtocolState::new();
        let before = state.metrics.clone();
        state
            .apply_telemetry(&TelemetryUpdate::new().with_pressure(42.5))
            .unwrap();
        assert!((state.metrics.pressure - 42.5).abs() < f64::EPSILON);
        assert_eq!(state.metrics.modulation, before.modulation);
        assert!((state.metrics.viscosity - before.viscosity).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rejects_ink_good() {
        let mut state = ProtocolState::new();
        let update = TelemetryUpdate::new()
            .with_pressure(10.0)
            .with_ink(FluidLevel::Good);
        assert_eq!(state.apply_telemetry(&update), Err(TelemetryError::InkLevelGood));
        // Nothing from the rejected update landed.
        assert!((state.metrics.pressure - 40.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_makeup_accepts_good() {
        let mut state = ProtocolState::new();
        state
            .apply_telemetry(&TelemetryUpdate::new().with_makeup(FluidLevel::Good))
            .unwrap();
        assert_eq!(state.consumables.makeup, FluidLevel::Good);
    }

    #[test]
    fn test_runtime_only_increases() {
        let mut state = ProtocolState::new();
        state
            .apply_telemetry(&TelemetryUpdate::new().with_runtime(1.5, 0.5))
            .unwrap();
        state
            .apply_telemetry(&TelemetryUpdate::new().with_runtime(0.5, 0.25))
            .unwrap();
        assert!((state.runtime.power_on - 2.0).abs() < 1e-9);
        assert!((state.runtime.ink_stream - 0.75).abs() < 1e-9);

        let negative = TelemetryUpdate::new().with_runtime(-1.0, 0.0);
        assert!(matches!(
            state.apply_telemetry(&negative),
            Err(TelemetryError::InvalidRuntimeDelta(_))
        ));
        assert!((state.runtime.power_on - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_non_finite_metric() {
        let mut state = ProtocolState::new();
        let update = TelemetryUpdate::new().with_viscosity(f64::NAN);
        assert!(matches!(
            state.apply_telemetry(&update),
            Err(TelemetryError::NonFiniteMetric { name: "viscosity", .. })
        ));
    }

    #[test]
    fn test_aux_slots() {
        let mut state = ProtocolState::new();
        let update = TelemetryUpdate::new().with_aux(1, true).with_aux(7, true);
        state.apply_telemetry(&update).unwrap();
        assert!(!state.subsystems.aux_1);
        assert!(state.subsystems.aux_2);
        assert!(!state.subsystems.aux_3);
    }
}
