//! Simulated live-metric drift.
//!
//! A real printer's pressure, viscosity and phase wander while the jet runs.
//! [`Drift`] produces a [`TelemetryUpdate`] per tick: a bounded random walk
//! around the current readings plus runtime-hour accrual.

use std::ops::RangeInclusive;
use std::time::Duration;

use cij_protocol::{ProtocolState, TelemetryUpdate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const PRESSURE_BOUNDS: RangeInclusive<f64> = 35.0..=45.0;
pub const VISCOSITY_BOUNDS: RangeInclusive<f64> = 3.0..=4.0;
pub const MODULATION_BOUNDS: RangeInclusive<u32> = 100..=140;
pub const CHARGE_BOUNDS: RangeInclusive<u32> = 40..=60;
pub const RPS_BOUNDS: RangeInclusive<u32> = 55..=65;
pub const PHASE_BOUNDS: RangeInclusive<u32> = 85..=100;
pub const PRINTHEAD_TEMP_BOUNDS: RangeInclusive<f64> = 28.0..=40.0;
pub const ELECTRONICS_TEMP_BOUNDS: RangeInclusive<f64> = 33.0..=45.0;

/// Random-walk generator for one session.
#[derive(Debug)]
pub struct Drift<R: Rng> {
    rng: R,
}

impl Drift<StdRng> {
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> Drift<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Next update for `state`, covering `elapsed` wall time.
    ///
    /// With the jet stopped, pressure and drop rate read zero and only
    /// power-on hours accrue.
    pub fn step(&mut self, state: &ProtocolState, elapsed: Duration) -> TelemetryUpdate {
        let hours = elapsed.as_secs_f64() / 3600.0;
        let temps = &state.temperatures;
        let update = TelemetryUpdate::new().with_temperatures(
            walk_f64(&mut self.rng, temps.printhead, 0.1, PRINTHEAD_TEMP_BOUNDS),
            walk_f64(&mut self.rng, temps.electronics, 0.1, ELECTRONICS_TEMP_BOUNDS),
        );

        if !state.subsystems.jet_running {
            return update.with_pressure(0.0).with_rps(0).with_runtime(hours, 0.0);
        }

        let m = &state.metrics;
        update
            .with_pressure(walk_f64(&mut self.rng, m.pressure, 0.3, PRESSURE_BOUNDS))
            .with_viscosity(walk_f64(&mut self.rng, m.viscosity, 0.02, VISCOSITY_BOUNDS))
            .with_modulation(walk_u32(&mut self.rng, m.modulation, 2, MODULATION_BOUNDS))
            .with_charge_percent(walk_u32(&mut self.rng, m.charge_percent, 1, CHARGE_BOUNDS))
            .with_rps(walk_u32(&mut self.rng, m.rps, 1, RPS_BOUNDS))
            .with_phase_quality(walk_u32(&mut self.rng, m.phase_quality, 2, PHASE_BOUNDS))
            .with_runtime(hours, hours)
    }
}

/// One step of a walk, pulled back inside `bounds` if the reading starts outside.
fn walk_f64<R: Rng>(rng: &mut R, current: f64, step: f64, bounds: RangeInclusive<f64>) -> f64 {
    let next = current + rng.gen_range(-step..=step);
    next.clamp(*bounds.start(), *bounds.end())
}

fn walk_u32<R: Rng>(rng: &mut R, current: u32, step: u32, bounds: RangeInclusive<u32>) -> u32 {
    let delta = rng.gen_range(-(step as i64)..=step as i64);
    let next = (current as i64 + delta).max(0) as u32;
    next.clamp(*bounds.start(), *bounds.end())
}
