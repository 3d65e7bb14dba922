//! Engine facade: ingest contract, integration clock, and cooperative
//! shutdown
//!
//! Three logical tasks touch the engine:
//!
//! - an **ingest** task calls [`AttitudeEngine::ingest`] whenever a producer
//!   has data, at whatever rate samples arrive;
//! - the **integration** task runs on its own fixed-period clock and is the
//!   only task that mutates orientation;
//! - any number of **consumers** call [`AttitudeEngine::snapshot`] at their
//!   own cadence.
//!
//! The engine is cheap to clone; clones share state, so one clone can feed
//! samples from a reader thread while another serves snapshots to a display
//! loop.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Instant;

use crate::bias::BiasEstimator;
use crate::errors::IngestError;
use crate::integrator::Integrator;
use crate::stationary::StationaryDetector;
use crate::store::{Snapshot, StateStore};
use crate::types::{EngineSettings, Sample};

/// Cooperative cancellation handle.
///
/// Each long-running loop receives a token at spawn time and checks it at
/// the top of every iteration, so cancellation takes effect within one
/// iteration and never interrupts a state mutation midway.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every loop holding a clone of this token to exit.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Real-time attitude and temperature estimation engine.
///
/// Fuses angular-rate and specific-force samples into a drift-corrected
/// orientation at a fixed physics rate, while tracking gyro bias and
/// bounded temperature histories for display.
#[derive(Debug, Clone)]
pub struct AttitudeEngine {
    settings: EngineSettings,
    detector: StationaryDetector,
    store: Arc<StateStore>,
    bias: Arc<Mutex<BiasEstimator>>,
    integrator: Arc<Mutex<Integrator>>,
}

impl AttitudeEngine {
    /// Build an engine whose calibration window opens now.
    pub fn new(settings: EngineSettings) -> Self {
        Self::new_at(settings, Instant::now())
    }

    /// Build an engine with an explicit calibration anchor. Useful for
    /// deterministic tests and replay, where sample timestamps are
    /// fabricated relative to a known origin.
    pub fn new_at(settings: EngineSettings, started_at: Instant) -> Self {
        Self {
            settings,
            detector: StationaryDetector::new(
                settings.gyro_threshold_dps,
                settings.accel_tolerance_g,
            ),
            store: Arc::new(StateStore::new(
                settings.history_capacity,
                settings.history_window,
            )),
            bias: Arc::new(Mutex::new(BiasEstimator::new(
                settings.calibration_duration,
                settings.bias_alpha,
                settings.auto_bias,
                started_at,
            ))),
            integrator: Arc::new(Mutex::new(Integrator::new(&settings))),
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Feed one ingest event: a raw sample and, when the producer computes
    /// one, a short-window averaged sample.
    ///
    /// Validation fails fast: if either sample carries a non-finite reading
    /// the whole event is rejected and no state changes. Safe to call from
    /// any thread.
    pub fn ingest(&self, raw: Sample, averaged: Option<Sample>) -> Result<(), IngestError> {
        raw.validate()?;
        if let Some(avg) = &averaged {
            avg.validate()?;
        }

        let raw_body = Sample {
            accel: self.settings.accel_axes.apply(raw.accel),
            gyro_dps: self.settings.gyro_axes.apply(raw.gyro_dps),
            ..raw
        };
        let averaged_body = averaged.map(|avg| Sample {
            accel: self.settings.accel_axes.apply(avg.accel),
            gyro_dps: self.settings.gyro_axes.apply(avg.gyro_dps),
            ..avg
        });

        let bias_dps = {
            let mut bias = lock(&self.bias);
            let stationary = self
                .detector
                .is_stationary(raw_body.gyro_dps - bias.bias_dps(), raw_body.accel);
            bias.ingest(raw_body.gyro_dps, stationary, raw.timestamp);
            bias.bias_dps()
        };

        self.store.record(raw_body, averaged_body, bias_dps);
        Ok(())
    }

    /// Whether the startup bias calibration window is still open.
    pub fn is_calibrating(&self) -> bool {
        lock(&self.bias).is_calibrating()
    }

    /// Apply one fixed-dt integration step.
    ///
    /// Does nothing until the first raw sample has been ingested. The shared
    /// lock is held only to copy inputs out and to publish the result, never
    /// across the integration math.
    pub fn tick(&self, dt: f32) {
        let Some(inputs) = self.store.latest_inputs() else {
            return;
        };
        let mut integrator = lock(&self.integrator);
        integrator.step(&inputs, dt);
        self.store
            .write_orientation(integrator.quaternion(), integrator.rotation());
    }

    /// Complete, internally consistent copy of the current state.
    pub fn snapshot(&self) -> Snapshot {
        self.store.snapshot()
    }

    /// Run the integration clock on the calling thread until the token is
    /// cancelled.
    ///
    /// Every tick advances orientation by exactly `1 / tick_rate_hz`
    /// seconds. If the scheduler falls behind, the loop catches up with
    /// additional fixed-dt steps instead of one large variable-dt step, so
    /// the filter gains stay calibrated to the configured rate.
    pub fn run_integrator(&self, token: &CancelToken) {
        let period = self.settings.tick_period();
        let dt = period.as_secs_f32();
        let mut next_tick = Instant::now() + period;
        while !token.is_cancelled() {
            self.tick(dt);
            if let Some(wait) = next_tick.checked_duration_since(Instant::now()) {
                thread::sleep(wait);
            }
            next_tick += period;
        }
    }

    /// Spawn the integration clock on a dedicated thread.
    pub fn spawn_integrator(&self, token: CancelToken) -> io::Result<thread::JoinHandle<()>> {
        let engine = self.clone();
        thread::Builder::new()
            .name("attitude-integrator".into())
            .spawn(move || engine.run_integrator(&token))
    }
}

// Poisoning only happens if another thread panicked mid-section; all
// sections write whole values, so the data is still coherent.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
