//! Gyroscope bias estimation
//!
//! The gyroscope's zero-rate reading carries a constant-ish offset that
//! integrates into orientation drift unless subtracted. The estimator runs a
//! two-mode state machine:
//!
//! - **Calibrating**: for a fixed window after construction, every incoming
//!   angular-rate sample is averaged into the bias. The sensor is expected to
//!   be physically still during this window; that is a precondition on the
//!   deployment, not something the estimator can enforce.
//! - **Tracking**: after the window the bias adapts by a slow exponential
//!   moving average, and only while the body is judged stationary. During
//!   motion the estimate is frozen so it cannot be corrupted.
//!
//! The transition is one-way and time-triggered.

use std::time::{Duration, Instant};

use nalgebra::Vector3;

/// Runtime gyroscope bias estimator.
#[derive(Debug, Clone)]
pub struct BiasEstimator {
    /// EMA rate for stationary adaptation.
    alpha: f32,
    /// Whether tracking-mode adaptation is enabled at all.
    auto_bias: bool,
    /// End of the startup calibration window.
    deadline: Instant,
    mode: Mode,
    bias_dps: Vector3<f32>,
}

#[derive(Debug, Clone)]
enum Mode {
    Calibrating { sum: Vector3<f32>, count: u32 },
    Tracking,
}

impl BiasEstimator {
    /// `started_at` anchors the calibration window; samples stamped before
    /// `started_at + calibration_duration` are averaged.
    pub fn new(
        calibration_duration: Duration,
        alpha: f32,
        auto_bias: bool,
        started_at: Instant,
    ) -> Self {
        Self {
            alpha,
            auto_bias,
            deadline: started_at + calibration_duration,
            mode: Mode::Calibrating {
                sum: Vector3::zeros(),
                count: 0,
            },
            bias_dps: Vector3::zeros(),
        }
    }

    /// Feed one measured (remapped, uncorrected) angular-rate sample.
    ///
    /// `stationary` is the caller's classification of the body at `now`,
    /// computed against the bias estimate before this update.
    pub fn ingest(&mut self, gyro_meas_dps: Vector3<f32>, stationary: bool, now: Instant) {
        match &mut self.mode {
            Mode::Calibrating { sum, count } if now < self.deadline => {
                *sum += gyro_meas_dps;
                *count += 1;
                self.bias_dps = *sum / *count as f32;
                return;
            }
            Mode::Calibrating { count, .. } => {
                tracing::info!(
                    bias_x = self.bias_dps.x,
                    bias_y = self.bias_dps.y,
                    bias_z = self.bias_dps.z,
                    samples = *count,
                    "gyro bias calibration complete"
                );
                self.mode = Mode::Tracking;
            }
            Mode::Tracking => {}
        }

        if self.auto_bias && stationary {
            self.bias_dps = self.bias_dps * (1.0 - self.alpha) + gyro_meas_dps * self.alpha;
        }
    }

    /// Current bias estimate in degrees per second.
    pub fn bias_dps(&self) -> Vector3<f32> {
        self.bias_dps
    }

    /// Whether the startup averaging window is still open.
    pub fn is_calibrating(&self) -> bool {
        matches!(self.mode, Mode::Calibrating { .. })
    }
}
