//! Core types and configuration for the attitude fusion engine

use std::time::{Duration, Instant};

use nalgebra::Vector3;

use crate::axes::AxisRemap;
use crate::errors::IngestError;

/// One IMU reading.
///
/// Producers hand the engine pre-parsed numeric tuples; transport and payload
/// parsing happen upstream. Accelerometer readings are in g, gyroscope
/// readings in degrees per second, temperature (when the sensor reports one)
/// in degrees Celsius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Specific force in g.
    pub accel: Vector3<f32>,
    /// Angular rate in degrees per second.
    pub gyro_dps: Vector3<f32>,
    /// Die temperature in degrees Celsius, if reported.
    pub temp_c: Option<f32>,
    /// Monotonic capture time.
    pub timestamp: Instant,
}

impl Sample {
    pub fn new(
        accel: Vector3<f32>,
        gyro_dps: Vector3<f32>,
        temp_c: Option<f32>,
        timestamp: Instant,
    ) -> Self {
        Self {
            accel,
            gyro_dps,
            temp_c,
            timestamp,
        }
    }

    /// Check that every reading is finite.
    ///
    /// Validation runs before the sample touches any engine state, so a
    /// malformed sample is rejected whole.
    pub fn validate(&self) -> Result<(), IngestError> {
        if !self.accel.iter().all(|c| c.is_finite()) {
            return Err(IngestError::InvalidSample { field: "accel" });
        }
        if !self.gyro_dps.iter().all(|c| c.is_finite()) {
            return Err(IngestError::InvalidSample { field: "gyro" });
        }
        if let Some(temp) = self.temp_c {
            if !temp.is_finite() {
                return Err(IngestError::InvalidSample { field: "temp" });
            }
        }
        Ok(())
    }
}

/// Engine configuration.
///
/// All policy is fixed at construction time. Defaults reproduce the behavior
/// of a bench setup with the sensor mounted in its reference orientation:
/// 2 s startup calibration, slow stationary bias adaptation, unit correction
/// gain, and a 60 Hz integration clock.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use attitude_fusion::EngineSettings;
///
/// let settings = EngineSettings {
///     gain: 0.5,                       // gentler tilt correction
///     stationary_gain_boost: 3.0,      // converge faster at rest
///     calibration_duration: Duration::from_secs(5),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Copy)]
pub struct EngineSettings {
    /// Accelerometer mounting remap.
    pub accel_axes: AxisRemap,
    /// Gyroscope mounting remap.
    pub gyro_axes: AxisRemap,
    /// Startup window during which every gyro sample is averaged into the
    /// bias estimate. The sensor must be physically still for this long.
    pub calibration_duration: Duration,
    /// Whether the bias keeps adapting after calibration while stationary.
    pub auto_bias: bool,
    /// Per-sample EMA rate for stationary bias adaptation (0..1, small).
    pub bias_alpha: f32,
    /// Bias-corrected angular rate magnitude below which the body counts as
    /// not rotating, in degrees per second.
    pub gyro_threshold_dps: f32,
    /// Allowed deviation of the accelerometer norm from 1 g at rest.
    pub accel_tolerance_g: f32,
    /// Base proportional gain of the tilt correction term.
    pub gain: f32,
    /// Factor applied to the gain while stationary. 1.0 disables boosting.
    pub stationary_gain_boost: f32,
    /// Prefer the raw accelerometer over the averaged stream while
    /// stationary, avoiding averaging lag.
    pub accel_raw_when_still: bool,
    /// Integrate the averaged gyro stream instead of the raw one when it is
    /// available. Raw is the default for responsiveness.
    pub gyro_use_averaged: bool,
    /// Integration tick rate in Hz. Each tick is one fixed-dt step.
    pub tick_rate_hz: f32,
    /// Maximum entries kept per temperature history.
    pub history_capacity: usize,
    /// Entries older than this relative to the newest are evicted.
    /// `None` keeps everything up to capacity.
    pub history_window: Option<Duration>,
}

impl EngineSettings {
    /// Period of the integration clock.
    pub fn tick_period(&self) -> Duration {
        Duration::from_secs_f32(1.0 / self.tick_rate_hz)
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            accel_axes: AxisRemap::identity(),
            gyro_axes: AxisRemap::identity(),
            calibration_duration: Duration::from_secs(2),
            auto_bias: true,
            bias_alpha: 0.005,
            gyro_threshold_dps: 1.5,
            accel_tolerance_g: 0.2,
            gain: 1.0,
            stationary_gain_boost: 1.0,
            accel_raw_when_still: true,
            gyro_use_averaged: false,
            tick_rate_hz: 60.0,
            history_capacity: 600,
            history_window: Some(Duration::from_secs(60)),
        }
    }
}
