//! Stationarity classification from angular rate and accelerometer norm

use nalgebra::Vector3;

/// Expected accelerometer norm at rest, in g.
pub const ACCEL_NORM_TARGET_G: f32 = 1.0;

/// Classifies "not rotating and at rest" from a bias-corrected angular rate
/// and the accelerometer norm's deviation from 1 g.
///
/// The predicate is recomputed per event and applies no hysteresis, so it
/// may flicker near the thresholds.
#[derive(Debug, Clone, Copy)]
pub struct StationaryDetector {
    /// Angular rate magnitude threshold in degrees per second.
    pub gyro_threshold_dps: f32,
    /// Allowed deviation of the accelerometer norm from 1 g.
    pub accel_tolerance_g: f32,
}

impl StationaryDetector {
    pub fn new(gyro_threshold_dps: f32, accel_tolerance_g: f32) -> Self {
        Self {
            gyro_threshold_dps,
            accel_tolerance_g,
        }
    }

    /// `corrected_gyro_dps` is the measured angular rate minus the current
    /// bias estimate; `accel_g` is the (remapped) accelerometer reading.
    #[inline]
    pub fn is_stationary(&self, corrected_gyro_dps: Vector3<f32>, accel_g: Vector3<f32>) -> bool {
        corrected_gyro_dps.norm() < self.gyro_threshold_dps
            && (accel_g.norm() - ACCEL_NORM_TARGET_G).abs() <= self.accel_tolerance_g
    }
}
