//! Fixed-rate orientation integration with accelerometer tilt correction
//!
//! The integrator owns the quaternion state and advances it one fixed-dt
//! step per tick: gyroscope angular rate propagates the fast dynamics, and a
//! proportional term built from the accelerometer's gravity direction pulls
//! the estimate back toward the true vertical, correcting the slow drift the
//! gyro alone would accumulate. Heading (yaw) has no absolute reference and
//! is left to drift.

use nalgebra::{Quaternion, Rotation3, UnitQuaternion, Vector3};

use crate::math::{QuaternionExt, Vector3Ext};
use crate::stationary::StationaryDetector;
use crate::types::EngineSettings;

/// Which stream feeds one integration step.
///
/// Selection is made once per tick as an explicit choice rather than
/// branching on stream flags inside the math.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputChoice {
    /// The raw, instantaneous reading.
    UseRaw,
    /// The window-averaged reading (availability already established).
    UseAveraged,
    /// The averaged reading when present, the raw one otherwise.
    FallbackToRaw,
}

impl InputChoice {
    /// Resolve the choice against the readings actually at hand.
    #[inline]
    pub fn resolve(self, raw: Vector3<f32>, averaged: Option<Vector3<f32>>) -> Vector3<f32> {
        match self {
            InputChoice::UseRaw => raw,
            InputChoice::UseAveraged | InputChoice::FallbackToRaw => averaged.unwrap_or(raw),
        }
    }
}

/// Accelerometer stream choice for one tick.
///
/// While stationary the raw stream avoids the lag a trailing average drags
/// into the correction term; in motion the averaged stream (when present)
/// smooths vibration.
pub fn select_accel_source(raw_when_still: bool, stationary: bool) -> InputChoice {
    if raw_when_still && stationary {
        InputChoice::UseRaw
    } else {
        InputChoice::FallbackToRaw
    }
}

/// Gyroscope stream choice for one tick. Raw is preferred for responsiveness
/// unless averaged-gyro mode is enabled and data is available.
pub fn select_gyro_source(use_averaged: bool, averaged_available: bool) -> InputChoice {
    if use_averaged && averaged_available {
        InputChoice::UseAveraged
    } else {
        InputChoice::UseRaw
    }
}

/// Inputs for one integration step, copied out of the shared store before
/// any math runs.
#[derive(Debug, Clone, Copy)]
pub struct TickInputs {
    /// Latest raw accelerometer reading in g (body frame).
    pub raw_accel: Vector3<f32>,
    /// Latest raw angular rate in degrees per second (body frame,
    /// uncorrected).
    pub raw_gyro_dps: Vector3<f32>,
    /// Latest averaged accelerometer reading, if a producer supplies one.
    pub averaged_accel: Option<Vector3<f32>>,
    /// Latest averaged angular rate, if a producer supplies one.
    pub averaged_gyro_dps: Option<Vector3<f32>>,
    /// Current gyro bias estimate in degrees per second.
    pub bias_dps: Vector3<f32>,
}

/// Quaternion integrator with complementary tilt correction.
#[derive(Debug, Clone)]
pub struct Integrator {
    quaternion: UnitQuaternion<f32>,
    rotation: Rotation3<f32>,
    gain: f32,
    stationary_gain_boost: f32,
    accel_raw_when_still: bool,
    gyro_use_averaged: bool,
    detector: StationaryDetector,
}

impl Integrator {
    pub fn new(settings: &EngineSettings) -> Self {
        Self {
            quaternion: UnitQuaternion::identity(),
            rotation: Rotation3::identity(),
            gain: settings.gain,
            stationary_gain_boost: settings.stationary_gain_boost,
            accel_raw_when_still: settings.accel_raw_when_still,
            gyro_use_averaged: settings.gyro_use_averaged,
            detector: StationaryDetector::new(
                settings.gyro_threshold_dps,
                settings.accel_tolerance_g,
            ),
        }
    }

    /// Advance orientation by exactly one fixed-dt step.
    ///
    /// A non-positive `dt` is a clock anomaly; the step is skipped and
    /// logged, never applied with a corrupted interval.
    pub fn step(&mut self, inputs: &TickInputs, dt: f32) {
        if dt <= 0.0 {
            tracing::warn!(dt, "skipping integration step: non-positive tick interval");
            return;
        }

        let corrected_raw_gyro = inputs.raw_gyro_dps - inputs.bias_dps;
        let stationary = self
            .detector
            .is_stationary(corrected_raw_gyro, inputs.raw_accel);

        let accel_choice = select_accel_source(self.accel_raw_when_still, stationary);
        let gyro_choice =
            select_gyro_source(self.gyro_use_averaged, inputs.averaged_gyro_dps.is_some());

        let accel = accel_choice.resolve(inputs.raw_accel, inputs.averaged_accel);
        let gyro_dps = gyro_choice.resolve(
            corrected_raw_gyro,
            inputs.averaged_gyro_dps.map(|g| g - inputs.bias_dps),
        );

        let gain = if stationary {
            self.gain * self.stationary_gain_boost
        } else {
            self.gain
        };

        // Tilt error: world up rotated into the body frame, crossed with the
        // measured gravity direction. Zero when the estimate agrees with the
        // accelerometer.
        let up_body = self.rotation.inverse_transform_vector(&Vector3::z());
        let error = up_body.cross(&accel.safe_normalize());

        let omega = gyro_dps.deg_to_rad() + error * gain;

        // dq/dt = 0.5 * q * (0, omega), first-order step, then renormalize.
        let rate = Quaternion::from_parts(0.0, omega * 0.5);
        let derivative = self.quaternion.as_ref() * rate;
        let advanced = self.quaternion.as_ref() + derivative * dt;

        self.quaternion = advanced.normalize_or(self.quaternion);
        self.rotation = self.quaternion.to_rotation_matrix();
    }

    /// Current orientation (body to world).
    pub fn quaternion(&self) -> UnitQuaternion<f32> {
        self.quaternion
    }

    /// Current orientation as a rotation matrix, kept consistent with the
    /// quaternion after every step.
    pub fn rotation(&self) -> Rotation3<f32> {
        self.rotation
    }
}
