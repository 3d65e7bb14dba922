//! Attitude Fusion - real-time orientation and temperature telemetry for
//! MPU6050-class IMUs
//!
//! The engine fuses noisy angular-rate (gyroscope) and specific-force
//! (accelerometer) samples into a drift-corrected attitude estimate using a
//! complementary filter: the gyroscope propagates fast dynamics, and the
//! accelerometer's gravity direction supplies a proportional correction that
//! bleeds off the slow drift integration alone would accumulate. Alongside
//! orientation, the engine tracks an adaptive gyro bias estimate and bounded
//! histories of the sensor's slowly drifting temperature signal.
//!
//! # Features
//!
//! - Complementary filter running at a fixed, configurable physics rate,
//!   independent of how fast or irregularly samples arrive
//! - Startup gyro bias calibration, then slow stationarity-gated adaptation
//! - Stationarity classification from angular rate and accelerometer norm
//! - Per-sensor axis remapping for arbitrary mounting orientations
//! - Thread-safe ingest/snapshot contract: producers, the integration
//!   clock, and display consumers each run on their own cadence
//! - Cooperative cancellation for every long-running loop
//!
//! # Quick Start
//!
//! ```rust
//! use std::time::Instant;
//! use nalgebra::Vector3;
//! use attitude_fusion::{AttitudeEngine, EngineSettings, Sample};
//!
//! let engine = AttitudeEngine::new(EngineSettings::default());
//!
//! // Producer side: hand the engine pre-parsed samples as they arrive.
//! let sample = Sample::new(
//!     Vector3::new(0.0, 0.0, 1.0), // accelerometer, g
//!     Vector3::new(0.1, 0.2, 0.3), // gyroscope, deg/s
//!     Some(24.5),                  // temperature, Celsius
//!     Instant::now(),
//! );
//! engine.ingest(sample, None).unwrap();
//!
//! // Integration clock: normally driven by `spawn_integrator`.
//! engine.tick(1.0 / 60.0);
//!
//! // Consumer side: atomic snapshot, never a torn read.
//! let snapshot = engine.snapshot();
//! let (roll, pitch, yaw) = snapshot.euler_degrees();
//! println!("roll {roll:.1} pitch {pitch:.1} yaw {yaw:.1}");
//! ```

mod axes;
mod bias;
mod engine;
mod errors;
mod integrator;
mod math;
mod stationary;
mod store;
mod types;

pub use axes::{Axis, AxisRemap, AxisRemapError, Sign};
pub use bias::BiasEstimator;
pub use engine::{AttitudeEngine, CancelToken};
pub use errors::IngestError;
pub use integrator::{
    InputChoice, Integrator, TickInputs, select_accel_source, select_gyro_source,
};
pub use math::{DEG_TO_RAD, NORM_EPSILON, QuaternionExt, RAD_TO_DEG, Vector3Ext};
pub use stationary::{ACCEL_NORM_TARGET_G, StationaryDetector};
pub use store::{Snapshot, StateStore, TemperatureHistory};
pub use types::{EngineSettings, Sample};
