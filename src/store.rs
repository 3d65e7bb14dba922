//! Shared state between the ingest path, the integration clock, and
//! consumers
//!
//! One exclusive lock guards everything, and every operation either copies
//! data out or writes a prepared value in, so the lock is never held across
//! integration math or handed to a slow consumer. Readers always see a
//! self-consistent view: a snapshot is taken in a single critical section.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use nalgebra::{Rotation3, UnitQuaternion, Vector3};

use crate::integrator::TickInputs;
use crate::types::Sample;

/// Bounded, time-ordered `(timestamp, temp_c)` sequence.
///
/// Appends are O(1) amortized. The oldest entries are evicted once the
/// capacity is reached, and entries older than the retention window relative
/// to the newest timestamp are dropped on append.
#[derive(Debug, Clone)]
pub struct TemperatureHistory {
    points: VecDeque<(Instant, f32)>,
    capacity: usize,
    window: Option<Duration>,
}

impl TemperatureHistory {
    pub fn new(capacity: usize, window: Option<Duration>) -> Self {
        let capacity = capacity.max(1);
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
            window,
        }
    }

    pub fn push(&mut self, timestamp: Instant, temp_c: f32) {
        if let Some(window) = self.window {
            while let Some(&(oldest, _)) = self.points.front() {
                if timestamp.saturating_duration_since(oldest) > window {
                    self.points.pop_front();
                } else {
                    break;
                }
            }
        }
        self.points.push_back((timestamp, temp_c));
        while self.points.len() > self.capacity {
            self.points.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Copy out the stored points, oldest first.
    pub fn to_vec(&self) -> Vec<(Instant, f32)> {
        self.points.iter().copied().collect()
    }
}

/// Complete, self-consistent copy of the engine state at one instant.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Current orientation, body to world.
    pub quaternion: UnitQuaternion<f32>,
    /// Rotation-matrix form of the same orientation.
    pub rotation: Rotation3<f32>,
    /// Last raw sample ingested (already remapped into the body frame).
    pub latest_raw: Option<Sample>,
    /// Last averaged sample ingested, if any producer supplies that stream.
    pub latest_averaged: Option<Sample>,
    /// Current gyro bias estimate in degrees per second.
    pub bias_dps: Vector3<f32>,
    /// Temperature history of the raw stream, oldest first.
    pub temp_history_raw: Vec<(Instant, f32)>,
    /// Temperature history of the averaged stream, oldest first.
    pub temp_history_averaged: Vec<(Instant, f32)>,
}

impl Snapshot {
    /// Orientation as (roll, pitch, yaw) in degrees, for display.
    pub fn euler_degrees(&self) -> (f32, f32, f32) {
        let (roll, pitch, yaw) = self.quaternion.euler_angles();
        (roll.to_degrees(), pitch.to_degrees(), yaw.to_degrees())
    }
}

#[derive(Debug)]
struct StoreInner {
    latest_raw: Option<Sample>,
    latest_averaged: Option<Sample>,
    bias_dps: Vector3<f32>,
    quaternion: UnitQuaternion<f32>,
    rotation: Rotation3<f32>,
    temp_raw: TemperatureHistory,
    temp_averaged: TemperatureHistory,
}

/// Thread-safe holder of the current engine state.
#[derive(Debug)]
pub struct StateStore {
    inner: Mutex<StoreInner>,
}

impl StateStore {
    pub fn new(history_capacity: usize, history_window: Option<Duration>) -> Self {
        Self {
            inner: Mutex::new(StoreInner {
                latest_raw: None,
                latest_averaged: None,
                bias_dps: Vector3::zeros(),
                quaternion: UnitQuaternion::identity(),
                rotation: Rotation3::identity(),
                temp_raw: TemperatureHistory::new(history_capacity, history_window),
                temp_averaged: TemperatureHistory::new(history_capacity, history_window),
            }),
        }
    }

    // A poisoned lock means a panic elsewhere, not corrupt data: every
    // critical section writes whole values. Recover the guard and carry on.
    fn lock_inner(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record one ingest event atomically: latest readings, bias, and
    /// temperature histories all move together.
    pub fn record(&self, raw: Sample, averaged: Option<Sample>, bias_dps: Vector3<f32>) {
        let mut inner = self.lock_inner();
        if let Some(temp) = raw.temp_c {
            inner.temp_raw.push(raw.timestamp, temp);
        }
        inner.latest_raw = Some(raw);
        if let Some(avg) = averaged {
            if let Some(temp) = avg.temp_c {
                inner.temp_averaged.push(avg.timestamp, temp);
            }
            inner.latest_averaged = Some(avg);
        }
        inner.bias_dps = bias_dps;
    }

    /// Copy out what the integration step needs. `None` until the first raw
    /// sample arrives.
    pub fn latest_inputs(&self) -> Option<TickInputs> {
        let inner = self.lock_inner();
        let raw = inner.latest_raw?;
        Some(TickInputs {
            raw_accel: raw.accel,
            raw_gyro_dps: raw.gyro_dps,
            averaged_accel: inner.latest_averaged.map(|s| s.accel),
            averaged_gyro_dps: inner.latest_averaged.map(|s| s.gyro_dps),
            bias_dps: inner.bias_dps,
        })
    }

    /// Publish a freshly integrated orientation.
    pub fn write_orientation(&self, quaternion: UnitQuaternion<f32>, rotation: Rotation3<f32>) {
        let mut inner = self.lock_inner();
        inner.quaternion = quaternion;
        inner.rotation = rotation;
    }

    /// Atomic copy of the full state; never a torn read.
    pub fn snapshot(&self) -> Snapshot {
        let inner = self.lock_inner();
        Snapshot {
            quaternion: inner.quaternion,
            rotation: inner.rotation,
            latest_raw: inner.latest_raw,
            latest_averaged: inner.latest_averaged,
            bias_dps: inner.bias_dps,
            temp_history_raw: inner.temp_raw.to_vec(),
            temp_history_averaged: inner.temp_averaged.to_vec(),
        }
    }
}
