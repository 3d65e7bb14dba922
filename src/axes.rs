//! Sensor axis remapping for different mounting orientations
//!
//! When the IMU is mounted rotated or mirrored relative to the body frame,
//! its readings must be permuted and sign-flipped before any fusion math.
//! A remap is described by an axis order (which sensor axis feeds each body
//! axis) and a sign per body axis, configured independently for the
//! accelerometer and the gyroscope.
//!
//! # Example
//! ```
//! use nalgebra::Vector3;
//! use attitude_fusion::{Axis, AxisRemap, Sign};
//!
//! // Sensor mounted with X and Y swapped, body Y inverted.
//! let remap = AxisRemap::new(
//!     [Axis::Y, Axis::X, Axis::Z],
//!     [Sign::Plus, Sign::Minus, Sign::Plus],
//! ).unwrap();
//!
//! let body = remap.apply(Vector3::new(1.0, 2.0, 3.0));
//! assert_eq!(body, Vector3::new(2.0, -1.0, 3.0));
//! ```

use nalgebra::Vector3;
use thiserror::Error;

/// One of the three sensor axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    #[inline]
    fn component(self, v: &Vector3<f32>) -> f32 {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
            Axis::Z => v.z,
        }
    }
}

/// Direction applied to a remapped axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sign {
    #[default]
    Plus,
    Minus,
}

impl Sign {
    #[inline]
    fn factor(self) -> f32 {
        match self {
            Sign::Plus => 1.0,
            Sign::Minus => -1.0,
        }
    }
}

/// The axis order did not name each of X, Y, and Z exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("axis order must be a permutation of X, Y, Z")]
pub struct AxisRemapError;

/// Permutation and per-axis sign correcting for sensor mounting orientation.
///
/// `order[i]` names the sensor axis that feeds body axis `i`; `signs[i]`
/// optionally inverts it. The identity remap leaves readings untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisRemap {
    order: [Axis; 3],
    signs: [Sign; 3],
}

impl AxisRemap {
    /// Create a remap, validating that `order` is a permutation of the three
    /// axes.
    pub fn new(order: [Axis; 3], signs: [Sign; 3]) -> Result<Self, AxisRemapError> {
        let mut seen = [false; 3];
        for axis in order {
            let slot = match axis {
                Axis::X => 0,
                Axis::Y => 1,
                Axis::Z => 2,
            };
            if seen[slot] {
                return Err(AxisRemapError);
            }
            seen[slot] = true;
        }
        Ok(Self { order, signs })
    }

    /// The identity remap: body axes equal sensor axes.
    pub fn identity() -> Self {
        Self {
            order: [Axis::X, Axis::Y, Axis::Z],
            signs: [Sign::Plus; 3],
        }
    }

    /// Remap a sensor reading into the body frame.
    #[inline]
    pub fn apply(&self, sensor: Vector3<f32>) -> Vector3<f32> {
        Vector3::new(
            self.signs[0].factor() * self.order[0].component(&sensor),
            self.signs[1].factor() * self.order[1].component(&sensor),
            self.signs[2].factor() * self.order[2].component(&sensor),
        )
    }
}

impl Default for AxisRemap {
    fn default() -> Self {
        Self::identity()
    }
}
