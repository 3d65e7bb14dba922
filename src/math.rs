//! Mathematical utilities and nalgebra extensions

use nalgebra::{Quaternion, UnitQuaternion, Vector3};

/// Mathematical constants
pub const DEG_TO_RAD: f32 = core::f32::consts::PI / 180.0;
pub const RAD_TO_DEG: f32 = 180.0 / core::f32::consts::PI;

/// Norm below which a vector or quaternion is treated as degenerate.
pub const NORM_EPSILON: f32 = 1e-9;

/// Extension trait for Vector3 operations
pub trait Vector3Ext {
    /// Normalize the vector, returning the zero vector when the norm is
    /// (near) zero instead of dividing by it.
    fn safe_normalize(&self) -> Vector3<f32>;

    /// Convert degrees to radians
    fn deg_to_rad(&self) -> Vector3<f32>;

    /// Convert radians to degrees
    fn rad_to_deg(&self) -> Vector3<f32>;
}

impl Vector3Ext for Vector3<f32> {
    fn safe_normalize(&self) -> Vector3<f32> {
        let norm = self.norm();
        if norm > NORM_EPSILON {
            *self / norm
        } else {
            Vector3::zeros()
        }
    }

    fn deg_to_rad(&self) -> Vector3<f32> {
        *self * DEG_TO_RAD
    }

    fn rad_to_deg(&self) -> Vector3<f32> {
        *self * RAD_TO_DEG
    }
}

/// Extension trait for quaternion normalization
pub trait QuaternionExt {
    /// Normalize into a unit quaternion, falling back to `fallback` when the
    /// norm is degenerate. NaN/Inf never propagate out of this call.
    fn normalize_or(self, fallback: UnitQuaternion<f32>) -> UnitQuaternion<f32>;
}

impl QuaternionExt for Quaternion<f32> {
    fn normalize_or(self, fallback: UnitQuaternion<f32>) -> UnitQuaternion<f32> {
        UnitQuaternion::try_new(self, NORM_EPSILON).unwrap_or(fallback)
    }
}
