//! Rotation-vector to device-angle conversion.
//!
//! Follows the usual mobile sensor convention: device x to the right, y up the
//! screen, z out of the screen. The rotation vector is the vector part of a
//! unit quaternion.

use nalgebra::{Matrix3, Quaternion, UnitQuaternion};
use serde::{Deserialize, Serialize};

/// Fused rotation reading as delivered by the sensor stack
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotationVector {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Scalar part; derived from x, y, z when the sensor omits it
    pub w: Option<f64>,
}

impl RotationVector {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z, w: None }
    }

    pub fn with_scalar(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w: Some(w) }
    }

    pub fn scalar(&self) -> f64 {
        self.w.unwrap_or_else(|| {
            let remainder = 1.0 - self.x * self.x - self.y * self.y - self.z * self.z;
            remainder.max(0.0).sqrt()
        })
    }

    pub fn to_unit_quaternion(&self) -> UnitQuaternion<f64> {
        let quaternion = Quaternion::new(self.scalar(), self.x, self.y, self.z);
        UnitQuaternion::try_new(quaternion, f64::EPSILON).unwrap_or_else(UnitQuaternion::identity)
    }
}

/// Device angles in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceAngles {
    pub azimuth: f64,
    pub pitch: f64,
    pub roll: f64,
}

/// Rotation matrix for a rotation vector; a degenerate quaternion maps to identity.
pub fn rotation_matrix_from_vector(vector: &RotationVector) -> Matrix3<f64> {
    vector.to_unit_quaternion().to_rotation_matrix().into_inner()
}

pub fn orientation_from_matrix(matrix: &Matrix3<f64>) -> DeviceAngles {
    let azimuth = matrix[(0, 1)].atan2(matrix[(1, 1)]);
    let pitch = (-matrix[(2, 1)]).clamp(-1.0, 1.0).asin();
    let roll = (-matrix[(2, 0)]).atan2(matrix[(2, 2)]);

    DeviceAngles {
        azimuth: azimuth.to_degrees(),
        pitch: pitch.to_degrees(),
        roll: roll.to_degrees(),
    }
}

pub fn orientation_from_vector(vector: &RotationVector) -> DeviceAngles {
    orientation_from_matrix(&rotation_matrix_from_vector(vector))
}
