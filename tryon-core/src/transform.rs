//! Object transforms
//!
//! Scene objects carry a position, an Euler rotation, a per-axis scale and an
//! up vector, composed as `translation * rotation * scale`.

use nalgebra::{Matrix4, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// Euler angles in radians, applied in XYZ order
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EulerXyz {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl EulerXyz {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Rotation as a unit quaternion (`Rx * Ry * Rz`)
    pub fn to_quaternion(&self) -> UnitQuaternion<f32> {
        UnitQuaternion::from_axis_angle(&Vector3::x_axis(), self.x)
            * UnitQuaternion::from_axis_angle(&Vector3::y_axis(), self.y)
            * UnitQuaternion::from_axis_angle(&Vector3::z_axis(), self.z)
    }
}

/// Position, orientation and scale of a scene object
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectTransform {
    pub position: Vector3<f32>,
    pub rotation: EulerXyz,
    pub scale: Vector3<f32>,
    pub up: Vector3<f32>,
}

impl ObjectTransform {
    /// Create an identity transform
    pub fn identity() -> Self {
        Self {
            position: Vector3::zeros(),
            rotation: EulerXyz::default(),
            scale: Vector3::new(1.0, 1.0, 1.0),
            up: Vector3::y(),
        }
    }

    /// Identity rotation at a position
    pub fn from_position(position: Vector3<f32>) -> Self {
        Self {
            position,
            ..Self::identity()
        }
    }

    /// Set the same scale on all three axes
    pub fn set_uniform_scale(&mut self, scale: f32) {
        self.scale = Vector3::new(scale, scale, scale);
    }

    /// Homogeneous model matrix
    pub fn matrix(&self) -> Matrix4<f32> {
        Matrix4::new_translation(&self.position)
            * self.rotation.to_quaternion().to_homogeneous()
            * Matrix4::new_nonuniform_scaling(&self.scale)
    }

    /// Check if this is approximately the identity transformation
    pub fn is_identity(&self, epsilon: f32) -> bool {
        (self.matrix() - Matrix4::identity()).norm() < epsilon
    }
}

impl Default for ObjectTransform {
    fn default() -> Self {
        Self::identity()
    }
}
