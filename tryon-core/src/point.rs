//! Point and vector types

use nalgebra::{Point3, Vector3};

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// A 3D vector with floating point components
pub type Vector3f = Vector3<f32>;

/// Map a landmark from frame-pixel space into render space.
///
/// Frame y grows downward while render y grows upward, and landmark depth is
/// relative to a plane `camera_z` units in front of the camera.
pub fn frame_to_render(point: &Point3f, camera_z: f32) -> Point3f {
    Point3f::new(point.x, -point.y, -camera_z + point.z)
}
