//! Overlay placement from facial landmarks
//!
//! Computes where an overlay (a glasses model) sits on one face from four
//! landmarks: the point between the eyes, both outer eye points and the
//! bottom of the nose. Landmarks are in frame-pixel space with y pointing
//! down; the result is in render space with y pointing up.
//!
//! Placement is recomputed from raw landmarks every frame. No smoothing is
//! applied, so landmark jitter passes straight through.

use std::f32::consts::{FRAC_PI_2, PI};
use tryon_core::{Calibration, EulerXyz, FaceKeyPoints, ObjectTransform, Point3f, Vector3f};

/// Up vector used when an instance has no usable history
pub const DEFAULT_UP: Vector3f = Vector3f::new(0.0, 1.0, 0.0);

/// Transform components for one overlay on one face
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Vector3f,
    /// Unit vector from the nose bottom towards the mid-eye point
    pub up: Vector3f,
    /// Uniform scale
    pub scale: f32,
    pub rotation: EulerXyz,
}

impl Placement {
    /// Write the placement into an object transform
    pub fn apply_to(&self, transform: &mut ObjectTransform) {
        transform.position = self.position;
        transform.up = self.up;
        transform.set_uniform_scale(self.scale);
        transform.rotation = self.rotation;
    }
}

/// Anchor position of the overlay.
///
/// `camera_z` is the render camera's z position; the overlay is pushed that far
/// behind the frame plane.
pub fn anchor_position(mid_eye: &Point3f, calibration: &Calibration, camera_z: f32) -> Vector3f {
    Vector3f::new(
        mid_eye.x + calibration.offset.x,
        -mid_eye.y + calibration.up_bias + calibration.offset.y,
        -camera_z + mid_eye.z + calibration.offset.z,
    )
}

/// Unit vector from the nose bottom to the mid-eye point, y flipped into
/// render space.
///
/// Returns `None` when the two points coincide (or the landmarks are not
/// finite), so the caller can keep its previous up vector.
pub fn up_vector(key_points: &FaceKeyPoints) -> Option<Vector3f> {
    let raw = key_points.mid_eye - key_points.nose_bottom;
    let flipped = Vector3f::new(raw.x, -raw.y, raw.z);
    let length = flipped.norm();
    if length <= f32::EPSILON || !length.is_finite() {
        return None;
    }
    Some(flipped / length)
}

/// Distance between the eyes times the asset scale factor
pub fn overlay_scale(key_points: &FaceKeyPoints, calibration: &Calibration) -> f32 {
    let eye_distance = (key_points.left_eye - key_points.right_eye).norm();
    (eye_distance * calibration.scale_factor).max(0.0)
}

/// Roll angle in radians derived from the up vector.
///
/// `π/2 − acos(up.x)` only looks at the x component, so it approximates the
/// in-plane tilt for small rolls and is not a general 3D alignment.
pub fn roll_from_up(up: &Vector3f) -> f32 {
    FRAC_PI_2 - up.x.clamp(-1.0, 1.0).acos()
}

/// Full placement of one overlay.
///
/// `previous_up` is the instance's up vector from the last cycle and is kept
/// when this frame's landmarks give a zero-length up vector.
pub fn place_overlay(
    key_points: &FaceKeyPoints,
    calibration: &Calibration,
    camera_z: f32,
    previous_up: Option<Vector3f>,
) -> Placement {
    let up = up_vector(key_points)
        .or(previous_up)
        .unwrap_or(DEFAULT_UP);

    Placement {
        position: anchor_position(&key_points.mid_eye, calibration, camera_z),
        up,
        scale: overlay_scale(key_points, calibration),
        // Half a turn of yaw so the model faces the camera
        rotation: EulerXyz::new(0.0, PI, roll_from_up(&up)),
    }
}

/// Viewports narrower than this show freshly loaded overlays at half scale
pub const NARROW_VIEWPORT_WIDTH: u32 = 480;

/// Transform of an overlay right after its asset loads, before any face is
/// seen: the asset offset and scale, halved on narrow viewports.
pub fn initial_transform(calibration: &Calibration, viewport_width: u32) -> ObjectTransform {
    let mut scale = calibration.scale_factor;
    if viewport_width < NARROW_VIEWPORT_WIDTH {
        scale /= 2.0;
    }
    let mut transform = ObjectTransform::from_position(calibration.offset);
    transform.set_uniform_scale(scale);
    transform
}
