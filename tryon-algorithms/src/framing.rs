//! Camera framing for the inspector and the try-on views

use nalgebra::{Matrix4, Perspective3};
use tryon_core::{Point3f, Vector3f};

/// Vertical field of view used by every perspective view, in degrees
pub const DEFAULT_FOV_DEGREES: f32 = 75.0;

/// Camera distance of the model inspector
pub const INSPECTOR_CAMERA_Z: f32 = 2.0;

/// Camera distance of the still-image try-on view
pub const IMAGE_CAMERA_Z: f32 = 1.5;

/// Where a perspective camera sits and what it looks at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Point3f,
    pub target: Point3f,
    pub up: Vector3f,
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl CameraPose {
    /// Camera on the +z axis looking at the origin
    pub fn on_axis(z: f32) -> Self {
        Self {
            position: Point3f::new(0.0, 0.0, z),
            target: Point3f::origin(),
            up: Vector3f::y(),
            fov_degrees: DEFAULT_FOV_DEGREES,
            near: 0.1,
            far: 1000.0,
        }
    }

    /// Render-space z the placement math pushes overlays behind
    pub fn depth(&self) -> f32 {
        self.position.z
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Matrix4<f32> {
        let aspect = if aspect.is_finite() && aspect > 0.0 { aspect } else { 1.0 };
        Perspective3::new(aspect, self.fov_degrees.to_radians(), self.near, self.far).into_inner()
    }
}

/// Inspector camera: fov 75° at z = 2
pub fn inspector_camera() -> CameraPose {
    CameraPose::on_axis(INSPECTOR_CAMERA_Z)
}

/// Still-image try-on camera: fov 75° at z = 1.5
pub fn image_camera() -> CameraPose {
    CameraPose::on_axis(IMAGE_CAMERA_Z)
}

/// Live-video camera registered with frame pixels.
///
/// The camera sits at `(w/2, −h/2, d)` looking down −z. Overlays land on the
/// plane `z = −d`, which is `2d` away, and `d` is chosen so that plane spans
/// exactly `h` pixels vertically. A landmark at pixel `(x, y)` then projects
/// onto the same pixel of the frame background.
pub fn video_camera(width: u32, height: u32, fov_degrees: f32) -> CameraPose {
    let half_w = width as f32 / 2.0;
    let half_h = height as f32 / 2.0;
    let half_fov = (fov_degrees.clamp(1.0, 179.0) / 2.0).to_radians();
    let depth = (half_h / (2.0 * half_fov.tan())).max(f32::EPSILON);

    CameraPose {
        position: Point3f::new(half_w, -half_h, depth),
        target: Point3f::new(half_w, -half_h, -depth),
        up: Vector3f::y(),
        fov_degrees,
        near: 0.1,
        far: depth * 4.0 + 1000.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    #[test]
    fn test_fixed_cameras() {
        assert_eq!(inspector_camera().position, Point3f::new(0.0, 0.0, 2.0));
        assert_eq!(image_camera().depth(), 1.5);
        assert_eq!(image_camera().fov_degrees, 75.0);
    }

    #[test]
    fn test_video_camera_registers_pixels() {
        let (w, h) = (640, 480);
        let pose = video_camera(w, h, 45.0);
        let view_proj = pose.projection_matrix(w as f32 / h as f32) * pose.view_matrix();

        // Pixel (x, y) placed on the overlay plane
        let to_ndc = |x: f32, y: f32| {
            let p = view_proj.transform_point(&Point3::new(x, -y, -pose.depth()));
            (p.x, p.y)
        };

        let (cx, cy) = to_ndc(320.0, 240.0);
        assert_relative_eq!(cx, 0.0, epsilon = 1e-4);
        assert_relative_eq!(cy, 0.0, epsilon = 1e-4);

        let (lx, ty) = to_ndc(0.0, 0.0);
        assert_relative_eq!(lx, -1.0, epsilon = 1e-3);
        assert_relative_eq!(ty, 1.0, epsilon = 1e-3);

        let (rx, by) = to_ndc(640.0, 480.0);
        assert_relative_eq!(rx, 1.0, epsilon = 1e-3);
        assert_relative_eq!(by, -1.0, epsilon = 1e-3);
    }

    #[test]
    fn test_degenerate_aspect_falls_back() {
        let m = inspector_camera().projection_matrix(0.0);
        assert!(m.iter().all(|v| v.is_finite()));
    }
}
