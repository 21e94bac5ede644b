//! Orbit camera with damping

use nalgebra::{Matrix4, Perspective3, Point3, Vector3};
use tryon_algorithms::CameraPose;
use winit::dpi::PhysicalPosition;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

/// Radians of orbit per pixel dragged
const ORBIT_SPEED: f32 = 0.005;

/// Zoom fraction per wheel line
const ZOOM_SPEED: f32 = 0.1;

/// Closest the camera may get to its target
const MIN_DISTANCE: f32 = 0.05;

/// Keeps the polar angle away from the poles
const POLAR_EPSILON: f32 = 1e-3;

/// Below this the remaining orbit motion is dropped
const REST_THRESHOLD: f32 = 1e-5;

/// A perspective camera orbiting a target.
///
/// With damping, [`Camera::orbit`] only queues motion: each [`Camera::update`]
/// applies `damping` of what is left, so the camera glides to a stop and the
/// total rotation still equals the input.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    /// Vertical field of view in radians
    pub fov: f32,
    pub aspect_ratio: f32,
    pub near: f32,
    pub far: f32,
    pub damping: f32,
    home: CameraPose,
    pending_azimuth: f32,
    pending_polar: f32,
}

impl Camera {
    pub fn from_pose(pose: &CameraPose, aspect_ratio: f32, damping: f32) -> Self {
        Self {
            position: pose.position,
            target: pose.target,
            up: pose.up,
            fov: pose.fov_degrees.to_radians(),
            aspect_ratio,
            near: pose.near,
            far: pose.far,
            damping: damping.clamp(0.0, 1.0),
            home: *pose,
            pending_azimuth: 0.0,
            pending_polar: 0.0,
        }
    }

    /// Current placement as a pose
    pub fn pose(&self) -> CameraPose {
        CameraPose {
            position: self.position,
            target: self.target,
            up: self.up,
            fov_degrees: self.fov.to_degrees(),
            near: self.near,
            far: self.far,
        }
    }

    /// Get the view matrix
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.up)
    }

    /// Get the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        let aspect = if self.aspect_ratio.is_finite() && self.aspect_ratio > 0.0 {
            self.aspect_ratio
        } else {
            1.0
        };
        Perspective3::new(aspect, self.fov, self.near, self.far).into_inner()
    }

    pub fn set_aspect_ratio(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect_ratio = width as f32 / height as f32;
        }
    }

    /// Move towards the target; never closer than a minimum distance
    pub fn move_forward(&mut self, distance: f32) {
        let offset = self.position - self.target;
        let radius = offset.norm();
        if radius <= f32::EPSILON {
            return;
        }
        let new_radius = (radius - distance).max(MIN_DISTANCE);
        self.position = self.target + offset * (new_radius / radius);
    }

    /// Zoom by a scroll amount; positive zooms in
    pub fn zoom(&mut self, delta: f32) {
        let radius = (self.position - self.target).norm();
        self.move_forward(radius * delta);
    }

    /// Rotate around the target by azimuth and polar angles in radians
    pub fn orbit(&mut self, horizontal: f32, vertical: f32) {
        if self.damping > 0.0 {
            self.pending_azimuth += horizontal;
            self.pending_polar += vertical;
        } else {
            self.rotate(horizontal, vertical);
        }
    }

    /// Shift camera and target in the view plane
    pub fn pan(&mut self, horizontal: f32, vertical: f32) {
        let forward = self.target - self.position;
        let radius = forward.norm();
        let Some(forward) = forward.try_normalize(f32::EPSILON) else {
            return;
        };
        let Some(right) = forward.cross(&self.up).try_normalize(f32::EPSILON) else {
            return;
        };
        let up = right.cross(&forward);
        let shift = (-right * horizontal + up * vertical) * radius;
        self.position += shift;
        self.target += shift;
    }

    /// Advance damped motion by one frame; returns whether the camera moved
    pub fn update(&mut self) -> bool {
        if self.damping <= 0.0 {
            return false;
        }
        if self.pending_azimuth.abs() < REST_THRESHOLD
            && self.pending_polar.abs() < REST_THRESHOLD
        {
            self.pending_azimuth = 0.0;
            self.pending_polar = 0.0;
            return false;
        }
        let azimuth = self.pending_azimuth * self.damping;
        let polar = self.pending_polar * self.damping;
        self.pending_azimuth -= azimuth;
        self.pending_polar -= polar;
        self.rotate(azimuth, polar);
        true
    }

    fn rotate(&mut self, azimuth: f32, polar: f32) {
        let offset = self.position - self.target;
        let radius = offset.norm();
        if radius <= f32::EPSILON {
            return;
        }
        let theta = offset.x.atan2(offset.z) - azimuth;
        let phi = ((offset.y / radius).clamp(-1.0, 1.0).acos() - polar)
            .clamp(POLAR_EPSILON, std::f32::consts::PI - POLAR_EPSILON);

        self.position = self.target
            + Vector3::new(
                radius * phi.sin() * theta.sin(),
                radius * phi.cos(),
                radius * phi.sin() * theta.cos(),
            );
    }

    /// Back to the pose the camera was created with
    pub fn reset(&mut self) {
        let aspect_ratio = self.aspect_ratio;
        *self = Self::from_pose(&self.home, aspect_ratio, self.damping);
    }

    pub fn is_moving(&self) -> bool {
        self.pending_azimuth != 0.0 || self.pending_polar != 0.0
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::from_pose(&tryon_algorithms::inspector_camera(), 16.0 / 9.0, 0.0)
    }
}

/// Mouse orbit controls: left drag orbits, right drag pans, the wheel zooms
#[derive(Debug, Clone, Default)]
pub struct OrbitControls {
    pub enabled: bool,
    last: Option<PhysicalPosition<f64>>,
    rotating: bool,
    panning: bool,
}

impl OrbitControls {
    pub fn new() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }

    /// Feed a window event; returns whether the camera changed
    pub fn handle(
        &mut self,
        event: &WindowEvent,
        camera: &mut Camera,
        viewport_height: u32,
    ) -> bool {
        match event {
            WindowEvent::MouseInput { state, button, .. } => {
                let pressed = *state == ElementState::Pressed;
                match button {
                    MouseButton::Left => self.rotating = pressed,
                    MouseButton::Right => self.panning = pressed,
                    _ => {}
                }
                false
            }
            WindowEvent::CursorMoved { position, .. } => {
                let moved = match self.last {
                    Some(last) if self.enabled => {
                        let dx = (position.x - last.x) as f32;
                        let dy = (position.y - last.y) as f32;
                        if self.rotating {
                            camera.orbit(dx * ORBIT_SPEED, dy * ORBIT_SPEED);
                            true
                        } else if self.panning {
                            let height = viewport_height.max(1) as f32;
                            camera.pan(dx / height, dy / height);
                            true
                        } else {
                            false
                        }
                    }
                    _ => false,
                };
                self.last = Some(*position);
                moved
            }
            WindowEvent::MouseWheel { delta, .. } if self.enabled => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
                };
                camera.zoom(lines * ZOOM_SPEED);
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_orbit_keeps_distance() {
        let mut camera = Camera::default();
        camera.orbit(0.7, 0.3);
        assert_relative_eq!((camera.position - camera.target).norm(), 2.0, epsilon = 1e-5);
        assert!(camera.position.x.abs() > 0.1);
    }

    #[test]
    fn test_damped_orbit_glides_to_full_rotation() {
        let mut damped = Camera::from_pose(&tryon_algorithms::inspector_camera(), 1.0, 0.05);
        let mut direct = Camera::from_pose(&tryon_algorithms::inspector_camera(), 1.0, 0.0);
        damped.orbit(0.5, 0.0);
        direct.orbit(0.5, 0.0);

        assert!(damped.update());
        assert!(damped.position.x.abs() < direct.position.x.abs());

        let mut frames = 1;
        while damped.update() {
            frames += 1;
            assert!(frames < 10_000);
        }
        assert!(!damped.is_moving());
        assert_relative_eq!(damped.position, direct.position, epsilon = 1e-3);
    }

    #[test]
    fn test_polar_angle_is_clamped() {
        let mut camera = Camera::default();
        camera.orbit(0.0, 10.0);
        assert!(camera.position.y > 1.99);
        assert!(camera.position.coords.iter().all(|v| v.is_finite()));
        assert_relative_eq!((camera.position - camera.target).norm(), 2.0, epsilon = 1e-5);
    }

    #[test]
    fn test_zoom_and_pan() {
        let mut camera = Camera::default();
        camera.zoom(0.5);
        assert_relative_eq!(camera.position.z, 1.0, epsilon = 1e-5);
        camera.zoom(10.0);
        assert_relative_eq!(camera.position.z, MIN_DISTANCE, epsilon = 1e-5);

        let mut camera = Camera::default();
        camera.pan(0.1, 0.0);
        assert_relative_eq!(camera.position.x, camera.target.x, epsilon = 1e-6);
        assert!(camera.target.x.abs() > 0.0);
    }

    #[test]
    fn test_reset_restores_home() {
        let mut camera = Camera::default();
        camera.set_aspect_ratio(800, 400);
        camera.orbit(1.0, 0.5);
        camera.zoom(0.3);
        camera.reset();
        let home = tryon_algorithms::inspector_camera();
        assert_eq!(camera.position, home.position);
        assert_eq!(camera.target, home.target);
        assert_relative_eq!(camera.pose().fov_degrees, home.fov_degrees, epsilon = 1e-4);
        assert_relative_eq!(camera.aspect_ratio, 2.0);
    }
}
