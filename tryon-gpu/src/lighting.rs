//! Scene lights reduced to the uniform the shaders read
//!
//! The shaders light every surface with one ambient term plus one key light.
//! Directional, spot and point lights are folded into the key light: its
//! direction is the intensity-weighted mean of their directions as seen from
//! the origin, its strength the sum of their intensities. An environment map
//! adds ambient light tinted by its mean radiance.

use bytemuck::{Pod, Zeroable};
use nalgebra::Matrix4;
use tryon_core::{LightKind, Scene, Vector3f};

/// Ambient strength contributed by an environment map
pub const ENVIRONMENT_AMBIENT: f32 = 0.4;

/// Camera and lighting uniform, bound at group 0
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub view_pos: [f32; 4],
    /// xyz: direction towards the key light, w: its intensity
    pub light_dir: [f32; 4],
    /// rgb: light colour, w: ambient strength
    pub light_color: [f32; 4],
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self {
            view_proj: Matrix4::<f32>::identity().into(),
            view_pos: [0.0, 0.0, 0.0, 1.0],
            light_dir: [0.0, 0.0, 1.0, 0.0],
            light_color: [1.0, 1.0, 1.0, 1.0],
        }
    }
}

/// Per-draw uniform, bound at group 1
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ModelUniform {
    pub model: [[f32; 4]; 4],
    pub color: [f32; 4],
}

impl ModelUniform {
    pub fn new(model: Matrix4<f32>, color: [f32; 4]) -> Self {
        Self {
            model: model.into(),
            color,
        }
    }
}

/// Lighting derived from a scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    pub ambient: f32,
    pub key_direction: Vector3f,
    pub key_intensity: f32,
    pub color: [f32; 3],
}

impl Lighting {
    /// Reduce the scene lights; `camera_position` places camera-attached
    /// point lights
    pub fn from_scene(scene: &Scene, camera_position: &Vector3f) -> Self {
        let mut ambient = 0.0;
        let mut direction = Vector3f::zeros();
        let mut key_intensity = 0.0;
        let mut color = Vector3f::zeros();
        let mut color_weight = 0.0;

        for light in &scene.lights {
            let intensity = light.intensity.max(0.0);
            let light_color = Vector3f::from(light.color);
            let towards = match light.kind {
                LightKind::Ambient => {
                    ambient += intensity;
                    color += light_color * intensity;
                    color_weight += intensity;
                    continue;
                }
                LightKind::Directional { position } | LightKind::Spot { position } => position,
                LightKind::Point { position } => position.unwrap_or(*camera_position),
            };
            if let Some(unit) = towards.try_normalize(f32::EPSILON) {
                direction += unit * intensity;
            }
            key_intensity += intensity;
            color += light_color * intensity;
            color_weight += intensity;
        }

        let mut color = if color_weight > f32::EPSILON {
            color / color_weight
        } else {
            Vector3f::new(1.0, 1.0, 1.0)
        };

        if let Some(environment) = &scene.environment {
            ambient += ENVIRONMENT_AMBIENT;
            let tint = Vector3f::from(environment.ambient_tint());
            color.component_mul_assign(&tint);
        }

        let key_direction = direction
            .try_normalize(f32::EPSILON)
            .or_else(|| camera_position.try_normalize(f32::EPSILON))
            .unwrap_or_else(Vector3f::z);

        Self {
            ambient,
            key_direction,
            key_intensity,
            color: [color.x, color.y, color.z],
        }
    }

    /// Fill the lighting half of a camera uniform
    pub fn write_to(&self, uniform: &mut CameraUniform) {
        let d = self.key_direction;
        uniform.light_dir = [d.x, d.y, d.z, self.key_intensity];
        uniform.light_color = [self.color[0], self.color[1], self.color[2], self.ambient];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tryon_core::{Environment, Light};

    #[test]
    fn test_inspector_lights() {
        let mut scene = Scene::new();
        scene.lights = vec![
            Light::ambient(0.5),
            Light::directional(Vector3f::new(1.0, 1.0, 1.0), 1.0),
        ];
        let lighting = Lighting::from_scene(&scene, &Vector3f::new(0.0, 0.0, 2.0));
        assert_relative_eq!(lighting.ambient, 0.5);
        assert_relative_eq!(lighting.key_intensity, 1.0);
        let expected = 1.0 / 3.0_f32.sqrt();
        assert_relative_eq!(
            lighting.key_direction,
            Vector3f::new(expected, expected, expected),
            epsilon = 1e-6
        );
        assert_eq!(lighting.color, [1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_camera_point_light_follows_camera() {
        let mut scene = Scene::new();
        scene.lights = vec![Light::camera_point(0.8)];
        let lighting = Lighting::from_scene(&scene, &Vector3f::new(0.0, 0.0, 5.0));
        assert_relative_eq!(lighting.key_direction, Vector3f::z(), epsilon = 1e-6);
        assert_relative_eq!(lighting.ambient, 0.0);
    }

    #[test]
    fn test_opposing_spots_fall_back_to_camera_direction() {
        let mut scene = Scene::new();
        scene.lights = vec![
            Light::spot(Vector3f::new(-1.0, 0.0, 0.0), 0.3),
            Light::spot(Vector3f::new(1.0, 0.0, 0.0), 0.3),
        ];
        let lighting = Lighting::from_scene(&scene, &Vector3f::new(0.0, 3.0, 0.0));
        assert_relative_eq!(lighting.key_direction, Vector3f::y(), epsilon = 1e-6);
        assert_relative_eq!(lighting.key_intensity, 0.6, epsilon = 1e-6);
    }

    #[test]
    fn test_environment_tints_ambient() {
        let mut scene = Scene::new();
        scene.environment = Some(Environment {
            name: "studio".into(),
            width: 2,
            height: 1,
            mean_radiance: Vector3f::new(2.0, 1.0, 0.5),
        });
        let lighting = Lighting::from_scene(&scene, &Vector3f::zeros());
        assert_relative_eq!(lighting.ambient, ENVIRONMENT_AMBIENT);
        assert_eq!(lighting.color, [1.0, 0.5, 0.25]);
        assert_eq!(lighting.key_direction, Vector3f::z());

        let mut uniform = CameraUniform::default();
        lighting.write_to(&mut uniform);
        assert_eq!(uniform.light_color, [1.0, 0.5, 0.25, ENVIRONMENT_AMBIENT]);
    }

    #[test]
    fn test_uniform_sizes_are_16_byte_aligned() {
        assert_eq!(std::mem::size_of::<CameraUniform>() % 16, 0);
        assert_eq!(std::mem::size_of::<ModelUniform>() % 16, 0);
    }
}
