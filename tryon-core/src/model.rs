//! Loaded 3D models
//!
//! A [`Model`] is a flattened glTF scene: every mesh primitive becomes a
//! [`ModelPart`] carrying its node's world matrix, so the renderer and the
//! exploded view can treat parts independently.

use crate::mesh::TriangleMesh;
use crate::point::{Point3f, Vector3f};
use nalgebra::Matrix4;

/// One drawable piece of a model
#[derive(Debug, Clone)]
pub struct ModelPart {
    pub name: String,
    pub mesh: TriangleMesh,
    /// Node world matrix within the model
    pub transform: Matrix4<f32>,
    /// Linear RGBA base colour from the part's material
    pub base_color: [f32; 4],
}

impl ModelPart {
    pub fn new(name: impl Into<String>, mesh: TriangleMesh) -> Self {
        Self {
            name: name.into(),
            mesh,
            transform: Matrix4::identity(),
            base_color: [0.8, 0.8, 0.8, 1.0],
        }
    }

    /// Vertices of the part in model space
    pub fn world_vertices(&self) -> impl Iterator<Item = Point3f> + '_ {
        self.mesh
            .vertices
            .iter()
            .map(move |v| self.transform.transform_point(v))
    }
}

/// A model assembled from one glTF/GLB file
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub name: String,
    pub parts: Vec<ModelPart>,
}

impl Model {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parts: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.parts.iter().all(|p| p.mesh.is_empty())
    }

    pub fn vertex_count(&self) -> usize {
        self.parts.iter().map(|p| p.mesh.vertex_count()).sum()
    }

    pub fn face_count(&self) -> usize {
        self.parts.iter().map(|p| p.mesh.face_count()).sum()
    }
}

/// Image-based environment lighting derived from an EXR map
#[derive(Debug, Clone, PartialEq)]
pub struct Environment {
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// Mean linear radiance of the map
    pub mean_radiance: Vector3f,
}

impl Environment {
    /// Ambient tint in `[0, 1]`, normalised by the brightest channel
    pub fn ambient_tint(&self) -> [f32; 3] {
        let max = self.mean_radiance.max();
        if max <= f32::EPSILON || !max.is_finite() {
            return [1.0, 1.0, 1.0];
        }
        let n = self.mean_radiance / max;
        [n.x, n.y, n.z]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_vertices_apply_part_transform() {
        let mut part = ModelPart::new(
            "lens",
            TriangleMesh::from_vertices_and_faces(vec![Point3f::new(1.0, 0.0, 0.0)], vec![]),
        );
        part.transform = Matrix4::new_translation(&Vector3f::new(0.0, 2.0, 0.0));
        let v: Vec<_> = part.world_vertices().collect();
        assert_eq!(v, vec![Point3f::new(1.0, 2.0, 0.0)]);
    }

    #[test]
    fn test_ambient_tint_of_black_map_is_white() {
        let env = Environment {
            name: "black".into(),
            width: 1,
            height: 1,
            mean_radiance: Vector3f::zeros(),
        };
        assert_eq!(env.ambient_tint(), [1.0, 1.0, 1.0]);
    }
}
