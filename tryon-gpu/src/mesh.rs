//! Vertex formats and CPU-side geometry for the scene renderer

use bytemuck::{Pod, Zeroable};
use tryon_core::{ModelPart, Point3f};

/// Vertex of a lit model part
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl MeshVertex {
    pub fn new(position: [f32; 3], normal: [f32; 3]) -> Self {
        Self { position, normal }
    }

    /// Vertex buffer layout descriptor
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<MeshVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                // Position
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // Normal
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Vertex of unlit lines and points
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ColorVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl ColorVertex {
    pub fn new(position: [f32; 3], color: [f32; 3]) -> Self {
        Self { position, color }
    }

    pub fn from_point(point: &Point3f, color: [f32; 3]) -> Self {
        Self::new([point.x, point.y, point.z], color)
    }

    /// Vertex buffer layout descriptor
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ColorVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// CPU copy of one model part, ready for upload
#[derive(Debug, Clone, Default)]
pub struct GpuMesh {
    pub vertices: Vec<MeshVertex>,
    /// Triangle list indices
    pub indices: Vec<u32>,
    /// Line list indices over unique edges
    pub edge_indices: Vec<u32>,
    pub color: [f32; 4],
}

impl GpuMesh {
    /// Convert a model part in its local space; the part transform is applied
    /// by the renderer
    pub fn from_part(part: &ModelPart) -> Self {
        let normals = part.mesh.normals_or_computed();
        let vertices = part
            .mesh
            .vertices
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let normal = normals
                    .get(i)
                    .map(|n| [n.x, n.y, n.z])
                    .unwrap_or([0.0, 0.0, 1.0]);
                MeshVertex::new([v.x, v.y, v.z], normal)
            })
            .collect();

        let indices = part
            .mesh
            .faces
            .iter()
            .flat_map(|f| f.iter().map(|&i| i as u32))
            .collect();

        let edge_indices = part
            .mesh
            .edges()
            .into_iter()
            .flat_map(|[a, b]| [a as u32, b as u32])
            .collect();

        Self {
            vertices,
            indices,
            edge_indices,
            color: part.base_color,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.indices.is_empty()
    }
}

/// Line-list vertices for red, green and blue axes of length `size`
pub fn axes_vertices(size: f32) -> Vec<ColorVertex> {
    let size = size.max(0.0);
    let red = [1.0, 0.0, 0.0];
    let green = [0.0, 1.0, 0.0];
    let blue = [0.0, 0.0, 1.0];
    vec![
        ColorVertex::new([0.0, 0.0, 0.0], red),
        ColorVertex::new([size, 0.0, 0.0], red),
        ColorVertex::new([0.0, 0.0, 0.0], green),
        ColorVertex::new([0.0, size, 0.0], green),
        ColorVertex::new([0.0, 0.0, 0.0], blue),
        ColorVertex::new([0.0, 0.0, size], blue),
    ]
}

/// Point-list vertices in a single colour
pub fn point_vertices(points: &[Point3f], color: [f32; 3]) -> Vec<ColorVertex> {
    points
        .iter()
        .map(|p| ColorVertex::from_point(p, color))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tryon_core::TriangleMesh;

    fn quad_part() -> ModelPart {
        let mesh = TriangleMesh::from_vertices_and_faces(
            vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(1.0, 1.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        );
        let mut part = ModelPart::new("frame", mesh);
        part.base_color = [0.2, 0.3, 0.4, 1.0];
        part
    }

    #[test]
    fn test_part_conversion() {
        let gpu = GpuMesh::from_part(&quad_part());
        assert_eq!(gpu.vertices.len(), 4);
        assert_eq!(gpu.indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(gpu.color, [0.2, 0.3, 0.4, 1.0]);
        // Two triangles sharing a diagonal have five unique edges
        assert_eq!(gpu.edge_indices.len(), 10);
        for v in &gpu.vertices {
            assert!((v.normal[2].abs() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_empty_part_is_skipped() {
        let part = ModelPart::new("empty", TriangleMesh::new());
        assert!(GpuMesh::from_part(&part).is_empty());
    }

    #[test]
    fn test_axes_are_colored_lines() {
        let axes = axes_vertices(2.0);
        assert_eq!(axes.len(), 6);
        assert_eq!(axes[1].position, [2.0, 0.0, 0.0]);
        assert_eq!(axes[3].color, [0.0, 1.0, 0.0]);
        assert_eq!(axes[5].position, [0.0, 0.0, 2.0]);
    }

    #[test]
    fn test_vertex_layout_strides() {
        assert_eq!(MeshVertex::desc().array_stride, 24);
        assert_eq!(ColorVertex::desc().array_stride, 24);
    }
}
