//! glTF / GLB model loading
//!
//! Every triangle primitive of the default scene becomes one [`ModelPart`]
//! carrying its node's world matrix and its material's base colour. Texture
//! images are not decoded.

use nalgebra::Matrix4;
use std::path::Path;
use tokio::io::AsyncReadExt;
use tracing::{debug, info};
use tryon_core::{Error, Model, ModelPart, Point3f, Result, TriangleMesh, Vector3f};

/// glTF extension for Draco mesh compression, which is not decoded
pub const DRACO_EXTENSION: &str = "KHR_draco_mesh_compression";

const READ_CHUNK: usize = 64 * 1024;

/// Percentage of `total` bytes read; `None` when the total is unknown
pub fn progress_percent(read: u64, total: u64) -> Option<u32> {
    if total == 0 {
        return None;
    }
    Some((read.saturating_mul(100) / total).min(100) as u32)
}

/// Read a file, logging load progress as a percentage of bytes read
pub async fn read_with_progress(path: &Path) -> Result<Vec<u8>> {
    let mut file = tokio::fs::File::open(path)
        .await
        .map_err(|e| Error::asset_load(path, e))?;
    let total = file.metadata().await.map(|m| m.len()).unwrap_or(0);

    let mut bytes = Vec::with_capacity(total as usize);
    let mut chunk = vec![0u8; READ_CHUNK];
    let mut reported = 0;
    loop {
        let n = file.read(&mut chunk).await.map_err(|e| Error::asset_load(path, e))?;
        if n == 0 {
            break;
        }
        bytes.extend_from_slice(&chunk[..n]);
        if let Some(percent) = progress_percent(bytes.len() as u64, total) {
            if percent >= reported + 10 || (percent == 100 && reported < 100) {
                info!(path = %path.display(), "{percent}% loaded");
                reported = percent;
            }
        }
    }
    Ok(bytes)
}

/// Load a `.gltf` or `.glb` file.
///
/// The file is read asynchronously; parsing runs on the blocking pool.
pub async fn load_model(path: impl AsRef<Path>) -> Result<Model> {
    let path = path.as_ref().to_path_buf();
    let bytes = read_with_progress(&path).await?;

    let task_path = path.clone();
    let model = tokio::task::spawn_blocking(move || {
        let base = task_path.parent().map(Path::to_path_buf);
        parse_model(&model_name(&task_path), base.as_deref(), &bytes)
    })
    .await
    .map_err(|e| Error::asset_load(&path, e))??;

    info!(
        path = %path.display(),
        parts = model.parts.len(),
        vertices = model.vertex_count(),
        faces = model.face_count(),
        "model loaded"
    );
    Ok(model)
}

/// Load a model synchronously
pub fn read_model(path: impl AsRef<Path>) -> Result<Model> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|e| Error::asset_load(path, e))?;
    parse_model(&model_name(path), path.parent(), &bytes)
}

fn model_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".to_string())
}

/// Whether a document relies on Draco mesh compression
pub fn uses_draco(document: &gltf::Document) -> bool {
    document
        .extensions_used()
        .chain(document.extensions_required())
        .any(|ext| ext == DRACO_EXTENSION)
}

/// Parse glTF JSON or GLB bytes into a [`Model`].
///
/// `base` is the directory external buffer URIs resolve against.
pub fn parse_model(name: &str, base: Option<&Path>, bytes: &[u8]) -> Result<Model> {
    let unchecked = gltf::Gltf::from_slice_without_validation(bytes)
        .map_err(|e| Error::asset_load(name, e))?;
    if uses_draco(&unchecked.document) {
        return Err(Error::UnsupportedFormat(format!(
            "{name}: Draco-compressed meshes are not supported"
        )));
    }

    let gltf::Gltf { document, blob } =
        gltf::Gltf::from_slice(bytes).map_err(|e| Error::asset_load(name, e))?;
    let buffers =
        gltf::import_buffers(&document, base, blob).map_err(|e| Error::asset_load(name, e))?;

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| Error::asset_load(name, "file contains no scene"))?;

    let mut model = Model::new(name);
    for node in scene.nodes() {
        collect_node(&node, &Matrix4::identity(), &buffers, &mut model)?;
    }
    Ok(model)
}

fn collect_node(
    node: &gltf::Node,
    parent: &Matrix4<f32>,
    buffers: &[gltf::buffer::Data],
    model: &mut Model,
) -> Result<()> {
    let world = parent * Matrix4::from(node.transform().matrix());

    if let Some(mesh) = node.mesh() {
        let mesh_name = mesh.name().or(node.name()).map(str::to_string);
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                debug!(mode = ?primitive.mode(), "skipping non-triangle primitive");
                continue;
            }
            let name = match &mesh_name {
                Some(n) => format!("{n}.{}", primitive.index()),
                None => format!("mesh{}.{}", mesh.index(), primitive.index()),
            };
            let mut part = ModelPart::new(name, read_primitive(&primitive, buffers)?);
            part.transform = world;
            part.base_color = primitive.material().pbr_metallic_roughness().base_color_factor();
            model.parts.push(part);
        }
    }

    for child in node.children() {
        collect_node(&child, &world, buffers, model)?;
    }
    Ok(())
}

fn read_primitive(
    primitive: &gltf::Primitive,
    buffers: &[gltf::buffer::Data],
) -> Result<TriangleMesh> {
    let reader =
        primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));

    let vertices: Vec<Point3f> = reader
        .read_positions()
        .ok_or_else(|| Error::InvalidData("primitive has no positions".into()))?
        .map(Point3f::from)
        .collect();

    // Non-indexed primitives list their vertices in triangle order
    let indices: Vec<usize> = match reader.read_indices() {
        Some(indices) => indices.into_u32().map(|i| i as usize).collect(),
        None => (0..vertices.len()).collect(),
    };
    if let Some(bad) = indices.iter().find(|&&i| i >= vertices.len()) {
        return Err(Error::InvalidData(format!(
            "index {bad} out of range for {} vertices",
            vertices.len()
        )));
    }
    let faces = indices.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect();

    let mut mesh = TriangleMesh::from_vertices_and_faces(vertices, faces);
    if let Some(normals) = reader.read_normals() {
        mesh.set_normals(normals.map(Vector3f::from).collect());
    }
    Ok(mesh)
}
