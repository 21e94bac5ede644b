//! EXR environment maps

use nalgebra::Vector3;
use std::path::Path;
use tracing::info;
use tryon_core::{Environment, Error, Result, Vector3f};

/// Mean linear radiance of an RGB float image; non-finite texels are skipped
pub fn mean_radiance(image: &image::Rgb32FImage) -> Vector3f {
    let mut sum = Vector3::<f64>::zeros();
    let mut count = 0u64;
    for pixel in image.pixels() {
        let [r, g, b] = pixel.0;
        if r.is_finite() && g.is_finite() && b.is_finite() {
            sum += Vector3::new(r as f64, g as f64, b as f64);
            count += 1;
        }
    }
    if count == 0 {
        return Vector3f::zeros();
    }
    (sum / count as f64).cast::<f32>()
}

/// Decode an environment map from an EXR file
pub fn read_environment(path: impl AsRef<Path>) -> Result<Environment> {
    let path = path.as_ref();
    let image = image::open(path)
        .map_err(|e| Error::asset_load(path, e))?
        .into_rgb32f();
    let environment = Environment {
        name: path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default(),
        width: image.width(),
        height: image.height(),
        mean_radiance: mean_radiance(&image),
    };
    info!(
        path = %path.display(),
        width = environment.width,
        height = environment.height,
        "environment loaded"
    );
    Ok(environment)
}

/// Decode an environment map on the blocking pool
pub async fn load_environment(path: impl AsRef<Path>) -> Result<Environment> {
    let path = path.as_ref().to_path_buf();
    let task_path = path.clone();
    tokio::task::spawn_blocking(move || read_environment(task_path))
        .await
        .map_err(|e| Error::asset_load(&path, e))?
}
