//! Asset loading for tryon
//!
//! This crate reads the files both viewers depend on: glTF/GLB models, EXR
//! environment maps, asset catalogs, recorded landmark sequences and the
//! layered viewer configuration.

pub mod catalog;
pub mod environment;
pub mod model;
pub mod records;
pub mod settings;

#[cfg(test)]
mod tests;

pub use catalog::AssetCatalog;
pub use environment::{load_environment, read_environment};
pub use model::{load_model, parse_model, read_model};
pub use records::{FaceRecord, FrameRecord, LandmarkRecord};
pub use settings::{parse_hex_color, InspectorConfig, KeyConfig, TryOnConfig, ViewerConfig};

use std::path::Path;
use tryon_core::{AssetKind, Error, Result};

/// Asset kind implied by a file extension
pub fn kind_from_path(path: impl AsRef<Path>) -> Result<AssetKind> {
    let path = path.as_ref();
    path.extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| Error::UnsupportedFormat(format!("no file extension: {}", path.display())))?
        .parse()
}
