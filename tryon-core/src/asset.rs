//! Selectable overlay assets and their calibration

use crate::point::Vector3f;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Format of an asset file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    /// JSON glTF with external or embedded buffers
    Gltf,
    /// Binary glTF
    Glb,
    /// OpenEXR environment map
    Exr,
}

impl AssetKind {
    /// Kinds that produce a model placed on faces
    pub fn is_model(self) -> bool {
        matches!(self, AssetKind::Gltf | AssetKind::Glb)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AssetKind::Gltf => "gltf",
            AssetKind::Glb => "glb",
            AssetKind::Exr => "exr",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "gltf" => Ok(AssetKind::Gltf),
            "glb" => Ok(AssetKind::Glb),
            "exr" => Ok(AssetKind::Exr),
            other => Err(crate::Error::UnsupportedFormat(format!("unknown asset kind: {other}"))),
        }
    }
}

fn default_scale() -> f32 {
    1.0
}

/// One selectable accessory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayAsset {
    pub id: String,
    #[serde(default)]
    pub label: String,
    /// Directory the model file is resolved against
    #[serde(default, alias = "model-path")]
    pub model_path: PathBuf,
    #[serde(alias = "model")]
    pub model_file: PathBuf,
    #[serde(alias = "type")]
    pub kind: AssetKind,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub z: f32,
    #[serde(default = "default_scale")]
    pub scale: f32,
    /// Vertical bias added after the y flip
    #[serde(default)]
    pub up: f32,
}

impl OverlayAsset {
    /// Full path of the model file
    pub fn path(&self) -> PathBuf {
        self.model_path.join(&self.model_file)
    }

    pub fn offset(&self) -> Vector3f {
        Vector3f::new(self.x, self.y, self.z)
    }

    pub fn calibration(&self) -> Calibration {
        Calibration {
            offset: self.offset(),
            up_bias: self.up,
            scale_factor: self.scale,
        }
    }
}

/// Per-asset constants applied on top of landmark geometry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    pub offset: Vector3f,
    pub up_bias: f32,
    pub scale_factor: f32,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            offset: Vector3f::zeros(),
            up_bias: 0.0,
            scale_factor: 1.0,
        }
    }
}
