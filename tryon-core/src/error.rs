//! Error types for tryon

use thiserror::Error;

/// Main error type for tryon operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to load asset {path}: {reason}")]
    AssetLoad { path: String, reason: String },

    #[error("Failed to load face landmark model: {0}")]
    ModelLoad(String),

    #[error("Landmark inference failed: {0}")]
    Inference(String),

    #[error("GPU error: {0}")]
    Gpu(String),

    #[error("Visualization error: {0}")]
    Visualization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl Error {
    /// Build an asset-load error for the given path
    pub fn asset_load(path: impl AsRef<std::path::Path>, reason: impl ToString) -> Self {
        Error::AssetLoad {
            path: path.as_ref().display().to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Result type alias for tryon operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(feature = "gpu")]
impl From<wgpu::SurfaceError> for Error {
    fn from(e: wgpu::SurfaceError) -> Self {
        Error::Gpu(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_load_message_names_path() {
        let err = Error::asset_load("glasses/01/scene.gltf", "file not found");
        let message = err.to_string();
        assert!(message.contains("glasses/01/scene.gltf"));
        assert!(message.contains("file not found"));
    }
}
