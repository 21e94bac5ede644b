//! Face-landmark providers
//!
//! The landmark model is external: given a frame it returns zero or more
//! faces, each a list of 3D landmarks in frame-pixel space. Loading the model
//! and running it are both suspension points.

use crate::frame::Frame;
use std::path::PathBuf;
use tracing::info;
use tryon_core::{Error, Face, Result};
use tryon_io::LandmarkRecord;

/// A loaded face-landmark model
#[allow(async_fn_in_trait)]
pub trait LandmarkProvider {
    /// Detect faces in one frame
    async fn estimate_faces(&mut self, frame: &Frame) -> Result<Vec<Face>>;
}

/// Loads a [`LandmarkProvider`]; failures surface as [`Error::ModelLoad`]
#[allow(async_fn_in_trait)]
pub trait LandmarkModelLoader {
    type Provider: LandmarkProvider;

    async fn load(&self) -> Result<Self::Provider>;
}

/// Plays back recorded detector output, indexed by frame number
#[derive(Debug, Clone, Default)]
pub struct ReplayProvider {
    frames: Vec<Vec<Face>>,
}

impl ReplayProvider {
    pub fn new(frames: Vec<Vec<Face>>) -> Self {
        Self { frames }
    }

    pub fn from_record(record: LandmarkRecord) -> Self {
        Self::new(record.into_frames())
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Faces recorded for a frame number; the recording loops
    pub fn faces_for(&self, index: u64) -> &[Face] {
        if self.frames.is_empty() {
            return &[];
        }
        &self.frames[(index % self.frames.len() as u64) as usize]
    }
}

impl LandmarkProvider for ReplayProvider {
    async fn estimate_faces(&mut self, frame: &Frame) -> Result<Vec<Face>> {
        Ok(self.faces_for(frame.index).to_vec())
    }
}

/// Loads a [`ReplayProvider`] from a landmark record file
#[derive(Debug, Clone)]
pub struct ReplayLoader {
    path: PathBuf,
}

impl ReplayLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl LandmarkModelLoader for ReplayLoader {
    type Provider = ReplayProvider;

    async fn load(&self) -> Result<ReplayProvider> {
        let record = LandmarkRecord::load(&self.path)
            .await
            .map_err(|e| Error::ModelLoad(format!("{}: {e}", self.path.display())))?;
        info!(
            path = %self.path.display(),
            frames = record.frames.len(),
            "landmark recording loaded"
        );
        Ok(ReplayProvider::from_record(record))
    }
}
