//! Recorded landmark files
//!
//! A record holds the detector output for a sequence of frames:
//! `{ "frames": [ { "faces": [ { "mesh": [[x, y, z], ...] } ] } ] }`.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;
use tryon_core::{Error, Face, Point3f, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FaceRecord {
    pub mesh: Vec<[f32; 3]>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    #[serde(default)]
    pub faces: Vec<FaceRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkRecord {
    pub frames: Vec<FrameRecord>,
}

impl From<&FaceRecord> for Face {
    fn from(record: &FaceRecord) -> Self {
        Face::new(record.mesh.iter().map(|&p| Point3f::from(p)).collect())
    }
}

impl From<&Face> for FaceRecord {
    fn from(face: &Face) -> Self {
        Self {
            mesh: face.mesh.iter().map(|p| [p.x, p.y, p.z]).collect(),
        }
    }
}

impl FrameRecord {
    pub fn faces(&self) -> Vec<Face> {
        self.faces.iter().map(Face::from).collect()
    }
}

impl LandmarkRecord {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::InvalidData(format!("landmark record: {e}")))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::InvalidData(format!("landmark record: {e}")))
    }

    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let record = Self::from_json(&std::fs::read_to_string(path)?)?;
        info!(path = %path.display(), frames = record.frames.len(), "landmark record loaded");
        Ok(record)
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = tokio::fs::read_to_string(path.as_ref()).await?;
        Self::from_json(&json)
    }

    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Faces of every frame, in order
    pub fn into_frames(self) -> Vec<Vec<Face>> {
        self.frames.iter().map(FrameRecord::faces).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_record() {
        let json = r#"{ "frames": [
            { "faces": [ { "mesh": [[1, 2, 3], [4.5, 5, -6]] } ] },
            { "faces": [] },
            {}
        ] }"#;
        let frames = LandmarkRecord::from_json(json).unwrap().into_frames();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0][0].mesh[1], Point3f::new(4.5, 5.0, -6.0));
        assert!(frames[1].is_empty() && frames[2].is_empty());
    }

    #[test]
    fn test_malformed_point_is_invalid_data() {
        let json = r#"{ "frames": [ { "faces": [ { "mesh": [[1, 2]] } ] } ] }"#;
        assert!(matches!(LandmarkRecord::from_json(json), Err(Error::InvalidData(_))));
    }
}
