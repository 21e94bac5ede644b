//! Face landmark records
//!
//! A [`Face`] is the ordered landmark list a face-landmark model produces for
//! one detected face. Index positions follow the model's fixed topology; the
//! defaults in [`KeyPointIndices`] are those of the 468-point MediaPipe face
//! mesh.

use crate::point::Point3f;
use serde::{Deserialize, Serialize};

/// Number of landmarks in the base face mesh topology
pub const FACE_MESH_LANDMARKS: usize = 468;

/// Number of landmarks when iris refinement is enabled
pub const FACE_MESH_LANDMARKS_WITH_IRISES: usize = 478;

/// One detected face: landmarks in frame-pixel space
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Face {
    pub mesh: Vec<Point3f>,
}

impl Face {
    pub fn new(mesh: Vec<Point3f>) -> Self {
        Self { mesh }
    }

    /// Number of landmarks
    pub fn len(&self) -> usize {
        self.mesh.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mesh.is_empty()
    }

    /// Landmark at a topology index
    pub fn landmark(&self, index: usize) -> Option<&Point3f> {
        self.mesh.get(index)
    }

    /// Extract the four points used for overlay placement.
    ///
    /// Returns `None` when the face does not carry one of the requested
    /// indices, e.g. a truncated record from a different topology.
    pub fn key_points(&self, indices: &KeyPointIndices) -> Option<FaceKeyPoints> {
        Some(FaceKeyPoints {
            mid_eye: *self.landmark(indices.mid_eye)?,
            left_eye: *self.landmark(indices.left_eye)?,
            right_eye: *self.landmark(indices.right_eye)?,
            nose_bottom: *self.landmark(indices.nose_bottom)?,
        })
    }
}

/// Topology indices of the landmarks overlay placement reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyPointIndices {
    pub mid_eye: usize,
    pub left_eye: usize,
    pub right_eye: usize,
    pub nose_bottom: usize,
}

impl Default for KeyPointIndices {
    fn default() -> Self {
        Self {
            mid_eye: 168,
            left_eye: 143,
            right_eye: 372,
            nose_bottom: 2,
        }
    }
}

/// The four named landmarks of one face
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceKeyPoints {
    pub mid_eye: Point3f,
    pub left_eye: Point3f,
    pub right_eye: Point3f,
    pub nose_bottom: Point3f,
}
