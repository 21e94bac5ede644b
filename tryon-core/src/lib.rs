//! Core data structures and traits for tryon
//!
//! This crate provides the fundamental types shared by the model inspector and
//! the virtual try-on viewer: landmark records, meshes, loaded models, object
//! transforms and the scene graph the renderer draws.

pub mod asset;
pub mod error;
pub mod landmarks;
pub mod mesh;
pub mod model;
pub mod point;
pub mod scene;
pub mod traits;
pub mod transform;

pub use asset::*;
pub use error::*;
pub use landmarks::*;
pub use mesh::*;
pub use model::*;
pub use point::*;
pub use scene::*;
pub use traits::*;
pub use transform::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Matrix4, Point3, UnitQuaternion, Vector3};
