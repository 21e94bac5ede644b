//! Algorithms for tryon
//!
//! Landmark-driven overlay placement, the per-face instance lifecycle, the
//! inspector's exploded view and camera framing for both viewers.

pub mod explode;
pub mod framing;
pub mod lifecycle;
pub mod placement;

pub use explode::*;
pub use framing::*;
pub use lifecycle::*;
pub use placement::*;
