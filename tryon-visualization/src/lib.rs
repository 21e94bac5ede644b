//! Windows and input for the tryon viewers
//!
//! - [`inspector`]: the GLB model inspector
//! - [`tryon_app`]: the virtual try-on viewer
//! - [`camera`]: orbit camera with damping and mouse controls
//! - [`bindings`]: configurable keyboard shortcuts

pub mod bindings;
pub mod camera;
pub mod inspector;
pub mod tryon_app;

pub use bindings::{InspectorCommand, KeyBinding, KeyMap, TryOnCommand};
pub use camera::{Camera, OrbitControls};
pub use inspector::{inspector_pose, run_inspector, InspectorState};
pub use tryon_app::{open_sources, run_headless, run_tryon, TryOnController};
