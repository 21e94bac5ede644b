//! # tryon GPU
//!
//! wgpu rendering for the model inspector and the try-on viewer.
//!
//! [`SceneRenderer`] draws a [`tryon_core::Scene`]: model parts lit by the
//! scene lights (or as wireframes), landmark points, axes, and optionally a
//! video frame filling the viewport behind them.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tryon_gpu::{RenderConfig, SceneRenderer, ViewParams};
//!
//! async fn example(
//!     window: Arc<winit::window::Window>,
//!     scene: &tryon_core::Scene,
//!     view: ViewParams,
//! ) -> tryon_core::Result<()> {
//!     let size = window.inner_size();
//!     let mut renderer =
//!         SceneRenderer::new(window, size.width, size.height, RenderConfig::default()).await?;
//!     renderer.render(scene, &view, None)?;
//!     Ok(())
//! }
//! ```

pub mod device;
pub mod lighting;
pub mod mesh;
pub mod renderer;

pub use device::GpuContext;
pub use lighting::{CameraUniform, Lighting, ModelUniform};
pub use mesh::{axes_vertices, point_vertices, ColorVertex, GpuMesh, MeshVertex};
pub use renderer::{clear_color, part_matrix, RenderConfig, SceneRenderer, ViewParams};
