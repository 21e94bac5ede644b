//! Face tracking for the tryon viewer
//!
//! Frame sources, face-landmark providers, the cooperative detection loop and
//! the session object the loop drives.

pub mod detection;
pub mod frame;
pub mod provider;
pub mod session;

pub use detection::{CycleOutcome, DetectionLoop, FaceSink, LoopHandle, LoopState};
pub use frame::{BlankFrames, Frame, FrameSource, ImageSequence, StillImage};
pub use provider::{LandmarkModelLoader, LandmarkProvider, ReplayLoader, ReplayProvider};
pub use session::{SourceMode, TryOnSession};
