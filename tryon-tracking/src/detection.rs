//! The detection loop
//!
//! ```text
//! Idle ──enable──▶ Loading ──ok──▶ Active ──disable──▶ Idle
//!                     │                │
//!                     └──err──▶ Error ◀┘ inference error
//! ```
//!
//! While active and armed, each cycle takes one frame, awaits inference and,
//! only if the loop is still armed, hands the faces to a [`FaceSink`].
//! Disarming cancels the next cycle; a result that arrives after disarming is
//! dropped.

use crate::frame::{Frame, FrameSource};
use crate::provider::{LandmarkModelLoader, LandmarkProvider};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};
use tryon_core::{Error, Face, Result};

/// Receives each cycle's detection result
pub trait FaceSink {
    fn apply_faces(&mut self, frame: &Frame, faces: &[Face]);

    /// Drop every overlay instance
    fn clear_overlays(&mut self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Loading,
    Active,
    /// Loading or inference failed; the message is shown to the user
    Error(String),
}

/// Cloneable switch that cancels the loop from anywhere
#[derive(Debug, Clone, Default)]
pub struct LoopHandle {
    armed: Arc<AtomicBool>,
}

impl LoopHandle {
    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::Acquire)
    }

    pub fn disarm(&self) {
        self.armed.store(false, Ordering::Release);
    }

    fn arm(&self) {
        self.armed.store(true, Ordering::Release);
    }
}

/// What one call to [`DetectionLoop::run_cycle`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Faces were handed to the sink
    Applied { faces: usize },
    /// Inference finished after the loop was disarmed
    Discarded,
    /// The loop is not running; no frame was taken
    Stopped,
}

pub struct DetectionLoop<P> {
    state: LoopState,
    provider: Option<P>,
    handle: LoopHandle,
    cycles: u64,
}

impl<P> Default for DetectionLoop<P> {
    fn default() -> Self {
        Self {
            state: LoopState::Idle,
            provider: None,
            handle: LoopHandle::default(),
            cycles: 0,
        }
    }
}

impl<P: LandmarkProvider> DetectionLoop<P> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &LoopState {
        &self.state
    }

    pub fn handle(&self) -> LoopHandle {
        self.handle.clone()
    }

    /// Active and armed
    pub fn is_running(&self) -> bool {
        self.state == LoopState::Active && self.handle.is_armed()
    }

    /// Number of cycles whose result was applied
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Load the landmark model and arm the loop.
    ///
    /// Allowed from `Idle` and `Error`; calling it after a failure is the
    /// manual retry.
    pub async fn enable<L>(&mut self, loader: &L) -> Result<()>
    where
        L: LandmarkModelLoader<Provider = P>,
    {
        match self.state {
            LoopState::Idle | LoopState::Error(_) => {}
            ref other => {
                return Err(Error::InvalidState(format!("cannot enable detection while {other:?}")));
            }
        }

        self.state = LoopState::Loading;
        self.handle.arm();
        info!("loading face landmark model");
        match loader.load().await {
            Ok(_) if !self.handle.is_armed() => {
                self.provider = None;
                self.state = LoopState::Idle;
                info!("detection cancelled while loading");
                Ok(())
            }
            Ok(provider) => {
                self.provider = Some(provider);
                self.state = LoopState::Active;
                info!("face landmark model loaded");
                Ok(())
            }
            Err(e) => {
                self.fail(&e);
                Err(e)
            }
        }
    }

    /// Stop the loop and drop every overlay instance
    pub fn disable<K: FaceSink + ?Sized>(&mut self, sink: &mut K) {
        self.handle.disarm();
        if self.state != LoopState::Idle {
            info!(state = ?self.state, "detection disabled");
        }
        self.state = LoopState::Idle;
        sink.clear_overlays();
    }

    /// Settle a disarm issued through a handle
    fn stop_disarmed<K: FaceSink + ?Sized>(&mut self, sink: &mut K) {
        info!("detection disarmed");
        self.state = LoopState::Idle;
        sink.clear_overlays();
    }

    fn fail(&mut self, e: &Error) {
        error!(error = %e, "face detection failed");
        self.handle.disarm();
        self.state = LoopState::Error(e.to_string());
    }

    /// Run one cycle: frame, inference, then placement through the sink
    pub async fn run_cycle<S, K>(&mut self, source: &mut S, sink: &mut K) -> Result<CycleOutcome>
    where
        S: FrameSource + ?Sized,
        K: FaceSink + ?Sized,
    {
        if self.state == LoopState::Active && !self.handle.is_armed() {
            self.stop_disarmed(sink);
        }
        if !self.is_running() || !source.is_live() {
            return Ok(CycleOutcome::Stopped);
        }
        let Some(provider) = self.provider.as_mut() else {
            return Err(Error::InvalidState("detection active without a model".into()));
        };

        let result = match source.next_frame() {
            Ok(frame) => provider.estimate_faces(&frame).await.map(|faces| (frame, faces)),
            Err(e) => Err(e),
        };

        if !self.handle.is_armed() {
            debug!("detection disarmed during inference, dropping result");
            self.stop_disarmed(sink);
            return Ok(CycleOutcome::Discarded);
        }

        match result {
            Ok((frame, faces)) => {
                debug!(frame = frame.index, faces = faces.len(), "detection cycle");
                sink.apply_faces(&frame, &faces);
                self.cycles += 1;
                Ok(CycleOutcome::Applied { faces: faces.len() })
            }
            Err(e) => {
                let e = match e {
                    Error::Inference(_) => e,
                    other => Error::Inference(other.to_string()),
                };
                self.fail(&e);
                Err(e)
            }
        }
    }

    /// Run cycles paced at `frame_rate` until the loop stops.
    ///
    /// `max_cycles` bounds the number of cycles attempted. Returns the number
    /// of cycles attempted.
    pub async fn run<S, K>(
        &mut self,
        source: &mut S,
        sink: &mut K,
        frame_rate: f32,
        max_cycles: Option<u64>,
    ) -> Result<u64>
    where
        S: FrameSource + ?Sized,
        K: FaceSink + ?Sized,
    {
        let period = Duration::from_secs_f32(1.0 / frame_rate.clamp(0.1, 1000.0));
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        let mut attempted = 0;
        while max_cycles.map_or(true, |max| attempted < max) {
            interval.tick().await;
            if self.run_cycle(source, sink).await? == CycleOutcome::Stopped {
                break;
            }
            attempted += 1;
        }
        Ok(attempted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::BlankFrames;
    use crate::provider::ReplayProvider;

    struct Loader;

    impl LandmarkModelLoader for Loader {
        type Provider = ReplayProvider;

        async fn load(&self) -> Result<ReplayProvider> {
            Ok(ReplayProvider::default())
        }
    }

    #[derive(Default)]
    struct CountingSink {
        applied: usize,
        cleared: usize,
    }

    impl FaceSink for CountingSink {
        fn apply_faces(&mut self, _frame: &Frame, _faces: &[Face]) {
            self.applied += 1;
        }

        fn clear_overlays(&mut self) {
            self.cleared += 1;
        }
    }

    #[tokio::test]
    async fn test_enable_then_disable() {
        let mut detection = DetectionLoop::new();
        let mut sink = CountingSink::default();
        let mut source = BlankFrames::new(4, 4);

        assert_eq!(
            detection.run_cycle(&mut source, &mut sink).await.unwrap(),
            CycleOutcome::Stopped
        );

        detection.enable(&Loader).await.unwrap();
        assert_eq!(detection.state(), &LoopState::Active);
        assert!(detection.enable(&Loader).await.is_err());

        let outcome = detection.run_cycle(&mut source, &mut sink).await.unwrap();
        assert_eq!(outcome, CycleOutcome::Applied { faces: 0 });

        detection.disable(&mut sink);
        assert_eq!(detection.state(), &LoopState::Idle);
        assert_eq!(sink.cleared, 1);
        assert_eq!(
            detection.run_cycle(&mut source, &mut sink).await.unwrap(),
            CycleOutcome::Stopped
        );
        assert_eq!(sink.applied, 1);
    }

    #[tokio::test]
    async fn test_still_source_is_not_cycled() {
        let mut detection = DetectionLoop::new();
        detection.enable(&Loader).await.unwrap();
        let mut still = crate::frame::StillImage::new(image::RgbaImage::new(2, 2));
        let mut sink = CountingSink::default();
        assert_eq!(
            detection.run_cycle(&mut still, &mut sink).await.unwrap(),
            CycleOutcome::Stopped
        );
    }
}
