//! Virtual try-on viewer
//!
//! [`TryOnController`] turns key commands and redraw ticks into session and
//! detection-loop calls; [`run_tryon`] wraps it in a window. Still mode shows
//! the selected glasses under orbit controls. Live mode runs one detection
//! cycle per due redraw and draws the frame behind the overlays.

use crate::bindings::{KeyMap, TryOnCommand};
use crate::camera::{Camera, OrbitControls};
use image::RgbaImage;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};
use tryon_core::{Error, Result};
use tryon_gpu::{RenderConfig, SceneRenderer, ViewParams};
use tryon_io::{AssetCatalog, TryOnConfig, ViewerConfig};
use tryon_tracking::{
    BlankFrames, CycleOutcome, DetectionLoop, FrameSource, ImageSequence, LandmarkModelLoader,
    LoopState, ReplayLoader, SourceMode, StillImage, TryOnSession,
};
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

/// Window-independent state of the try-on viewer
pub struct TryOnController<L: LandmarkModelLoader> {
    session: TryOnSession,
    detection: DetectionLoop<L::Provider>,
    loader: L,
    live: Box<dyn FrameSource>,
    still: Option<Arc<RgbaImage>>,
    camera: Camera,
    damping: f32,
    period: Duration,
    last_cycle: Option<Instant>,
}

impl<L: LandmarkModelLoader> TryOnController<L> {
    pub fn new(
        session: TryOnSession,
        loader: L,
        live: Box<dyn FrameSource>,
        still: Option<Arc<RgbaImage>>,
        config: &TryOnConfig,
        damping: f32,
    ) -> Self {
        let camera = Camera::from_pose(session.camera(), 1.0, damping);
        Self {
            session,
            detection: DetectionLoop::new(),
            loader,
            live,
            still,
            camera,
            damping,
            period: Duration::from_secs_f32(1.0 / config.frame_rate.clamp(0.1, 1000.0)),
            last_cycle: None,
        }
    }

    pub fn session(&self) -> &TryOnSession {
        &self.session
    }

    pub fn detection_state(&self) -> &LoopState {
        self.detection.state()
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Load the first asset and place it in still mode
    pub async fn start(&mut self) {
        self.session.load_selected().await;
        self.session.refresh_still();
    }

    fn reframe(&mut self) {
        let aspect = self.camera.aspect_ratio;
        self.camera = Camera::from_pose(self.session.camera(), aspect, self.damping);
    }

    /// Switch to the live source and start detection
    pub async fn go_live(&mut self) {
        if self.session.mode() == SourceMode::Live {
            return;
        }
        self.session.set_mode(SourceMode::Live, self.live.dimensions());
        self.reframe();
        self.last_cycle = None;
        if let Err(e) = self.detection.enable(&self.loader).await {
            self.session.set_notice(e.to_string());
        }
    }

    /// Stop detection and return to the still view
    pub fn go_still(&mut self) {
        if self.session.mode() == SourceMode::Still {
            return;
        }
        self.detection.disable(&mut self.session);
        let dimensions = self.still_dimensions();
        self.session.set_mode(SourceMode::Still, dimensions);
        self.reframe();
    }

    fn still_dimensions(&self) -> (u32, u32) {
        self.still
            .as_ref()
            .map(|image| image.dimensions())
            .unwrap_or_else(|| self.live.dimensions())
    }

    pub async fn apply(&mut self, command: TryOnCommand) {
        match command {
            TryOnCommand::ToggleSource => match self.session.mode() {
                SourceMode::Still => self.go_live().await,
                SourceMode::Live => self.go_still(),
            },
            TryOnCommand::NextAsset => {
                self.session.select_relative(1).await;
            }
            TryOnCommand::PreviousAsset => {
                self.session.select_relative(-1).await;
            }
            TryOnCommand::ToggleFaceMesh => {
                self.session.toggle_face_mesh();
            }
            TryOnCommand::Dismiss => {
                if self.session.dismiss_notice() {
                    info!("notice dismissed");
                }
                self.go_still();
            }
        }
    }

    /// Whether a detection cycle is due at `now`
    pub fn cycle_due(&self, now: Instant) -> bool {
        self.last_cycle
            .map_or(true, |last| now.duration_since(last) >= self.period)
    }

    /// Run one detection cycle if the loop is running and one is due
    pub async fn tick(&mut self, now: Instant) -> Option<CycleOutcome> {
        if !self.detection.is_running() || !self.cycle_due(now) {
            return None;
        }
        self.last_cycle = Some(now);
        match self.detection.run_cycle(self.live.as_mut(), &mut self.session).await {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                self.session.set_notice(e.to_string());
                None
            }
        }
    }

    /// Frame drawn behind the scene
    pub fn background(&self) -> Option<&RgbaImage> {
        match self.session.mode() {
            SourceMode::Live => self.session.frame().map(|frame| frame.image.as_ref()),
            SourceMode::Still => self.still.as_deref(),
        }
    }

    /// Camera matrices for a viewport; the live view keeps the frame's aspect
    /// so overlays stay registered with the stretched background
    pub fn view_params(&self) -> ViewParams {
        match self.session.mode() {
            SourceMode::Live => {
                let pose = self.session.camera();
                let (w, h) = self.live.dimensions();
                ViewParams {
                    view: pose.view_matrix(),
                    projection: pose.projection_matrix(w as f32 / h.max(1) as f32),
                    camera_position: pose.position.coords,
                }
            }
            SourceMode::Still => ViewParams {
                view: self.camera.view_matrix(),
                projection: self.camera.projection_matrix(),
                camera_position: self.camera.position.coords,
            },
        }
    }

    pub fn title(&self) -> String {
        let label = self
            .session
            .selected_asset()
            .map(|asset| {
                if asset.label.is_empty() {
                    asset.id.as_str()
                } else {
                    asset.label.as_str()
                }
            })
            .unwrap_or("no asset");
        match self.session.notice() {
            Some(notice) => format!("Virtual try-on: {label} | {notice} (Esc to dismiss)"),
            None => format!("Virtual try-on: {label}"),
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_aspect_ratio(width, height);
        self.session.set_viewport(width, height);
    }

    pub fn dispose(&mut self) {
        self.detection.disable(&mut self.session);
        self.session.dispose();
    }
}

/// Live source and optional still image for the configured frames path.
///
/// A directory plays as an image sequence; a single image is the still view,
/// with blank frames as the live source; nothing configured means blank
/// frames only.
pub fn open_sources(
    config: &TryOnConfig,
) -> Result<(Box<dyn FrameSource>, Option<Arc<RgbaImage>>)> {
    let blank = || {
        Box::new(BlankFrames::new(config.frame_width, config.frame_height)) as Box<dyn FrameSource>
    };
    match config.frames.as_deref() {
        Some(path) if path.is_dir() => Ok((Box::new(ImageSequence::from_dir(path)?), None)),
        Some(path) => {
            let mut still = StillImage::open(path)?;
            let frame = still.next_frame()?;
            Ok((blank(), Some(frame.image)))
        }
        None => Ok((blank(), None)),
    }
}

fn landmark_loader(config: &TryOnConfig) -> Result<ReplayLoader> {
    config
        .landmarks
        .as_deref()
        .map(ReplayLoader::new)
        .ok_or_else(|| Error::Config("no landmark recording configured (tryon.landmarks)".into()))
}

/// Open the try-on window and run until it is closed
pub fn run_tryon(config: &ViewerConfig) -> Result<()> {
    let keys = KeyMap::tryon(&config.keys)?;
    let tryon = &config.tryon;
    let catalog = AssetCatalog::read(&tryon.catalog)?;
    let loader = landmark_loader(tryon)?;
    let (live, still) = open_sources(tryon)?;
    let (width, height) = live.dimensions();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let mut session = TryOnSession::new(tryon, catalog)?;
    session.set_viewport(width, height);
    let mut controller =
        TryOnController::new(session, loader, live, still, tryon, config.inspector.damping);
    runtime.block_on(controller.start());

    let event_loop = EventLoop::new()
        .map_err(|e| Error::Visualization(format!("Failed to create event loop: {}", e)))?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(controller.title())
            .with_inner_size(PhysicalSize::new(width, height))
            .build(&event_loop)
            .map_err(|e| Error::Visualization(format!("Failed to create window: {}", e)))?,
    );
    let size = window.inner_size();
    let mut renderer = pollster::block_on(SceneRenderer::new(
        window.clone(),
        size.width,
        size.height,
        RenderConfig::default(),
    ))?;
    controller.resize(size.width, size.height);
    let mut controls = OrbitControls::new();
    let mut title = controller.title();

    event_loop
        .run(move |event, elwt| {
            elwt.set_control_flow(ControlFlow::Poll);
            match event {
                Event::WindowEvent { event, .. } => {
                    controls.enabled = controller.session().mode() == SourceMode::Still;
                    controls.handle(&event, controller.camera_mut(), renderer.size().1);
                    match event {
                        WindowEvent::CloseRequested => {
                            controller.dispose();
                            elwt.exit();
                        }
                        WindowEvent::Resized(new_size) => {
                            renderer.resize(new_size);
                            controller.resize(new_size.width, new_size.height);
                        }
                        WindowEvent::KeyboardInput { event, .. } => {
                            if event.state == ElementState::Pressed && !event.repeat {
                                if let Some(command) = keys.command(&event.logical_key) {
                                    runtime.block_on(controller.apply(command));
                                }
                            }
                        }
                        WindowEvent::RedrawRequested => {
                            let outcome = runtime.block_on(controller.tick(Instant::now()));
                            if let Some(CycleOutcome::Discarded) = outcome {
                                warn!("detection result discarded");
                            }
                            controller.camera_mut().update();

                            let next_title = controller.title();
                            if next_title != title {
                                window.set_title(&next_title);
                                title = next_title;
                            }

                            let view = controller.view_params();
                            let scene = controller.session().scene();
                            if let Err(e) = renderer.render(scene, &view, controller.background()) {
                                error!(error = %e, "render failed");
                                elwt.exit();
                            }
                        }
                        _ => {}
                    }
                }
                Event::AboutToWait => window.request_redraw(),
                _ => {}
            }
        })
        .map_err(|e| Error::Visualization(format!("Event loop error: {}", e)))?;

    Ok(())
}

/// Headless counterpart of [`run_tryon`]'s live mode: enable detection over
/// `source` and run `cycles` paced cycles into `session`
pub async fn run_headless<L, K>(
    loader: &L,
    source: &mut dyn FrameSource,
    sink: &mut K,
    frame_rate: f32,
    cycles: u64,
) -> Result<u64>
where
    L: LandmarkModelLoader,
    K: tryon_tracking::FaceSink,
{
    let mut detection = DetectionLoop::new();
    detection.enable(loader).await?;
    let attempted = detection.run(source, sink, frame_rate, Some(cycles)).await;
    detection.disable(sink);
    attempted
}

#[cfg(test)]
mod tests {
    use super::*;
    use tryon_core::{Face, Point3f};
    use tryon_tracking::ReplayProvider;

    struct RecordedFaces(usize);

    impl LandmarkModelLoader for RecordedFaces {
        type Provider = ReplayProvider;

        async fn load(&self) -> Result<ReplayProvider> {
            let mut mesh = vec![Point3f::origin(); 400];
            mesh[168] = Point3f::new(100.0, 100.0, 0.0);
            mesh[2] = Point3f::new(100.0, 150.0, 0.0);
            mesh[143] = Point3f::new(80.0, 100.0, 0.0);
            mesh[372] = Point3f::new(120.0, 100.0, 0.0);
            Ok(ReplayProvider::new(vec![vec![Face::new(mesh); self.0]]))
        }
    }

    struct Unavailable;

    impl LandmarkModelLoader for Unavailable {
        type Provider = ReplayProvider;

        async fn load(&self) -> Result<ReplayProvider> {
            Err(Error::ModelLoad("model server unreachable".into()))
        }
    }

    fn catalog() -> AssetCatalog {
        AssetCatalog::from_json(
            r#"[{"id": "round", "label": "Round", "model_file": "missing.glb", "kind": "glb"}]"#,
            None,
        )
        .unwrap()
    }

    fn controller<L: LandmarkModelLoader>(loader: L) -> TryOnController<L> {
        let config = TryOnConfig::default();
        let session = TryOnSession::new(&config, catalog()).unwrap();
        let live = Box::new(BlankFrames::new(640, 480));
        TryOnController::new(session, loader, live, None, &config, 0.05)
    }

    #[tokio::test]
    async fn test_live_cycle_places_overlays() {
        let mut app = controller(RecordedFaces(2));
        app.start().await;
        app.apply(TryOnCommand::ToggleSource).await;
        assert_eq!(app.session().mode(), SourceMode::Live);
        assert_eq!(app.detection_state(), &LoopState::Active);

        let now = Instant::now();
        assert_eq!(app.tick(now).await, Some(CycleOutcome::Applied { faces: 2 }));
        assert_eq!(app.session().instances().len(), 2);
        assert!(app.background().is_some());

        // Not due again within one frame period
        assert_eq!(app.tick(now).await, None);

        app.apply(TryOnCommand::ToggleSource).await;
        assert_eq!(app.session().mode(), SourceMode::Still);
        assert_eq!(app.detection_state(), &LoopState::Idle);
        assert!(app.session().instances().is_empty());
        assert!(app.background().is_none());
    }

    #[tokio::test]
    async fn test_model_load_failure_shows_notice_until_dismissed() {
        let mut app = controller(Unavailable);
        app.start().await;
        app.apply(TryOnCommand::ToggleSource).await;
        assert!(matches!(app.detection_state(), LoopState::Error(_)));
        assert!(app.title().contains("model server unreachable"));
        assert_eq!(app.tick(Instant::now()).await, None);

        app.apply(TryOnCommand::Dismiss).await;
        assert!(app.session().notice().is_none());
        assert_eq!(app.session().mode(), SourceMode::Still);
        assert_eq!(app.title(), "Virtual try-on: Round");
    }

    #[tokio::test]
    async fn test_headless_run_clears_on_finish() {
        let config = TryOnConfig::default();
        let mut session = TryOnSession::new(&config, catalog()).unwrap();
        session.set_mode(SourceMode::Live, (640, 480));
        let mut source = BlankFrames::new(640, 480);
        let attempted = run_headless(&RecordedFaces(1), &mut source, &mut session, 1000.0, 3)
            .await
            .unwrap();
        assert_eq!(attempted, 3);
        assert!(session.instances().is_empty());
    }
}
