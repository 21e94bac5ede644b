//! Try-on session state
//!
//! A [`TryOnSession`] owns everything one try-on view mutates: the scene,
//! the camera pose, the source mode, the asset selection, the overlay
//! instances and the user notice. It lives from `new` to `dispose`; the
//! detection loop feeds it through [`FaceSink`].

use crate::detection::FaceSink;
use crate::frame::Frame;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tryon_algorithms::{
    image_camera, initial_transform, video_camera, CameraPose, CycleReport, OverlayInstances,
    OverlayTemplate, PlacementParams,
};
use tryon_core::{
    AssetKind, Calibration, Face, KeyPointIndices, Light, Model, OverlayAsset, Result, Scene,
    SceneNode, Vector3f,
};
use tryon_io::{parse_hex_color, AssetCatalog, TryOnConfig};

/// Where frames come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceMode {
    /// A still image; overlays are placed once per asset change
    Still,
    /// A live source driving the detection loop
    Live,
}

#[derive(Debug)]
pub struct TryOnSession {
    scene: Scene,
    camera: CameraPose,
    mode: SourceMode,
    catalog: AssetCatalog,
    selected: usize,
    template: OverlayTemplate,
    calibration: Calibration,
    models: HashMap<PathBuf, Arc<Model>>,
    instances: OverlayInstances,
    notice: Option<String>,
    show_face_mesh: bool,
    key_points: KeyPointIndices,
    viewport: (u32, u32),
    video_fov: f32,
    still_background: [f32; 4],
    frame: Option<Frame>,
}

impl TryOnSession {
    /// New session in still-image mode with the first catalog entry selected.
    ///
    /// Call [`TryOnSession::load_selected`] to load it.
    pub fn new(config: &TryOnConfig, catalog: AssetCatalog) -> Result<Self> {
        let mut scene = Scene::new();
        scene.lights = vec![
            Light::spot(Vector3f::new(10.0, 10.0, 10.0), config.spot_intensity),
            Light::spot(Vector3f::new(10.0, 10.0, -10.0), config.spot_intensity),
            Light::camera_point(config.camera_light_intensity),
        ];
        let still_background = parse_hex_color(&config.still_background)?;
        scene.background = Some(still_background);

        let calibration = catalog.get(0).map(OverlayAsset::calibration).unwrap_or_default();
        Ok(Self {
            scene,
            camera: image_camera(),
            mode: SourceMode::Still,
            catalog,
            selected: 0,
            template: OverlayTemplate::default(),
            calibration,
            models: HashMap::new(),
            instances: OverlayInstances::new(),
            notice: None,
            show_face_mesh: config.show_face_mesh,
            key_points: config.key_points,
            viewport: (config.frame_width, config.frame_height),
            video_fov: config.video_fov_degrees,
            still_background,
            frame: None,
        })
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &CameraPose {
        &self.camera
    }

    pub fn mode(&self) -> SourceMode {
        self.mode
    }

    pub fn catalog(&self) -> &AssetCatalog {
        &self.catalog
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_asset(&self) -> Option<&OverlayAsset> {
        self.catalog.get(self.selected)
    }

    pub fn instances(&self) -> &OverlayInstances {
        &self.instances
    }

    pub fn show_face_mesh(&self) -> bool {
        self.show_face_mesh
    }

    /// Latest live frame, drawn behind the scene
    pub fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Show a dismissible message to the user
    pub fn set_notice(&mut self, message: impl Into<String>) {
        self.notice = Some(message.into());
    }

    /// Dismiss the notice; returns whether one was shown
    pub fn dismiss_notice(&mut self) -> bool {
        self.notice.take().is_some()
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
    }

    pub fn placement_params(&self) -> PlacementParams {
        PlacementParams {
            calibration: self.calibration,
            indices: self.key_points,
            camera_z: self.camera.depth(),
            show_face_mesh: self.show_face_mesh,
        }
    }

    /// Load the selected asset.
    ///
    /// Models go into the overlay template; an EXR entry replaces the scene
    /// environment. A failure is logged and leaves the template empty, so
    /// overlays become empty groups. Returns whether loading succeeded.
    pub async fn load_selected(&mut self) -> bool {
        let Some(asset) = self.catalog.get(self.selected).cloned() else {
            self.template = OverlayTemplate::default();
            return false;
        };
        self.calibration = asset.calibration();
        self.template = OverlayTemplate::new(asset.id.clone(), None);

        let path = asset.path();
        let loaded = match asset.kind {
            AssetKind::Gltf | AssetKind::Glb => self.load_model(path.clone()).await.map(|model| {
                self.template.model = Some(model);
            }),
            AssetKind::Exr => tryon_io::load_environment(&path).await.map(|environment| {
                self.scene.environment = Some(environment);
            }),
        };
        match loaded {
            Ok(()) => {
                info!(asset = %asset.id, kind = %asset.kind, "asset selected");
                true
            }
            Err(e) => {
                error!(asset = %asset.id, error = %e, "failed to load asset");
                false
            }
        }
    }

    async fn load_model(&mut self, path: PathBuf) -> Result<Arc<Model>> {
        if let Some(model) = self.models.get(&path) {
            return Ok(model.clone());
        }
        let model = Arc::new(tryon_io::load_model(&path).await?);
        self.models.insert(path, model.clone());
        Ok(model)
    }

    /// Select a catalog entry: overlays are cleared, the asset loaded and,
    /// in still mode, placed again
    pub async fn select(&mut self, index: usize) -> bool {
        if index >= self.catalog.len() {
            return false;
        }
        self.selected = index;
        self.clear_overlays();
        let loaded = self.load_selected().await;
        if self.mode == SourceMode::Still {
            self.refresh_still();
        }
        loaded
    }

    /// Move the carousel by `step`, wrapping at both ends
    pub async fn select_relative(&mut self, step: isize) -> bool {
        match self.catalog.wrap(self.selected, step) {
            Some(index) => self.select(index).await,
            None => false,
        }
    }

    /// Switch between still and live sources.
    ///
    /// Overlays are cleared and the camera re-framed: the live camera is
    /// registered with `frame_size` pixels; the still camera is the orbit
    /// view, with the selected glasses placed again.
    pub fn set_mode(&mut self, mode: SourceMode, frame_size: (u32, u32)) {
        self.mode = mode;
        self.clear_overlays();
        match mode {
            SourceMode::Live => {
                self.camera = video_camera(frame_size.0, frame_size.1, self.video_fov);
                self.scene.background = None;
            }
            SourceMode::Still => {
                self.camera = image_camera();
                self.scene.background = Some(self.still_background);
                self.frame = None;
                self.refresh_still();
            }
        }
        info!(?mode, "source switched");
    }

    /// Place the selected glasses once at their initial transform
    pub fn refresh_still(&mut self) {
        self.instances.clear(&mut self.scene);
        let Some(model) = self.template.model.clone() else {
            return;
        };
        let transform = initial_transform(&self.calibration, self.viewport.0);
        let node = SceneNode::model(self.template.name.clone(), model).with_transform(transform);
        let id = self.scene.add(node);
        self.instances.adopt(id);
    }

    /// Flip the debug face-mesh toggle
    pub fn toggle_face_mesh(&mut self) -> bool {
        self.show_face_mesh = !self.show_face_mesh;
        self.instances.set_face_mesh_visible(&mut self.scene, self.show_face_mesh);
        info!(visible = self.show_face_mesh, "face mesh toggled");
        self.show_face_mesh
    }

    /// Apply faces detected in the current frame
    pub fn place_faces(&mut self, faces: &[Face]) -> CycleReport {
        let params = self.placement_params();
        self.instances.apply(&mut self.scene, faces, &self.template, &params)
    }

    /// Release the scene and cached models
    pub fn dispose(&mut self) {
        self.instances.clear(&mut self.scene);
        self.scene.clear_nodes();
        self.scene.environment = None;
        self.models.clear();
        self.template = OverlayTemplate::default();
        self.frame = None;
        info!("try-on session disposed");
    }
}

impl FaceSink for TryOnSession {
    fn apply_faces(&mut self, frame: &Frame, faces: &[Face]) {
        if self.mode != SourceMode::Live {
            return;
        }
        self.frame = Some(frame.clone());
        self.place_faces(faces);
    }

    fn clear_overlays(&mut self) {
        self.instances.clear(&mut self.scene);
        self.scene.remove_where(SceneNode::is_overlay_like);
    }
}
