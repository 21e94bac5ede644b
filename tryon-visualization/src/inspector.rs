//! GLB model inspector
//!
//! One model, centred at the origin, under an ambient and a directional
//! light. The keyboard toggles a global wireframe and an axes gizmo, steps
//! the exploded view and resets the orbit camera.

use crate::bindings::{InspectorCommand, KeyMap};
use crate::camera::{Camera, OrbitControls};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tryon_algorithms::{centering_offset, CameraPose, ExplodeState};
use tryon_core::{Error, Light, Model, NodeId, ObjectTransform, Result, Scene, SceneNode, Vector3f};
use tryon_gpu::{RenderConfig, SceneRenderer, ViewParams};
use tryon_io::{parse_hex_color, InspectorConfig, ViewerConfig};
use winit::dpi::LogicalSize;
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

/// Camera the inspector starts from and resets to
pub fn inspector_pose(config: &InspectorConfig) -> CameraPose {
    let mut pose = CameraPose::on_axis(config.camera_z);
    pose.fov_degrees = config.fov_degrees;
    pose
}

/// Scene and tool state of the inspector
#[derive(Debug)]
pub struct InspectorState {
    scene: Scene,
    model: Option<NodeId>,
    axes: NodeId,
    explode: ExplodeState,
    wireframe: bool,
}

impl InspectorState {
    pub fn new(config: &InspectorConfig) -> Result<Self> {
        let mut scene = Scene::new();
        scene.background = Some(parse_hex_color(&config.background)?);
        scene.lights = vec![
            Light::ambient(config.ambient_intensity),
            Light::directional(
                Vector3f::from(config.directional_position),
                config.directional_intensity,
            ),
        ];
        let axes = scene.add(SceneNode::axes("axes", config.axes_size).with_visible(false));

        Ok(Self {
            scene,
            model: None,
            axes,
            explode: ExplodeState::new(config.explode_step),
            wireframe: false,
        })
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn model_node(&self) -> Option<NodeId> {
        self.model
    }

    pub fn wireframe(&self) -> bool {
        self.wireframe
    }

    pub fn axes_visible(&self) -> bool {
        self.scene.get(self.axes).map(|n| n.visible).unwrap_or(false)
    }

    pub fn explode_factor(&self) -> f32 {
        self.explode.factor()
    }

    /// Show `model` centred at the origin, replacing any previous one
    pub fn set_model(&mut self, model: Arc<Model>) -> NodeId {
        if let Some(old) = self.model.take() {
            self.scene.remove(old);
        }
        let transform = ObjectTransform::from_position(centering_offset(&model));
        info!(
            model = %model.name,
            parts = model.parts.len(),
            vertices = model.vertex_count(),
            "model shown"
        );
        let mut node = SceneNode::model(model.name.clone(), model).with_transform(transform);
        self.explode.apply(&mut node);
        let id = self.scene.add(node);
        self.model = Some(id);
        id
    }

    pub fn toggle_wireframe(&mut self) -> bool {
        self.wireframe = !self.wireframe;
        info!(enabled = self.wireframe, "wireframe toggled");
        self.wireframe
    }

    pub fn toggle_axes(&mut self) -> bool {
        let Some(axes) = self.scene.get_mut(self.axes) else {
            return false;
        };
        axes.visible = !axes.visible;
        info!(visible = axes.visible, "axes toggled");
        axes.visible
    }

    fn apply_explode(&mut self) -> f32 {
        if let Some(node) = self.model.and_then(|id| self.scene.get_mut(id)) {
            self.explode.apply(node);
        }
        info!(factor = self.explode.factor(), "exploded view");
        self.explode.factor()
    }

    pub fn explode_more(&mut self) -> f32 {
        self.explode.increase();
        self.apply_explode()
    }

    pub fn explode_less(&mut self) -> f32 {
        self.explode.decrease();
        self.apply_explode()
    }

    /// Run a keyboard command
    pub fn apply(&mut self, command: InspectorCommand, camera: &mut Camera) {
        match command {
            InspectorCommand::ToggleWireframe => {
                self.toggle_wireframe();
            }
            InspectorCommand::ToggleAxes => {
                self.toggle_axes();
            }
            InspectorCommand::ExplodeUp => {
                self.explode_more();
            }
            InspectorCommand::ExplodeDown => {
                self.explode_less();
            }
            InspectorCommand::ResetCamera => {
                camera.reset();
                info!("camera reset");
            }
        }
    }
}

/// Open the inspector window and run until it is closed.
///
/// `model` overrides the configured model. A model that fails to load is
/// logged and the viewer stays empty.
pub fn run_inspector(config: &ViewerConfig, model: Option<PathBuf>) -> Result<()> {
    let keys = KeyMap::inspector(&config.keys)?;
    let mut state = InspectorState::new(&config.inspector)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let path = model.or_else(|| config.inspector.model.clone());
    let mut title = String::from("GLB inspector");
    if let Some(path) = &path {
        match runtime.block_on(tryon_io::load_model(path)) {
            Ok(model) => {
                title = format!("GLB inspector: {}", model.name);
                state.set_model(Arc::new(model));
            }
            Err(e) => error!(path = %path.display(), error = %e, "failed to load model"),
        }
    }

    let event_loop = EventLoop::new()
        .map_err(|e| Error::Visualization(format!("Failed to create event loop: {}", e)))?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(title)
            .with_inner_size(LogicalSize::new(1200.0, 800.0))
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
    let mut camera =
        Camera::from_pose(&inspector_pose(&config.inspector), 1.0, config.inspector.damping);
    camera.set_aspect_ratio(size.width, size.height);
    let mut controls = OrbitControls::new();

    event_loop
        .run(move |event, elwt| {
            elwt.set_control_flow(ControlFlow::Poll);
            match event {
                Event::WindowEvent { event, .. } => {
                    controls.handle(&event, &mut camera, renderer.size().1);
                    match event {
                        WindowEvent::CloseRequested => elwt.exit(),
                        WindowEvent::Resized(new_size) => {
                            renderer.resize(new_size);
                            camera.set_aspect_ratio(new_size.width, new_size.height);
                        }
                        WindowEvent::KeyboardInput { event, .. } => {
                            if event.state == ElementState::Pressed && !event.repeat {
                                if let Some(command) = keys.command(&event.logical_key) {
                                    state.apply(command, &mut camera);
                                    renderer.set_wireframe(state.wireframe());
                                }
                            }
                        }
                        WindowEvent::RedrawRequested => {
                            camera.update();
                            let view = ViewParams {
                                view: camera.view_matrix(),
                                projection: camera.projection_matrix(),
                                camera_position: camera.position.coords,
                            };
                            if let Err(e) = renderer.render(state.scene(), &view, None) {
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

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tryon_core::{ModelPart, NodeKind, Point3f, TriangleMesh};

    fn offset_model() -> Arc<Model> {
        let mut model = Model::new("offset");
        for (name, x) in [("left", 1.0), ("right", 3.0)] {
            let mesh = TriangleMesh::from_vertices_and_faces(
                vec![
                    Point3f::new(x, 0.0, 0.0),
                    Point3f::new(x + 1.0, 0.0, 0.0),
                    Point3f::new(x, 1.0, 0.0),
                ],
                vec![[0, 1, 2]],
            );
            model.parts.push(ModelPart::new(name, mesh));
        }
        Arc::new(model)
    }

    #[test]
    fn test_scene_setup() {
        let state = InspectorState::new(&InspectorConfig::default()).unwrap();
        let scene = state.scene();
        let background = scene.background.unwrap();
        assert_relative_eq!(background[0], 0x44 as f32 / 255.0);
        assert_eq!(scene.lights.len(), 2);
        assert!(!state.axes_visible());
        assert!(state.model_node().is_none());
    }

    #[test]
    fn test_model_is_centred() {
        let mut state = InspectorState::new(&InspectorConfig::default()).unwrap();
        let id = state.set_model(offset_model());
        let node = state.scene().get(id).unwrap();
        assert_relative_eq!(node.transform.position, Vector3f::new(-2.5, -0.5, 0.0));

        // Replacing the model keeps a single model node
        state.set_model(offset_model());
        assert_eq!(state.scene().len(), 2);
        assert!(!state.scene().contains(id));
    }

    #[test]
    fn test_explode_steps_and_saturates() {
        let mut state = InspectorState::new(&InspectorConfig::default()).unwrap();
        let id = state.set_model(offset_model());
        assert_relative_eq!(state.explode_more(), 0.1);

        let NodeKind::Model { part_offsets, .. } = &state.scene().get(id).unwrap().kind else {
            panic!("model node expected");
        };
        assert_eq!(part_offsets.len(), 2);
        assert!(part_offsets[0].x < 0.0 && part_offsets[1].x > 0.0);

        for _ in 0..40 {
            state.explode_more();
        }
        assert_relative_eq!(state.explode_factor(), 2.0);
        for _ in 0..40 {
            state.explode_less();
        }
        assert_eq!(state.explode_factor(), 0.0);
        let NodeKind::Model { part_offsets, .. } = &state.scene().get(id).unwrap().kind else {
            panic!("model node expected");
        };
        assert!(part_offsets.is_empty());
    }

    #[test]
    fn test_commands() {
        let mut state = InspectorState::new(&InspectorConfig::default()).unwrap();
        let mut camera = Camera::from_pose(&inspector_pose(&InspectorConfig::default()), 1.0, 0.0);
        state.apply(InspectorCommand::ToggleWireframe, &mut camera);
        state.apply(InspectorCommand::ToggleAxes, &mut camera);
        assert!(state.wireframe());
        assert!(state.axes_visible());

        camera.orbit(1.0, 0.0);
        state.apply(InspectorCommand::ResetCamera, &mut camera);
        assert_relative_eq!(camera.position, Point3f::new(0.0, 0.0, 2.0), epsilon = 1e-6);

        state.apply(InspectorCommand::ToggleWireframe, &mut camera);
        assert!(!state.wireframe());
    }
}
