//! Overlay instance lifecycle
//!
//! Keeps one overlay node and one debug face-mesh node per detected face. When
//! the face count changes, every existing instance is removed from the scene
//! and a fresh set is created; positions are then updated for all of them.
//! The rebuild makes overlays flicker when a face enters or leaves the frame.

use std::sync::Arc;
use tracing::{debug, warn};
use tryon_core::{
    frame_to_render, Calibration, Face, KeyPointIndices, Model, NodeId, ObjectTransform, Scene,
    SceneNode, Vector3f,
};

use crate::placement::place_overlay;

/// Colour of the debug face-mesh points
pub const FACE_MESH_COLOR: [f32; 3] = [0.0, 1.0, 0.0];

/// What to instantiate for each face
#[derive(Debug, Clone, Default)]
pub struct OverlayTemplate {
    pub name: String,
    /// `None` when the asset failed to load; instances are then empty groups
    pub model: Option<Arc<Model>>,
}

impl OverlayTemplate {
    pub fn new(name: impl Into<String>, model: Option<Arc<Model>>) -> Self {
        Self {
            name: name.into(),
            model,
        }
    }

    fn instantiate(&self) -> SceneNode {
        match &self.model {
            Some(model) => SceneNode::model(self.name.clone(), model.clone()),
            None => SceneNode::group(self.name.clone()),
        }
    }
}

/// Per-cycle inputs to placement
#[derive(Debug, Clone, Copy)]
pub struct PlacementParams {
    pub calibration: Calibration,
    pub indices: KeyPointIndices,
    /// Render camera z position
    pub camera_z: f32,
    pub show_face_mesh: bool,
}

/// What one call to [`OverlayInstances::apply`] did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub rebuilt: bool,
    pub placed: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy)]
struct Instance {
    node: NodeId,
    last_up: Option<Vector3f>,
}

/// Overlay and face-mesh nodes bound to the currently detected faces
#[derive(Debug, Default)]
pub struct OverlayInstances {
    overlays: Vec<Instance>,
    face_meshes: Vec<NodeId>,
}

impl OverlayInstances {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live overlay instances
    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }

    /// Overlay node ids, one per face, in face order
    pub fn overlay_nodes(&self) -> Vec<NodeId> {
        self.overlays.iter().map(|i| i.node).collect()
    }

    /// Debug face-mesh node ids, one per face, in face order
    pub fn face_mesh_nodes(&self) -> &[NodeId] {
        &self.face_meshes
    }

    /// Adopt a node created outside a detection cycle (still-image mode)
    pub fn adopt(&mut self, node: NodeId) {
        self.overlays.push(Instance { node, last_up: None });
    }

    /// Rebuild overlay nodes if their count differs from `face_count`.
    ///
    /// Returns `true` when a rebuild happened.
    pub fn sync_overlays(
        &mut self,
        scene: &mut Scene,
        face_count: usize,
        template: &OverlayTemplate,
    ) -> bool {
        if self.overlays.len() == face_count {
            return false;
        }
        debug!(from = self.overlays.len(), to = face_count, "rebuilding overlay instances");
        self.remove_overlays(scene);
        for _ in 0..face_count {
            let node = scene.add(template.instantiate());
            self.overlays.push(Instance { node, last_up: None });
        }
        true
    }

    /// Rebuild face-mesh nodes if their count differs from `face_count`
    pub fn sync_face_meshes(
        &mut self,
        scene: &mut Scene,
        face_count: usize,
        visible: bool,
    ) -> bool {
        if self.face_meshes.len() == face_count {
            return false;
        }
        self.remove_face_meshes(scene);
        for i in 0..face_count {
            let node = SceneNode::points(format!("face-mesh-{i}"), Vec::new(), FACE_MESH_COLOR)
                .with_visible(visible);
            self.face_meshes.push(scene.add(node));
        }
        true
    }

    /// Apply one detection result: rebuild on count change, then place every
    /// instance.
    pub fn apply(
        &mut self,
        scene: &mut Scene,
        faces: &[Face],
        template: &OverlayTemplate,
        params: &PlacementParams,
    ) -> CycleReport {
        let rebuilt = self.sync_overlays(scene, faces.len(), template);
        self.sync_face_meshes(scene, faces.len(), params.show_face_mesh);
        self.update_face_meshes(scene, faces, params);
        let (placed, skipped) = self.update_overlays(scene, faces, params);
        CycleReport { rebuilt, placed, skipped }
    }

    /// Recompute overlay transforms; returns `(placed, skipped)`.
    ///
    /// An index without a face, an instance, a scene node or the key
    /// landmarks is skipped for this cycle.
    pub fn update_overlays(
        &mut self,
        scene: &mut Scene,
        faces: &[Face],
        params: &PlacementParams,
    ) -> (usize, usize) {
        let mut placed = 0;
        let mut skipped = 0;
        let count = faces.len().max(self.overlays.len());
        for i in 0..count {
            let (Some(face), Some(instance)) = (faces.get(i), self.overlays.get_mut(i)) else {
                skipped += 1;
                continue;
            };
            let Some(key_points) = face.key_points(&params.indices) else {
                warn!(face = i, landmarks = face.len(), "face is missing placement landmarks");
                skipped += 1;
                continue;
            };
            let Some(node) = scene.get_mut(instance.node) else {
                skipped += 1;
                continue;
            };
            let placement = place_overlay(
                &key_points,
                &params.calibration,
                params.camera_z,
                instance.last_up,
            );
            placement.apply_to(&mut node.transform);
            instance.last_up = Some(placement.up);
            placed += 1;
        }
        (placed, skipped)
    }

    fn update_face_meshes(&self, scene: &mut Scene, faces: &[Face], params: &PlacementParams) {
        for (face, id) in faces.iter().zip(&self.face_meshes) {
            let Some(node) = scene.get_mut(*id) else {
                continue;
            };
            if let tryon_core::NodeKind::Points { points, .. } = &mut node.kind {
                points.clear();
                points.extend(face.mesh.iter().map(|p| frame_to_render(p, params.camera_z)));
            }
            node.transform = ObjectTransform::identity();
            node.visible = params.show_face_mesh;
        }
    }

    /// Show or hide every face-mesh node
    pub fn set_face_mesh_visible(&self, scene: &mut Scene, visible: bool) {
        for id in &self.face_meshes {
            if let Some(node) = scene.get_mut(*id) {
                node.visible = visible;
            }
        }
    }

    /// Remove every instance from the scene
    pub fn clear(&mut self, scene: &mut Scene) {
        self.remove_overlays(scene);
        self.remove_face_meshes(scene);
    }

    fn remove_overlays(&mut self, scene: &mut Scene) {
        for instance in self.overlays.drain(..) {
            scene.remove(instance.node);
        }
    }

    fn remove_face_meshes(&mut self, scene: &mut Scene) {
        for id in self.face_meshes.drain(..) {
            scene.remove(id);
        }
    }
}
