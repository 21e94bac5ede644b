//! Scene graph
//!
//! A flat, ordered set of nodes keyed by [`NodeId`]. Ids are never reused
//! within a scene, so a removed node can never be mistaken for a new one.

use crate::model::{Environment, Model};
use crate::point::{Point3f, Vector3f};
use crate::transform::ObjectTransform;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Identifier of a node within one [`Scene`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u64);

impl NodeId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Light kinds understood by the renderer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    Ambient,
    /// Light shining from `position` towards the origin
    Directional { position: Vector3f },
    Spot { position: Vector3f },
    /// Point light; `None` attaches it to the camera
    Point { position: Option<Vector3f> },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub kind: LightKind,
    pub color: [f32; 3],
    pub intensity: f32,
}

impl Light {
    pub fn ambient(intensity: f32) -> Self {
        Self { kind: LightKind::Ambient, color: [1.0; 3], intensity }
    }

    pub fn directional(position: Vector3f, intensity: f32) -> Self {
        Self { kind: LightKind::Directional { position }, color: [1.0; 3], intensity }
    }

    pub fn spot(position: Vector3f, intensity: f32) -> Self {
        Self { kind: LightKind::Spot { position }, color: [1.0; 3], intensity }
    }

    pub fn camera_point(intensity: f32) -> Self {
        Self { kind: LightKind::Point { position: None }, color: [1.0; 3], intensity }
    }
}

/// What a node draws
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Empty container; stands in for an overlay whose asset failed to load
    Group,
    /// A loaded model; `part_offsets` is empty or holds one offset per part
    Model {
        model: Arc<Model>,
        part_offsets: Vec<Vector3f>,
    },
    /// Unlit points in render space
    Points {
        points: Vec<Point3f>,
        color: [f32; 3],
    },
    /// Red/green/blue lines along +X/+Y/+Z
    Axes { size: f32 },
}

#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub kind: NodeKind,
    pub transform: ObjectTransform,
    pub visible: bool,
}

impl SceneNode {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            transform: ObjectTransform::identity(),
            visible: true,
        }
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Group)
    }

    pub fn model(name: impl Into<String>, model: Arc<Model>) -> Self {
        Self::new(
            name,
            NodeKind::Model {
                model,
                part_offsets: Vec::new(),
            },
        )
    }

    pub fn points(name: impl Into<String>, points: Vec<Point3f>, color: [f32; 3]) -> Self {
        Self::new(name, NodeKind::Points { points, color })
    }

    pub fn axes(name: impl Into<String>, size: f32) -> Self {
        Self::new(name, NodeKind::Axes { size })
    }

    pub fn with_transform(mut self, transform: ObjectTransform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Groups and models: the nodes that represent overlays
    pub fn is_overlay_like(&self) -> bool {
        matches!(self.kind, NodeKind::Group | NodeKind::Model { .. })
    }
}

/// Everything drawn in one view
#[derive(Debug, Clone, Default)]
pub struct Scene {
    nodes: BTreeMap<NodeId, SceneNode>,
    next_id: u64,
    pub lights: Vec<Light>,
    /// Clear colour; `None` keeps the frame background visible
    pub background: Option<[f32; 4]>,
    pub environment: Option<Environment>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node and return its id
    pub fn add(&mut self, node: SceneNode) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, node);
        id
    }

    /// Remove a node, returning it if it was present
    pub fn remove(&mut self, id: NodeId) -> Option<SceneNode> {
        self.nodes.remove(&id)
    }

    /// Remove every node matching the predicate; returns how many were removed
    pub fn remove_where<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(&SceneNode) -> bool,
    {
        let before = self.nodes.len();
        self.nodes.retain(|_, node| !predicate(node));
        before - self.nodes.len()
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.nodes.iter().map(|(id, node)| (*id, node))
    }

    /// Visible nodes in insertion order
    pub fn visible(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.iter().filter(|(_, node)| node.visible)
    }

    /// Drop all nodes, keeping lights, background and environment
    pub fn clear_nodes(&mut self) {
        self.nodes.clear();
    }
}
