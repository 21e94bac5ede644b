//! Model centring and exploded view

use tryon_core::{Drawable, Model, NodeKind, SceneNode, Vector3f};

/// Largest explode factor
pub const MAX_EXPLODE_FACTOR: f32 = 2.0;

/// Amount one key press changes the explode factor
pub const DEFAULT_EXPLODE_STEP: f32 = 0.1;

/// Translation that moves the model's bounding-box centre to the origin
pub fn centering_offset(model: &Model) -> Vector3f {
    -model.center().coords
}

/// Per-part offsets for the given explode factor.
///
/// Each part moves along the direction from the model centre to the part
/// centre; a part sitting on the centre does not move.
pub fn part_offsets(model: &Model, factor: f32) -> Vec<Vector3f> {
    let factor = factor.clamp(0.0, MAX_EXPLODE_FACTOR);
    let center = model.center();
    model
        .parts
        .iter()
        .map(|part| (part.center() - center) * factor)
        .collect()
}

/// Explode factor driven by the keyboard
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExplodeState {
    factor: f32,
    step: f32,
}

impl Default for ExplodeState {
    fn default() -> Self {
        Self::new(DEFAULT_EXPLODE_STEP)
    }
}

impl ExplodeState {
    pub fn new(step: f32) -> Self {
        Self {
            factor: 0.0,
            step: step.abs(),
        }
    }

    pub fn factor(&self) -> f32 {
        self.factor
    }

    /// Step up, saturating at [`MAX_EXPLODE_FACTOR`]
    pub fn increase(&mut self) -> f32 {
        self.set(self.factor + self.step)
    }

    /// Step down, saturating at zero
    pub fn decrease(&mut self) -> f32 {
        self.set(self.factor - self.step)
    }

    pub fn set(&mut self, factor: f32) -> f32 {
        self.factor = factor.clamp(0.0, MAX_EXPLODE_FACTOR);
        self.factor
    }

    /// Write part offsets for the current factor into a model node.
    ///
    /// Returns `false` when the node is not a model.
    pub fn apply(&self, node: &mut SceneNode) -> bool {
        match &mut node.kind {
            NodeKind::Model { model, part_offsets: offsets } => {
                *offsets = if self.factor == 0.0 {
                    Vec::new()
                } else {
                    part_offsets(model, self.factor)
                };
                true
            }
            _ => false,
        }
    }
}
