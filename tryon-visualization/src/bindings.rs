//! Keyboard shortcuts
//!
//! Key names come from [`KeyConfig`]: a single character (matched without
//! regard to case) or a winit named key such as `Space` or `ArrowLeft`.

use tryon_core::{Error, Result};
use tryon_io::KeyConfig;
use winit::keyboard::{Key, NamedKey};

/// One configured key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyBinding {
    Character(String),
    Named(NamedKey),
}

impl KeyBinding {
    pub fn parse(name: &str) -> Result<Self> {
        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Ok(Self::Character(c.to_lowercase().collect()));
        }
        let named = match name {
            "Space" => NamedKey::Space,
            "Enter" => NamedKey::Enter,
            "Tab" => NamedKey::Tab,
            "Escape" => NamedKey::Escape,
            "Backspace" => NamedKey::Backspace,
            "Delete" => NamedKey::Delete,
            "ArrowLeft" => NamedKey::ArrowLeft,
            "ArrowRight" => NamedKey::ArrowRight,
            "ArrowUp" => NamedKey::ArrowUp,
            "ArrowDown" => NamedKey::ArrowDown,
            "PageUp" => NamedKey::PageUp,
            "PageDown" => NamedKey::PageDown,
            "Home" => NamedKey::Home,
            "End" => NamedKey::End,
            _ => return Err(Error::Config(format!("unknown key name: {name:?}"))),
        };
        Ok(Self::Named(named))
    }

    pub fn matches(&self, key: &Key) -> bool {
        match (self, key) {
            (Self::Character(expected), Key::Character(c)) => c.to_lowercase() == *expected,
            (Self::Named(expected), Key::Named(named)) => expected == named,
            // winit reports the space bar as a named key, but a config may say " "
            (Self::Character(expected), Key::Named(NamedKey::Space)) => expected == " ",
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InspectorCommand {
    ToggleWireframe,
    ToggleAxes,
    ExplodeUp,
    ExplodeDown,
    ResetCamera,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TryOnCommand {
    ToggleSource,
    NextAsset,
    PreviousAsset,
    ToggleFaceMesh,
    Dismiss,
}

/// Lookup from pressed key to command
#[derive(Debug, Clone)]
pub struct KeyMap<C> {
    bindings: Vec<(KeyBinding, C)>,
}

impl<C: Copy> KeyMap<C> {
    fn from_pairs(pairs: &[(&str, C)]) -> Result<Self> {
        let bindings = pairs
            .iter()
            .map(|(name, command)| Ok((KeyBinding::parse(name)?, *command)))
            .collect::<Result<_>>()?;
        Ok(Self { bindings })
    }

    /// First command bound to `key`
    pub fn command(&self, key: &Key) -> Option<C> {
        self.bindings
            .iter()
            .find(|(binding, _)| binding.matches(key))
            .map(|(_, command)| *command)
    }
}

impl KeyMap<InspectorCommand> {
    pub fn inspector(keys: &KeyConfig) -> Result<Self> {
        Self::from_pairs(&[
            (keys.wireframe.as_str(), InspectorCommand::ToggleWireframe),
            (keys.axes.as_str(), InspectorCommand::ToggleAxes),
            (keys.explode_up.as_str(), InspectorCommand::ExplodeUp),
            (keys.explode_down.as_str(), InspectorCommand::ExplodeDown),
            (keys.reset_camera.as_str(), InspectorCommand::ResetCamera),
        ])
    }
}

impl KeyMap<TryOnCommand> {
    pub fn tryon(keys: &KeyConfig) -> Result<Self> {
        Self::from_pairs(&[
            (keys.toggle_source.as_str(), TryOnCommand::ToggleSource),
            (keys.next_asset.as_str(), TryOnCommand::NextAsset),
            (keys.previous_asset.as_str(), TryOnCommand::PreviousAsset),
            (keys.face_mesh.as_str(), TryOnCommand::ToggleFaceMesh),
            (keys.dismiss.as_str(), TryOnCommand::Dismiss),
        ])
    }
}
