//! Viewer settings
//!
//! Layered through the `config` crate: built-in defaults, then an optional
//! file (JSON, TOML or YAML by extension), then `TRYON__SECTION__KEY`
//! environment variables.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;
use tryon_core::{Error, KeyPointIndices, Result};

/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "TRYON";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InspectorConfig {
    /// Model opened at startup
    pub model: Option<PathBuf>,
    /// Clear colour as `#rrggbb`
    pub background: String,
    pub fov_degrees: f32,
    pub camera_z: f32,
    pub ambient_intensity: f32,
    pub directional_intensity: f32,
    pub directional_position: [f32; 3],
    /// Orbit damping factor per frame
    pub damping: f32,
    pub explode_step: f32,
    pub axes_size: f32,
}

impl Default for InspectorConfig {
    fn default() -> Self {
        Self {
            model: None,
            background: "#444444".into(),
            fov_degrees: 75.0,
            camera_z: 2.0,
            ambient_intensity: 0.5,
            directional_intensity: 1.0,
            directional_position: [1.0, 1.0, 1.0],
            damping: 0.05,
            explode_step: 0.1,
            axes_size: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TryOnConfig {
    pub catalog: PathBuf,
    /// Recorded landmarks replayed as the face-landmark model
    pub landmarks: Option<PathBuf>,
    /// Still image, or a directory of frames played as the live source
    pub frames: Option<PathBuf>,
    pub frame_rate: f32,
    /// Size of generated blank frames when no frame files are given
    pub frame_width: u32,
    pub frame_height: u32,
    pub video_fov_degrees: f32,
    pub key_points: KeyPointIndices,
    pub show_face_mesh: bool,
    pub spot_intensity: f32,
    pub camera_light_intensity: f32,
    /// Clear colour of the still-image view
    pub still_background: String,
}

impl Default for TryOnConfig {
    fn default() -> Self {
        Self {
            catalog: PathBuf::from("assets/catalog.json"),
            landmarks: None,
            frames: None,
            frame_rate: 30.0,
            frame_width: 640,
            frame_height: 480,
            video_fov_degrees: 45.0,
            key_points: KeyPointIndices::default(),
            show_face_mesh: false,
            spot_intensity: 0.3,
            camera_light_intensity: 0.8,
            still_background: "#3399cc".into(),
        }
    }
}

/// Key names as winit reports them: a character, or a named key such as
/// `Space`, `ArrowLeft` or `Escape`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyConfig {
    pub wireframe: String,
    pub axes: String,
    pub explode_up: String,
    pub explode_down: String,
    pub reset_camera: String,
    pub toggle_source: String,
    pub next_asset: String,
    pub previous_asset: String,
    pub face_mesh: String,
    pub dismiss: String,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            wireframe: "w".into(),
            axes: "a".into(),
            explode_up: "e".into(),
            explode_down: "q".into(),
            reset_camera: "r".into(),
            toggle_source: "Space".into(),
            next_asset: "ArrowRight".into(),
            previous_asset: "ArrowLeft".into(),
            face_mesh: "d".into(),
            dismiss: "Escape".into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub inspector: InspectorConfig,
    pub tryon: TryOnConfig,
    pub keys: KeyConfig,
}

fn config_error(e: config::ConfigError) -> Error {
    Error::Config(e.to_string())
}

impl ViewerConfig {
    /// Defaults, then the file if one is given, then the environment.
    ///
    /// A given file must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder()
            .add_source(config::Config::try_from(&Self::default()).map_err(config_error)?);
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let config = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(config_error)?
            .try_deserialize::<Self>()
            .map_err(config_error)?;
        debug!(?config, "configuration loaded");
        Ok(config)
    }

    /// Parse configuration text on top of the defaults
    pub fn parse(text: &str, format: config::FileFormat) -> Result<Self> {
        config::Config::builder()
            .add_source(config::Config::try_from(&Self::default()).map_err(config_error)?)
            .add_source(config::File::from_str(text, format))
            .build()
            .map_err(config_error)?
            .try_deserialize()
            .map_err(config_error)
    }
}

/// Parse `#rrggbb` (leading `#` optional) into RGBA in `[0, 1]`
pub fn parse_hex_color(text: &str) -> Result<[f32; 4]> {
    let hex = text.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(Error::Config(format!("invalid colour: {text}")));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16)
            .map(|v| v as f32 / 255.0)
            .map_err(|_| Error::Config(format!("invalid colour: {text}")))
    };
    Ok([channel(0)?, channel(2)?, channel(4)?, 1.0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults_match_viewers() {
        let config = ViewerConfig::default();
        assert_eq!(config.inspector.fov_degrees, 75.0);
        assert_eq!(config.inspector.camera_z, 2.0);
        assert_eq!(config.tryon.key_points.mid_eye, 168);
        assert_eq!(config.keys.toggle_source, "Space");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let toml = r#"
            [inspector]
            damping = 0.1

            [tryon.key_points]
            nose_bottom = 4
        "#;
        let config = ViewerConfig::parse(toml, config::FileFormat::Toml).unwrap();
        assert_eq!(config.inspector.damping, 0.1);
        assert_eq!(config.inspector.background, "#444444");
        assert_eq!(config.tryon.key_points.nose_bottom, 4);
        assert_eq!(config.tryon.key_points.mid_eye, 168);
    }

    #[test]
    fn test_missing_config_file_is_config_error() {
        let err = ViewerConfig::load(Some(Path::new("no/such/tryon.toml"))).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_no_file_loads_defaults() {
        let config = ViewerConfig::load(None).unwrap();
        assert_eq!(config.tryon.frame_rate, 30.0);
    }

    #[test]
    fn test_hex_colors() {
        let c = parse_hex_color("#444444").unwrap();
        assert_relative_eq!(c[0], 68.0 / 255.0);
        assert_eq!(c[3], 1.0);
        assert!(parse_hex_color("#44").is_err());
        assert!(parse_hex_color("zzzzzz").is_err());
    }
}
