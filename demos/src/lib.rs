//! Shared setup for the tryon command-line tools

use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tryon_io::ViewerConfig;

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `default_filter` (trace|debug|info|warn|error|off).
pub fn init_tracing(default_filter: &str) -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init()?;
    Ok(())
}

/// Command-line overrides for the `[tryon]` config section
#[derive(Debug, Clone, Default, clap::Args)]
pub struct TryOnArgs {
    /// Asset catalog JSON
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Recorded landmark JSON used as the face detector
    #[arg(long)]
    pub landmarks: Option<PathBuf>,

    /// Image file (still mode background) or directory of frames (live source)
    #[arg(long)]
    pub frames: Option<PathBuf>,

    /// Detection cycles per second
    #[arg(long)]
    pub frame_rate: Option<f32>,
}

impl TryOnArgs {
    pub fn apply(&self, config: &mut ViewerConfig) {
        let tryon = &mut config.tryon;
        if let Some(catalog) = &self.catalog {
            tryon.catalog = catalog.clone();
        }
        if let Some(landmarks) = &self.landmarks {
            tryon.landmarks = Some(landmarks.clone());
        }
        if let Some(frames) = &self.frames {
            tryon.frames = Some(frames.clone());
        }
        if let Some(rate) = self.frame_rate {
            tryon.frame_rate = rate;
        }
    }
}
