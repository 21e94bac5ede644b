//! Headless overlay placement.
//!
//! Replays recorded landmarks through the detection loop and prints one JSON
//! line per cycle with the transform of every overlay instance.
//!
//! Usage:
//!   place_overlay --catalog assets/catalog.json --landmarks faces.json --cycles 5

use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use tracing::error;
use tryon_core::{Face, ObjectTransform};
use tryon_demos::{init_tracing, TryOnArgs};
use tryon_io::{AssetCatalog, ViewerConfig};
use tryon_tracking::{FaceSink, Frame, FrameSource, ReplayLoader, SourceMode, TryOnSession};

#[derive(Parser, Debug)]
#[command(name = "place_overlay")]
#[command(
    author,
    version,
    about = "Print overlay transforms for recorded faces",
    long_about = None
)]
struct Args {
    /// Viewer config file (TOML, YAML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    tryon: TryOnArgs,

    /// Catalog entry to place
    #[arg(long, default_value_t = 0)]
    asset: usize,

    /// Detection cycles to run
    #[arg(long, default_value_t = 1)]
    cycles: u64,
}

#[derive(Serialize)]
struct CycleLine<'a> {
    cycle: u64,
    asset: Option<&'a str>,
    faces: usize,
    overlays: Vec<ObjectTransform>,
}

/// Session wrapper that reports every applied cycle on stdout
struct Reporter {
    session: TryOnSession,
    cycle: u64,
}

impl Reporter {
    fn report(&self, faces: usize) {
        let scene = self.session.scene();
        let overlays = self
            .session
            .instances()
            .overlay_nodes()
            .into_iter()
            .filter_map(|id| scene.get(id).map(|node| node.transform))
            .collect();
        let line = CycleLine {
            cycle: self.cycle,
            asset: self.session.selected_asset().map(|asset| asset.id.as_str()),
            faces,
            overlays,
        };
        match serde_json::to_string(&line) {
            Ok(json) => println!("{json}"),
            Err(e) => error!(error = %e, "failed to encode cycle"),
        }
    }
}

impl FaceSink for Reporter {
    fn apply_faces(&mut self, frame: &Frame, faces: &[Face]) {
        self.session.apply_faces(frame, faces);
        self.report(faces.len());
        self.cycle += 1;
    }

    fn clear_overlays(&mut self) {
        self.session.clear_overlays();
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing("warn")?;
    let args = Args::parse();
    let mut config = ViewerConfig::load(args.config.as_deref())?;
    args.tryon.apply(&mut config);
    let tryon = &config.tryon;

    let Some(landmarks) = tryon.landmarks.clone() else {
        anyhow::bail!("no landmark recording given (--landmarks or tryon.landmarks)");
    };
    let catalog = AssetCatalog::read(&tryon.catalog)?;
    let (mut source, _) = tryon_visualization::open_sources(tryon)?;
    let (width, height) = source.dimensions();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async {
        let mut session = TryOnSession::new(tryon, catalog)?;
        session.set_viewport(width, height);
        session.select(args.asset).await;
        session.set_mode(SourceMode::Live, (width, height));

        let mut reporter = Reporter { session, cycle: 0 };
        let loader = ReplayLoader::new(landmarks);
        tryon_visualization::run_headless(
            &loader,
            source.as_mut(),
            &mut reporter,
            tryon.frame_rate,
            args.cycles,
        )
            .await?;
        reporter.session.dispose();
        anyhow::Ok(())
    })
}
