//! GLB model inspector
//!
//! Usage:
//!   glb_inspector model.glb
//!   glb_inspector --config viewer.toml
//!
//! Keys (defaults): W wireframe, A axes, E/Q explode, R reset camera.
//! Mouse: left drag orbits, right drag pans, wheel zooms.

use clap::Parser;
use std::path::PathBuf;
use tryon_demos::init_tracing;
use tryon_io::ViewerConfig;

#[derive(Parser, Debug)]
#[command(name = "glb_inspector")]
#[command(author, version, about = "Inspect a glTF/GLB model", long_about = None)]
struct Args {
    /// Model to open; overrides `inspector.model` from the config
    model: Option<PathBuf>,

    /// Viewer config file (TOML, YAML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    init_tracing("info")?;
    let args = Args::parse();
    let config = ViewerConfig::load(args.config.as_deref())?;
    tryon_visualization::run_inspector(&config, args.model)?;
    Ok(())
}
