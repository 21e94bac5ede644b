//! Virtual try-on viewer
//!
//! Starts on the still image with the first catalog asset. Space toggles the
//! live source, arrows step through the catalog, D shows the detected face
//! mesh and Esc dismisses a notice.

use clap::Parser;
use std::path::PathBuf;
use tryon_demos::{init_tracing, TryOnArgs};
use tryon_io::ViewerConfig;

#[derive(Parser, Debug)]
#[command(name = "virtual_tryon")]
#[command(author, version, about = "Try glasses on detected faces", long_about = None)]
struct Args {
    /// Viewer config file (TOML, YAML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(flatten)]
    tryon: TryOnArgs,
}

fn main() -> anyhow::Result<()> {
    init_tracing("info")?;
    let args = Args::parse();
    let mut config = ViewerConfig::load(args.config.as_deref())?;
    args.tryon.apply(&mut config);
    tryon_visualization::run_tryon(&config)?;
    Ok(())
}
