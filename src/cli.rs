//! Command-line plumbing shared by the binaries

use crate::error::Result;
use crate::markers::{select_markers, Marker, MarkerPreset};
use crate::viewer::open_image;
use clap::Args;
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Log to stderr at INFO, or DEBUG with `--verbose`. `RUST_LOG` wins when set.
pub fn init_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[derive(Args, Debug, Clone, Default)]
pub struct ChartOptions {
    /// JSON file with bandwidth-change markers ([{"time", "label", "color"}])
    #[arg(long, value_name = "FILE", conflicts_with = "no_markers")]
    pub markers: Option<PathBuf>,

    /// Do not draw bandwidth-change markers
    #[arg(long)]
    pub no_markers: bool,

    /// Write the image without opening a viewer
    #[arg(long)]
    pub no_show: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl ChartOptions {
    pub fn markers(&self, preset: MarkerPreset) -> Result<Vec<Marker>> {
        select_markers(self.markers.as_deref(), self.no_markers, preset)
    }

    /// Announce the written file and open it unless `--no-show`.
    pub fn finish(&self, path: &Path) {
        println!("Plot saved as {}", path.display());
        if !self.no_show {
            open_image(path);
        }
    }
}
