//! Command line interface definition

use bubz2_types::{ColorChoice, CompressionLevel};
use clap::Parser;
use std::path::PathBuf;

/// bubz2 - Incremental bzip2 mirror for game server fast downloads
#[derive(Parser)]
#[command(name = "bubz2")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Incremental bzip2 mirror for game server fast downloads")]
#[command(long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub sync: SyncArgs,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// What to mirror and how
#[derive(Parser)]
pub struct SyncArgs {
    /// Directory with the uncompressed files
    #[arg(long, value_name = "PATH")]
    pub from: Option<PathBuf>,

    /// Directory receiving the .bz2 files
    #[arg(long, value_name = "PATH")]
    pub to: Option<PathBuf>,

    /// File recording the modification time of every compressed file
    #[arg(long, value_name = "PATH")]
    pub state: Option<PathBuf>,

    /// File with wildcard patterns of paths to skip
    #[arg(long, value_name = "PATH")]
    pub ignore: Option<PathBuf>,

    /// Compression level: none, fast, best or 0-9
    #[arg(long, value_name = "LEVEL")]
    pub level: Option<CompressionLevel>,

    /// Files compressed in parallel (0 = auto)
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Compress every file even if it looks up to date
    #[arg(long)]
    pub force: bool,

    /// Show what would be compressed without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Keep state records of files that no longer exist
    #[arg(long)]
    pub no_prune: bool,
}

/// Output and configuration options
#[derive(Parser)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging to the logs directory
    #[arg(long)]
    pub debug: bool,

    /// Color output control
    #[arg(long, value_enum)]
    pub color: Option<ColorChoice>,

    /// Use alternate config file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}
