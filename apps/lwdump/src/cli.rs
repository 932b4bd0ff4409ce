//! Command line interface definition

use clap::Parser;
use std::path::PathBuf;

/// lwdump - dump game assets from the Lost Word content servers
#[derive(Parser)]
#[command(name = "lwdump")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Dump game assets from the Lost Word content servers")]
#[command(long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Directory that receives manifests and assets
    #[arg(long, value_name = "DIR")]
    pub dump_dir: Option<PathBuf>,

    /// Only dump these categories (repeatable)
    #[arg(long = "category", value_name = "NAME")]
    pub categories: Vec<String>,

    /// Maximum simultaneous asset transfers
    #[arg(long, value_name = "N")]
    pub max_concurrent: Option<usize>,

    /// Stop a category on its first failed asset
    #[arg(long)]
    pub fail_fast: bool,
}

/// Global arguments
#[derive(Parser)]
pub struct GlobalArgs {
    /// Emit JSON logs and a JSON summary on stdout
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging to <dump dir>/logs/
    #[arg(long)]
    pub debug: bool,

    /// Use alternate config file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}
