//! gamedir command-line entry point.

mod app;
mod config;
mod library;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gamedir")]
#[command(about = "Match game folders to the catalog and track missing games", long_about = None)]
struct Cli {
    /// Configuration file (defaults to the per-user location)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Match the subfolders of a directory against the catalog and install new games
    Scan {
        /// Directory whose immediate subfolders are game folders
        root: PathBuf,
    },

    /// Rebuild the game path cache from the library
    Rebuild {
        /// Rebuild even if the cache file already exists
        #[arg(short, long)]
        force: bool,
    },

    /// Verify every cached game path and list games whose files are gone
    Missing,

    /// Print the game path cache
    Cache,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "starting gamedir");

    let config = match &cli.config {
        Some(path) => config::Config::load_from(path)?,
        None => config::Config::load()?,
    };
    tracing::debug!(catalog = %config.catalog_url, "configuration loaded");

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(app::run(config, cli.command))
}
