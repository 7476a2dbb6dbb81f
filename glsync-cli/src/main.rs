//! glsync — mirror a GitLab group tree into a local directory.
//!
//! # Usage
//!
//! ```text
//! glsync sync [--dry-run] [--workers N] [--yes]
//!             [--group G] [--local-root PATH] [--gitlab-url URL] [--token T]
//! glsync config
//! ```
//!
//! Configuration lives in `~/.glsync/config.yaml`; flags override it, and
//! the token can also come from `GLSYNC_TOKEN`.

mod commands;
mod config;
mod renderer;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{config::ConfigArgs, sync::SyncArgs};

#[derive(Parser, Debug)]
#[command(
    name = "glsync",
    version,
    about = "Keep a local directory tree in sync with a GitLab group",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Reconcile the local tree with the remote group (clone/pull/delete).
    Sync(SyncArgs),

    /// Show the resolved configuration.
    Config(ConfigArgs),
}

fn main() -> Result<()> {
    // Diagnostics go to stderr so the live table owns stdout.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Sync(args) => args.run(),
        Commands::Config(args) => args.run(),
    }
}
