//! `glsync config` — show the resolved configuration.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use crate::config::{self, DEFAULT_GITLAB_URL, DEFAULT_WORKERS};

/// Arguments for `glsync config`.
#[derive(Args, Debug)]
pub struct ConfigArgs {}

impl ConfigArgs {
    pub fn run(self) -> Result<()> {
        let home: PathBuf = dirs::home_dir().context("could not determine home directory")?;
        let path = config::config_path_at(&home);
        let file = config::load_file_at(&home)?;

        if path.exists() {
            println!("config file: {}", path.display());
        } else {
            println!("config file: {} {}", path.display(), "(absent)".dimmed());
        }

        print_field(
            "gitlab_url",
            file.gitlab_url
                .or_else(|| Some(DEFAULT_GITLAB_URL.to_string())),
        );
        // Tokens resolve from the file or GLSYNC_TOKEN, same as `sync` does.
        let token = match (file.token, std::env::var("GLSYNC_TOKEN").is_ok()) {
            (_, true) => Some("<redacted> (from GLSYNC_TOKEN)".to_string()),
            (Some(_), false) => Some("<redacted>".to_string()),
            (None, false) => None,
        };
        print_field("token", token);
        print_field("group", file.group);
        print_field(
            "local_root",
            file.local_root.map(|p| p.display().to_string()),
        );
        print_field(
            "workers",
            Some(file.workers.unwrap_or(DEFAULT_WORKERS).to_string()),
        );
        Ok(())
    }
}

fn print_field(name: &str, value: Option<String>) {
    match value {
        Some(value) => println!("  {name}: {value}"),
        None => println!("  {name}: {}", "(unset)".yellow()),
    }
}
