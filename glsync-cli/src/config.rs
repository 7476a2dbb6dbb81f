//! Configuration resolution.
//!
//! Values come from three layers, strongest first: command-line flags, the
//! `GLSYNC_TOKEN` environment variable (handled by clap), and the YAML file
//! at `~/.glsync/config.yaml`. `gitlab_url` and `workers` have defaults; the
//! token, group, and local root must be provided somewhere.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_GITLAB_URL: &str = "https://gitlab.com";
pub const DEFAULT_WORKERS: usize = 5;

/// Shape of `~/.glsync/config.yaml`. Everything optional; resolution decides
/// what is required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub gitlab_url: Option<String>,
    pub token: Option<String>,
    pub group: Option<String>,
    pub local_root: Option<PathBuf>,
    pub workers: Option<usize>,
}

/// Values supplied on the command line, overriding the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub gitlab_url: Option<String>,
    pub token: Option<String>,
    pub group: Option<String>,
    pub local_root: Option<PathBuf>,
    pub workers: Option<usize>,
}

/// A fully resolved run configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub gitlab_url: String,
    pub token: String,
    pub group: String,
    pub local_root: PathBuf,
    pub workers: usize,
}

pub fn config_path_at(home: &Path) -> PathBuf {
    home.join(".glsync").join("config.yaml")
}

/// Load the config file under `home`, or an empty config if there is none.
pub fn load_file_at(home: &Path) -> Result<ConfigFile> {
    let path = config_path_at(home);
    if !path.exists() {
        return Ok(ConfigFile::default());
    }
    let content = fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_yaml::from_str(&content)
        .with_context(|| format!("failed to parse {}", path.display()))
}

/// Merge flags over the file over defaults into a runnable [`Config`].
pub fn resolve_at(home: &Path, overrides: Overrides) -> Result<Config> {
    let file = load_file_at(home)?;
    let path = config_path_at(home);

    let require = |value: Option<String>, field: &str, flag: &str| -> Result<String> {
        match value {
            Some(v) if !v.is_empty() => Ok(v),
            _ => bail!(
                "no {field} configured; pass {flag} or set `{field}` in {}",
                path.display()
            ),
        }
    };

    Ok(Config {
        gitlab_url: overrides
            .gitlab_url
            .or(file.gitlab_url)
            .unwrap_or_else(|| DEFAULT_GITLAB_URL.to_string()),
        token: require(overrides.token.or(file.token), "token", "--token")?,
        group: require(overrides.group.or(file.group), "group", "--group")?,
        local_root: match overrides.local_root.or(file.local_root) {
            Some(root) => root,
            None => bail!(
                "no local_root configured; pass --local-root or set `local_root` in {}",
                path.display()
            ),
        },
        workers: overrides
            .workers
            .or(file.workers)
            .unwrap_or(DEFAULT_WORKERS),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
