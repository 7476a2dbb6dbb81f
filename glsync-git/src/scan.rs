//! Discovery of git working copies under a local root.
//!
//! A directory containing a `.git` entry (directory, or `gitdir:` file as
//! used by worktrees and submodules) is a working-copy root: it is emitted
//! and its subtree is not entered. Everything else is traversed
//! transparently. Logical paths are slash-joined segments relative to the
//! scan root, so they line up with GitLab namespace paths on any platform.

use std::fs;
use std::path::Path;

use glsync_core::LocalProject;

use crate::error::{io_err, GitError};

/// Scan `root` for working copies and report each with its checked-out
/// branch (short form).
pub fn scan_working_copies(root: &Path) -> Result<Vec<LocalProject>, GitError> {
    let mut projects = Vec::new();
    scan_dir(root, String::new(), &mut projects)?;
    Ok(projects)
}

fn scan_dir(dir: &Path, logical: String, out: &mut Vec<LocalProject>) -> Result<(), GitError> {
    if !logical.is_empty() {
        if let Some(branch) = read_branch(dir)? {
            tracing::debug!(path = %logical, %branch, "working copy found");
            out.push(LocalProject {
                path: logical,
                branch,
            });
            return Ok(());
        }
    }

    let entries = fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let file_type = entry.file_type().map_err(|e| io_err(entry.path(), e))?;
        if !file_type.is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name == ".git" {
            continue;
        }
        let child_logical = if logical.is_empty() {
            name
        } else {
            format!("{logical}/{name}")
        };
        scan_dir(&entry.path(), child_logical, out)?;
    }
    Ok(())
}

/// The checked-out branch of the working copy rooted at `dir`, or `None` if
/// `dir` is not a working-copy root.
///
/// `ref: refs/heads/x/y` yields `x/y`; a detached HEAD yields the raw commit
/// id, which never equals a remote default branch, so such a checkout ends
/// up skipped rather than pulled.
fn read_branch(dir: &Path) -> Result<Option<String>, GitError> {
    let dot_git = dir.join(".git");
    let git_dir = if dot_git.is_dir() {
        dot_git
    } else if dot_git.is_file() {
        // Worktree/submodule layout: `.git` is a one-line pointer file.
        let content = fs::read_to_string(&dot_git).map_err(|e| io_err(&dot_git, e))?;
        let Some(target) = content.strip_prefix("gitdir:") else {
            return Ok(None);
        };
        let target = Path::new(target.trim());
        if target.is_absolute() {
            target.to_path_buf()
        } else {
            dir.join(target)
        }
    } else {
        return Ok(None);
    };

    let head_path = git_dir.join("HEAD");
    let head = fs::read_to_string(&head_path).map_err(|_| GitError::UnreadableHead {
        path: dir.to_path_buf(),
    })?;
    let head = head.trim();
    if head.is_empty() {
        return Err(GitError::UnreadableHead {
            path: dir.to_path_buf(),
        });
    }

    let branch = match head.strip_prefix("ref:") {
        Some(reference) => {
            let reference = reference.trim();
            reference
                .strip_prefix("refs/heads/")
                .unwrap_or(reference)
                .to_string()
        }
        None => head.to_string(),
    };
    Ok(Some(branch))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
