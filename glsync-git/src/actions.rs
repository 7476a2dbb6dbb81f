//! Git actions: clone, pull, delete.
//!
//! Clone and pull shell out to `git` rather than reimplementing transport:
//! the user's existing SSH setup, credential helpers, and hooks then apply
//! unchanged. Progress is read line by line from stderr, where git writes it,
//! and handed to the caller's sink.

use std::io::{Read, Write};
use std::path::Path;
use std::process::{Command, Stdio};

use glsync_core::LineSplitter;

use crate::error::{io_err, GitError};

/// Clone `clone_url` into `dest`, reporting each progress line to `on_line`.
/// `dest` must not exist yet; git creates it.
pub fn clone(
    clone_url: &str,
    dest: &Path,
    on_line: &mut dyn FnMut(&str),
) -> Result<(), GitError> {
    let mut cmd = Command::new("git");
    cmd.arg("clone").arg("--progress").arg(clone_url).arg(dest);
    run_git(cmd, "clone", dest, on_line)
}

/// Run `git pull --progress` inside `path`. An "already up to date" result
/// is exit 0 and therefore success.
pub fn pull(path: &Path, on_line: &mut dyn FnMut(&str)) -> Result<(), GitError> {
    let mut cmd = Command::new("git");
    cmd.arg("pull").arg("--progress").current_dir(path);
    run_git(cmd, "pull", path, on_line)
}

/// Remove the working copy at `path`. Refuses anything that is not a
/// working-copy root, so a misderived task cannot take out an arbitrary
/// directory tree.
pub fn delete(path: &Path) -> Result<(), GitError> {
    if !path.join(".git").exists() {
        return Err(GitError::NotAWorkingCopy {
            path: path.to_path_buf(),
        });
    }
    tracing::debug!(path = %path.display(), "removing working copy");
    std::fs::remove_dir_all(path).map_err(|e| io_err(path, e))
}

fn run_git(
    mut cmd: Command,
    action: &'static str,
    context: &Path,
    on_line: &mut dyn FnMut(&str),
) -> Result<(), GitError> {
    tracing::debug!(%action, path = %context.display(), "running git");
    cmd.stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped());

    let mut child = cmd.spawn().map_err(|e| io_err(context, e))?;
    // Piped above, so the handle is always present.
    let mut stderr = child
        .stderr
        .take()
        .ok_or_else(|| io_err(context, std::io::Error::other("stderr pipe missing")))?;

    let mut transcript = String::new();
    let mut splitter = LineSplitter::new(|line: &str| {
        transcript.push_str(line);
        transcript.push('\n');
        on_line(line);
    });
    let mut buf = [0u8; 4096];
    loop {
        let n = match stderr.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                // Best effort: reap the child before surfacing the error.
                let _ = child.wait();
                return Err(io_err(context, e));
            }
        };
        splitter.write_all(&buf[..n]).map_err(|e| io_err(context, e))?;
    }
    splitter.finish();
    drop(splitter);

    let status = child.wait().map_err(|e| io_err(context, e))?;
    if !status.success() {
        return Err(GitError::Command {
            action,
            status,
            transcript,
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
