//! Error types for glsync-git.

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// All errors that can arise from local scanning and git actions.
#[derive(Debug, Error)]
pub enum GitError {
    /// Underlying I/O failure, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A directory has a `.git` entry but its HEAD cannot be read or parsed.
    #[error("cannot read HEAD of working copy at {path}")]
    UnreadableHead { path: PathBuf },

    /// Refusing to act on a directory that is not a working-copy root.
    #[error("{path} is not the root of a git working copy")]
    NotAWorkingCopy { path: PathBuf },

    /// `git` exited unsuccessfully; `transcript` is its collected output.
    #[error("git {action} failed ({status}):\n{transcript}")]
    Command {
        action: &'static str,
        status: ExitStatus,
        transcript: String,
    },
}

/// Convenience constructor for [`GitError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> GitError {
    GitError::Io {
        path: path.into(),
        source,
    }
}
