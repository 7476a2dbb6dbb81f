//! Domain types for a reconciliation run.
//!
//! A [`Task`] is the unit of observable work: one git action against one
//! logical path. Its immutable identity is set at construction by the
//! reconciler; its mutable state (status, message, error, progress) is
//! written by the single worker executing it and read concurrently by
//! observers such as the live table renderer.

use std::error::Error;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Boxed error stored on a failed task.
pub type TaskError = Box<dyn Error + Send + Sync>;

// ---------------------------------------------------------------------------
// Project descriptors
// ---------------------------------------------------------------------------

/// A project discovered under the remote group tree.
///
/// `path` is the project's logical path relative to the traversal root group
/// (e.g. `teamA/svc1`). Immutable once produced by the tree walker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteProject {
    pub path: String,
    pub default_branch: String,
    pub clone_url: String,
}

/// A working copy discovered under the local root.
///
/// `branch` is the short form of the checked-out branch (`main`, not
/// `refs/heads/main`). Immutable once produced by the scanner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalProject {
    pub path: String,
    pub branch: String,
}

/// The full-outer-join record for one logical path.
///
/// At least one side is always present; the reconciler never constructs an
/// empty pair.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProjectPair {
    pub remote: Option<RemoteProject>,
    pub local: Option<LocalProject>,
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// The git operation a task performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Clone,
    Pull,
    Delete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Clone => write!(f, "clone"),
            Action::Pull => write!(f, "pull"),
            Action::Delete => write!(f, "delete"),
        }
    }
}

/// Lifecycle state of a task. Transitions are monotonic:
/// `Open → Progressing → Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Open,
    Progressing,
    Completed,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Open => write!(f, "open"),
            Status::Progressing => write!(f, "progressing"),
            Status::Completed => write!(f, "completed"),
        }
    }
}

/// Numeric transfer progress extracted from git output, observer-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub current: u64,
    pub total: u64,
}

// ---------------------------------------------------------------------------
// Task
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct TaskState {
    status: Status,
    message: String,
    error: Option<TaskError>,
    progress: Option<Progress>,
}

/// A point-in-time copy of a task's mutable state, safe to hold without
/// blocking the worker.
#[derive(Debug, Clone)]
pub struct TaskSnapshot {
    pub status: Status,
    pub message: String,
    pub error: Option<String>,
    pub progress: Option<Progress>,
}

/// One reconciliation task: an action against a logical path.
///
/// Each setter takes the state lock independently, so a reader polling during
/// a transition may observe, say, the new status with the old message. That
/// interleaving is accepted: observers are best-effort, not transactional.
/// What is guaranteed is that no read ever sees a torn value.
pub struct Task {
    /// Logical path relative to the group root / local root.
    pub path: String,
    /// Absolute filesystem location, computed once at creation.
    pub local_path: PathBuf,
    /// Local branch for pull/delete, remote default branch for clone.
    pub branch: String,
    pub action: Action,
    pub pair: ProjectPair,
    state: Mutex<TaskState>,
}

impl Task {
    pub fn new(
        path: impl Into<String>,
        pair: ProjectPair,
        local_path: impl Into<PathBuf>,
        branch: impl Into<String>,
        action: Action,
        status: Status,
    ) -> Arc<Self> {
        Arc::new(Self {
            path: path.into(),
            local_path: local_path.into(),
            branch: branch.into(),
            action,
            pair,
            state: Mutex::new(TaskState {
                status,
                message: String::new(),
                error: None,
                progress: None,
            }),
        })
    }

    pub fn set_status(&self, status: Status) {
        self.lock().status = status;
    }

    pub fn status(&self) -> Status {
        self.lock().status
    }

    pub fn set_message(&self, message: impl Into<String>) {
        self.lock().message = message.into();
    }

    pub fn message(&self) -> String {
        self.lock().message.clone()
    }

    /// Record the terminal error. Called at most once, by the worker that
    /// executed the task.
    pub fn set_error(&self, error: TaskError) {
        self.lock().error = Some(error);
    }

    /// Formatted terminal error, if the task failed.
    pub fn error(&self) -> Option<String> {
        self.lock().error.as_ref().map(|e| e.to_string())
    }

    pub fn set_progress(&self, progress: Progress) {
        self.lock().progress = Some(progress);
    }

    pub fn snapshot(&self) -> TaskSnapshot {
        let state = self.lock();
        TaskSnapshot {
            status: state.status,
            message: state.message.clone(),
            error: state.error.as_ref().map(|e| e.to_string()),
            progress: state.progress,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, TaskState> {
        // A worker never panics while holding this lock; if one somehow did,
        // the state is still a coherent snapshot, so recover it.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("path", &self.path)
            .field("action", &self.action)
            .field("status", &self.status())
            .finish()
    }
}

/// Tasks currently in `status`, in input order.
pub fn filter_tasks(tasks: &[Arc<Task>], status: Status) -> Vec<Arc<Task>> {
    tasks
        .iter()
        .filter(|t| t.status() == status)
        .cloned()
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
