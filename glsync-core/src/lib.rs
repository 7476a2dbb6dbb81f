//! # glsync-core
//!
//! The reconciliation engine: domain types, the remote/local pairing logic,
//! and the bounded worker pool that executes derived tasks.
//!
//! Public API surface:
//! - [`task`] — [`Task`] and its observable state, project descriptors
//! - [`reconcile`] — pairing and the action decision table
//! - [`scheduler`] — [`run_tasks`], the bounded worker pool
//! - [`progress`] — line splitting and git progress parsing

pub mod progress;
pub mod reconcile;
pub mod scheduler;
pub mod task;

pub use progress::{parse_received_objects, LineSplitter};
pub use reconcile::{build_tasks, pair_projects};
pub use scheduler::run_tasks;
pub use task::{
    filter_tasks, Action, LocalProject, Progress, ProjectPair, RemoteProject, Status, Task,
    TaskError, TaskSnapshot,
};
