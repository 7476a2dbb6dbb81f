//! Bounded worker pool for executing reconciliation tasks.
//!
//! The task list is loaded once and never requeued; a fixed number of OS
//! threads claim entries through an atomic cursor. OS threads (rather than an
//! async runtime) because every action blocks the calling thread on a
//! subprocess, the network, or the filesystem.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use crate::task::{Status, Task, TaskError};

/// Execute every task in `tasks` exactly once, with at most `workers` actions
/// running concurrently. Returns once all tasks are `Completed`.
///
/// Each claimed task is moved to `Progressing`, its `work` result (if an
/// error) is stored on the task, and it is moved to `Completed`
/// unconditionally. A failing task never affects another; there is no retry
/// and no cancellation. Callers pass only open tasks; anything passed in is
/// executed regardless of its prior status.
pub fn run_tasks<F>(tasks: &[Arc<Task>], workers: usize, work: F)
where
    F: Fn(&Task) -> Result<(), TaskError> + Send + Sync,
{
    let workers = workers.max(1).min(tasks.len().max(1));
    let cursor = AtomicUsize::new(0);
    let work = &work;
    let cursor = &cursor;

    thread::scope(|scope| {
        for worker in 0..workers {
            scope.spawn(move || {
                loop {
                    let index = cursor.fetch_add(1, Ordering::Relaxed);
                    let Some(task) = tasks.get(index) else {
                        return;
                    };

                    tracing::debug!(worker, path = %task.path, action = %task.action, "task dispatched");
                    task.set_status(Status::Progressing);
                    let result = work(task);
                    if let Err(error) = result {
                        tracing::debug!(worker, path = %task.path, %error, "task failed");
                        task.set_error(error);
                    }
                    task.set_status(Status::Completed);
                }
            });
        }
    });
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
