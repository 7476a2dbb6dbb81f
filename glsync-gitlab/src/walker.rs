//! Concurrent traversal of a GitLab group tree.
//!
//! Every group node contributes two independent jobs (list its projects,
//! list its subgroups); a fixed pool of walker threads drains a shared
//! frontier of such jobs, and each discovered subgroup enqueues two more.
//! A failed listing is recorded and the rest of the tree keeps going, so a
//! single bad node costs only its own subtree.

use std::sync::{Condvar, Mutex};
use std::thread;

use glsync_core::RemoteProject;

use crate::error::GitlabError;

/// Default number of walker threads; sized to what a GitLab instance
/// comfortably serves from one token.
pub const WALKER_THREADS: usize = 8;

/// A group node as the walker sees it: enough identity to list its contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRef {
    pub id: u64,
    pub full_path: String,
}

/// A project as listed under a group, before filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupProject {
    pub path_with_namespace: String,
    pub default_branch: String,
    pub clone_url: String,
    pub archived: bool,
    /// True when the project is shared into this group rather than owned by
    /// it; such projects live at a different canonical path and would collide.
    pub shared: bool,
}

/// Directory of a group hierarchy. Implemented by [`GitlabClient`] for real
/// runs and by in-memory fakes in tests.
///
/// [`GitlabClient`]: crate::client::GitlabClient
pub trait GroupDirectory: Sync {
    fn list_projects(&self, group: &GroupRef) -> Result<Vec<GroupProject>, GitlabError>;
    fn list_subgroups(&self, group: &GroupRef) -> Result<Vec<GroupRef>, GitlabError>;
}

/// Walk the tree rooted at `root` and return every active project reachable
/// under it, plus every listing error encountered on the way.
///
/// Active means not archived and not merely shared into its group. Project
/// paths are relative to `root`. No ordering is guaranteed. `on_group` fires
/// once per discovered group, for progress reporting.
pub fn walk_group(
    dir: &dyn GroupDirectory,
    root: &GroupRef,
    concurrency: usize,
    on_group: &(dyn Fn(&str) + Sync),
) -> (Vec<RemoteProject>, Vec<GitlabError>) {
    let frontier = Frontier::new();
    frontier.push_group(root.clone(), on_group);

    let root_prefix = format!("{}/", root.full_path);
    let projects = Mutex::new(Vec::new());
    let errors = Mutex::new(Vec::new());

    thread::scope(|scope| {
        for _ in 0..concurrency.max(1) {
            scope.spawn(|| {
                while let Some(job) = frontier.claim() {
                    match job {
                        Job::Projects(group) => match dir.list_projects(&group) {
                            Ok(listed) => {
                                let mut out = projects.lock().expect("projects lock");
                                out.extend(
                                    listed
                                        .into_iter()
                                        .filter(|p| !p.archived && !p.shared)
                                        .map(|p| into_remote(p, &root_prefix)),
                                );
                            }
                            Err(err) => record_error(&errors, &group, err),
                        },
                        Job::Subgroups(group) => match dir.list_subgroups(&group) {
                            Ok(subgroups) => {
                                for subgroup in subgroups {
                                    frontier.push_group(subgroup, on_group);
                                }
                            }
                            Err(err) => record_error(&errors, &group, err),
                        },
                    }
                    frontier.finish();
                }
            });
        }
    });

    (
        projects.into_inner().expect("projects lock"),
        errors.into_inner().expect("errors lock"),
    )
}

fn into_remote(project: GroupProject, root_prefix: &str) -> RemoteProject {
    let path = project
        .path_with_namespace
        .strip_prefix(root_prefix)
        .unwrap_or(&project.path_with_namespace)
        .to_string();
    RemoteProject {
        path,
        default_branch: project.default_branch,
        clone_url: project.clone_url,
    }
}

fn record_error(errors: &Mutex<Vec<GitlabError>>, group: &GroupRef, err: GitlabError) {
    tracing::warn!(group = %group.full_path, error = %err, "listing failed");
    errors.lock().expect("errors lock").push(err);
}

// ---------------------------------------------------------------------------
// Frontier
// ---------------------------------------------------------------------------

enum Job {
    Projects(GroupRef),
    Subgroups(GroupRef),
}

/// Shared job queue with termination detection: a walker may only exit when
/// the queue is empty *and* no job is in flight, since any in-flight
/// subgroup listing can still grow the queue.
struct Frontier {
    state: Mutex<FrontierState>,
    ready: Condvar,
}

struct FrontierState {
    queue: Vec<Job>,
    in_flight: usize,
}

impl Frontier {
    fn new() -> Self {
        Self {
            state: Mutex::new(FrontierState {
                queue: Vec::new(),
                in_flight: 0,
            }),
            ready: Condvar::new(),
        }
    }

    fn push_group(&self, group: GroupRef, on_group: &(dyn Fn(&str) + Sync)) {
        tracing::debug!(group = %group.full_path, "group discovered");
        on_group(&group.full_path);
        let mut state = self.state.lock().expect("frontier lock");
        state.queue.push(Job::Projects(group.clone()));
        state.queue.push(Job::Subgroups(group));
        drop(state);
        self.ready.notify_all();
    }

    fn claim(&self) -> Option<Job> {
        let mut state = self.state.lock().expect("frontier lock");
        loop {
            if let Some(job) = state.queue.pop() {
                state.in_flight += 1;
                return Some(job);
            }
            if state.in_flight == 0 {
                return None;
            }
            state = self.ready.wait(state).expect("frontier lock");
        }
    }

    fn finish(&self) {
        let mut state = self.state.lock().expect("frontier lock");
        state.in_flight -= 1;
        let drained = state.in_flight == 0 && state.queue.is_empty();
        drop(state);
        if drained {
            // Wake the waiters so they can observe termination.
            self.ready.notify_all();
        }
    }
}
