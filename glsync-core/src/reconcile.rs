//! Pairing of remote and local project descriptors into tasks.
//!
//! Descriptors are joined by exact logical-path equality (case-sensitive, no
//! normalization) into [`ProjectPair`]s, and each pair yields exactly one
//! [`Task`] with its action derived from which sides are present and whether
//! the checked-out branch matches the remote default.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use crate::task::{Action, LocalProject, ProjectPair, RemoteProject, Status, Task};

/// Message set on a pull task skipped because a non-default branch is
/// checked out locally.
pub const SKIP_NON_DEFAULT_BRANCH: &str = "skipped: non-default branch";

/// Message set on a delete task skipped because confirmation was declined.
pub const SKIP_DELETE_DECLINED: &str = "skipped: delete declined";

/// Full outer join of the two descriptor lists, keyed by logical path.
///
/// BTreeMap keeps the result ordered by path so task lists render stably;
/// execution order is still up to the scheduler.
pub fn pair_projects(
    remote: Vec<RemoteProject>,
    local: Vec<LocalProject>,
) -> BTreeMap<String, ProjectPair> {
    let mut pairs: BTreeMap<String, ProjectPair> = BTreeMap::new();
    for project in remote {
        let path = project.path.clone();
        pairs.entry(path).or_default().remote = Some(project);
    }
    for project in local {
        let path = project.path.clone();
        pairs.entry(path).or_default().local = Some(project);
    }
    pairs
}

/// Derive one task per logical path.
///
/// `confirm` is consulted once per local-only project before a delete task is
/// opened; a declining answer produces a pre-completed skip task instead.
pub fn build_tasks(
    remote: Vec<RemoteProject>,
    local: Vec<LocalProject>,
    local_root: &Path,
    mut confirm: impl FnMut(&str) -> bool,
) -> Vec<Arc<Task>> {
    let pairs = pair_projects(remote, local);

    let mut tasks = Vec::with_capacity(pairs.len());
    for (path, pair) in pairs {
        let local_path = local_root.join(&path);
        let task = match (&pair.remote, &pair.local) {
            // Both sides exist: pull, unless a non-default branch is
            // checked out, in which case leave the working copy alone.
            (Some(remote), Some(local)) => {
                if remote.default_branch == local.branch {
                    Task::new(path, pair.clone(), local_path, local.branch.as_str(), Action::Pull, Status::Open)
                } else {
                    let task = Task::new(
                        path,
                        pair.clone(),
                        local_path,
                        local.branch.as_str(),
                        Action::Pull,
                        Status::Completed,
                    );
                    task.set_message(SKIP_NON_DEFAULT_BRANCH);
                    task
                }
            }

            // Remote only: clone it.
            (Some(remote), None) => Task::new(
                path,
                pair.clone(),
                local_path,
                remote.default_branch.as_str(),
                Action::Clone,
                Status::Open,
            ),

            // Local only: the remote counterpart is gone; delete if confirmed.
            (None, Some(local)) => {
                if confirm(&format!("delete local project '{path}'?")) {
                    Task::new(path, pair.clone(), local_path, local.branch.as_str(), Action::Delete, Status::Open)
                } else {
                    let task = Task::new(
                        path,
                        pair.clone(),
                        local_path,
                        local.branch.as_str(),
                        Action::Delete,
                        Status::Completed,
                    );
                    task.set_message(SKIP_DELETE_DECLINED);
                    task
                }
            }

            // Unreachable: pair_projects only creates entries with a side.
            (None, None) => continue,
        };

        tracing::debug!(path = %task.path, action = %task.action, status = %task.status(), "task derived");
        tasks.push(task);
    }

    tasks
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn remote(path: &str, branch: &str) -> RemoteProject {
        RemoteProject {
            path: path.to_string(),
            default_branch: branch.to_string(),
            clone_url: format!("git@example.com:{path}.git"),
        }
    }

    fn local(path: &str, branch: &str) -> LocalProject {
        LocalProject {
            path: path.to_string(),
            branch: branch.to_string(),
        }
    }

    fn accept_all(_: &str) -> bool {
        true
    }

    #[test]
    fn pair_projects_joins_both_sides_on_one_key() {
        let pairs = pair_projects(
            vec![remote("a/x", "main"), remote("a/y", "main")],
            vec![local("a/x", "main"), local("b/z", "main")],
        );
        assert_eq!(pairs.len(), 3);

        let joined = &pairs["a/x"];
        assert_eq!(joined.remote.as_ref().map(|r| r.path.as_str()), Some("a/x"));
        assert_eq!(joined.local.as_ref().map(|l| l.path.as_str()), Some("a/x"));
        assert!(pairs["a/y"].local.is_none());
        assert!(pairs["b/z"].remote.is_none());
    }

    #[test]
    fn one_task_per_distinct_path() {
        let tasks = build_tasks(
            vec![remote("a/x", "main"), remote("a/y", "main")],
            vec![local("a/x", "main"), local("b/z", "main")],
            Path::new("/repos"),
            accept_all,
        );
        let mut paths: Vec<_> = tasks.iter().map(|t| t.path.clone()).collect();
        paths.sort();
        assert_eq!(paths, ["a/x", "a/y", "b/z"]);
    }

    #[rstest]
    #[case::matching_branch("main", "main", Action::Pull, Status::Open, "")]
    #[case::non_default_branch(
        "main",
        "hotfix",
        Action::Pull,
        Status::Completed,
        SKIP_NON_DEFAULT_BRANCH
    )]
    fn both_sides_present(
        #[case] default_branch: &str,
        #[case] local_branch: &str,
        #[case] action: Action,
        #[case] status: Status,
        #[case] message: &str,
    ) {
        let tasks = build_tasks(
            vec![remote("a/x", default_branch)],
            vec![local("a/x", local_branch)],
            Path::new("/repos"),
            accept_all,
        );
        assert_eq!(tasks.len(), 1);
        let task = &tasks[0];
        assert_eq!(task.action, action);
        assert_eq!(task.status(), status);
        assert_eq!(task.message(), message);
        assert_eq!(task.branch, local_branch);
        assert_eq!(task.local_path, Path::new("/repos/a/x"));
    }

    #[test]
    fn remote_only_becomes_clone() {
        let tasks = build_tasks(
            vec![remote("a/x", "develop")],
            vec![],
            Path::new("/repos"),
            accept_all,
        );
        let task = &tasks[0];
        assert_eq!(task.action, Action::Clone);
        assert_eq!(task.status(), Status::Open);
        assert_eq!(task.branch, "develop");
    }

    #[test]
    fn local_only_becomes_delete_when_confirmed() {
        let tasks = build_tasks(vec![], vec![local("a/gone", "main")], Path::new("/repos"), accept_all);
        let task = &tasks[0];
        assert_eq!(task.action, Action::Delete);
        assert_eq!(task.status(), Status::Open);
    }

    #[test]
    fn declined_delete_is_pre_completed() {
        let mut prompts = Vec::new();
        let tasks = build_tasks(
            vec![],
            vec![local("a/gone", "main")],
            Path::new("/repos"),
            |prompt: &str| {
                prompts.push(prompt.to_string());
                false
            },
        );
        let task = &tasks[0];
        assert_eq!(task.action, Action::Delete);
        assert_eq!(task.status(), Status::Completed);
        assert_eq!(task.message(), SKIP_DELETE_DECLINED);
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("a/gone"));
    }

    #[test]
    fn case_sensitive_paths_do_not_join() {
        // Exact-string matching is deliberate: a case difference yields two
        // tasks, not one pair.
        let tasks = build_tasks(
            vec![remote("Team/Svc", "main")],
            vec![local("team/svc", "main")],
            Path::new("/repos"),
            accept_all,
        );
        assert_eq!(tasks.len(), 2);
        let actions: Vec<_> = tasks.iter().map(|t| (t.path.clone(), t.action)).collect();
        assert!(actions.contains(&("Team/Svc".to_string(), Action::Clone)));
        assert!(actions.contains(&("team/svc".to_string(), Action::Delete)));
    }

    #[test]
    fn team_scenario_end_to_end() {
        let tasks = build_tasks(
            vec![remote("teamA/svc1", "main"), remote("teamA/svc2", "main")],
            vec![local("teamA/svc1", "main"), local("teamA/old", "main")],
            Path::new("/repos"),
            accept_all,
        );

        let by_path: std::collections::HashMap<_, _> =
            tasks.iter().map(|t| (t.path.as_str(), t)).collect();
        assert_eq!(tasks.len(), 3);

        let svc1 = by_path["teamA/svc1"];
        assert_eq!((svc1.action, svc1.status()), (Action::Pull, Status::Open));
        let svc2 = by_path["teamA/svc2"];
        assert_eq!((svc2.action, svc2.status()), (Action::Clone, Status::Open));
        let old = by_path["teamA/old"];
        assert_eq!((old.action, old.status()), (Action::Delete, Status::Open));
    }

    #[test]
    fn tasks_are_ordered_by_path() {
        let tasks = build_tasks(
            vec![remote("b", "main"), remote("a", "main")],
            vec![local("c", "main")],
            Path::new("/repos"),
            accept_all,
        );
        let paths: Vec<_> = tasks.iter().map(|t| t.path.as_str()).collect();
        assert_eq!(paths, ["a", "b", "c"]);
    }
}
