//! End-to-end properties of the reconcile → schedule pipeline, exercised
//! with in-memory work functions instead of real git actions.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use glsync_core::{
    build_tasks, filter_tasks, run_tasks,
    task::{Action, LocalProject, RemoteProject, Status},
};

fn remote(path: &str, branch: &str) -> RemoteProject {
    RemoteProject {
        path: path.to_string(),
        default_branch: branch.to_string(),
        clone_url: format!("git@gitlab.example.com:{path}.git"),
    }
}

fn local(path: &str, branch: &str) -> LocalProject {
    LocalProject {
        path: path.to_string(),
        branch: branch.to_string(),
    }
}

#[test]
fn skipped_tasks_are_never_dispatched() {
    // svc1 is checked out on a hotfix branch: the derived pull task is born
    // Completed and must never reach a worker.
    let tasks = build_tasks(
        vec![remote("teamA/svc1", "main"), remote("teamA/svc2", "main")],
        vec![local("teamA/svc1", "hotfix")],
        Path::new("/repos"),
        |_| true,
    );

    let open = filter_tasks(&tasks, Status::Open);
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].path, "teamA/svc2");

    let executed = Mutex::new(Vec::new());
    run_tasks(&open, 4, |task| {
        executed.lock().expect("lock").push(task.path.clone());
        Ok(())
    });

    assert_eq!(executed.into_inner().expect("lock"), ["teamA/svc2"]);
    for task in &tasks {
        assert_eq!(task.status(), Status::Completed);
    }
}

#[test]
fn full_run_reaches_completed_despite_failures() {
    let remotes: Vec<_> = (0..8).map(|i| remote(&format!("g/p{i}"), "main")).collect();
    let locals = vec![local("g/p0", "main"), local("g/stale", "main")];
    let tasks = build_tasks(remotes, locals, Path::new("/repos"), |_| true);
    assert_eq!(tasks.len(), 9);

    let open = filter_tasks(&tasks, Status::Open);
    let failures = AtomicUsize::new(0);
    run_tasks(&open, 3, |task| {
        if task.action == Action::Delete {
            failures.fetch_add(1, Ordering::SeqCst);
            return Err("disk on fire".into());
        }
        task.set_message("done");
        Ok(())
    });

    assert_eq!(failures.load(Ordering::SeqCst), 1);
    let failed: Vec<_> = tasks.iter().filter(|t| t.error().is_some()).collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].path, "g/stale");
    assert!(tasks.iter().all(|t| t.status() == Status::Completed));
}

#[test]
fn worker_bound_holds_for_open_subset() {
    let remotes: Vec<_> = (0..16).map(|i| remote(&format!("g/p{i}"), "main")).collect();
    let tasks = build_tasks(remotes, vec![], Path::new("/repos"), |_| true);
    let open = filter_tasks(&tasks, Status::Open);

    let running = AtomicUsize::new(0);
    let peak = AtomicUsize::new(0);
    run_tasks(&open, 2, |_| {
        let now = running.fetch_add(1, Ordering::SeqCst) + 1;
        peak.fetch_max(now, Ordering::SeqCst);
        std::thread::sleep(std::time::Duration::from_millis(3));
        running.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    });

    assert!(peak.load(Ordering::SeqCst) <= 2);
}
