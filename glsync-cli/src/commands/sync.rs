//! `glsync sync` — the reconciliation run.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use glsync_core::{
    build_tasks, filter_tasks, parse_received_objects, run_tasks,
    task::{Action, Status, Task, TaskError},
};
use glsync_gitlab::{walk_group, GitlabClient, WALKER_THREADS};

use crate::config::{self, Overrides};
use crate::renderer;

/// Arguments for `glsync sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// GitLab group to mirror (full path, e.g. `platform/services`).
    #[arg(long)]
    pub group: Option<String>,

    /// Local directory that mirrors the group tree.
    #[arg(long)]
    pub local_root: Option<PathBuf>,

    /// GitLab instance URL.
    #[arg(long)]
    pub gitlab_url: Option<String>,

    /// Personal access token; prefer the config file or GLSYNC_TOKEN.
    #[arg(long, env = "GLSYNC_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Maximum number of git actions running at once.
    #[arg(long)]
    pub workers: Option<usize>,

    /// Derive and print the task table without executing anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Delete local-only projects without prompting.
    #[arg(long, short = 'y')]
    pub yes: bool,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let home: PathBuf = dirs::home_dir().context("could not determine home directory")?;
        let config = config::resolve_at(
            &home,
            Overrides {
                gitlab_url: self.gitlab_url,
                token: self.token,
                group: self.group,
                local_root: self.local_root,
                workers: self.workers,
            },
        )?;

        tracing::debug!(
            group = %config.group,
            local_root = %config.local_root.display(),
            workers = config.workers,
            "configuration resolved"
        );

        let client = GitlabClient::new(config.gitlab_url.as_str(), config.token.as_str());
        let root = client
            .find_group(&config.group)
            .with_context(|| format!("cannot resolve group '{}'", config.group))?;

        eprintln!("{}", format!("discovering projects under {}", config.group).dimmed());
        let (remote, errors) = walk_group(&client, &root, WALKER_THREADS, &|group_path| {
            eprintln!("{}", format!("  {group_path}").dimmed());
        });

        // Acting on a partial remote list could delete local projects that
        // simply failed to list; any traversal error aborts before scheduling.
        if !errors.is_empty() {
            for error in &errors {
                eprintln!("{} {error}", "discovery error:".red().bold());
            }
            bail!(
                "remote discovery failed with {} error(s); no local changes made",
                errors.len()
            );
        }

        let local = glsync_git::scan_working_copies(&config.local_root)
            .with_context(|| format!("failed to scan {}", config.local_root.display()))?;

        // A dry run only reports the plan, so it never prompts.
        let assume_yes = self.yes || self.dry_run;
        let tasks = build_tasks(remote, local, &config.local_root, |prompt| {
            assume_yes || confirm_on_stdin(prompt)
        });

        if self.dry_run {
            print_plan(&tasks);
            return Ok(());
        }

        let open = filter_tasks(&tasks, Status::Open);
        let skipped = tasks.len() - open.len();
        if open.is_empty() {
            println!("Nothing to do — {} project(s) already in sync.", tasks.len());
            return Ok(());
        }

        renderer::print_run_header(tasks.len(), open.len(), config.workers);
        let live = renderer::spawn(tasks.clone());
        run_tasks(&open, config.workers, execute);
        live.stop();

        report(&tasks, skipped)
    }
}

/// Execute one task's git action, streaming progress into its state.
fn execute(task: &Task) -> Result<(), TaskError> {
    let mut on_line = |line: &str| {
        if let Some(progress) = parse_received_objects(line) {
            task.set_progress(progress);
        }
        task.set_message(line);
    };

    match task.action {
        Action::Clone => {
            let remote = task
                .pair
                .remote
                .as_ref()
                .ok_or("clone task without a remote side")?;
            glsync_git::clone(&remote.clone_url, &task.local_path, &mut on_line)?;
        }
        Action::Pull => glsync_git::pull(&task.local_path, &mut on_line)?,
        Action::Delete => glsync_git::delete(&task.local_path)?,
    }
    Ok(())
}

fn confirm_on_stdin(prompt: &str) -> bool {
    print!("{prompt} [y/N] ");
    let _ = io::stdout().flush();
    let mut answer = String::new();
    if io::stdin().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim(), "y" | "Y" | "yes")
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Tabled)]
struct PlanRow {
    #[tabled(rename = "repo")]
    repo: String,
    #[tabled(rename = "branch")]
    branch: String,
    #[tabled(rename = "action")]
    action: String,
    #[tabled(rename = "note")]
    note: String,
}

fn print_plan(tasks: &[std::sync::Arc<Task>]) {
    if tasks.is_empty() {
        println!("[dry-run] nothing to reconcile");
        return;
    }

    let rows: Vec<PlanRow> = tasks
        .iter()
        .map(|task| {
            let snapshot = task.snapshot();
            PlanRow {
                repo: task.path.clone(),
                branch: task.branch.clone(),
                action: task.action.to_string(),
                note: if snapshot.status == Status::Completed {
                    snapshot.message
                } else {
                    String::new()
                },
            }
        })
        .collect();

    let pending = rows.iter().filter(|r| r.note.is_empty()).count();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    println!("[dry-run] {pending} task(s) would run, {} skipped", tasks.len() - pending);
}

fn report(tasks: &[std::sync::Arc<Task>], skipped: usize) -> Result<()> {
    let failed: Vec<_> = tasks
        .iter()
        .filter_map(|task| task.error().map(|error| (task, error)))
        .collect();
    let succeeded = tasks.len() - skipped - failed.len();

    println!(
        "{} {succeeded} synced, {skipped} skipped, {} failed",
        if failed.is_empty() {
            "✓".green().bold()
        } else {
            "✗".red().bold()
        },
        failed.len()
    );

    for (task, error) in &failed {
        println!(
            "{} failed to {} {}: {error}",
            "✗".red().bold(),
            task.action,
            task.path
        );
    }

    if !failed.is_empty() {
        bail!("{} task(s) failed", failed.len());
    }
    Ok(())
}
