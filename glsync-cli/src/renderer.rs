//! Live task table.
//!
//! A background thread polls task snapshots every 200 ms and repaints a
//! table of the currently progressing tasks, erasing the previous frame with
//! ANSI cursor movement. The renderer only ever reads snapshots; it is a
//! best-effort observer and may see a status/message pair mid-transition.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use colored::Colorize;
use glsync_core::{Status, Task, TaskSnapshot};
use tabled::{settings::Style, Table, Tabled};

const REDRAW_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "repo")]
    repo: String,
    #[tabled(rename = "branch")]
    branch: String,
    #[tabled(rename = "action")]
    action: String,
    #[tabled(rename = "message")]
    message: String,
}

fn row_for(task: &Task, snapshot: &TaskSnapshot) -> TaskRow {
    let message = match snapshot.progress {
        Some(p) => format!("({}/{}) {}", p.current, p.total, snapshot.message),
        None => snapshot.message.clone(),
    };
    TaskRow {
        repo: task.path.clone(),
        branch: task.branch.clone(),
        action: task.action.to_string(),
        message,
    }
}

fn render_frame(tasks: &[Arc<Task>]) -> String {
    let rows: Vec<TaskRow> = tasks
        .iter()
        .filter_map(|task| {
            let snapshot = task.snapshot();
            (snapshot.status == Status::Progressing).then(|| row_for(task, &snapshot))
        })
        .collect();

    if rows.is_empty() {
        return String::new();
    }
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    format!("{table}\n")
}

/// Handle to the renderer thread; dropping without [`stop`] detaches it.
///
/// [`stop`]: Renderer::stop
pub struct Renderer {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

/// Start rendering `tasks` until stopped.
pub fn spawn(tasks: Vec<Arc<Task>>) -> Renderer {
    let stop = Arc::new(AtomicBool::new(false));
    let stop_flag = stop.clone();

    let handle = std::thread::spawn(move || {
        let mut stdout = std::io::stdout();
        let mut previous_lines = 0usize;
        loop {
            let frame = render_frame(&tasks);
            let mut out = erase_lines(previous_lines);
            out.push_str(&frame);
            previous_lines = frame.lines().count();
            let _ = stdout.write_all(out.as_bytes());
            let _ = stdout.flush();

            if stop_flag.load(Ordering::Relaxed) {
                // Final frame: wipe the table so the summary prints cleanly.
                let _ = stdout.write_all(erase_lines(previous_lines).as_bytes());
                let _ = stdout.flush();
                return;
            }
            std::thread::sleep(REDRAW_INTERVAL);
        }
    });

    Renderer {
        stop,
        handle: Some(handle),
    }
}

impl Renderer {
    /// Stop redrawing, erase the live table, and join the thread.
    pub fn stop(mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn erase_lines(count: usize) -> String {
    if count == 0 {
        return String::new();
    }
    // Move up over the previous frame and erase to end of screen.
    format!("\x1b[{count}A\x1b[0J")
}

/// One-line run header shown above the live table.
pub fn print_run_header(total: usize, open: usize, workers: usize) {
    println!(
        "{}",
        format!("syncing {open} of {total} projects with {workers} workers").bold()
    );
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
