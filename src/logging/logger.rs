//! Structured logger with dry-run awareness and summary collection.
use std::path::PathBuf;
use std::sync::Mutex;

use super::subscriber::{DRY_RUN, SECTION, STEP, SUBSECTION, SUCCESS, SUMMARY};
use super::types::{Log, TaskEntry, TaskStatus};
use super::utils::{DIM, GREEN, RED, WHITE, YELLOW, color_enabled, log_file_path, paint};

/// Implement the display methods of [`Log`] by delegating to inherent methods
/// of the same name on the implementing type.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Structured logger with dry-run awareness and summary collection.
///
/// Every message is emitted as a [`tracing`] event; the subscriber installed
/// by [`init_subscriber`](super::init_subscriber) renders it on the console
/// and appends it to `$XDG_CACHE_HOME/mint-setup/<command>.log`.
#[derive(Debug)]
pub struct Logger {
    tasks: Mutex<Vec<TaskEntry>>,
    log_file: Option<PathBuf>,
    color: bool,
}

impl Logger {
    /// Create a new logger.
    ///
    /// Stores the log file path for display in the run summary. The file
    /// itself is created by the subscriber's file layer.
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self {
            tasks: Mutex::new(Vec::new()),
            log_file: log_file_path(command),
            color: color_enabled(),
        }
    }

    /// Create a logger that reports `path` as its log file (test-only).
    #[cfg(test)]
    pub(crate) const fn with_log_file(path: PathBuf) -> Self {
        Self {
            tasks: Mutex::new(Vec::new()),
            log_file: Some(path),
            color: false,
        }
    }

    /// Return the log file path, if available.
    #[cfg(test)]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// Return a clone of all recorded task entries.
    #[must_use]
    pub fn task_entries(&self) -> Vec<TaskEntry> {
        self.tasks.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Log a top-level section banner.
    pub fn section(&self, msg: &str) {
        tracing::info!(target: SECTION, "{msg}");
    }

    /// Log a subsection header.
    pub fn subsection(&self, msg: &str) {
        tracing::info!(target: SUBSECTION, "{msg}");
    }

    /// Log a step about to be performed.
    pub fn step(&self, msg: &str) {
        tracing::info!(target: STEP, "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a successful outcome.
    pub fn success(&self, msg: &str) {
        tracing::info!(target: SUCCESS, "{msg}");
    }

    /// Log a debug message (suppressed on console unless verbose; always
    /// written to the log file).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a dry-run action message.
    pub fn dry_run(&self, msg: &str) {
        tracing::info!(target: DRY_RUN, "{msg}");
    }

    fn summary_line(&self, msg: &str) {
        tracing::info!(target: SUMMARY, "{msg}");
    }

    /// Record a task result for the summary.
    pub fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.tasks.lock() {
            guard.push(TaskEntry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    /// Count the number of failed tasks.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.tasks.lock().map_or(0, |guard| {
            guard
                .iter()
                .filter(|t| t.status == TaskStatus::Failed)
                .count()
        })
    }

    /// Print the summary of all recorded tasks.
    pub fn print_summary(&self) {
        let tasks = self.task_entries();
        if tasks.is_empty() {
            return;
        }

        self.section("Summary");

        let c = self.color;
        let mut ok = 0u32;
        let mut not_applicable = 0u32;
        let mut skipped = 0u32;
        let mut dry_run = 0u32;
        let mut failed = 0u32;

        for task in &tasks {
            let (icon, color) = match task.status {
                TaskStatus::Ok => {
                    ok += 1;
                    ("✓", GREEN)
                }
                TaskStatus::NotApplicable => {
                    not_applicable += 1;
                    ("·", DIM)
                }
                TaskStatus::Skipped => {
                    skipped += 1;
                    ("○", YELLOW)
                }
                TaskStatus::DryRun => {
                    dry_run += 1;
                    ("~", WHITE)
                }
                TaskStatus::Failed => {
                    failed += 1;
                    ("✗", RED)
                }
            };

            let suffix = task
                .message
                .as_ref()
                .map_or_else(String::new, |msg| format!(" ({msg})"));

            self.summary_line(&paint(c, color, &format!("{icon} {}{suffix}", task.name)));
        }

        let total = ok + not_applicable + skipped + dry_run + failed;
        self.summary_line(&format!(
            "{total} tasks: {}, {}, {}, {}, {}",
            paint(c, GREEN, &format!("{ok} ok")),
            paint(c, DIM, &format!("{not_applicable} n/a")),
            paint(c, YELLOW, &format!("{skipped} skipped")),
            paint(c, WHITE, &format!("{dry_run} dry-run")),
            paint(c, RED, &format!("{failed} failed")),
        ));

        if let Some(path) = &self.log_file {
            self.summary_line(&paint(c, DIM, &format!("log: {}", path.display())));
        }
    }
}

impl Log for Logger {
    forward_log_methods!(
        section, subsection, step, info, success, debug, warn, error, dry_run
    );

    fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>) {
        self.record_task(name, status, message);
    }
}
