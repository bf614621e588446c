//! Core logging types: task entries, status, and the [`Log`] trait.

/// Task execution result for summary reporting.
#[derive(Debug, Clone)]
pub struct TaskEntry {
    /// Human-readable task name.
    pub name: String,
    /// Final status of the task.
    pub status: TaskStatus,
    /// Optional detail message (e.g., skip reason or error description).
    pub message: Option<String>,
}

/// Status of a completed task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Task completed successfully.
    Ok,
    /// Task does not apply to this system (e.g. no systemd).
    NotApplicable,
    /// Task was explicitly skipped (e.g., tool not found, nothing to do).
    Skipped,
    /// Task ran in dry-run mode; no changes were applied.
    DryRun,
    /// Task encountered an error and could not complete.
    Failed,
}

/// Abstraction over logging backends.
///
/// Tasks log through this trait so tests can substitute a logger without
/// touching the global subscriber.
pub trait Log: Send + Sync {
    /// Log a top-level section banner (one per action).
    fn section(&self, msg: &str);
    /// Log a subsection header (one per task).
    fn subsection(&self, msg: &str);
    /// Log a step that is about to be performed.
    fn step(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a successful outcome.
    fn success(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log a dry-run action message.
    fn dry_run(&self, msg: &str);
    /// Record a task result for the summary.
    fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>);
}
