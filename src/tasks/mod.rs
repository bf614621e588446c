//! Named tasks that orchestrate resource changes, grouped into stages.
pub mod context;
pub mod firefox;
pub mod flatpak;
pub mod journald;
pub mod packages;
mod processing;
pub mod services;
pub mod sysctl;
pub mod update;
pub mod vscode;

pub use context::Context;
pub use processing::{
    ProcessOpts, Steps, TaskResult, TaskStats, process_resources, resource_stats,
};

use anyhow::Result;

use crate::logging::TaskStatus;

/// A named, executable task.
pub trait Task: Send + Sync {
    /// Human-readable task name, shown as a subsection header.
    fn name(&self) -> &str;

    /// Whether this task applies to the current platform.
    fn should_run(&self, ctx: &Context) -> bool;

    /// Execute the task.
    ///
    /// # Errors
    ///
    /// Returns an error if the task fails to execute, such as when system commands
    /// fail, file operations are not permitted, or configuration is invalid.
    fn run(&self, ctx: &Context) -> Result<TaskResult>;
}

impl std::fmt::Debug for dyn Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Task").field(&self.name()).finish()
    }
}

/// Execute a task, recording the result in the logger.
///
/// Failures are logged and recorded but never propagated; the caller moves
/// on to the next task.
pub fn execute(task: &dyn Task, ctx: &Context) -> TaskStatus {
    if !task.should_run(ctx) {
        ctx.log
            .debug(&format!("skipping task: {} (not applicable)", task.name()));
        ctx.log
            .record_task(task.name(), TaskStatus::NotApplicable, None);
        return TaskStatus::NotApplicable;
    }

    ctx.log.subsection(task.name());

    let (status, message) = match task.run(ctx) {
        Ok(TaskResult::Ok) => (TaskStatus::Ok, None),
        Ok(TaskResult::Skipped(reason)) => {
            ctx.log.info(&format!("skipped: {reason}"));
            (TaskStatus::Skipped, Some(reason))
        }
        Ok(TaskResult::DryRun) => (TaskStatus::DryRun, None),
        Err(e) => {
            ctx.log.error(&format!("{}: {e:#}", task.name()));
            (TaskStatus::Failed, Some(format!("{e:#}")))
        }
    };
    ctx.log.record_task(task.name(), status, message.as_deref());
    status
}

/// A titled group of tasks, logged as one section.
#[derive(Debug)]
pub struct Stage {
    /// Section banner.
    pub title: &'static str,
    /// Success line printed when no task in the stage failed.
    pub done: &'static str,
    /// Tasks in execution order.
    pub tasks: Vec<Box<dyn Task>>,
}

impl Stage {
    /// Create a stage.
    #[must_use]
    pub fn new(title: &'static str, done: &'static str, tasks: Vec<Box<dyn Task>>) -> Self {
        Self { title, done, tasks }
    }

    /// Names of the tasks in this stage.
    #[must_use]
    pub fn task_names(&self) -> Vec<&str> {
        self.tasks.iter().map(|t| t.name()).collect()
    }

    /// Run every task in order. Returns `false` if any task failed.
    pub fn run(&self, ctx: &Context) -> bool {
        ctx.log.section(self.title);
        let mut ok = true;
        for task in &self.tasks {
            ok &= execute(task.as_ref(), ctx) != TaskStatus::Failed;
        }
        if ok && !ctx.dry_run {
            ctx.log.success(self.done);
        }
        ok
    }
}
