//! Flatpak maintenance for the invoking user.
use anyhow::Result;

use super::{Context, Steps, Task, TaskResult};

/// Show configured remotes and installed apps, then update all flatpaks as
/// the invoking user.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncFlatpaks;

impl Task for SyncFlatpaks {
    fn name(&self) -> &'static str {
        "Flatpak Update"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        if !ctx.executor.which("flatpak") {
            return Ok(TaskResult::Skipped("flatpak not installed".to_string()));
        }
        let mut steps = Steps::new();
        steps.record(
            ctx,
            ctx.run_step_as_user("Checking configured remotes", "flatpak", &["remotes"]),
        );
        steps.record(
            ctx,
            ctx.run_step_as_user("Listing installed flatpaks", "flatpak", &["list"]),
        );
        steps.record(
            ctx,
            ctx.run_step_as_user(
                "Checking for flatpak updates and runtimes",
                "flatpak",
                &["update", "-y"],
            ),
        );
        steps.finish(ctx)
    }
}
