//! Repository refresh, full upgrade and package cleanup.
use anyhow::Result;

use super::{Context, Steps, Task, TaskResult};

/// Refresh the APT cache, bootstrap `nala` and sync it with the repositories.
#[derive(Debug, Clone, Copy, Default)]
pub struct RefreshRepositories;

impl Task for RefreshRepositories {
    fn name(&self) -> &'static str {
        "System Refresh"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.platform.has_apt
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let mut steps = Steps::new();
        steps.record(ctx, ctx.run_step("Updating APT cache", "apt", &["update", "-y"]));
        if ctx.executor.which("nala") {
            ctx.log.debug("nala already installed");
        } else {
            steps.record(
                ctx,
                ctx.run_step("Ensuring Nala is installed", "apt", &["install", "-y", "nala"]),
            );
        }
        steps.record(
            ctx,
            ctx.run_step("Syncing Nala with repositories", "nala", &["update"]),
        );
        if steps.all_ok() && !ctx.dry_run {
            ctx.log.success("System repositories are up to date");
        }
        steps.finish(ctx)
    }
}

/// Full system upgrade followed by a package cache cleanup.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpgradeSystem;

impl Task for UpgradeSystem {
    fn name(&self) -> &'static str {
        "Full System Upgrade"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.platform.has_apt
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let mut steps = Steps::new();
        steps.record(ctx, ctx.run_step("Running Nala upgrade", "nala", &["upgrade", "-y"]));
        steps.record(ctx, ctx.run_step("Cleaning package cache", "nala", &["clean"]));
        if steps.all_ok() && !ctx.dry_run {
            ctx.log.success("All system packages are current");
        }
        steps.finish(ctx)
    }
}

/// Drop orphaned packages, purge their leftovers and empty the package cache.
#[derive(Debug, Clone, Copy, Default)]
pub struct CleanPackages;

impl Task for CleanPackages {
    fn name(&self) -> &'static str {
        "Package Cleanup"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.platform.has_apt
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let mut steps = Steps::new();
        steps.record(ctx, ctx.run_step("Autoremoving", "nala", &["autoremove"]));
        steps.record(ctx, ctx.run_step("Autopurging", "nala", &["autopurge"]));
        steps.record(ctx, ctx.run_step("Cleaning", "nala", &["clean"]));
        steps.finish(ctx)
    }
}
