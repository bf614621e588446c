//! Category-batched package install and purge.
use std::collections::HashSet;

use anyhow::Result;

use super::{Context, Task, TaskResult, TaskStats};
use crate::config::PackageCategory;
use crate::resources::package::{self, PackageAction, PackageResource, get_installed_packages};

/// Query installed packages once; on failure assume every package still
/// needs the action so the batch runs with the full list.
fn installed_or_fallback(
    ctx: &Context,
    categories: &[PackageCategory],
    action: PackageAction,
) -> HashSet<String> {
    match get_installed_packages(ctx.executor.as_ref()) {
        Ok(installed) => {
            ctx.log
                .debug(&format!("{} packages currently installed", installed.len()));
            installed
        }
        Err(e) => {
            ctx.log.warn(&format!(
                "could not query installed packages, using full lists: {e:#}"
            ));
            match action {
                PackageAction::Install => HashSet::new(),
                PackageAction::Purge => categories
                    .iter()
                    .flat_map(|c| c.packages.iter().cloned())
                    .collect(),
            }
        }
    }
}

/// Run one batched `nala` call per category for the packages that still need
/// `action`. A failing category is logged and the next one still runs.
fn process_categories(
    ctx: &Context,
    categories: &[PackageCategory],
    action: PackageAction,
) -> Result<TaskResult> {
    let mut installed = installed_or_fallback(ctx, categories, action);
    let mut stats = TaskStats::new();

    for category in categories {
        let mut seen = HashSet::new();
        let pending: Vec<&str> = category
            .packages
            .iter()
            .filter(|name| seen.insert(name.as_str()))
            .filter(|name| {
                let state = PackageResource::new(name.as_str()).state_from_installed(&installed);
                action.is_pending(&state)
            })
            .map(String::as_str)
            .collect();
        let total = u32::try_from(seen.len()).unwrap_or(u32::MAX);
        let count = u32::try_from(pending.len()).unwrap_or(u32::MAX);
        stats.already_ok += total - count;

        if pending.is_empty() {
            ctx.log.info(&format!(
                "{}: nothing to {action} ({total} packages)",
                category.name
            ));
            continue;
        }

        if ctx.dry_run {
            ctx.log.dry_run(&format!(
                "would {action} {count} packages from {}: {}",
                category.name,
                pending.join(" ")
            ));
            stats.changed += count;
            record_batch(&mut installed, &pending, action);
            continue;
        }

        let step = match action {
            PackageAction::Install => {
                format!("Installing {count} packages from {}", category.name)
            }
            PackageAction::Purge => format!("Purging {count} packages from {}", category.name),
        };
        ctx.log.step(&step);
        match package::batch(ctx.executor.as_ref(), action, &pending) {
            Ok(()) => {
                stats.changed += count;
                record_batch(&mut installed, &pending, action);
                ctx.log.success(&match action {
                    PackageAction::Install => {
                        format!("Category {} installed successfully", category.name)
                    }
                    PackageAction::Purge => {
                        format!("Removed all packages in {}", category.name)
                    }
                });
            }
            Err(e) => {
                ctx.log
                    .error(&format!("{}: nala {action} failed: {e:#}", category.name));
                stats.failed += count;
            }
        }
    }

    stats.finish(ctx)
}

/// Track the effect of a batch so later categories see it.
fn record_batch(installed: &mut HashSet<String>, pending: &[&str], action: PackageAction) {
    for name in pending {
        match action {
            PackageAction::Install => installed.insert((*name).to_string()),
            PackageAction::Purge => installed.remove(*name),
        };
    }
}

fn has_packages(categories: &[PackageCategory]) -> bool {
    categories.iter().any(|c| !c.packages.is_empty())
}

/// Install every category of packages.
#[derive(Debug, Clone)]
pub struct InstallPackages {
    categories: Vec<PackageCategory>,
}

impl InstallPackages {
    /// Create the task for the given categories, in install order.
    #[must_use]
    pub const fn new(categories: Vec<PackageCategory>) -> Self {
        Self { categories }
    }
}

impl Task for InstallPackages {
    fn name(&self) -> &'static str {
        "Install Packages"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.platform.has_apt
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        if !has_packages(&self.categories) {
            return Ok(TaskResult::Skipped("no packages to install".to_string()));
        }
        process_categories(ctx, &self.categories, PackageAction::Install)
    }
}

/// Purge every category of unwanted packages.
#[derive(Debug, Clone)]
pub struct RemovePackages {
    categories: Vec<PackageCategory>,
}

impl RemovePackages {
    /// Create the task for the given categories, in removal order.
    #[must_use]
    pub const fn new(categories: Vec<PackageCategory>) -> Self {
        Self { categories }
    }
}

impl Task for RemovePackages {
    fn name(&self) -> &'static str {
        "Remove Packages"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.platform.has_apt
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        if !has_packages(&self.categories) {
            return Ok(TaskResult::Skipped("no packages to remove".to_string()));
        }
        process_categories(ctx, &self.categories, PackageAction::Purge)
    }
}
