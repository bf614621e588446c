//! `mint-setup`: action selection, stage planning and dispatch.
use std::sync::Arc;

use anyhow::Result;

use crate::cli::Cli;
use crate::config::Config;
use crate::exec::SystemExecutor;
use crate::logging::{Log, Logger};
use crate::platform::Platform;
use crate::privilege;
use crate::tasks::flatpak::SyncFlatpaks;
use crate::tasks::journald::ConfigureJournald;
use crate::tasks::packages::{InstallPackages, RemovePackages};
use crate::tasks::services::ActivateServices;
use crate::tasks::sysctl::ApplySysctl;
use crate::tasks::update::{CleanPackages, RefreshRepositories, UpgradeSystem};
use crate::tasks::vscode::InstallVsCode;
use crate::tasks::{Context, Stage, Task};

/// An independent unit of work selected on the command line.
///
/// Variants are declared in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Action {
    /// Refresh and fully upgrade the system.
    Update,
    /// Purge unwanted package categories.
    Remove,
    /// Install package categories and update flatpaks.
    Install,
    /// Add the VS Code repository and install `code`.
    VsCode,
    /// Autoremove, autopurge and clean the package cache.
    Clean,
    /// Kernel tuning, journald and services.
    System,
}

impl Action {
    /// Whether this action talks to the package manager and therefore needs
    /// fresh repository metadata first.
    #[must_use]
    pub const fn needs_refresh(self) -> bool {
        !matches!(self, Self::System)
    }
}

/// Build the ordered stages for `actions`.
///
/// Actions run in declaration order regardless of how they were given, each
/// at most once, and the repository refresh is scheduled only before the
/// first action that needs it.
#[must_use]
pub fn plan(actions: &[Action], config: &Config) -> Vec<Stage> {
    let mut actions = actions.to_vec();
    actions.sort_unstable();
    actions.dedup();

    let mut refreshed = false;
    let mut stages = Vec::new();
    for action in actions {
        let mut tasks: Vec<Box<dyn Task>> = Vec::new();
        if action.needs_refresh() && !refreshed {
            tasks.push(Box::new(RefreshRepositories));
            refreshed = true;
        }
        match action {
            Action::Update => {
                tasks.push(Box::new(UpgradeSystem));
                stages.push(Stage::new("Update", "System is up to date", tasks));
            }
            Action::Remove => {
                tasks.push(Box::new(RemovePackages::new(config.packages.remove.clone())));
                stages.push(Stage::new(
                    "Purge & Cleanup",
                    "Cleaned up unwanted packages from the system",
                    tasks,
                ));
            }
            Action::Install => {
                tasks.push(Box::new(InstallPackages::new(config.packages.install.clone())));
                stages.push(Stage::new("Install", "Package categories processed", tasks));
                stages.push(Stage::new(
                    "Flatpak Management",
                    "All required packages (APT & Flatpak) have been processed",
                    vec![Box::new(SyncFlatpaks)],
                ));
            }
            Action::VsCode => {
                tasks.push(Box::new(InstallVsCode::new(config.vscode.clone())));
                stages.push(Stage::new(
                    "Visual Studio Code",
                    "VS Code installation and repository setup complete",
                    tasks,
                ));
            }
            Action::Clean => {
                tasks.push(Box::new(CleanPackages));
                stages.push(Stage::new("Clean", "Cleaned up packages in System", tasks));
            }
            Action::System => {
                stages.push(Stage::new(
                    "Sysctl",
                    "Kernel and VM parameters applied successfully",
                    vec![Box::new(ApplySysctl::new(config.system.sysctl.clone()))],
                ));
                stages.push(Stage::new(
                    "Journald",
                    "Journald configuration updated",
                    vec![Box::new(ConfigureJournald::new(
                        config.system.journald.clone(),
                    ))],
                ));
                stages.push(Stage::new(
                    "Services",
                    "All system services are optimized and running",
                    vec![Box::new(ActivateServices::new(
                        config.system.services.units.clone(),
                    ))],
                ));
            }
        }
    }
    stages
}

/// Run the `mint-setup` command.
///
/// # Errors
///
/// Returns an error if configuration loading fails or any task failed.
pub fn run(cli: &Cli, log: &Arc<Logger>) -> Result<()> {
    let global = &cli.global;
    let actions = cli.actions();
    log.info(&format!(
        "mint-setup {} ({} action(s) selected)",
        crate::VERSION,
        actions.len()
    ));

    let platform = Platform::detect();
    log.debug(&format!("platform: {}", platform.pretty_name));
    if !platform.is_debian_family() {
        log.warn(&format!(
            "{} is not a Debian-family distribution",
            if platform.pretty_name.is_empty() {
                "this system"
            } else {
                platform.pretty_name.as_str()
            }
        ));
    }

    let config = super::load_config(global, log)?;
    let ctx = Context::new(
        Arc::new(platform),
        Arc::clone(log) as Arc<dyn Log>,
        global.dry_run,
        Arc::new(SystemExecutor),
        privilege::invoking_user(),
    );

    super::run_stages(&plan(&actions, &config), &ctx, log)
}
