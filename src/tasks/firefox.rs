//! Locked Firefox preferences.
use std::path::PathBuf;

use anyhow::Result;

use super::{Context, ProcessOpts, Task, TaskResult, process_resources};
use crate::config::FirefoxConfig;
use crate::resources::file::ManagedFile;

/// Write the autoconfig registration and the locked-preference file into a
/// Firefox installation.
#[derive(Debug, Clone)]
pub struct WriteFirefoxConfig {
    config: FirefoxConfig,
    install_dir: PathBuf,
}

impl WriteFirefoxConfig {
    /// Create the task for the installation at `install_dir`.
    #[must_use]
    pub fn new(config: FirefoxConfig, install_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            install_dir: install_dir.into(),
        }
    }

    /// The two files this task manages, in write order.
    #[must_use]
    pub fn files(&self) -> [ManagedFile; 2] {
        [
            ManagedFile::new(
                self.config.autoconfig_path(&self.install_dir),
                self.config.render_autoconfig(),
            ),
            ManagedFile::new(
                self.config.cfg_path(&self.install_dir),
                self.config.render_cfg(),
            ),
        ]
    }
}

impl Task for WriteFirefoxConfig {
    fn name(&self) -> &'static str {
        "Firefox Preferences"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        if !self.install_dir.is_dir() {
            anyhow::bail!("{} not found", self.install_dir.display());
        }
        ctx.log.debug(&format!(
            "{} locked preferences in {} groups",
            self.config.pref_count(),
            self.config.groups.len()
        ));
        for pref in self.config.groups.iter().flat_map(|g| &g.prefs) {
            ctx.log.debug(&pref.lock_line());
        }
        process_resources(ctx, self.files(), &ProcessOpts::apply_all("write"))
    }
}
