//! systemd journal settings.
use anyhow::Result;

use super::{Context, ProcessOpts, Task, TaskResult, TaskStats, resource_stats};
use crate::config::system::JournaldConfig;
use crate::resources::config_patch::{SectionPatch, backup_path};

/// Set each configured property in the `[Journal]` section of
/// `journald.conf`, keeping a one-time `.bak` copy of the original.
#[derive(Debug, Clone)]
pub struct ConfigureJournald {
    config: JournaldConfig,
}

impl ConfigureJournald {
    /// Create the task.
    #[must_use]
    pub const fn new(config: JournaldConfig) -> Self {
        Self { config }
    }
}

impl Task for ConfigureJournald {
    fn name(&self) -> &'static str {
        "Configuring System Journal"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.platform.has_systemd
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let path = &self.config.path;
        if !path.is_file() {
            anyhow::bail!("{} does not exist", path.display());
        }
        let had_backup = backup_path(path).exists();

        let mut invalid = TaskStats::new();
        let mut patches = Vec::with_capacity(self.config.properties.len());
        for property in &self.config.properties {
            match SectionPatch::new(path, &self.config.section, &property.key, &property.value) {
                Ok(patch) => patches.push(patch),
                Err(e) => {
                    ctx.log.error(&e.to_string());
                    invalid.failed += 1;
                }
            }
        }

        let mut stats = resource_stats(ctx, patches, &ProcessOpts::apply_all("set").no_bail())?;
        stats += invalid;

        if !had_backup && backup_path(path).exists() {
            ctx.log.info(&format!(
                "Backup created: {}",
                backup_path(path).display()
            ));
        }
        stats.finish(ctx)
    }
}
