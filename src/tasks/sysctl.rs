//! Kernel and VM parameters.
use anyhow::{Context as _, Result};

use super::{Context, ProcessOpts, Task, TaskResult, resource_stats};
use crate::config::system::SysctlConfig;
use crate::resources::file::ManagedFile;

/// Write the kernel/VM tuning drop-in and reload all sysctl settings.
#[derive(Debug, Clone)]
pub struct ApplySysctl {
    config: SysctlConfig,
}

impl ApplySysctl {
    /// Create the task.
    #[must_use]
    pub const fn new(config: SysctlConfig) -> Self {
        Self { config }
    }
}

impl Task for ApplySysctl {
    fn name(&self) -> &'static str {
        "Kernel & VM Optimizations"
    }

    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        if self.config.params.is_empty() {
            return Ok(TaskResult::Skipped("no sysctl parameters".to_string()));
        }
        ctx.log.step(&format!(
            "Writing optimizations to {}",
            self.config.path.display()
        ));
        let file = ManagedFile::new(&self.config.path, self.config.render());
        let stats = resource_stats(ctx, [file], &ProcessOpts::apply_all("write"))?;

        if ctx.dry_run {
            ctx.log.dry_run("would run: sysctl --system");
            return stats.finish(ctx);
        }
        ctx.log.step("Reloading sysctl configuration");
        ctx.executor
            .run("sysctl", &["--system"])
            .context("sysctl --system")?;
        stats.finish(ctx)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::system::Setting;
    use crate::exec::test_helpers::MockExecutor;
    use crate::tasks::test_helpers::recording;
    use std::os::unix::fs::PermissionsExt as _;

    fn config(path: std::path::PathBuf) -> SysctlConfig {
        SysctlConfig {
            path,
            header: "Optimized sysctl settings".to_string(),
            params: vec![Setting {
                key: "vm.swappiness".to_string(),
                value: "10".to_string(),
            }],
        }
    }

    #[test]
    fn writes_file_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sysctl.d/99-zzz-sysctl.conf");
        let (ctx, mock, _) = recording(MockExecutor::new(), false);
        assert_eq!(
            ApplySysctl::new(config(path.clone())).run(&ctx).unwrap(),
            TaskResult::Ok
        );
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "# Optimized sysctl settings\nvm.swappiness = 10\n"
        );
        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);
        assert_eq!(mock.calls(), vec!["sysctl --system"]);
    }

    #[test]
    fn reloads_even_when_file_is_current() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("99-zzz-sysctl.conf");
        let (ctx, mock, _) = recording(MockExecutor::new(), false);
        let task = ApplySysctl::new(config(path));
        task.run(&ctx).unwrap();
        task.run(&ctx).unwrap();
        assert_eq!(mock.calls(), vec!["sysctl --system", "sysctl --system"]);
    }

    #[test]
    fn failed_reload_fails_task() {
        let dir = tempfile::tempdir().unwrap();
        let (ctx, _, _) = recording(MockExecutor::with_responses(vec![(false, "")]), false);
        let err = ApplySysctl::new(config(dir.path().join("s.conf")))
            .run(&ctx)
            .unwrap_err();
        assert!(format!("{err:#}").contains("sysctl --system"));
    }

    #[test]
    fn dry_run_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("99-zzz-sysctl.conf");
        let (ctx, mock, log) = recording(MockExecutor::new(), true);
        assert_eq!(
            ApplySysctl::new(config(path.clone())).run(&ctx).unwrap(),
            TaskResult::DryRun
        );
        assert!(!path.exists());
        assert!(mock.calls().is_empty());
        assert!(log.contains("dry_run", "would write"));
    }
}
