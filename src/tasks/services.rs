//! Service activation.
use std::sync::Arc;

use anyhow::Result;

use super::{Context, Task, TaskResult, TaskStats};
use crate::resources::Applicable as _;
use crate::resources::service::ServiceResource;

/// Enable, start and restart each configured systemd unit, then report its
/// status.
#[derive(Debug, Clone)]
pub struct ActivateServices {
    units: Vec<String>,
}

impl ActivateServices {
    /// Create the task.
    #[must_use]
    pub const fn new(units: Vec<String>) -> Self {
        Self { units }
    }
}

impl Task for ActivateServices {
    fn name(&self) -> &'static str {
        "Activate Services"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.platform.has_systemd
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        if self.units.is_empty() {
            return Ok(TaskResult::Skipped("no services configured".to_string()));
        }
        let mut stats = TaskStats::new();
        for unit in &self.units {
            if ctx.dry_run {
                ctx.log.dry_run(&format!("would enable and restart {unit}"));
                stats.changed += 1;
                continue;
            }
            ctx.log.step(&format!("Activating service: {unit}"));
            let service = ServiceResource::new(unit.as_str(), Arc::clone(&ctx.executor));
            if let Err(e) = service.apply() {
                ctx.log
                    .error(&format!("Failed to activate service {unit}: {e:#}"));
                stats.failed += 1;
                continue;
            }
            stats.changed += 1;
            ctx.log.debug(&format!("Verifying status for {unit}"));
            match service.status() {
                Ok(true) => ctx
                    .log
                    .success(&format!("Service {unit} is active and enabled")),
                Ok(false) => ctx.log.warn(&format!(
                    "Service {unit} started but status reported issues"
                )),
                Err(e) => ctx
                    .log
                    .warn(&format!("Could not query status of {unit}: {e:#}")),
            }
        }
        stats.finish(ctx)
    }
}
