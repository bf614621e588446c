//! systemd service activation.
use std::sync::Arc;

use anyhow::{Context as _, Result};

use super::{Applicable, ResourceChange};
use crate::exec::Executor;

/// A systemd system unit that must be enabled, running and freshly
/// restarted so it picks up configuration written earlier in the run.
#[derive(Debug, Clone)]
pub struct ServiceResource {
    /// Unit name, e.g. `ssh` or `systemd-journald`.
    pub name: String,
    executor: Arc<dyn Executor>,
}

impl ServiceResource {
    /// Create a new service resource.
    #[must_use]
    pub fn new(name: impl Into<String>, executor: Arc<dyn Executor>) -> Self {
        Self {
            name: name.into(),
            executor,
        }
    }

    /// Whether `systemctl status` reports the unit healthy.
    ///
    /// # Errors
    ///
    /// Returns an error only if `systemctl` cannot be executed.
    pub fn status(&self) -> Result<bool> {
        let result = self
            .executor
            .run_unchecked("systemctl", &["--no-pager", "status", &self.name, "-n", "0"])?;
        Ok(result.success)
    }
}

impl Applicable for ServiceResource {
    fn description(&self) -> String {
        self.name.clone()
    }

    fn apply(&self) -> Result<ResourceChange> {
        self.executor
            .run("systemctl", &["enable", "--now", &self.name])
            .with_context(|| format!("enable {}", self.name))?;
        self.executor
            .run("systemctl", &["restart", &self.name])
            .with_context(|| format!("restart {}", self.name))?;
        Ok(ResourceChange::Applied)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::exec::test_helpers::MockExecutor;

    #[test]
    fn apply_enables_then_restarts() {
        let mock = Arc::new(MockExecutor::new());
        let svc = ServiceResource::new("ssh", mock.clone());
        assert_eq!(svc.apply().unwrap(), ResourceChange::Applied);
        assert_eq!(
            mock.calls(),
            vec!["systemctl enable --now ssh", "systemctl restart ssh"]
        );
    }

    #[test]
    fn failed_enable_skips_restart() {
        let mock = Arc::new(MockExecutor::with_responses(vec![(false, "")]));
        let svc = ServiceResource::new("preload", mock.clone());
        let err = svc.apply().unwrap_err();
        assert!(format!("{err:#}").contains("enable preload"));
        assert_eq!(mock.calls().len(), 1);
    }

    #[test]
    fn status_reports_exit_code() {
        let mock = Arc::new(MockExecutor::with_responses(vec![(true, ""), (false, "")]));
        let svc = ServiceResource::new("haveged", mock.clone());
        assert!(svc.status().unwrap());
        assert!(!svc.status().unwrap());
        assert_eq!(
            mock.calls()[0],
            "systemctl --no-pager status haveged -n 0"
        );
    }
}
