//! Shared state handed to every task.
use std::sync::Arc;

use crate::exec::Executor;
use crate::logging::Log;
use crate::platform::Platform;

/// Shared context for task execution.
///
/// Tasks own the configuration slice they act on; the context only carries
/// what every task needs to talk to the system.
pub struct Context {
    /// Detected platform information.
    pub platform: Arc<Platform>,
    /// Logger for output and task recording.
    pub log: Arc<dyn Log>,
    /// Whether to perform a dry run (preview changes without applying).
    pub dry_run: bool,
    /// Command executor (for testing or real system calls).
    pub executor: Arc<dyn Executor>,
    /// Unprivileged user who invoked `sudo`, for per-user tools.
    pub user: Option<String>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("platform", &self.platform)
            .field("log", &"<dyn Log>")
            .field("dry_run", &self.dry_run)
            .field("executor", &self.executor)
            .field("user", &self.user)
            .finish()
    }
}

impl Context {
    /// Creates a new context for task execution.
    #[must_use]
    pub fn new(
        platform: Arc<Platform>,
        log: Arc<dyn Log>,
        dry_run: bool,
        executor: Arc<dyn Executor>,
        user: Option<String>,
    ) -> Self {
        Self {
            platform,
            log,
            dry_run,
            executor,
            user,
        }
    }

    /// Run a mutating command unless this is a dry run.
    ///
    /// Output streams to the terminal so package-manager progress stays
    /// visible.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub fn run_step(&self, step: &str, program: &str, args: &[&str]) -> anyhow::Result<()> {
        if self.dry_run {
            self.log
                .dry_run(&format!("would run: {program} {}", args.join(" ")));
            return Ok(());
        }
        self.log.step(step);
        self.executor.run_inherited(program, args)?;
        Ok(())
    }

    /// Like [`run_step`](Self::run_step) but as the invoking user when one is
    /// known.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub fn run_step_as_user(
        &self,
        step: &str,
        program: &str,
        args: &[&str],
    ) -> anyhow::Result<()> {
        if let Some(user) = &self.user {
            self.log.debug(&format!("running '{program}' as user: {user}"));
        }
        let (program, args) = crate::privilege::as_user(self.user.as_deref(), program, args);
        self.run_step(step, program, &args)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use crate::tasks::test_helpers::{make_context, make_dry_run_context};

    #[test]
    fn run_step_executes_command() {
        let (ctx, mock) = make_context();
        ctx.run_step("Cleaning", "nala", &["clean"]).unwrap();
        assert_eq!(mock.calls(), vec!["nala clean"]);
    }

    #[test]
    fn run_step_in_dry_run_executes_nothing() {
        let (ctx, mock) = make_dry_run_context();
        ctx.run_step("Cleaning", "nala", &["clean"]).unwrap();
        assert!(mock.calls().is_empty());
    }

    #[test]
    fn run_step_as_user_wraps_with_sudo() {
        let (mut ctx, mock) = make_context();
        ctx.user = Some("jakob".to_string());
        ctx.run_step_as_user("Listing", "flatpak", &["list"]).unwrap();
        assert_eq!(mock.calls(), vec!["sudo -u jakob flatpak list"]);
    }

    #[test]
    fn run_step_propagates_failure() {
        let (ctx, _) = crate::tasks::test_helpers::make_context_with(vec![(false, "")]);
        assert!(ctx.run_step("Upgrading", "nala", &["upgrade", "-y"]).is_err());
    }
}
