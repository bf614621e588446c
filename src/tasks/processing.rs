//! Generic resource processing loop: check state, apply, collect stats.
use std::fmt::Write as _;

use anyhow::Result;

use super::context::Context;
use crate::resources::{Resource, ResourceChange, ResourceState};

/// Result of a single task execution.
///
/// # Examples
///
/// ```
/// use mint_setup::tasks::TaskResult;
///
/// let ok = TaskResult::Ok;
/// let skipped = TaskResult::Skipped("flatpak not installed".into());
/// let dry = TaskResult::DryRun;
///
/// assert!(matches!(ok, TaskResult::Ok));
/// assert!(matches!(skipped, TaskResult::Skipped(_)));
/// assert!(matches!(dry, TaskResult::DryRun));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskResult {
    /// Task completed successfully.
    Ok,
    /// Task was skipped (tool missing, nothing to do).
    Skipped(String),
    /// Task ran in dry-run mode.
    DryRun,
}

/// Counters for batch tasks that process many items.
///
/// # Examples
///
/// ```
/// use mint_setup::tasks::TaskStats;
///
/// let mut stats = TaskStats::new();
/// stats.changed = 3;
/// stats.already_ok = 1;
///
/// assert_eq!(stats.summary(false), "3 changed, 1 already ok");
/// assert_eq!(stats.summary(true), "3 would change, 1 already ok");
/// ```
///
/// Skipped and failed items are only mentioned when present:
///
/// ```
/// use mint_setup::tasks::TaskStats;
///
/// let stats = TaskStats { changed: 1, already_ok: 2, skipped: 0, failed: 1 };
/// assert_eq!(stats.summary(false), "1 changed, 2 already ok, 1 failed");
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TaskStats {
    /// Number of items changed or applied.
    pub changed: u32,
    /// Number of items already in the correct state.
    pub already_ok: u32,
    /// Number of items that could not be applied here (e.g. file missing).
    pub skipped: u32,
    /// Number of items whose application failed.
    pub failed: u32,
}

impl TaskStats {
    /// Create a new empty stats counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Format the summary string (e.g. "3 changed, 10 already ok, 1 failed").
    #[must_use]
    pub fn summary(&self, dry_run: bool) -> String {
        let verb = if dry_run { "would change" } else { "changed" };
        let mut out = format!("{} {verb}, {} already ok", self.changed, self.already_ok);
        if self.skipped > 0 {
            write!(out, ", {} skipped", self.skipped).ok();
        }
        if self.failed > 0 {
            write!(out, ", {} failed", self.failed).ok();
        }
        out
    }

    /// Log the summary and turn the counters into a task outcome.
    ///
    /// # Errors
    ///
    /// Returns an error if any item failed, so the task is reported failed
    /// after every item had its chance to run.
    pub fn finish(self, ctx: &Context) -> Result<TaskResult> {
        ctx.log.info(&self.summary(ctx.dry_run));
        if self.failed > 0 {
            anyhow::bail!(
                "{} of {} item(s) failed",
                self.failed,
                self.changed + self.already_ok + self.skipped + self.failed
            );
        }
        Ok(if ctx.dry_run {
            TaskResult::DryRun
        } else {
            TaskResult::Ok
        })
    }
}

impl std::ops::AddAssign for TaskStats {
    fn add_assign(&mut self, other: Self) {
        self.changed += other.changed;
        self.already_ok += other.already_ok;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

/// Outcome tracker for a task made of independent commands.
///
/// Each step runs regardless of earlier failures; a failure is logged when it
/// happens and the task fails once every step has had its turn.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Steps {
    /// Number of steps recorded.
    pub total: u32,
    /// Number of steps that failed.
    pub failed: u32,
}

impl Steps {
    /// Create an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the result of one step, logging it if it failed.
    pub fn record(&mut self, ctx: &Context, result: Result<()>) {
        self.total += 1;
        if let Err(e) = result {
            ctx.log.error(&format!("{e:#}"));
            self.failed += 1;
        }
    }

    /// Whether every recorded step succeeded.
    #[must_use]
    pub const fn all_ok(&self) -> bool {
        self.failed == 0
    }

    /// Turn the tally into a task outcome.
    ///
    /// # Errors
    ///
    /// Returns an error if any step failed.
    pub fn finish(self, ctx: &Context) -> Result<TaskResult> {
        if self.failed > 0 {
            anyhow::bail!("{} of {} step(s) failed", self.failed, self.total);
        }
        Ok(if ctx.dry_run {
            TaskResult::DryRun
        } else {
            TaskResult::Ok
        })
    }
}

/// Configuration for the generic resource processing loop.
///
/// # Examples
///
/// ```
/// use mint_setup::tasks::ProcessOpts;
///
/// // Fix everything, stop at the first error:
/// let opts = ProcessOpts::apply_all("write");
/// assert!(opts.fix_incorrect && opts.fix_missing && opts.bail_on_error);
///
/// // Fix everything, log errors and keep going:
/// let opts = ProcessOpts::apply_all("set").no_bail();
/// assert!(!opts.bail_on_error);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ProcessOpts<'a> {
    /// Verb for log messages (e.g., "write", "set").
    pub verb: &'a str,
    /// Treat `Incorrect` as fixable (apply the change). If `false`, skip it.
    pub fix_incorrect: bool,
    /// Treat `Missing` as fixable (apply the change). If `false`, skip it.
    pub fix_missing: bool,
    /// Propagate errors from `apply()` (bail). If `false`, log and count as failed.
    pub bail_on_error: bool,
}

impl<'a> ProcessOpts<'a> {
    /// Fix both missing and incorrect resources, bailing on errors.
    #[must_use]
    pub const fn apply_all(verb: &'a str) -> Self {
        Self {
            verb,
            fix_incorrect: true,
            fix_missing: true,
            bail_on_error: true,
        }
    }

    /// Log errors and continue with the next resource instead of bailing.
    #[must_use]
    pub const fn no_bail(mut self) -> Self {
        self.bail_on_error = false;
        self
    }
}

/// Process resources by checking each one's current state and applying as needed.
///
/// # Errors
///
/// With `bail_on_error`, returns the first state or apply error. Otherwise
/// every resource is attempted and the task fails at the end if any did.
pub fn process_resources<R: Resource>(
    ctx: &Context,
    resources: impl IntoIterator<Item = R>,
    opts: &ProcessOpts,
) -> Result<TaskResult> {
    resource_stats(ctx, resources, opts)?.finish(ctx)
}

/// Like [`process_resources`] but returns the raw counters so the caller can
/// merge them with its own before finishing.
///
/// # Errors
///
/// With `bail_on_error`, returns the first state or apply error.
pub fn resource_stats<R: Resource>(
    ctx: &Context,
    resources: impl IntoIterator<Item = R>,
    opts: &ProcessOpts,
) -> Result<TaskStats> {
    let mut stats = TaskStats::new();
    for resource in resources {
        let current = match resource.current_state() {
            Ok(state) => state,
            Err(e) if !opts.bail_on_error => {
                ctx.log
                    .error(&format!("{}: {e:#}", resource.description()));
                stats.failed += 1;
                continue;
            }
            Err(e) => return Err(e),
        };
        stats += process_single(ctx, &resource, current, opts)?;
    }
    Ok(stats)
}

/// Process a single resource given its current state, returning a stats delta.
pub(super) fn process_single<R: Resource>(
    ctx: &Context,
    resource: &R,
    resource_state: ResourceState,
    opts: &ProcessOpts,
) -> Result<TaskStats> {
    let desc = resource.description();
    let mut delta = TaskStats::new();
    match resource_state {
        ResourceState::Correct => {
            ctx.log.debug(&format!("ok: {desc}"));
            delta.already_ok += 1;
        }
        ResourceState::Invalid { reason } => {
            ctx.log.warn(&format!("cannot {} {desc}: {reason}", opts.verb));
            delta.skipped += 1;
        }
        ResourceState::Missing if !opts.fix_missing => {
            delta.skipped += 1;
        }
        ResourceState::Incorrect { .. } if !opts.fix_incorrect => {
            ctx.log.debug(&format!("skipping {desc} (unexpected state)"));
            delta.skipped += 1;
        }
        resource_state @ (ResourceState::Missing | ResourceState::Incorrect { .. }) => {
            if ctx.dry_run {
                let msg = if let ResourceState::Incorrect { ref current } = resource_state {
                    format!("would {} {desc} (currently {current})", opts.verb)
                } else {
                    format!("would {}: {desc}", opts.verb)
                };
                ctx.log.dry_run(&msg);
                delta.changed += 1;
                return Ok(delta);
            }
            delta += apply_resource(ctx, resource, opts)?;
        }
    }
    Ok(delta)
}

/// Apply a single resource change, returning a stats delta.
pub(super) fn apply_resource<R: Resource>(
    ctx: &Context,
    resource: &R,
    opts: &ProcessOpts,
) -> Result<TaskStats> {
    let desc = resource.description();
    let mut delta = TaskStats::new();
    let change = match resource.apply() {
        Ok(change) => change,
        Err(e) => {
            if opts.bail_on_error {
                return Err(e);
            }
            ctx.log.error(&format!("failed to {} {desc}: {e:#}", opts.verb));
            delta.failed += 1;
            return Ok(delta);
        }
    };

    match change {
        ResourceChange::Applied => {
            ctx.log.step(&format!("{}: {desc}", opts.verb));
            delta.changed += 1;
        }
        ResourceChange::AlreadyCorrect => {
            delta.already_ok += 1;
        }
    }
    Ok(delta)
}
