//! Debian package resources driven through `nala`.
use std::collections::HashSet;

use anyhow::Result;

use super::ResourceState;
use crate::exec::Executor;

/// What to do with a batch of packages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageAction {
    /// `nala install -y`.
    Install,
    /// `nala purge -y`.
    Purge,
}

impl PackageAction {
    /// The `nala` subcommand for this action.
    #[must_use]
    pub const fn subcommand(self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::Purge => "purge",
        }
    }

    /// Whether a package in `state` still needs this action.
    #[must_use]
    pub const fn is_pending(self, state: &ResourceState) -> bool {
        match self {
            Self::Install => matches!(state, ResourceState::Missing),
            Self::Purge => matches!(state, ResourceState::Correct),
        }
    }
}

impl std::fmt::Display for PackageAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.subcommand())
    }
}

/// A Debian package whose installed state is known from a bulk query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageResource {
    /// Package name.
    pub name: String,
}

impl PackageResource {
    /// Create a new package resource.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Determine the resource state from a pre-fetched set of installed
    /// package names.
    #[must_use]
    pub fn state_from_installed(&self, installed: &HashSet<String>) -> ResourceState {
        if installed.contains(&self.name) {
            ResourceState::Correct
        } else {
            ResourceState::Missing
        }
    }
}

/// Parse `dpkg-query -W -f='${Status}\t${Package}\n'` output.
///
/// Only packages whose status ends in `ok installed` count; packages left in
/// `deinstall ok config-files` state after a plain remove do not.
#[must_use]
pub fn parse_dpkg_status(output: &str) -> HashSet<String> {
    output
        .lines()
        .filter_map(|line| line.split_once('\t'))
        .filter(|(status, _)| status.trim_end().ends_with(" ok installed"))
        .map(|(_, name)| name.trim().split(':').next().unwrap_or_default().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

/// Query the full set of installed package names with a single `dpkg-query`.
///
/// # Errors
///
/// Returns an error if `dpkg-query` cannot be executed or exits non-zero.
pub fn get_installed_packages(executor: &dyn Executor) -> Result<HashSet<String>> {
    let result = executor.run("dpkg-query", &["-W", "-f=${Status}\t${Package}\n"])?;
    Ok(parse_dpkg_status(&result.stdout))
}

/// Run one `nala <action> -y <names…>` for the whole batch, streaming its
/// progress to the terminal.
///
/// # Errors
///
/// Returns an error if `nala` fails.
pub fn batch(executor: &dyn Executor, action: PackageAction, names: &[&str]) -> Result<()> {
    if names.is_empty() {
        return Ok(());
    }
    let mut args = vec![action.subcommand(), "-y"];
    args.extend_from_slice(names);
    executor.run_inherited("nala", &args)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::exec::test_helpers::MockExecutor;

    const DPKG: &str = "install ok installed\tvim-tiny\n\
                        deinstall ok config-files\tgcolor3\n\
                        install ok installed\tlibc6:amd64\n\
                        unknown ok not-installed\tneovim\n";

    #[test]
    fn parse_dpkg_status_keeps_installed_only() {
        let installed = parse_dpkg_status(DPKG);
        assert!(installed.contains("vim-tiny"));
        assert!(installed.contains("libc6"), "arch qualifier is stripped");
        assert!(!installed.contains("gcolor3"));
        assert!(!installed.contains("neovim"));
        assert_eq!(installed.len(), 2);
    }

    #[test]
    fn state_from_installed() {
        let installed = parse_dpkg_status(DPKG);
        assert_eq!(
            PackageResource::new("vim-tiny").state_from_installed(&installed),
            ResourceState::Correct
        );
        assert_eq!(
            PackageResource::new("tmux").state_from_installed(&installed),
            ResourceState::Missing
        );
    }

    #[test]
    fn pending_depends_on_action() {
        assert!(PackageAction::Install.is_pending(&ResourceState::Missing));
        assert!(!PackageAction::Install.is_pending(&ResourceState::Correct));
        assert!(PackageAction::Purge.is_pending(&ResourceState::Correct));
        assert!(!PackageAction::Purge.is_pending(&ResourceState::Missing));
    }

    #[test]
    fn get_installed_packages_queries_dpkg_once() {
        let mock = MockExecutor::with_responses(vec![(true, "install ok installed\ttmux\n")]);
        let installed = get_installed_packages(&mock).unwrap();
        assert!(installed.contains("tmux"));
        assert_eq!(mock.calls().len(), 1);
        assert!(mock.calls()[0].starts_with("dpkg-query -W"));
    }

    #[test]
    fn batch_runs_single_nala_command() {
        let mock = MockExecutor::new();
        batch(&mock, PackageAction::Purge, &["vim-common", "vim-tiny"]).unwrap();
        assert_eq!(mock.calls(), vec!["nala purge -y vim-common vim-tiny"]);
    }

    #[test]
    fn batch_with_no_packages_runs_nothing() {
        let mock = MockExecutor::new();
        batch(&mock, PackageAction::Install, &[]).unwrap();
        assert!(mock.calls().is_empty());
    }
}
