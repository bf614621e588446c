//! Command-line definitions for both programs.
use std::path::PathBuf;

use clap::{Args, Parser};

use crate::commands::setup::Action;

/// Options shared by both programs.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Preview changes without applying (no root needed)
    #[arg(short = 'd', long)]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Load TOML data from this directory instead of the built-in defaults
    #[arg(long, value_name = "DIR")]
    pub conf: Option<PathBuf>,
}

/// Linux Mint system setup.
#[derive(Parser, Debug)]
#[command(
    name = "mint-setup",
    about = "Linux Mint system setup: packages, VS Code, kernel tuning, journald and services",
    version = crate::VERSION
)]
pub struct Cli {
    /// Update only system
    #[arg(short, long)]
    pub update: bool,

    /// Remove only packages
    #[arg(short, long)]
    pub remove: bool,

    /// Install only packages
    #[arg(short, long)]
    pub install: bool,

    /// Add repository and install VS Code
    #[arg(long)]
    pub vscode: bool,

    /// Clean only packages
    #[arg(short, long)]
    pub clean: bool,

    /// Setup system settings
    #[arg(short, long)]
    pub system: bool,

    /// Options shared with `firefox-setup`.
    #[command(flatten)]
    pub global: GlobalOpts,
}

impl Cli {
    /// Selected actions in execution order.
    #[must_use]
    pub fn actions(&self) -> Vec<Action> {
        [
            (self.update, Action::Update),
            (self.remove, Action::Remove),
            (self.install, Action::Install),
            (self.vscode, Action::VsCode),
            (self.clean, Action::Clean),
            (self.system, Action::System),
        ]
        .into_iter()
        .filter_map(|(set, action)| set.then_some(action))
        .collect()
    }
}

/// Write locked Firefox preferences.
#[derive(Parser, Debug)]
#[command(
    name = "firefox-setup",
    about = "Write autoconfig.js and a locked-preference firefox.cfg",
    version = crate::VERSION
)]
pub struct FirefoxCli {
    /// Firefox installation directory [default: from firefox.toml, /usr/lib/firefox]
    #[arg(long, value_name = "DIR")]
    pub firefox_dir: Option<PathBuf>,

    /// Options shared with `mint-setup`.
    #[command(flatten)]
    pub global: GlobalOpts,
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
        FirefoxCli::command().debug_assert();
    }

    #[test]
    fn no_flags_selects_nothing() {
        let cli = Cli::parse_from(["mint-setup"]);
        assert!(cli.actions().is_empty());
    }

    #[test]
    fn short_flags_combine() {
        let cli = Cli::parse_from(["mint-setup", "-s", "-ui"]);
        assert_eq!(
            cli.actions(),
            vec![Action::Update, Action::Install, Action::System]
        );
    }

    #[test]
    fn vscode_has_no_short_flag() {
        let cli = Cli::parse_from(["mint-setup", "--vscode", "--clean"]);
        assert_eq!(cli.actions(), vec![Action::VsCode, Action::Clean]);
        let command = Cli::command();
        let vscode = command
            .get_arguments()
            .find(|a| a.get_id() == "vscode")
            .unwrap();
        assert_eq!(vscode.get_short(), None);
    }

    #[test]
    fn global_options() {
        let cli = Cli::parse_from(["mint-setup", "-r", "-d", "-v", "--conf", "/tmp/conf"]);
        assert!(cli.global.dry_run);
        assert!(cli.global.verbose);
        assert_eq!(cli.global.conf, Some(PathBuf::from("/tmp/conf")));
    }

    #[test]
    fn firefox_dir_override() {
        let cli = FirefoxCli::parse_from(["firefox-setup", "--firefox-dir", "/opt/firefox", "-d"]);
        assert_eq!(cli.firefox_dir, Some(PathBuf::from("/opt/firefox")));
        assert!(cli.global.dry_run);
    }

    #[test]
    fn firefox_dir_defaults_to_none() {
        let cli = FirefoxCli::parse_from(["firefox-setup"]);
        assert_eq!(cli.firefox_dir, None);
        assert!(!cli.global.dry_run);
    }
}
