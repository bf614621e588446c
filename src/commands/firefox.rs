//! `firefox-setup`.
use std::sync::Arc;

use anyhow::Result;

use crate::cli::FirefoxCli;
use crate::config;
use crate::exec::SystemExecutor;
use crate::logging::{Log, Logger};
use crate::platform::Platform;
use crate::tasks::firefox::WriteFirefoxConfig;
use crate::tasks::{Context, Stage};

/// Run the `firefox-setup` command.
///
/// # Errors
///
/// Returns an error if `firefox.toml` cannot be loaded or writing failed.
pub fn run(cli: &FirefoxCli, log: &Arc<Logger>) -> Result<()> {
    let global = &cli.global;
    log.info(&format!("firefox-setup {}", crate::VERSION));

    let firefox = config::load_firefox(global.conf.as_deref())?;
    for warning in firefox.validate() {
        log.warn(&warning);
    }
    let install_dir = cli
        .firefox_dir
        .clone()
        .unwrap_or_else(|| firefox.install_dir.clone());
    log.debug(&format!("firefox directory: {}", install_dir.display()));

    let ctx = Context::new(
        Arc::new(Platform::detect()),
        Arc::clone(log) as Arc<dyn Log>,
        global.dry_run,
        Arc::new(SystemExecutor),
        None,
    );
    let stage = Stage::new(
        "Firefox",
        "Firefox preferences are locked",
        vec![Box::new(WriteFirefoxConfig::new(firefox, install_dir))],
    );
    super::run_stages(std::slice::from_ref(&stage), &ctx, log)
}
