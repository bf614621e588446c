//! Top-level orchestration for `mint-setup` and `firefox-setup`.
pub mod firefox;
pub mod setup;

use anyhow::Result;

use crate::cli::GlobalOpts;
use crate::config::Config;
use crate::logging::Logger;
use crate::tasks::{Context, Stage};

/// Load the system configuration and display validation warnings.
///
/// # Errors
///
/// Returns an error if any configuration file fails to parse.
pub fn load_config(global: &GlobalOpts, log: &Logger) -> Result<Config> {
    match &global.conf {
        Some(dir) => log.info(&format!("configuration override: {}", dir.display())),
        None => log.debug("using embedded configuration"),
    }
    let config = Config::load(global.conf.as_deref())?;

    log.debug(&format!(
        "{} remove categories, {} install categories",
        config.packages.remove.len(),
        config.packages.install.len()
    ));
    log.debug(&format!(
        "{} sysctl parameters, {} journald properties, {} services",
        config.system.sysctl.params.len(),
        config.system.journald.properties.len(),
        config.system.services.units.len()
    ));

    let warnings = config.validate();
    if !warnings.is_empty() {
        log.warn(&format!(
            "found {} configuration warning(s):",
            warnings.len()
        ));
        for warning in &warnings {
            log.warn(&format!("  {warning}"));
        }
    }
    Ok(config)
}

/// Run every stage in order, print the summary, and bail if any task failed.
///
/// # Errors
///
/// Returns an error if one or more tasks recorded a failure.
pub fn run_stages(stages: &[Stage], ctx: &Context, log: &Logger) -> Result<()> {
    for stage in stages {
        stage.run(ctx);
    }

    log.print_summary();

    let count = log.failure_count();
    if count > 0 {
        anyhow::bail!("{count} task(s) failed");
    }
    Ok(())
}
