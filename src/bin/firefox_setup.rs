//! `firefox-setup` entry point.
use std::sync::Arc;

use anyhow::Result;
use clap::Parser as _;
use mint_setup::cli::FirefoxCli;
use mint_setup::{commands, logging, privilege};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let cli = FirefoxCli::parse();

    if !cli.global.dry_run {
        privilege::elevate()?;
    }

    logging::init_subscriber(cli.global.verbose, "firefox-setup");
    let log = Arc::new(logging::Logger::new("firefox-setup"));
    commands::firefox::run(&cli, &log)
}
