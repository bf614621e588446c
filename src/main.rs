//! `mint-setup` entry point.
use std::sync::Arc;

use anyhow::Result;
use clap::{CommandFactory as _, Parser as _};
use mint_setup::cli::Cli;
use mint_setup::{commands, logging, privilege};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let cli = Cli::parse();

    if cli.actions().is_empty() {
        Cli::command().print_help()?;
        std::process::exit(1);
    }

    if !cli.global.dry_run {
        privilege::elevate()?;
    }

    logging::init_subscriber(cli.global.verbose, "mint-setup");
    let log = Arc::new(logging::Logger::new("mint-setup"));
    commands::setup::run(&cli, &log)
}
