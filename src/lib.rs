//! Linux Mint workstation setup.
//!
//! Two programs share this library: `mint-setup` drives the package manager,
//! a signed third-party repository, kernel tuning, the systemd journal and a
//! fixed set of services; `firefox-setup` writes locked browser preferences.
//! All data (package categories, preferences, sysctl values, journald
//! properties, services) lives in TOML files under `conf/`, embedded at build
//! time and overridable with `--conf`.
//!
//! The public API is organised into four layers:
//!
//! - **[`config`]**: parse and validate the TOML data files
//! - **[`resources`]**: idempotent `check + apply` primitives (files, config patches, packages, …)
//! - **[`tasks`]**: named units of work wired to resources, grouped into stages
//! - **[`commands`]**: top-level orchestration for each program
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod logging;
pub mod platform;
pub mod privilege;
pub mod resources;
pub mod tasks;

/// Version string: `MINT_SETUP_VERSION` from the build, or the crate version.
pub const VERSION: &str = match option_env!("MINT_SETUP_VERSION") {
    Some(version) => version,
    None => env!("CARGO_PKG_VERSION"),
};
