//! Domain-specific error types for the setup engine.
//!
//! Internal modules return typed errors (e.g. [`PatchError`], [`ExecError`])
//! while tasks and commands at the CLI boundary convert them to
//! [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error types
//!
//! ```text
//! ConfigError     : TOML data loading
//! PatchError      : config-file key/value edits
//! ExecError       : external command failures
//! PrivilegeError  : re-exec under sudo failed
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Errors from gaining root privileges at startup.
#[derive(Error, Debug)]
pub enum PrivilegeError {
    /// `sudo` could not be executed; nothing else can run.
    #[error("Failed to elevate privileges: {0}")]
    Elevate(String),
}

/// Errors that arise while loading the declarative TOML data.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A data file could not be read.
    #[error("IO error reading config file {path}: {source}")]
    Io {
        /// Path to the file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A data file is not valid TOML for its schema.
    #[error("Invalid TOML in {origin}: {source}")]
    Parse {
        /// File name or `embedded:<name>` for compiled-in defaults.
        origin: String,
        /// Underlying deserialization error.
        source: toml::de::Error,
    },
}

/// Errors from the idempotent key/value config-file patcher.
#[derive(Error, Debug)]
pub enum PatchError {
    /// The value does not match the allow pattern; the file is untouched.
    #[error("Invalid value '{value}' for key '{key}'")]
    InvalidValue {
        /// Key that was being set.
        key: String,
        /// Rejected value.
        value: String,
    },

    /// The key is empty or contains characters that cannot form an assignment.
    #[error("Invalid key '{0}'")]
    InvalidKey(String),

    /// The one-time backup copy could not be created.
    #[error("failed to back up {path}: {source}")]
    Backup {
        /// File that was being backed up.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The target file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// File that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The patched content could not be written back.
    #[error("failed to write {path}: {source}")]
    Write {
        /// File that could not be written.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Errors that arise from running external commands.
#[derive(Error, Debug)]
pub enum ExecError {
    /// The program could not be started at all.
    #[error("failed to execute '{program}': {source}")]
    Spawn {
        /// Program that was invoked.
        program: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The program ran but exited unsuccessfully.
    #[error("'{program}' failed (exit {code}): {stderr}")]
    Failed {
        /// Program that was invoked.
        program: String,
        /// Exit code, or -1 when terminated by a signal.
        code: i32,
        /// Captured standard error (empty for inherited output).
        stderr: String,
    },
}
