//! External command execution behind an injectable [`Executor`].
use std::io::Write as _;
use std::process::{Command, Output, Stdio};

use anyhow::{Context as _, Result};

use crate::error::ExecError;

/// Result of a command execution.
#[derive(Debug, Clone, Default)]
pub struct ExecResult {
    /// Captured standard output (empty when output was inherited).
    pub stdout: String,
    /// Captured standard error (empty when output was inherited).
    pub stderr: String,
    /// Whether the process exited with status zero.
    pub success: bool,
    /// Exit code, if the process was not terminated by a signal.
    pub code: Option<i32>,
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

/// Abstraction over process execution so tasks can be tested without
/// touching the system.
pub trait Executor: Send + Sync + std::fmt::Debug {
    /// Run a command, capturing output. Fails if the command exits non-zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be started or exits unsuccessfully.
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Run a command, capturing output, without treating a non-zero exit as an error.
    ///
    /// # Errors
    ///
    /// Returns an error only if the program cannot be started.
    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Run a command with its output streamed to the terminal.
    ///
    /// Used for long-running package-manager calls whose progress the user
    /// should see. Fails if the command exits non-zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be started or exits unsuccessfully.
    fn run_inherited(&self, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Run a command feeding `input` to its stdin and return raw stdout bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be started or exits unsuccessfully.
    fn run_with_input(&self, program: &str, args: &[&str], input: &[u8]) -> Result<Vec<u8>>;

    /// Check whether a program is available on `PATH`.
    fn which(&self, program: &str) -> bool;
}

/// [`Executor`] backed by [`std::process::Command`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

fn check_status(program: &str, result: ExecResult) -> Result<ExecResult> {
    if result.success {
        return Ok(result);
    }
    Err(ExecError::Failed {
        program: program.to_string(),
        code: result.code.unwrap_or(-1),
        stderr: result.stderr.trim().to_string(),
    }
    .into())
}

fn spawn_error(program: &str, source: std::io::Error) -> anyhow::Error {
    ExecError::Spawn {
        program: program.to_string(),
        source,
    }
    .into()
}

impl Executor for SystemExecutor {
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        let result = self.run_unchecked(program, args)?;
        check_status(program, result)
    }

    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|e| spawn_error(program, e))?;
        Ok(ExecResult::from(output))
    }

    fn run_inherited(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        let status = Command::new(program)
            .args(args)
            .status()
            .map_err(|e| spawn_error(program, e))?;
        check_status(
            program,
            ExecResult {
                success: status.success(),
                code: status.code(),
                ..ExecResult::default()
            },
        )
    }

    fn run_with_input(&self, program: &str, args: &[&str], input: &[u8]) -> Result<Vec<u8>> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| spawn_error(program, e))?;

        // Write from a separate thread so a child that fills its stdout pipe
        // before draining stdin cannot deadlock us.
        let mut stdin = child
            .stdin
            .take()
            .with_context(|| format!("{program}: stdin not captured"))?;
        let input = input.to_vec();
        let writer = std::thread::spawn(move || stdin.write_all(&input));

        let output = child
            .wait_with_output()
            .with_context(|| format!("waiting for {program}"))?;
        writer
            .join()
            .map_err(|_| anyhow::anyhow!("{program}: stdin writer panicked"))?
            .with_context(|| format!("writing to {program} stdin"))?;

        let stdout = output.stdout.clone();
        check_status(program, ExecResult::from(output))?;
        Ok(stdout)
    }

    fn which(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}
