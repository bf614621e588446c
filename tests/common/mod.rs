// Shared helpers for integration tests.
//
// Provides a scripted executor that records every command without running
// it, a log that collects messages in memory, and a temporary `--conf`
// directory whose system paths all point inside the temp dir.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use mint_setup::config::Config;
use mint_setup::exec::{ExecResult, Executor};
use mint_setup::logging::{Log, TaskStatus};
use mint_setup::platform::Platform;
use mint_setup::tasks::Context;

/// Executor that succeeds for every command and records it as
/// `"program arg arg"`.
#[derive(Debug, Default)]
pub struct ScriptedExecutor {
    calls: Mutex<Vec<String>>,
    available: Vec<String>,
}

impl ScriptedExecutor {
    /// Executor for which `which` reports only `programs` as installed.
    pub fn with_programs(programs: &[&str]) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            available: programs.iter().map(ToString::to_string).collect(),
        }
    }

    /// Every command run so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn record(&self, program: &str, args: &[&str]) -> ExecResult {
        let mut line = program.to_string();
        for arg in args {
            line.push(' ');
            line.push_str(arg);
        }
        self.calls.lock().expect("calls lock").push(line);
        ExecResult {
            success: true,
            code: Some(0),
            ..ExecResult::default()
        }
    }
}

impl Executor for ScriptedExecutor {
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        Ok(self.record(program, args))
    }

    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        Ok(self.record(program, args))
    }

    fn run_inherited(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        Ok(self.record(program, args))
    }

    fn run_with_input(&self, program: &str, args: &[&str], _input: &[u8]) -> Result<Vec<u8>> {
        self.record(program, args);
        Ok(b"binary-keyring".to_vec())
    }

    fn which(&self, program: &str) -> bool {
        self.available.iter().any(|p| p == program)
    }
}

/// Log that keeps `"kind: message"` lines and task results in memory.
#[derive(Debug, Default)]
pub struct CollectingLog {
    lines: Mutex<Vec<String>>,
    tasks: Mutex<Vec<(String, TaskStatus)>>,
}

impl CollectingLog {
    fn push(&self, kind: &str, msg: &str) {
        self.lines
            .lock()
            .expect("lines lock")
            .push(format!("{kind}: {msg}"));
    }

    /// Every message logged so far.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().expect("lines lock").clone()
    }

    /// Whether a message of `kind` containing `needle` was logged.
    pub fn contains(&self, kind: &str, needle: &str) -> bool {
        let prefix = format!("{kind}: ");
        self.lines()
            .iter()
            .any(|l| l.starts_with(&prefix) && l.contains(needle))
    }

    /// Recorded task results.
    pub fn tasks(&self) -> Vec<(String, TaskStatus)> {
        self.tasks.lock().expect("tasks lock").clone()
    }

    /// Names of tasks recorded with `status`.
    pub fn tasks_with(&self, status: TaskStatus) -> Vec<String> {
        self.tasks()
            .into_iter()
            .filter(|(_, s)| *s == status)
            .map(|(name, _)| name)
            .collect()
    }
}

impl Log for CollectingLog {
    fn section(&self, msg: &str) {
        self.push("section", msg);
    }
    fn subsection(&self, msg: &str) {
        self.push("subsection", msg);
    }
    fn step(&self, msg: &str) {
        self.push("step", msg);
    }
    fn info(&self, msg: &str) {
        self.push("info", msg);
    }
    fn success(&self, msg: &str) {
        self.push("success", msg);
    }
    fn debug(&self, msg: &str) {
        self.push("debug", msg);
    }
    fn warn(&self, msg: &str) {
        self.push("warn", msg);
    }
    fn error(&self, msg: &str) {
        self.push("error", msg);
    }
    fn dry_run(&self, msg: &str) {
        self.push("dry_run", msg);
    }
    fn record_task(&self, name: &str, status: TaskStatus, _message: Option<&str>) {
        self.tasks
            .lock()
            .expect("tasks lock")
            .push((name.to_string(), status));
    }
}

/// Stock Debian journald.conf fragment.
pub const JOURNALD_CONF: &str = "\
#  This file is part of systemd.
#
# See journald.conf(5) for details.

[Journal]
#Storage=auto
#Compress=yes
#SystemMaxUse=
#SystemMaxFileSize=
#SyncIntervalSec=5m
";

/// A temporary `--conf` directory plus the fake system tree its
/// `system.toml` and `vscode.toml` point into.
pub struct SandboxConf {
    /// Temporary directory holding `conf/` and `root/`.
    pub dir: tempfile::TempDir,
}

impl SandboxConf {
    /// Write override files for everything that touches system paths.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let conf = dir.path().join("conf");
        let root = dir.path().join("root");
        std::fs::create_dir_all(&conf).expect("create conf dir");
        std::fs::create_dir_all(root.join("etc/systemd")).expect("create etc dir");
        std::fs::create_dir_all(root.join("lists/partial")).expect("create lists dir");
        std::fs::write(root.join("etc/systemd/journald.conf"), JOURNALD_CONF)
            .expect("write journald.conf");

        let r = root.display();
        std::fs::write(
            conf.join("system.toml"),
            format!(
                r#"[sysctl]
path = "{r}/etc/sysctl.d/99-zzz-sysctl.conf"
header = "Optimized sysctl settings"
params = [
    {{ key = "vm.swappiness", value = "10" }},
    {{ key = "kernel.sysrq", value = "0" }},
]

[journald]
path = "{r}/etc/systemd/journald.conf"
section = "[Journal]"
properties = [
    {{ key = "Storage", value = "persistent" }},
    {{ key = "SystemMaxUse", value = "100M" }},
]

[services]
units = ["ssh", "haveged"]
"#
            ),
        )
        .expect("write system.toml");

        std::fs::write(
            conf.join("vscode.toml"),
            format!(
                r#"name = "VS Code"
key_url = "https://packages.microsoft.com/keys/microsoft.asc"
keyring = "{r}/etc/apt/keyrings/packages.microsoft.gpg"
source_list = "{r}/etc/apt/sources.list.d/vscode.list"
repo_url = "https://packages.microsoft.com/repos/code"
suite = "stable"
components = ["main"]
architectures = ["amd64"]
package = "code"
lists_dir = "{r}/lists"
conflicting = ["{r}/usr/share/keyrings/microsoft.gpg"]
"#
            ),
        )
        .expect("write vscode.toml");

        std::fs::write(
            conf.join("packages.toml"),
            "[[remove]]\nname = \"VIM\"\npackages = [\"vim-tiny\"]\n\n\
             [[install]]\nname = \"UTILITY\"\npackages = [\"tree\", \"htop\"]\n",
        )
        .expect("write packages.toml");

        Self { dir }
    }

    /// The `--conf` directory.
    pub fn conf_dir(&self) -> PathBuf {
        self.dir.path().join("conf")
    }

    /// Resolve `rel` inside the fake system tree.
    pub fn root(&self, rel: &str) -> PathBuf {
        self.dir.path().join("root").join(rel)
    }

    /// Load configuration through the override directory.
    pub fn config(&self) -> Config {
        Config::load(Some(&self.conf_dir())).expect("load sandbox config")
    }
}

/// Build a context on a Mint-like platform with apt and systemd.
pub fn context(
    executor: &Arc<ScriptedExecutor>,
    log: &Arc<CollectingLog>,
    dry_run: bool,
) -> Context {
    Context::new(
        Arc::new(Platform::new("linuxmint", true, true)),
        Arc::clone(log) as Arc<dyn Log>,
        dry_run,
        Arc::clone(executor) as Arc<dyn Executor>,
        None,
    )
}

/// Read a file that must exist.
pub fn read(path: &Path) -> String {
    std::fs::read_to_string(path).expect("read file")
}
