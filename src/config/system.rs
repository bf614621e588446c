//! Kernel, journal and service settings from `system.toml`.
use std::fmt::Write as _;
use std::path::PathBuf;

use serde::Deserialize;

use crate::resources::config_patch::is_valid_value;

/// A single `key = value` setting.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Setting {
    /// Setting name.
    pub key: String,
    /// Setting value, kept as text.
    pub value: String,
}

/// The sysctl drop-in file.
#[derive(Debug, Clone, Deserialize)]
pub struct SysctlConfig {
    /// Drop-in path, e.g. `/etc/sysctl.d/99-zzz-sysctl.conf`.
    pub path: PathBuf,
    /// Comment written on the first line.
    pub header: String,
    /// Kernel parameters in output order.
    #[serde(default)]
    pub params: Vec<Setting>,
}

impl SysctlConfig {
    /// Render the drop-in file.
    ///
    /// Parameters are grouped by their top-level namespace (`kernel`, `vm`),
    /// with a blank line between groups.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = format!("# {}\n", self.header);
        let mut previous: Option<&str> = None;
        for param in &self.params {
            let namespace = param.key.split('.').next().unwrap_or_default();
            if previous.is_some_and(|p| p != namespace) {
                out.push('\n');
            }
            previous = Some(namespace);
            writeln!(out, "{} = {}", param.key, param.value).ok();
        }
        out
    }
}

/// The journald properties to enforce.
#[derive(Debug, Clone, Deserialize)]
pub struct JournaldConfig {
    /// Path to `journald.conf`.
    pub path: PathBuf,
    /// Section marker, e.g. `[Journal]`.
    pub section: String,
    /// Properties in application order.
    #[serde(default)]
    pub properties: Vec<Setting>,
}

/// Services enabled and restarted by `--system`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServicesConfig {
    /// systemd unit names, without the `.service` suffix.
    #[serde(default)]
    pub units: Vec<String>,
}

/// Contents of `system.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct SystemConfig {
    /// Kernel tuning.
    pub sysctl: SysctlConfig,
    /// Journal configuration.
    pub journald: JournaldConfig,
    /// Services to activate.
    #[serde(default)]
    pub services: ServicesConfig,
}

impl SystemConfig {
    /// Human-readable problems with the data.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut warnings: Vec<String> = self
            .journald
            .properties
            .iter()
            .filter(|p| !is_valid_value(&p.value))
            .map(|p| format!("journald: invalid value '{}' for key '{}'", p.value, p.key))
            .collect();
        if !self.journald.section.starts_with('[') || !self.journald.section.ends_with(']') {
            warnings.push(format!(
                "journald: section marker '{}' is not a [Section] header",
                self.journald.section
            ));
        }
        warnings.extend(
            self.sysctl
                .params
                .iter()
                .filter(|p| p.key.contains(char::is_whitespace) || p.key.is_empty())
                .map(|p| format!("sysctl: invalid parameter name '{}'", p.key)),
        );
        warnings
    }
}
