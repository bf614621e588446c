//! Locked Firefox preferences and the two files that carry them.
use std::collections::HashSet;
use std::fmt::{self, Write as _};
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// A preference value as written into `firefox.cfg`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PrefValue {
    /// Rendered bare: `true` / `false`.
    Bool(bool),
    /// Rendered bare.
    Int(i64),
    /// Rendered as a double-quoted, escaped string literal.
    Text(String),
}

impl fmt::Display for PrefValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Text(s) => {
                f.write_str("\"")?;
                for c in s.chars() {
                    match c {
                        '"' => f.write_str("\\\"")?,
                        '\\' => f.write_str("\\\\")?,
                        '\n' => f.write_str("\\n")?,
                        '\r' => f.write_str("\\r")?,
                        '\t' => f.write_str("\\t")?,
                        c if c.is_control() => write!(f, "\\u{:04x}", u32::from(c))?,
                        c => write!(f, "{c}")?,
                    }
                }
                f.write_str("\"")
            }
        }
    }
}

/// One `lockPref` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Preference {
    /// Preference name, e.g. `browser.cache.disk.capacity`.
    pub key: String,
    /// Locked value.
    pub value: PrefValue,
}

impl Preference {
    /// The `lockPref("key", value);` line, without a trailing newline.
    #[must_use]
    pub fn lock_line(&self) -> String {
        format!("lockPref(\"{}\", {});", self.key, self.value)
    }
}

/// Preferences rendered together under one `// comment` separator.
#[derive(Debug, Clone, Deserialize)]
pub struct PrefGroup {
    /// Separator comment text.
    pub comment: String,
    /// Entries in output order.
    #[serde(default)]
    pub prefs: Vec<Preference>,
}

/// Contents of `firefox.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct FirefoxConfig {
    /// Default Firefox installation directory.
    pub install_dir: PathBuf,
    /// Autoconfig registration file, relative to the install directory.
    pub autoconfig: PathBuf,
    /// Name of the locked-preference file, relative to the install directory.
    pub config_file: String,
    /// Comment written at the top of the preference file.
    pub header: String,
    /// Preference groups in output order.
    #[serde(default, rename = "group")]
    pub groups: Vec<PrefGroup>,
}

impl FirefoxConfig {
    /// Path of the autoconfig registration file under `install_dir`.
    #[must_use]
    pub fn autoconfig_path(&self, install_dir: &Path) -> PathBuf {
        install_dir.join(&self.autoconfig)
    }

    /// Path of the locked-preference file under `install_dir`.
    #[must_use]
    pub fn cfg_path(&self, install_dir: &Path) -> PathBuf {
        install_dir.join(&self.config_file)
    }

    /// Content of `autoconfig.js`, pointing Firefox at the preference file.
    #[must_use]
    pub fn render_autoconfig(&self) -> String {
        format!(
            "pref(\"general.config.filename\", \"{}\");\npref(\"general.config.obscure_value\", 0);\n",
            self.config_file
        )
    }

    /// Content of the locked-preference file.
    #[must_use]
    pub fn render_cfg(&self) -> String {
        let mut out = format!("\n// {}\n", self.header);
        for group in &self.groups {
            writeln!(out, "\n// {}", group.comment).ok();
            for pref in &group.prefs {
                writeln!(out, "{}", pref.lock_line()).ok();
            }
        }
        out
    }

    /// Total number of preferences across all groups.
    #[must_use]
    pub fn pref_count(&self) -> usize {
        self.groups.iter().map(|g| g.prefs.len()).sum()
    }

    /// Keys locked more than once; the later line wins in Firefox.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.groups
            .iter()
            .flat_map(|g| g.prefs.iter())
            .filter(|p| !seen.insert(p.key.as_str()))
            .map(|p| format!("preference '{}' is locked more than once", p.key))
            .collect()
    }
}
