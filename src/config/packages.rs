//! Package categories to install and remove.
use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

/// A named, ordered group of Debian packages.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PackageCategory {
    /// Category name used in log output (e.g. `DEVELOPMENT_PYTHON`).
    pub name: String,
    /// Package names in install order.
    #[serde(default)]
    pub packages: Vec<String>,
}

/// The remove and install category lists from `packages.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageSets {
    /// Categories purged by `--remove`.
    #[serde(default)]
    pub remove: Vec<PackageCategory>,
    /// Categories installed by `--install`.
    #[serde(default)]
    pub install: Vec<PackageCategory>,
}

fn package_name_regex() -> Option<&'static Regex> {
    static REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    REGEX
        .get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9+.\-]+$").ok())
        .as_ref()
}

/// Whether `name` is a syntactically valid Debian package name.
#[must_use]
pub fn is_valid_package_name(name: &str) -> bool {
    package_name_regex().is_some_and(|re| re.is_match(name))
}

/// Packages from `categories` in order, each listed once.
///
/// Several categories share packages (`synaptic`, `ca-certificates`); only
/// the first occurrence is kept.
#[must_use]
pub fn unique_packages(categories: &[PackageCategory]) -> Vec<&str> {
    let mut seen = HashSet::new();
    categories
        .iter()
        .flat_map(|c| c.packages.iter())
        .map(String::as_str)
        .filter(|p| seen.insert(*p))
        .collect()
}

impl PackageSets {
    /// Human-readable problems with the data (empty categories, bad names).
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        for (kind, categories) in [("remove", &self.remove), ("install", &self.install)] {
            for category in categories {
                if category.packages.is_empty() {
                    warnings.push(format!("{kind} category '{}' is empty", category.name));
                }
                for package in &category.packages {
                    if !is_valid_package_name(package) {
                        warnings.push(format!(
                            "{kind} category '{}': invalid package name '{package}'",
                            category.name
                        ));
                    }
                }
            }
        }
        warnings
    }
}
