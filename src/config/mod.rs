//! Declarative setup data: package categories, system tuning, the VS Code
//! repository and Firefox preferences.
//!
//! Every file is compiled into the binary from `conf/` and may be replaced
//! at run time by a file of the same name in the `--conf` directory.
pub mod packages;
pub mod preferences;
pub mod repository;
pub mod system;
pub mod toml_loader;

use anyhow::{Context as _, Result};
use std::path::Path;

pub use packages::{PackageCategory, PackageSets};
pub use preferences::FirefoxConfig;
pub use repository::ThirdPartyRepo;
pub use system::SystemConfig;

const PACKAGES_TOML: &str = include_str!("../../conf/packages.toml");
const SYSTEM_TOML: &str = include_str!("../../conf/system.toml");
const VSCODE_TOML: &str = include_str!("../../conf/vscode.toml");
const FIREFOX_TOML: &str = include_str!("../../conf/firefox.toml");

/// All loaded setup data.
#[derive(Debug, Clone)]
pub struct Config {
    /// Package categories.
    pub packages: PackageSets,
    /// Kernel, journal and service settings.
    pub system: SystemConfig,
    /// The VS Code APT repository.
    pub vscode: ThirdPartyRepo,
}

impl Config {
    /// Load all setup data, preferring files in `conf_dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if any data file cannot be read or parsed.
    pub fn load(conf_dir: Option<&Path>) -> Result<Self> {
        Ok(Self {
            packages: toml_loader::load(conf_dir, "packages.toml", PACKAGES_TOML)
                .context("loading packages.toml")?,
            system: toml_loader::load(conf_dir, "system.toml", SYSTEM_TOML)
                .context("loading system.toml")?,
            vscode: toml_loader::load(conf_dir, "vscode.toml", VSCODE_TOML)
                .context("loading vscode.toml")?,
        })
    }

    /// Human-readable problems found across all data files.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = self.packages.validate();
        warnings.extend(self.system.validate());
        warnings.extend(self.vscode.validate());
        warnings
    }
}

/// Load the Firefox preference data, preferring `conf_dir/firefox.toml`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_firefox(conf_dir: Option<&Path>) -> Result<FirefoxConfig> {
    toml_loader::load(conf_dir, "firefox.toml", FIREFOX_TOML).context("loading firefox.toml")
}
