//! Third-party APT repository description (`vscode.toml`).
use std::path::PathBuf;

use serde::Deserialize;

/// An APT repository signed by a vendor key.
#[derive(Debug, Clone, Deserialize)]
pub struct ThirdPartyRepo {
    /// Display name for log output.
    pub name: String,
    /// HTTPS URL of the ASCII-armored signing key.
    pub key_url: String,
    /// Where the dearmored keyring is written.
    pub keyring: PathBuf,
    /// The `sources.list.d` entry to write.
    pub source_list: PathBuf,
    /// Repository base URL.
    pub repo_url: String,
    /// Distribution suite, e.g. `stable`.
    pub suite: String,
    /// Repository components.
    #[serde(default)]
    pub components: Vec<String>,
    /// Restrict the source to these architectures; empty means any.
    #[serde(default)]
    pub architectures: Vec<String>,
    /// Package installed from the repository.
    pub package: String,
    /// APT list cache cleared before the first sync.
    pub lists_dir: PathBuf,
    /// Stale source and key files removed before installing.
    #[serde(default)]
    pub conflicting: Vec<PathBuf>,
}

impl ThirdPartyRepo {
    /// The one-line `deb` entry, including its trailing newline.
    #[must_use]
    pub fn source_line(&self) -> String {
        let mut options = Vec::new();
        if !self.architectures.is_empty() {
            options.push(format!("arch={}", self.architectures.join(",")));
        }
        options.push(format!("signed-by={}", self.keyring.display()));
        format!(
            "deb [{}] {} {} {}\n",
            options.join(" "),
            self.repo_url,
            self.suite,
            self.components.join(" ")
        )
    }

    /// Problems with the data.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if !self.key_url.starts_with("https://") {
            warnings.push(format!("{}: key URL '{}' is not HTTPS", self.name, self.key_url));
        }
        if self.components.is_empty() {
            warnings.push(format!("{}: no repository components", self.name));
        }
        warnings
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn sample() -> ThirdPartyRepo {
        toml::from_str(
            r#"
            name = "VS Code"
            key_url = "https://packages.microsoft.com/keys/microsoft.asc"
            keyring = "/etc/apt/keyrings/packages.microsoft.gpg"
            source_list = "/etc/apt/sources.list.d/vscode.list"
            repo_url = "https://packages.microsoft.com/repos/code"
            suite = "stable"
            components = ["main"]
            architectures = ["amd64"]
            package = "code"
            lists_dir = "/var/lib/apt/lists"
            "#,
        )
        .unwrap()
    }

    #[test]
    fn source_line_for_vscode() {
        assert_eq!(
            sample().source_line(),
            "deb [arch=amd64 signed-by=/etc/apt/keyrings/packages.microsoft.gpg] \
             https://packages.microsoft.com/repos/code stable main\n"
        );
    }

    #[test]
    fn source_line_without_architectures() {
        let mut repo = sample();
        repo.architectures.clear();
        assert!(
            repo.source_line()
                .starts_with("deb [signed-by=/etc/apt/keyrings/packages.microsoft.gpg] ")
        );
    }

    #[test]
    fn plain_http_key_is_flagged() {
        let mut repo = sample();
        repo.key_url = "http://example.com/key.asc".to_string();
        let warnings = repo.validate();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("not HTTPS"));
    }
}
