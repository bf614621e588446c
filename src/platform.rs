//! Detection of the host distribution and its service manager.
use std::fs;
use std::path::Path;

/// Platform information for the current system.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Platform {
    /// `ID` from `/etc/os-release` (e.g. `linuxmint`).
    pub id: String,
    /// `ID_LIKE` entries from `/etc/os-release` (e.g. `ubuntu`, `debian`).
    pub id_like: Vec<String>,
    /// `PRETTY_NAME` from `/etc/os-release`.
    pub pretty_name: String,
    /// Whether `apt` is available.
    pub has_apt: bool,
    /// Whether systemd is the running init system.
    pub has_systemd: bool,
}

impl Platform {
    /// Detect the current platform.
    #[must_use]
    pub fn detect() -> Self {
        let mut platform = fs::read_to_string("/etc/os-release")
            .map(|s| Self::from_os_release(&s))
            .unwrap_or_default();
        platform.has_apt = which::which("apt").is_ok();
        platform.has_systemd = Path::new("/run/systemd/system").is_dir();
        platform
    }

    /// Create a platform with explicit values.
    #[must_use]
    pub fn new(id: &str, has_apt: bool, has_systemd: bool) -> Self {
        Self {
            id: id.to_string(),
            id_like: Vec::new(),
            pretty_name: id.to_string(),
            has_apt,
            has_systemd,
        }
    }

    /// Parse the identification fields of an `os-release` file.
    #[must_use]
    pub fn from_os_release(content: &str) -> Self {
        let mut platform = Self::default();
        for line in content.lines() {
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim().trim_matches('"').trim_matches('\'');
            match key.trim() {
                "ID" => platform.id = value.to_string(),
                "ID_LIKE" => {
                    platform.id_like = value.split_whitespace().map(String::from).collect();
                }
                "PRETTY_NAME" => platform.pretty_name = value.to_string(),
                _ => {}
            }
        }
        platform
    }

    /// Whether this is Debian or a derivative of it.
    #[must_use]
    pub fn is_debian_family(&self) -> bool {
        self.id == "debian" || self.id_like.iter().any(|l| l == "debian" || l == "ubuntu")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINT: &str = r#"NAME="Linux Mint"
VERSION="22.1 (Xia)"
ID=linuxmint
ID_LIKE="ubuntu debian"
PRETTY_NAME="Linux Mint 22.1"
"#;

    #[test]
    fn parses_mint_os_release() {
        let p = Platform::from_os_release(MINT);
        assert_eq!(p.id, "linuxmint");
        assert_eq!(p.id_like, vec!["ubuntu", "debian"]);
        assert_eq!(p.pretty_name, "Linux Mint 22.1");
        assert!(p.is_debian_family());
    }

    #[test]
    fn arch_is_not_debian_family() {
        let p = Platform::from_os_release("ID=arch\nPRETTY_NAME=\"Arch Linux\"\n");
        assert!(!p.is_debian_family());
    }

    #[test]
    fn debian_itself_is_debian_family() {
        assert!(Platform::from_os_release("ID=debian\n").is_debian_family());
    }

    #[test]
    fn malformed_lines_are_ignored() {
        let p = Platform::from_os_release("garbage\nID=linuxmint\n=\n");
        assert_eq!(p.id, "linuxmint");
    }

    #[test]
    fn platform_detect_does_not_panic() {
        let _ = Platform::detect();
    }
}
