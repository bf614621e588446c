//! Whole-file resource: a path that must hold exact content and mode.
use std::fs;
use std::os::unix::fs::PermissionsExt as _;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use super::{Applicable, Resource, ResourceChange, ResourceState};

/// A file whose full content and permission bits are managed.
#[derive(Debug, Clone)]
pub struct ManagedFile {
    /// Absolute target path.
    pub path: PathBuf,
    /// Exact desired content.
    pub content: Vec<u8>,
    /// Desired permission bits, e.g. `0o644`.
    pub mode: u32,
}

impl ManagedFile {
    /// Create a file resource with mode `0o644`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            mode: 0o644,
        }
    }
}

/// Ensure the parent directory of `path` exists.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create parent: {}", parent.display()))?;
    }
    Ok(())
}

/// Remove the file at `path` if present. Returns whether a file was removed.
///
/// # Errors
///
/// Returns an error if the path exists but cannot be removed.
pub fn remove_if_exists(path: &Path) -> Result<bool> {
    if path.symlink_metadata().is_err() {
        return Ok(false);
    }
    fs::remove_file(path).with_context(|| format!("remove {}", path.display()))?;
    Ok(true)
}

impl Applicable for ManagedFile {
    fn description(&self) -> String {
        self.path.display().to_string()
    }

    fn apply(&self) -> Result<ResourceChange> {
        ensure_parent_dir(&self.path)?;
        fs::write(&self.path, &self.content)
            .with_context(|| format!("write {}", self.path.display()))?;
        fs::set_permissions(&self.path, fs::Permissions::from_mode(self.mode))
            .with_context(|| format!("chmod {:o} {}", self.mode, self.path.display()))?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for ManagedFile {
    fn current_state(&self) -> Result<ResourceState> {
        let Ok(meta) = fs::metadata(&self.path) else {
            return Ok(ResourceState::Missing);
        };
        if meta.is_dir() {
            return Ok(ResourceState::Invalid {
                reason: "target is a directory".to_string(),
            });
        }
        let current =
            fs::read(&self.path).with_context(|| format!("read {}", self.path.display()))?;
        if current != self.content {
            return Ok(ResourceState::Incorrect {
                current: "content differs".to_string(),
            });
        }
        let mode = meta.permissions().mode() & 0o7777;
        if mode != self.mode {
            return Ok(ResourceState::Incorrect {
                current: format!("mode {mode:o}"),
            });
        }
        Ok(ResourceState::Correct)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_missing_then_correct_after_apply() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub/99-sysctl.conf");
        let file = ManagedFile::new(path, "vm.swappiness = 10\n");
        assert_eq!(file.current_state().unwrap(), ResourceState::Missing);
        assert_eq!(file.apply().unwrap(), ResourceChange::Applied);
        assert_eq!(file.current_state().unwrap(), ResourceState::Correct);
        assert_eq!(
            fs::read_to_string(&file.path).unwrap(),
            "vm.swappiness = 10\n"
        );
    }

    #[test]
    fn different_content_is_incorrect() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f");
        fs::write(&path, "old").unwrap();
        let file = ManagedFile::new(&path, "new");
        assert!(matches!(
            file.current_state().unwrap(),
            ResourceState::Incorrect { .. }
        ));
    }

    #[test]
    fn wrong_mode_is_incorrect_and_fixed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keyring.gpg");
        fs::write(&path, b"key").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o600)).unwrap();
        let file = ManagedFile::new(&path, b"key".to_vec());
        assert_eq!(
            file.current_state().unwrap(),
            ResourceState::Incorrect {
                current: "mode 600".to_string()
            }
        );
        file.apply().unwrap();
        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);
    }

    #[test]
    fn directory_target_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let file = ManagedFile::new(dir.path(), "x");
        assert!(matches!(
            file.current_state().unwrap(),
            ResourceState::Invalid { .. }
        ));
    }

    #[test]
    fn remove_if_exists_reports_removal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vscode.list");
        assert!(!remove_if_exists(&path).unwrap());
        fs::write(&path, "deb ...").unwrap();
        assert!(remove_if_exists(&path).unwrap());
        assert!(!path.exists());
    }
}
