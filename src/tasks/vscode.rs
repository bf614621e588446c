//! VS Code APT repository, signing key and package.
use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context as _, Result};

use super::{Context, Task, TaskResult};
use crate::config::ThirdPartyRepo;
use crate::resources::Applicable as _;
use crate::resources::file::{ManagedFile, remove_if_exists};
use crate::resources::keyring::{self, HttpKeySource, KeySource};

/// Entries of the APT lists directory that apt itself manages.
const KEEP_IN_LISTS: &[&str] = &["lock", "partial"];

/// Delete downloaded package indexes so the next update fetches them fresh.
/// Returns the number of entries removed.
///
/// # Errors
///
/// Returns an error if the directory cannot be read or an entry cannot be
/// removed.
pub fn clear_lists_dir(dir: &Path) -> Result<usize> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e).with_context(|| format!("read {}", dir.display())),
    };
    let mut removed = 0;
    for entry in entries {
        let entry = entry.with_context(|| format!("read {}", dir.display()))?;
        if KEEP_IN_LISTS.iter().any(|k| entry.file_name() == *k) {
            continue;
        }
        let path = entry.path();
        let result = if entry.file_type().is_ok_and(|t| t.is_dir()) {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        result.with_context(|| format!("remove {}", path.display()))?;
        removed += 1;
    }
    Ok(removed)
}

/// Install a package from a signed third-party APT repository (VS Code).
#[derive(Debug, Clone)]
pub struct InstallVsCode {
    repo: ThirdPartyRepo,
    keys: Arc<dyn KeySource>,
}

impl InstallVsCode {
    /// Create the task, fetching the signing key over HTTPS.
    #[must_use]
    pub fn new(repo: ThirdPartyRepo) -> Self {
        Self::with_key_source(repo, Arc::new(HttpKeySource))
    }

    /// Create the task with a custom key source.
    #[must_use]
    pub fn with_key_source(repo: ThirdPartyRepo, keys: Arc<dyn KeySource>) -> Self {
        Self { repo, keys }
    }

    /// Remove stale source and key files. Failures are logged and skipped.
    fn purge_conflicting(&self, ctx: &Context) {
        ctx.log.step(&format!(
            "Purging old {} repository and key files",
            self.repo.name
        ));
        for path in &self.repo.conflicting {
            if ctx.dry_run {
                if path.symlink_metadata().is_ok() {
                    ctx.log.dry_run(&format!("would remove {}", path.display()));
                }
                continue;
            }
            match remove_if_exists(path) {
                Ok(true) => ctx
                    .log
                    .info(&format!("Removed conflicting file: {}", path.display())),
                Ok(false) => {}
                Err(e) => ctx
                    .log
                    .error(&format!("Could not remove {}: {e:#}", path.display())),
            }
        }
    }

    fn dry_run(&self, ctx: &Context) -> Result<TaskResult> {
        let repo = &self.repo;
        ctx.log.dry_run(&format!(
            "would install key from {} to {}",
            repo.key_url,
            repo.keyring.display()
        ));
        ctx.log.dry_run(&format!(
            "would write {}: {}",
            repo.source_list.display(),
            repo.source_line().trim_end()
        ));
        ctx.log
            .dry_run(&format!("would clear {}", repo.lists_dir.display()));
        ctx.run_step("Running Nala update", "nala", &["update"])?;
        ctx.run_step("Installing package", "nala", &["install", "-y", &repo.package])?;
        Ok(TaskResult::DryRun)
    }
}

impl Task for InstallVsCode {
    fn name(&self) -> &'static str {
        "VS Code Repository & Key Setup"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        ctx.platform.has_apt
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let repo = &self.repo;
        self.purge_conflicting(ctx);
        if ctx.dry_run {
            return self.dry_run(ctx);
        }

        ctx.log
            .step(&format!("Downloading fresh GPG key from {}", repo.key_url));
        keyring::install(
            ctx.executor.as_ref(),
            self.keys.as_ref(),
            &repo.key_url,
            &repo.keyring,
        )?;
        ctx.log.info(&format!(
            "GPG key successfully installed to {}",
            repo.keyring.display()
        ));

        ctx.log.step("Creating clean repository list");
        ManagedFile::new(&repo.source_list, repo.source_line()).apply()?;

        ctx.log.step("Clearing local APT lists for fresh sync");
        let removed = clear_lists_dir(&repo.lists_dir)?;
        ctx.log.debug(&format!(
            "removed {removed} entries from {}",
            repo.lists_dir.display()
        ));

        ctx.run_step("Running Nala update", "nala", &["update"])?;
        ctx.run_step(
            &format!("Installing '{}'", repo.package),
            "nala",
            &["install", "-y", &repo.package],
        )?;
        ctx.log
            .success(&format!("{} installed successfully", repo.name));
        Ok(TaskResult::Ok)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::exec::test_helpers::MockExecutor;
    use crate::tasks::test_helpers::recording;

    #[derive(Debug)]
    struct FixedKey(Result<&'static str, &'static str>);

    impl KeySource for FixedKey {
        fn fetch(&self, _url: &str) -> Result<Vec<u8>> {
            self.0
                .map(|k| k.as_bytes().to_vec())
                .map_err(|e| anyhow::anyhow!("{e}"))
        }
    }

    const ARMORED: &str = "-----BEGIN PGP PUBLIC KEY BLOCK-----\n";

    fn repo_in(root: &Path) -> ThirdPartyRepo {
        ThirdPartyRepo {
            name: "VS Code".to_string(),
            key_url: "https://packages.microsoft.com/keys/microsoft.asc".to_string(),
            keyring: root.join("keyrings/packages.microsoft.gpg"),
            source_list: root.join("sources.list.d/vscode.list"),
            repo_url: "https://packages.microsoft.com/repos/code".to_string(),
            suite: "stable".to_string(),
            components: vec!["main".to_string()],
            architectures: vec!["amd64".to_string()],
            package: "code".to_string(),
            lists_dir: root.join("lists"),
            conflicting: vec![
                root.join("sources.list.d/vscode.list"),
                root.join("trusted.gpg.d/microsoft.gpg"),
            ],
        }
    }

    #[test]
    fn clear_lists_keeps_lock_and_partial() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("partial")).unwrap();
        fs::write(dir.path().join("lock"), "").unwrap();
        fs::write(dir.path().join("packages.linuxmint.com_dists_xia_InRelease"), "x").unwrap();
        fs::create_dir(dir.path().join("auxfiles")).unwrap();
        assert_eq!(clear_lists_dir(dir.path()).unwrap(), 2);
        assert!(dir.path().join("lock").exists());
        assert!(dir.path().join("partial").is_dir());
        assert!(!dir.path().join("auxfiles").exists());
    }

    #[test]
    fn clear_missing_lists_dir_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(clear_lists_dir(&dir.path().join("absent")).unwrap(), 0);
    }

    #[test]
    fn full_install_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo_in(dir.path());
        fs::create_dir_all(dir.path().join("trusted.gpg.d")).unwrap();
        fs::write(dir.path().join("trusted.gpg.d/microsoft.gpg"), "old").unwrap();
        fs::create_dir_all(&repo.lists_dir).unwrap();
        fs::write(repo.lists_dir.join("stale_Packages"), "x").unwrap();

        let (ctx, mock, log) = recording(
            MockExecutor::with_responses(vec![(true, "binary-key")]),
            false,
        );
        let task = InstallVsCode::with_key_source(repo.clone(), Arc::new(FixedKey(Ok(ARMORED))));
        assert_eq!(task.run(&ctx).unwrap(), TaskResult::Ok);

        assert!(!dir.path().join("trusted.gpg.d/microsoft.gpg").exists());
        assert_eq!(fs::read(&repo.keyring).unwrap(), b"binary-key");
        assert_eq!(fs::read_to_string(&repo.source_list).unwrap(), repo.source_line());
        assert!(!repo.lists_dir.join("stale_Packages").exists());
        assert_eq!(
            mock.calls(),
            vec!["gpg --dearmor", "nala update", "nala install -y code"]
        );
        assert!(log.contains("info", "Removed conflicting file"));
        assert!(log.contains("success", "VS Code installed successfully"));
    }

    #[test]
    fn download_failure_stops_before_apt() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo_in(dir.path());
        let (ctx, mock, _) = recording(MockExecutor::new(), false);
        let task = InstallVsCode::with_key_source(repo.clone(), Arc::new(FixedKey(Err("offline"))));
        let err = task.run(&ctx).unwrap_err();
        assert!(format!("{err:#}").contains("offline"));
        assert!(mock.calls().is_empty());
        assert!(!repo.source_list.exists());
    }

    #[test]
    fn dry_run_touches_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo_in(dir.path());
        fs::create_dir_all(dir.path().join("sources.list.d")).unwrap();
        fs::write(&repo.source_list, "deb old").unwrap();
        let (ctx, mock, log) = recording(MockExecutor::new(), true);
        let task = InstallVsCode::with_key_source(repo.clone(), Arc::new(FixedKey(Err("unused"))));
        assert_eq!(task.run(&ctx).unwrap(), TaskResult::DryRun);
        assert_eq!(fs::read_to_string(&repo.source_list).unwrap(), "deb old");
        assert!(mock.calls().is_empty());
        assert!(log.contains("dry_run", "would remove"));
        assert!(log.contains("dry_run", "would run: nala install -y code"));
    }
}
