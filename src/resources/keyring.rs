//! APT signing keys: HTTPS download and `gpg --dearmor` conversion.
use std::path::Path;
use std::time::Duration;

use anyhow::{Context as _, Result};

use super::file::ManagedFile;
use super::{Applicable, ResourceChange};
use crate::exec::Executor;

const ARMOR_HEADER: &[u8] = b"-----BEGIN PGP PUBLIC KEY BLOCK-----";
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Whether `bytes` look like an ASCII-armored OpenPGP public key.
#[must_use]
pub fn is_armored(bytes: &[u8]) -> bool {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    bytes
        .get(start..)
        .is_some_and(|rest| rest.starts_with(ARMOR_HEADER))
}

/// Download an ASCII-armored key.
///
/// # Errors
///
/// Returns an error if the request fails, the server answers with a non-2xx
/// status, or the body is not an armored public key.
pub fn download(url: &str) -> Result<Vec<u8>> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(format!("mint-setup/{}", crate::VERSION))
        .timeout(DOWNLOAD_TIMEOUT)
        .build()
        .context("Failed to create HTTP client")?;

    let bytes = client
        .get(url)
        .send()
        .and_then(reqwest::blocking::Response::error_for_status)
        .with_context(|| format!("download {url}"))?
        .bytes()
        .with_context(|| format!("read body of {url}"))?;

    if !is_armored(&bytes) {
        anyhow::bail!("{url} did not return an ASCII-armored public key");
    }
    Ok(bytes.to_vec())
}

/// Convert an armored key into a binary keyring via `gpg --dearmor`.
///
/// # Errors
///
/// Returns an error if `gpg` fails or produces no output.
pub fn dearmor(executor: &dyn Executor, armored: &[u8]) -> Result<Vec<u8>> {
    let binary = executor
        .run_with_input("gpg", &["--dearmor"], armored)
        .context("gpg --dearmor")?;
    if binary.is_empty() {
        anyhow::bail!("gpg --dearmor produced an empty keyring");
    }
    Ok(binary)
}

/// Where armored keys come from.
pub trait KeySource: Send + Sync + std::fmt::Debug {
    /// Fetch the armored key published at `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key cannot be retrieved.
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// [`KeySource`] that downloads over HTTPS.
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpKeySource;

impl KeySource for HttpKeySource {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        download(url)
    }
}

/// Fetch `url`, dearmor it and write the keyring to `path` with mode 0644.
///
/// # Errors
///
/// Returns an error if any step fails; nothing is written in that case.
pub fn install(
    executor: &dyn Executor,
    source: &dyn KeySource,
    url: &str,
    path: &Path,
) -> Result<ResourceChange> {
    let armored = source.fetch(url)?;
    let binary = dearmor(executor, &armored)?;
    ManagedFile::new(path, binary).apply()
}
