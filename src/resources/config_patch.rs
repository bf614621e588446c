//! Section-scoped `key=value` patching for INI-like system config files
//! such as `journald.conf`.
//!
//! An assignment of the key is *in scope* when it sits in the section-less
//! preamble or under a header equal to the target section marker. Both
//! active (`Key=value`) and commented (`#Key=value`) assignments count.
//! Assignments under other headers are never touched.
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::Result;
use regex::Regex;

use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::error::PatchError;

const VALUE_PATTERN: &str = r"^([0-9]+[KMGTPsmhday]?|persistent|auto|volatile|yes|no)$";

fn value_regex() -> Option<&'static Regex> {
    static REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(VALUE_PATTERN).ok()).as_ref()
}

/// Whether `value` is acceptable for a journald-style property.
#[must_use]
pub fn is_valid_value(value: &str) -> bool {
    value_regex().is_some_and(|re| re.is_match(value))
}

fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with(['#', ';', '['])
        && !key.contains(|c: char| c == '=' || c.is_whitespace())
}

fn is_header(trimmed: &str) -> bool {
    trimmed.starts_with('[') && trimmed.ends_with(']')
}

/// An assignment of the target key found in scope.
#[derive(Debug, PartialEq, Eq)]
struct Assignment<'a> {
    active: bool,
    value: &'a str,
    in_section: bool,
}

/// Parse `trimmed` as `key=value` or `#key=value`.
///
/// The key must follow `#` directly, so prose such as `# Key= limits ...`
/// is treated as a comment and left alone.
fn parse_assignment<'a>(trimmed: &'a str, key: &str) -> Option<(bool, &'a str)> {
    let (active, body) = match trimmed.strip_prefix('#') {
        Some(rest) => (false, rest),
        None => (true, trimmed),
    };
    let value = body.strip_prefix(key)?.trim_start().strip_prefix('=')?;
    Some((active, value.trim()))
}

/// Walk the lines of `content`, reporting for each whether it is in scope
/// and under the target section.
fn scoped_lines<'a>(
    content: &'a str,
    section: &'a str,
) -> impl Iterator<Item = (&'a str, bool, bool)> + 'a {
    let mut current: Option<&str> = None;
    content.split_inclusive('\n').map(move |line| {
        let trimmed = line.trim();
        if is_header(trimmed) {
            current = Some(trimmed);
        }
        let in_section = current == Some(section);
        let in_scope = current.is_none_or(|h| h == section);
        (line, in_scope, in_section)
    })
}

fn assignments<'a>(content: &'a str, section: &'a str, key: &str) -> Vec<Assignment<'a>> {
    scoped_lines(content, section)
        .filter(|(_, in_scope, _)| *in_scope)
        .filter_map(|(line, _, in_section)| {
            parse_assignment(line.trim(), key).map(|(active, value)| Assignment {
                active,
                value,
                in_section,
            })
        })
        .collect()
}

/// Whether `content` already holds exactly one in-scope assignment of `key`,
/// active, set to `value`, and inside `section`.
#[must_use]
pub fn is_satisfied(content: &str, section: &str, key: &str, value: &str) -> bool {
    matches!(
        assignments(content, section, key).as_slice(),
        [Assignment { active: true, value: v, in_section: true }] if *v == value
    )
}

/// Rewrite `content` so `key=value` sits directly under the first `section`
/// header, with every other in-scope assignment of `key` removed.
///
/// When the section is absent it is created at the top of the file.
#[must_use]
pub fn patch_content(content: &str, section: &str, key: &str, value: &str) -> String {
    let mut out = String::with_capacity(content.len() + key.len() + value.len() + 2);
    let mut inserted = false;
    for (line, in_scope, _) in scoped_lines(content, section) {
        let trimmed = line.trim();
        if in_scope && parse_assignment(trimmed, key).is_some() {
            continue;
        }
        out.push_str(line);
        if !inserted && trimmed == section {
            if !line.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(key);
            out.push('=');
            out.push_str(value);
            out.push('\n');
            inserted = true;
        }
    }
    if inserted {
        out
    } else {
        format!("{section}\n{key}={value}\n{out}")
    }
}

/// Path of the one-time backup copy: `<file>.bak`.
#[must_use]
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".bak");
    PathBuf::from(name)
}

/// Ensure `key=value` inside `section` of the file at `path`.
#[derive(Debug, Clone)]
pub struct SectionPatch {
    path: PathBuf,
    section: String,
    key: String,
    value: String,
}

impl SectionPatch {
    /// Validate and create a patch.
    ///
    /// # Errors
    ///
    /// Returns [`PatchError::InvalidValue`] if the value does not match the
    /// allowed pattern, or [`PatchError::InvalidKey`] if the key cannot form
    /// an assignment line.
    pub fn new(
        path: impl Into<PathBuf>,
        section: &str,
        key: &str,
        value: &str,
    ) -> Result<Self, PatchError> {
        if !is_valid_key(key) {
            return Err(PatchError::InvalidKey(key.to_string()));
        }
        if !is_valid_value(value) {
            return Err(PatchError::InvalidValue {
                key: key.to_string(),
                value: value.to_string(),
            });
        }
        Ok(Self {
            path: path.into(),
            section: section.trim().to_string(),
            key: key.to_string(),
            value: value.to_string(),
        })
    }

    /// The key being set.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The value being set.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    fn read(&self) -> Result<String, PatchError> {
        fs::read_to_string(&self.path).map_err(|source| PatchError::Read {
            path: self.path.clone(),
            source,
        })
    }

    /// Apply the patch, creating `<file>.bak` first if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns a [`PatchError`] naming the path on any filesystem failure.
    pub fn write(&self) -> Result<ResourceChange, PatchError> {
        let content = self.read()?;
        if is_satisfied(&content, &self.section, &self.key, &self.value) {
            return Ok(ResourceChange::AlreadyCorrect);
        }
        let patched = patch_content(&content, &self.section, &self.key, &self.value);
        if patched == content {
            return Ok(ResourceChange::AlreadyCorrect);
        }
        let backup = backup_path(&self.path);
        if !backup.exists() {
            fs::copy(&self.path, &backup).map_err(|source| PatchError::Backup {
                path: self.path.clone(),
                source,
            })?;
        }
        fs::write(&self.path, patched).map_err(|source| PatchError::Write {
            path: self.path.clone(),
            source,
        })?;
        Ok(ResourceChange::Applied)
    }
}

impl Applicable for SectionPatch {
    fn description(&self) -> String {
        format!(
            "{} {}={} in {}",
            self.section,
            self.key,
            self.value,
            self.path.display()
        )
    }

    fn apply(&self) -> Result<ResourceChange> {
        Ok(self.write()?)
    }
}

impl Resource for SectionPatch {
    fn current_state(&self) -> Result<ResourceState> {
        if !self.path.is_file() {
            return Ok(ResourceState::Invalid {
                reason: format!("{} does not exist", self.path.display()),
            });
        }
        let content = self.read()?;
        if is_satisfied(&content, &self.section, &self.key, &self.value) {
            return Ok(ResourceState::Correct);
        }
        let found = assignments(&content, &self.section, &self.key);
        Ok(match found.iter().find(|a| a.active) {
            Some(a) => ResourceState::Incorrect {
                current: format!("{}={}", self.key, a.value),
            },
            None => ResourceState::Missing,
        })
    }
}
