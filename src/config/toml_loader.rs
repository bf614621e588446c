//! TOML data loading: compiled-in defaults with an optional on-disk override.
use serde::de::DeserializeOwned;
use std::path::Path;

use crate::error::ConfigError;

/// Deserialize `content`, naming `origin` in any parse error.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] if the content does not match `T`.
pub fn parse<T: DeserializeOwned>(origin: &str, content: &str) -> Result<T, ConfigError> {
    toml::from_str(content).map_err(|source| ConfigError::Parse {
        origin: origin.to_string(),
        source,
    })
}

/// Load the data file `name`.
///
/// When `conf_dir` is given and contains `name`, that file is used.
/// Otherwise the compiled-in `embedded` copy is parsed.
///
/// # Errors
///
/// Returns an error if the override file cannot be read or either source
/// fails to parse.
pub fn load<T: DeserializeOwned>(
    conf_dir: Option<&Path>,
    name: &str,
    embedded: &str,
) -> Result<T, ConfigError> {
    if let Some(dir) = conf_dir {
        let path = dir.join(name);
        if path.exists() {
            let content = std::fs::read_to_string(&path)
                .map_err(|source| ConfigError::Io { path: path.clone(), source })?;
            return parse(&path.display().to_string(), &content);
        }
    }
    parse(&format!("embedded:{name}"), embedded)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Sample {
        value: u32,
    }

    #[test]
    fn embedded_used_without_override_dir() {
        let s: Sample = load(None, "sample.toml", "value = 1").unwrap();
        assert_eq!(s.value, 1);
    }

    #[test]
    fn override_file_wins() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("sample.toml"), "value = 7").unwrap();
        let s: Sample = load(Some(dir.path()), "sample.toml", "value = 1").unwrap();
        assert_eq!(s.value, 7);
    }

    #[test]
    fn missing_override_falls_back_to_embedded() {
        let dir = tempfile::tempdir().unwrap();
        let s: Sample = load(Some(dir.path()), "sample.toml", "value = 3").unwrap();
        assert_eq!(s.value, 3);
    }

    #[test]
    fn parse_error_names_origin() {
        let err = load::<Sample>(None, "sample.toml", "value = \"x\"").unwrap_err();
        assert!(
            err.to_string().contains("embedded:sample.toml"),
            "unexpected error: {err}"
        );
    }
}
