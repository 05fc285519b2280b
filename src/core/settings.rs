//! Persisted user settings
//!
//! ```toml
//! default_roots = ["WORK", "SRC"]
//! git_timeout = 180
//! worker_fraction = 0.5
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::config::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_GIT_TIMEOUT_SECS, DEFAULT_WORKER_FRACTION,
};
use super::error::SweepError;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Bare environment variable names searched when no roots are given
    pub default_roots: Vec<String>,
    /// Seconds before a single git or shell invocation is abandoned
    pub git_timeout: u64,
    /// Fraction of available cores used as workers, in (0, 1]
    pub worker_fraction: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_roots: Vec::new(),
            git_timeout: DEFAULT_GIT_TIMEOUT_SECS,
            worker_fraction: DEFAULT_WORKER_FRACTION,
        }
    }
}

impl Settings {
    /// Default config file location, if the platform has a config directory
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Loads settings from `explicit`, or from the default location
    ///
    /// A missing default file yields defaults; a missing explicit file is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self, SweepError> {
        match explicit {
            Some(path) => Self::from_path(path),
            None => match Self::default_path() {
                Some(path) if path.is_file() => Self::from_path(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, SweepError> {
        let content = std::fs::read_to_string(path).map_err(|e| SweepError::InvalidConfig {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::parse(&content).map_err(|reason| SweepError::InvalidConfig {
            path: path.to_path_buf(),
            reason,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.message().to_string())
    }

    pub fn git_timeout(&self) -> Duration {
        Duration::from_secs(self.git_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_file() {
        let settings = Settings::parse(
            r#"
default_roots = ["WORK", "SRC"]
git_timeout = 30
worker_fraction = 0.5
"#,
        )
        .unwrap();

        assert_eq!(settings.default_roots, vec!["WORK", "SRC"]);
        assert_eq!(settings.git_timeout(), Duration::from_secs(30));
        assert_eq!(settings.worker_fraction, 0.5);
    }

    #[test]
    fn test_missing_keys_fall_back_to_defaults() {
        let settings = Settings::parse("default_roots = [\"WORK\"]").unwrap();
        assert_eq!(settings.git_timeout, DEFAULT_GIT_TIMEOUT_SECS);
        assert_eq!(settings.worker_fraction, DEFAULT_WORKER_FRACTION);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert!(Settings::parse("default_root = [\"WORK\"]").is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = Settings::load(Some(&temp_dir.path().join("nope.toml"))).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_load_explicit_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "git_timeout = 5\n").unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.git_timeout, 5);
        assert!(settings.default_roots.is_empty());
    }
}
