//! cmdforge configuration
//!
//! Configuration lives in `$CMDFORGE_CONFIG`, or `cmdforge/config.toml`
//! under the platform config directory (`$XDG_CONFIG_HOME` or
//! `~/.config` on Linux). A missing file at the default location means
//! defaults; a `$CMDFORGE_CONFIG` path that does not exist is an error.
//!
//! ```toml
//! catalog_path = "/opt/cmdforge/catalog.toml"
//!
//! [inputs]
//! lhost = "10.10.14.1"
//! port = "4444"
//!
//! [ui]
//! tag_chip_limit = 12
//! color = true
//! ```

use crate::error::ConfigError;
use crate::render::InputValues;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment override for the config file location
pub const CONFIG_ENV: &str = "CMDFORGE_CONFIG";
const CONFIG_DIR: &str = "cmdforge";
const CONFIG_FILE: &str = "config.toml";

/// Display settings for the consumer
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UiSettings {
    /// How many tag chips the search bar offers
    #[serde(default = "default_tag_chip_limit")]
    pub tag_chip_limit: usize,

    #[serde(default = "default_color")]
    pub color: bool,
}

fn default_tag_chip_limit() -> usize {
    12
}

fn default_color() -> bool {
    true
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            tag_chip_limit: default_tag_chip_limit(),
            color: default_color(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// External catalog replacing the built-in one
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,

    /// Pre-filled input panel values
    #[serde(default)]
    pub inputs: InputValues,

    #[serde(default)]
    pub ui: UiSettings,
}

impl Config {
    /// Resolve the config file path (the file may not exist)
    pub fn config_path() -> Option<PathBuf> {
        Self::env_path().or_else(Self::default_path)
    }

    fn env_path() -> Option<PathBuf> {
        std::env::var_os(CONFIG_ENV)
            .filter(|path| !path.is_empty())
            .map(PathBuf::from)
    }

    fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Load from the resolved path, defaults when there is no file.
    ///
    /// A path named by `$CMDFORGE_CONFIG` must exist; only the default
    /// location may be absent.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_resolved(Self::env_path(), Self::default_path())
    }

    fn load_resolved(explicit: Option<PathBuf>, default: Option<PathBuf>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_from(&path);
        }
        match default {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => {
                debug!("no config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "config loaded");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.ui.tag_chip_limit, 12);
        assert!(config.ui.color);
        assert!(config.catalog_path.is_none());
        assert!(config.inputs.is_empty());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[inputs]\nlhost = \"10.10.14.1\"\n\n[ui]\ncolor = false").unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.inputs.lhost, "10.10.14.1");
        assert_eq!(config.inputs.port, "");
        assert!(!config.ui.color);
        assert_eq!(config.ui.tag_chip_limit, 12);
    }

    #[test]
    fn test_parse_error_names_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[ui\ncolor = ").unwrap();

        let err = Config::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }

    #[test]
    fn test_explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("typo.toml");

        let err = Config::load_resolved(Some(missing.clone()), None).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));

        // The default location is optional
        let config = Config::load_resolved(None, Some(missing)).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load_from(&dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
