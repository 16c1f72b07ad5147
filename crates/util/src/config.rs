//! Configuration file for the garg binary.
//!
//! A small JSON document, by default `<config_dir>/garg/config.json`
//! (`~/.config/garg/config.json` on most platforms). A missing file yields the
//! defaults; a file that fails to parse is reported with a warning and also
//! yields the defaults, so a typo never blocks a run.
//!
//! ```json
//! {
//!   "binder": { "ignore_syntax_errors": true, "close_on_error": false },
//!   "log_file": "~/logs/garg.log"
//! }
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use garg_types::BinderOptions;

use crate::paths::{app_cache_dir, app_config_dir, expand_tilde};

/// Environment variable overriding the config file path.
pub const CONFIG_PATH_ENV: &str = "GARG_CONFIG_PATH";

pub const CONFIG_FILE_NAME: &str = "config.json";

pub const LOG_FILE_NAME: &str = "garg.log";

#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("failed to read config file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Persisted settings.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GargConfig {
    /// Defaults for the binder; command-line flags take precedence.
    pub binder: BinderOptions,
    /// Where logs go while the terminal form owns the screen.
    pub log_file: Option<String>,
}

impl GargConfig {
    /// Loads the config from `GARG_CONFIG_PATH` or the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&default_config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(data) => match serde_json::from_str(&data) {
                Ok(config) => Ok(config),
                Err(error) => {
                    warn!(
                        path = %path.display(),
                        error = %error,
                        "Failed to parse config file; using defaults"
                    );
                    Ok(Self::default())
                }
            },
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(error) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source: error,
            }),
        }
    }

    /// Resolved log file path: the configured one, or `<cache_dir>/garg/garg.log`.
    pub fn log_path(&self) -> PathBuf {
        match self.log_file.as_deref().map(str::trim) {
            Some(path) if !path.is_empty() => expand_tilde(path),
            _ => app_cache_dir().join(LOG_FILE_NAME),
        }
    }
}

/// Config file location, honoring [`CONFIG_PATH_ENV`].
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = env::var(CONFIG_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return expand_tilde(trimmed);
        }
    }
    app_config_dir().join(CONFIG_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use garg_types::ParameterKind;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = GargConfig::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config, GargConfig::default());
        assert!(!config.binder.ignore_syntax_errors);
    }

    #[test]
    fn reads_partial_documents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(
            &path,
            r#"{"binder": {"ignore_positional_only": true, "eligible_kinds": ["POSITIONAL_ONLY", "KEYWORD_ONLY"]}, "log_file": "/var/tmp/g.log"}"#,
        )
        .unwrap();

        let config = GargConfig::load_from(&path).unwrap();
        assert!(config.binder.ignore_positional_only);
        assert!(!config.binder.ignore_syntax_errors);
        assert_eq!(
            config.binder.eligible_kinds,
            vec![ParameterKind::PositionalOnly, ParameterKind::KeywordOnly]
        );
        assert_eq!(config.log_path(), PathBuf::from("/var/tmp/g.log"));
    }

    #[test]
    fn invalid_json_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "not json").unwrap();
        assert_eq!(GargConfig::load_from(&path).unwrap(), GargConfig::default());
    }

    #[test]
    fn unreadable_paths_are_errors() {
        let dir = tempdir().unwrap();
        let result = GargConfig::load_from(dir.path());
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn default_log_path_lives_in_the_cache_dir() {
        let config = GargConfig::default();
        assert!(config.log_path().ends_with(Path::new("garg").join(LOG_FILE_NAME)));
    }

    #[test]
    fn default_path_honors_env_override() {
        let override_path = "~/custom/garg.json";
        temp_env::with_var(CONFIG_PATH_ENV, Some(override_path), || {
            assert_eq!(default_config_path(), expand_tilde(override_path));
        });
        temp_env::with_var(CONFIG_PATH_ENV, Some("  "), || {
            assert_eq!(default_config_path(), app_config_dir().join(CONFIG_FILE_NAME));
        });
    }
}
