use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use form_spec::FormOptions;
use serde::Deserialize;
use thiserror::Error;
use tracing::Level;

/// Environment variable naming a config file used when `--config` is absent.
pub const CONFIG_ENV: &str = "FORM_BUILDER_CONFIG";

pub const DEFAULT_LOG_LEVEL: Level = Level::WARN;

/// Contents of the optional TOML config file.
///
/// ```toml
/// log_level = "debug"
///
/// [form]
/// policy = "visible_only"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub log_level: Option<String>,
    pub form: FormOptions,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid log level '{0}' (expected trace, debug, info, warn or error)")]
    InvalidLogLevel(String),
}

impl AppConfig {
    /// Loads the explicit file, else the one named by `FORM_BUILDER_CONFIG`,
    /// else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match resolve_path(explicit) {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Command-line level wins over the file; `warn` when neither is set.
    pub fn log_level(&self, cli_level: Option<&str>) -> Result<Level, ConfigError> {
        match cli_level.or(self.log_level.as_deref()) {
            Some(raw) => parse_level(raw),
            None => Ok(DEFAULT_LOG_LEVEL),
        }
    }
}

fn resolve_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    env::var_os(CONFIG_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

pub fn parse_level(raw: &str) -> Result<Level, ConfigError> {
    Level::from_str(raw.trim()).map_err(|_| ConfigError::InvalidLogLevel(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use form_spec::VisibilityPolicy;

    #[test]
    fn reads_policy_and_level_from_toml() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("form-builder.toml");
        fs::write(&path, "log_level = \"debug\"\n\n[form]\npolicy = \"visible_only\"\n").unwrap();

        let config = AppConfig::load(Some(&path)).expect("config loads");
        assert_eq!(config.form.policy, VisibilityPolicy::VisibleOnly);
        assert_eq!(config.log_level(None).unwrap(), Level::DEBUG);
        assert_eq!(config.log_level(Some("error")).unwrap(), Level::ERROR);
    }

    #[test]
    fn empty_file_yields_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("empty.toml");
        fs::write(&path, "").unwrap();

        let config = AppConfig::from_file(&path).expect("config loads");
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.log_level(None).unwrap(), DEFAULT_LOG_LEVEL);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("typo.toml");
        fs::write(&path, "log_lvl = \"info\"\n").unwrap();

        let err = AppConfig::from_file(&path).expect_err("typo should fail");
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn unknown_form_keys_are_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("typo.toml");
        fs::write(&path, "[form]\npolcy = \"visible_only\"\n").unwrap();

        let err = AppConfig::from_file(&path).expect_err("typo should fail");
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("polcy"));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = AppConfig::from_file(Path::new("/nonexistent/form-builder.toml"))
            .expect_err("missing file");
        assert!(err.to_string().contains("/nonexistent/form-builder.toml"));
    }

    #[test]
    fn bad_level_is_rejected() {
        let err = parse_level("loud").expect_err("not a level");
        assert!(matches!(err, ConfigError::InvalidLogLevel(level) if level == "loud"));
    }
}
