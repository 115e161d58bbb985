//! Persistent manager settings.
//!
//! Settings live in `$XDG_CONFIG_HOME/akshara/config.toml` unless a path is
//! given explicitly. A missing file yields the defaults. Environment variables
//! override the file; command-line flags override both.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const ENV_PROJECT: &str = "AKSHARA_PROJECT";
pub const ENV_PORT: &str = "AKSHARA_PORT";
pub const ENV_BACKEND: &str = "AKSHARA_BACKEND";
pub const ENV_SKIP_PREREQS: &str = "AKSHARA_SKIP_PREREQS";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("invalid value for {var}: '{value}'")]
    InvalidEnv { var: &'static str, value: String },
}

/// Every field is optional; unset fields keep the manager's built-in default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManagerSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compose_dir: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_repo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init_timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pull_retries: Option<u32>,
    #[serde(default)]
    pub skip_prereqs: bool,
}

impl ManagerSettings {
    /// Load from the default location, or return defaults when absent.
    pub fn load_default() -> Result<Self, SettingsError> {
        match default_settings_path() {
            Some(path) => Self::load_or_default(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_or_default(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let io_err = |source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(io_err)
    }

    /// Apply `AKSHARA_*` overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<(), SettingsError> {
        self.apply_env_from(|var| std::env::var(var).ok())
    }

    /// Apply overrides from an arbitrary variable source.
    pub fn apply_env_from(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), SettingsError> {
        if let Some(project) = lookup(ENV_PROJECT).filter(|v| !v.trim().is_empty()) {
            self.project_name = Some(project.trim().to_owned());
        }
        if let Some(port) = lookup(ENV_PORT) {
            let parsed = port.trim().parse().map_err(|_| SettingsError::InvalidEnv {
                var: ENV_PORT,
                value: port.clone(),
            })?;
            self.port = Some(parsed);
        }
        if let Some(backend) = lookup(ENV_BACKEND).filter(|v| !v.trim().is_empty()) {
            self.backend = Some(backend.trim().to_owned());
        }
        if let Some(skip) = lookup(ENV_SKIP_PREREQS) {
            self.skip_prereqs = matches!(skip.trim(), "1" | "true" | "yes");
        }
        Ok(())
    }

    pub fn query_timeout(&self) -> Option<Duration> {
        self.query_timeout_secs.map(Duration::from_secs)
    }

    pub fn init_timeout(&self) -> Option<Duration> {
        self.init_timeout_secs.map(Duration::from_secs)
    }
}

/// `$XDG_CONFIG_HOME/akshara/config.toml`, falling back to `~/.config`.
pub fn default_settings_path() -> Option<PathBuf> {
    config_home().map(|dir| dir.join("akshara").join("config.toml"))
}

/// `$XDG_DATA_HOME/akshara`, falling back to `~/.local/share`.
pub fn default_data_dir() -> Option<PathBuf> {
    data_home().map(|dir| dir.join("akshara"))
}

fn config_home() -> Option<PathBuf> {
    xdg_dir("XDG_CONFIG_HOME", ".config")
}

fn data_home() -> Option<PathBuf> {
    xdg_dir("XDG_DATA_HOME", ".local/share")
}

fn xdg_dir(var: &str, home_relative: &str) -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os(var).filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(dir));
    }
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(home_relative))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = ManagerSettings::load_or_default(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(settings, ManagerSettings::default());
    }

    #[test]
    fn settings_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("akshara").join("config.toml");

        let settings = ManagerSettings {
            project_name: Some("translit-dev".to_owned()),
            port: Some(18085),
            query_timeout_secs: Some(30),
            ..Default::default()
        };
        settings.save(&path).unwrap();

        let loaded = ManagerSettings::load(&path).unwrap();
        assert_eq!(loaded, settings);
        assert_eq!(loaded.query_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(loaded.init_timeout(), None);
    }

    #[test]
    fn partial_file_parses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "host = \"10.0.0.5\"\npull_retries = 5\n").unwrap();

        let loaded = ManagerSettings::load(&path).unwrap();
        assert_eq!(loaded.host.as_deref(), Some("10.0.0.5"));
        assert_eq!(loaded.pull_retries, Some(5));
        assert!(loaded.project_name.is_none());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "prot = 8085\n").unwrap();
        assert!(matches!(
            ManagerSettings::load(&path),
            Err(SettingsError::Parse { .. })
        ));
    }

    #[test]
    fn env_overrides_file_values() {
        let mut settings = ManagerSettings {
            project_name: Some("from-file".to_owned()),
            port: Some(9000),
            ..Default::default()
        };
        settings
            .apply_env_from(env(&[
                (ENV_PROJECT, "from-env"),
                (ENV_BACKEND, "mock"),
                (ENV_SKIP_PREREQS, "1"),
            ]))
            .unwrap();
        assert_eq!(settings.project_name.as_deref(), Some("from-env"));
        assert_eq!(settings.port, Some(9000));
        assert_eq!(settings.backend.as_deref(), Some("mock"));
        assert!(settings.skip_prereqs);
    }

    #[test]
    fn invalid_port_env_is_rejected() {
        let mut settings = ManagerSettings::default();
        let err = settings
            .apply_env_from(env(&[(ENV_PORT, "eighty")]))
            .unwrap_err();
        assert!(matches!(err, SettingsError::InvalidEnv { var: ENV_PORT, .. }));
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let mut settings = ManagerSettings::default();
        settings
            .apply_env_from(env(&[(ENV_PROJECT, "  "), (ENV_BACKEND, "")]))
            .unwrap();
        assert!(settings.project_name.is_none());
        assert!(settings.backend.is_none());
    }
}
