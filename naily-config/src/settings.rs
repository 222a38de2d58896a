//! Runtime settings read from a YAML mapping.
//!
//! # Location
//!
//! ```text
//! $NAILY_CONFIG            (explicit — must exist)
//! ~/.naily/config.yaml     (default — missing file means empty settings)
//! ```
//!
//! [`Config::load_at`] and [`Config::load_at_or_empty`] read a given path.
//! [`ConfigLocation::from_env`] picks the path and whether it is required;
//! [`ConfigLocation::load`] then applies the matching rule. Tests use the
//! path-taking forms.

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};

use crate::error::ConfigError;

/// Environment variable naming an explicit settings file.
pub const CONFIG_ENV: &str = "NAILY_CONFIG";

/// `<home>/.naily/config.yaml` — pure, no I/O.
pub fn default_path_at(home: &Path) -> PathBuf {
    home.join(".naily").join("config.yaml")
}

/// Where settings are read from, and whether the file is required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigLocation {
    /// Named by `NAILY_CONFIG`; a missing file is an error.
    Explicit(PathBuf),
    /// The per-user default; a missing file yields empty settings.
    Default(PathBuf),
}

impl ConfigLocation {
    /// Pick the location from an optional `NAILY_CONFIG` value and home dir.
    pub fn locate(env: Option<OsString>, home: Option<PathBuf>) -> Result<Self, ConfigError> {
        match env.filter(|value| !value.is_empty()) {
            Some(path) => Ok(ConfigLocation::Explicit(PathBuf::from(path))),
            None => home
                .map(|home| ConfigLocation::Default(default_path_at(&home)))
                .ok_or(ConfigError::HomeNotFound),
        }
    }

    /// Location derived from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::locate(std::env::var_os(CONFIG_ENV), dirs::home_dir())
    }

    pub fn path(&self) -> &Path {
        match self {
            ConfigLocation::Explicit(path) | ConfigLocation::Default(path) => path,
        }
    }

    pub fn load(&self) -> Result<Config, ConfigError> {
        match self {
            ConfigLocation::Explicit(path) => Config::load_at(path),
            ConfigLocation::Default(path) => Config::load_at_or_empty(path),
        }
    }
}

/// The worker's runtime settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    source: Option<PathBuf>,
    values: Mapping,
}

impl Config {
    /// No settings, not backed by any file.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Read settings from `path`. A missing file is [`ConfigError::NotFound`].
    pub fn load_at(path: &Path) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(ConfigError::NotFound {
                    path: path.to_path_buf(),
                })
            }
            Err(err) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        };
        Self::parse(&contents, path)
    }

    /// Like [`Config::load_at`], but a missing file yields empty settings.
    pub fn load_at_or_empty(path: &Path) -> Result<Self, ConfigError> {
        match Self::load_at(path) {
            Err(ConfigError::NotFound { .. }) => Ok(Self::empty()),
            other => other,
        }
    }

    fn parse(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        let document: Value = serde_yaml::from_str(contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        let values = match document {
            Value::Null => Mapping::new(),
            Value::Mapping(values) => values,
            _ => {
                return Err(ConfigError::NotAMapping {
                    path: path.to_path_buf(),
                })
            }
        };
        Ok(Self {
            source: Some(path.to_path_buf()),
            values,
        })
    }

    /// Typed lookup of a top-level setting. `Ok(None)` when the key is absent.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        let Some(value) = self.values.get(key) else {
            return Ok(None);
        };
        serde_yaml::from_value(value.clone())
            .map(Some)
            .map_err(|e| ConfigError::Value {
                key: key.to_string(),
                source: e,
            })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Top-level setting names, in file order. Non-string keys are skipped.
    pub fn keys(&self) -> Vec<String> {
        self.values
            .iter()
            .filter_map(|(key, _)| key.as_str().map(str::to_owned))
            .collect()
    }

    /// File the settings were read from; `None` for empty defaults.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
