//! Error types for naily-config.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while locating, reading or querying settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure other than a missing file.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A settings file named explicitly via `NAILY_CONFIG` does not exist.
    #[error("config file not found at {path}")]
    NotFound { path: PathBuf },

    /// YAML parse error — includes file path and line context from serde_yaml.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The document parsed, but its top level is not a mapping.
    #[error("config at {path} must be a mapping of setting names to values")]
    NotAMapping { path: PathBuf },

    /// A setting exists but does not deserialize into the requested type.
    #[error("invalid value for setting '{key}': {source}")]
    Value {
        key: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None` and `NAILY_CONFIG` is unset.
    #[error("cannot determine home directory; set $HOME or $NAILY_CONFIG")]
    HomeNotFound,
}
