//! Error types for the channel store

use std::path::PathBuf;

use chan_rules::{SchemaValidationError, UnknownEnvironment};

/// Errors reading or writing the data directory and talking to the inventory
/// service
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Filesystem failure
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file is not valid YAML, or a value could not be dumped
    #[error("yaml error in {origin}: {source}")]
    Yaml {
        origin: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// A document that must be a mapping is something else
    #[error("expected a YAML key-value mapping in {origin}, found {found}")]
    NotAMapping { origin: String, found: &'static str },

    /// No template entry for a channel
    #[error("Could not find template for {channel} in {file}")]
    MissingTemplate { channel: String, file: String },

    /// `schema.yaml` is missing
    #[error("Could not find schema file {0}")]
    MissingSchema(PathBuf),

    /// `schema.yaml` exists but a schema in it is unusable
    #[error(transparent)]
    Schema(#[from] SchemaValidationError),

    /// Inventory service request failed
    #[error("inventory request to {url} failed: {source}")]
    Inventory {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Unrecognised environment name
    #[error(transparent)]
    UnknownEnvironment(#[from] UnknownEnvironment),

    /// Tool configuration file is unreadable
    #[error("invalid configuration {path}: {message}")]
    Config { path: PathBuf, message: String },
}

impl StoreError {
    /// IO error for path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// YAML error for a file or value description
    pub fn yaml(origin: impl Into<String>, source: serde_yaml::Error) -> Self {
        Self::Yaml {
            origin: origin.into(),
            source,
        }
    }
}

/// Result alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
