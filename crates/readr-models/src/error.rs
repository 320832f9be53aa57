//! Error types for readr-models

use readr_store::StoreError;
use std::path::PathBuf;
use thiserror::Error;

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Debug, Error)]
pub enum ModelError {
    /// Configuration file could not be read
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML or has the wrong shape
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration parsed but failed validation
    #[error("invalid config: {0}")]
    Config(String),

    /// `${VAR}` referenced an unset environment variable
    #[error("environment variable '{0}' is not set")]
    MissingEnv(String),

    /// A status code not present in the configured table
    #[error("invalid {model} status code {code}")]
    InvalidStatus { model: &'static str, code: i64 },

    /// A record failed its pre-write rules
    #[error("invalid record: {0}")]
    Lifecycle(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ModelError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn lifecycle(message: impl Into<String>) -> Self {
        Self::Lifecycle(message.into())
    }

    /// The store-level outcome, if this error came from the store.
    pub fn as_store(&self) -> Option<&StoreError> {
        match self {
            Self::Store(e) => Some(e),
            _ => None,
        }
    }
}
