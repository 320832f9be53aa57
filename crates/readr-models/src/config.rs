//! Application configuration file.
//!
//! ```toml
//! [database]
//! url = "${DATABASE_URL}"
//! max_connections = 16
//!
//! [store]
//! query_timeout_ms = 5000
//!
//! [status.members]
//! active = 1
//! inactive = 0
//! deleted = -1
//! # ... [status.posts], [status.comments], [status.post_publish]
//! ```

use crate::error::{ModelError, ModelResult};
use crate::status::StatusTable;
use readr_store::{DatabaseConfig, StoreConfig, StoreSection};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub store: StoreSection,
    pub status: StatusTable,
}

impl AppConfig {
    /// Read, expand, and validate a config file.
    ///
    /// A `.env` file in the working directory, if any, is loaded first so
    /// `${VAR}` references can resolve against it.
    pub fn load(path: impl AsRef<Path>) -> ModelResult<Self> {
        let path = path.as_ref();
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!(target: "readr_models::config", error = %e, "ignoring unreadable .env");
            }
        }

        let raw = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&raw)?;
        tracing::info!(
            target: "readr_models::config",
            path = %path.display(),
            max_connections = config.database.max_connections,
            "loaded configuration"
        );
        Ok(config)
    }

    /// Parse config text, expanding `${VAR}` from the process environment.
    pub fn from_toml_str(raw: &str) -> ModelResult<Self> {
        Self::from_toml_str_with(raw, |key| std::env::var(key).ok())
    }

    /// Parse config text with a custom variable lookup.
    pub fn from_toml_str_with(
        raw: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> ModelResult<Self> {
        let mut config: Self = toml::from_str(raw)?;
        config.database.url = expand_env_vars(&config.database.url, &lookup)?;
        config.validate()?;
        Ok(config)
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::from(self.store.clone())
    }

    fn validate(&self) -> ModelResult<()> {
        if self.database.url.trim().is_empty() {
            return Err(ModelError::config("database.url must not be empty"));
        }
        if self.database.max_connections == 0 {
            return Err(ModelError::config(
                "database.max_connections must be at least 1",
            ));
        }
        if self.store.query_timeout_ms == Some(0) {
            return Err(ModelError::config(
                "store.query_timeout_ms must be positive; omit it to disable the timeout",
            ));
        }
        self.status.check()
    }
}

fn expand_env_vars(input: &str, lookup: impl Fn(&str) -> Option<String>) -> ModelResult<String> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'

            let mut key = String::new();
            let mut closed = false;
            for ch in chars.by_ref() {
                if ch == '}' {
                    closed = true;
                    break;
                }
                key.push(ch);
            }

            if !closed {
                return Err(ModelError::config(format!(
                    "unterminated env var reference: ${{{key}"
                )));
            }
            if key.is_empty() {
                return Err(ModelError::config("invalid env var reference: ${}"));
            }

            let v = lookup(&key).ok_or(ModelError::MissingEnv(key))?;
            out.push_str(&v);
            continue;
        }

        out.push(c);
    }

    Ok(out)
}
