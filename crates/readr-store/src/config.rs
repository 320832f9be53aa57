//! Store and database configuration.

use crate::policy::TextPresence;
use serde::Deserialize;
use std::time::Duration;

/// Runtime behavior of a [`Repository`](crate::Repository).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Upper bound on one façade operation, driver round-trip included.
    pub query_timeout: Option<Duration>,
    /// How plain text fields count as present in partial updates.
    pub text_presence: TextPresence,
    /// Memoize rendered statement templates.
    pub template_cache: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            query_timeout: None,
            text_presence: TextPresence::NonEmpty,
            template_cache: true,
        }
    }
}

impl StoreConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set query timeout.
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.query_timeout = Some(duration);
        self
    }

    pub fn no_timeout(mut self) -> Self {
        self.query_timeout = None;
        self
    }

    pub fn text_presence(mut self, text: TextPresence) -> Self {
        self.text_presence = text;
        self
    }

    /// Enable or disable the template cache.
    pub fn template_cache(mut self, enabled: bool) -> Self {
        self.template_cache = enabled;
        self
    }
}

/// File form of [`StoreConfig`]; durations in milliseconds.
///
/// ```toml
/// query_timeout_ms = 5000
/// text_presence = "non_empty"
/// template_cache = true
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreSection {
    pub query_timeout_ms: Option<u64>,
    pub text_presence: TextPresence,
    pub template_cache: Option<bool>,
}

impl From<StoreSection> for StoreConfig {
    fn from(section: StoreSection) -> Self {
        let defaults = StoreConfig::default();
        Self {
            query_timeout: section.query_timeout_ms.map(Duration::from_millis),
            text_presence: section.text_presence,
            template_cache: section.template_cache.unwrap_or(defaults.template_cache),
        }
    }
}

fn default_max_connections() -> usize {
    16
}

/// Where the connection pool points.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: default_max_connections(),
        }
    }

    pub fn max_connections(mut self, n: usize) -> Self {
        self.max_connections = n;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_fields() {
        let cfg = StoreConfig::new()
            .timeout(Duration::from_secs(2))
            .text_presence(TextPresence::Always)
            .template_cache(false);
        assert_eq!(cfg.query_timeout, Some(Duration::from_secs(2)));
        assert_eq!(cfg.text_presence, TextPresence::Always);
        assert!(!cfg.template_cache);
        assert_eq!(cfg.no_timeout().query_timeout, None);
    }

    #[test]
    fn section_converts_milliseconds() {
        let section: StoreSection =
            serde_json::from_str(r#"{"query_timeout_ms": 1500, "text_presence": "always"}"#)
                .unwrap();
        let cfg = StoreConfig::from(section);
        assert_eq!(cfg.query_timeout, Some(Duration::from_millis(1500)));
        assert_eq!(cfg.text_presence, TextPresence::Always);
        assert!(cfg.template_cache);
    }

    #[test]
    fn empty_section_is_legacy_default() {
        let cfg = StoreConfig::from(StoreSection::default());
        assert_eq!(cfg, StoreConfig::default());
    }

    #[test]
    fn database_defaults_pool_size() {
        let db: DatabaseConfig = serde_json::from_str(r#"{"url": "postgres://x"}"#).unwrap();
        assert_eq!(db.max_connections, 16);
        assert_eq!(DatabaseConfig::new("postgres://x"), db);
    }
}
