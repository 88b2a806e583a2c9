//! Engine configuration.
//!
//! Every setting has a default, so `EngineConfig::default()` is a working
//! configuration. Settings can also be loaded from TOML:
//!
//! ```toml
//! allow_empty_where = false
//!
//! [dialect]
//! recursive_procedure = "RECURSIVE_FIND_CHILDREN"
//! max_in_items = 1000
//!
//! [dialect.omission]
//! threshold = 50
//! keep = 5
//! ```

use crate::error::SqlResult;
use serde::{Deserialize, Serialize};

/// How long IN lists are shortened in logged (executable) SQL.
///
/// Only the logged form is affected; the prepared value list always carries
/// every value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OmissionConfig {
    /// Lists longer than this are shortened. `0` disables omission.
    pub threshold: usize,
    /// Values kept at each end of a shortened list.
    pub keep: usize,
}

impl Default for OmissionConfig {
    fn default() -> Self {
        Self {
            threshold: 50,
            keep: 5,
        }
    }
}

impl OmissionConfig {
    /// Never shorten lists.
    pub fn disabled() -> Self {
        Self {
            threshold: 0,
            keep: 0,
        }
    }

    /// Whether a list of `len` values gets shortened.
    pub fn applies_to(&self, len: usize) -> bool {
        self.threshold > 0 && self.keep > 0 && len > self.threshold && len > 2 * self.keep
    }
}

/// Per-dialect rendering options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialectOptions {
    /// IN list shortening for logged SQL.
    pub omission: OmissionConfig,
    /// Stored procedure used for recursive lookups on engines without
    /// recursive CTEs (MySQL before 8.0).
    pub recursive_procedure: String,
    /// Override of the product's IN list limit. `None` keeps the product default.
    pub max_in_items: Option<usize>,
}

impl Default for DialectOptions {
    fn default() -> Self {
        Self {
            omission: OmissionConfig::default(),
            recursive_procedure: "RECURSIVE_FIND_CHILDREN".to_string(),
            max_in_items: None,
        }
    }
}

impl DialectOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the IN list omission settings.
    pub fn omission(mut self, omission: OmissionConfig) -> Self {
        self.omission = omission;
        self
    }

    /// Set the recursive lookup stored procedure name.
    pub fn recursive_procedure(mut self, name: impl Into<String>) -> Self {
        self.recursive_procedure = name.into();
        self
    }

    /// Override the IN list limit.
    pub fn max_in_items(mut self, max: usize) -> Self {
        self.max_in_items = Some(max);
        self
    }
}

/// Configuration for [`SqlEngine`](crate::SqlEngine).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Dialect rendering options.
    pub dialect: DialectOptions,
    /// Allow UPDATE/DELETE with an empty WHERE.
    ///
    /// When `false` (the default) only [`DbWhere::everything`](crate::DbWhere::everything)
    /// produces an unfiltered UPDATE/DELETE.
    pub allow_empty_where: bool,
}

impl EngineConfig {
    /// Create a new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from TOML text. Missing keys take defaults.
    pub fn from_toml_str(text: &str) -> SqlResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Set dialect options.
    pub fn dialect(mut self, options: DialectOptions) -> Self {
        self.dialect = options;
        self
    }

    /// Allow UPDATE/DELETE without conditions.
    pub fn allow_empty_where(mut self, allow: bool) -> Self {
        self.allow_empty_where = allow;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn omission_needs_threshold_and_room() {
        let cfg = OmissionConfig {
            threshold: 10,
            keep: 3,
        };
        assert!(!cfg.applies_to(10));
        assert!(cfg.applies_to(11));
        assert!(!OmissionConfig::disabled().applies_to(1000));
    }

    #[test]
    fn parses_partial_toml() {
        let cfg = EngineConfig::from_toml_str(
            r#"
            allow_empty_where = true

            [dialect]
            max_in_items = 500

            [dialect.omission]
            threshold = 8
            "#,
        )
        .unwrap();

        assert!(cfg.allow_empty_where);
        assert_eq!(cfg.dialect.max_in_items, Some(500));
        assert_eq!(cfg.dialect.omission.threshold, 8);
        assert_eq!(cfg.dialect.omission.keep, 5);
        assert_eq!(cfg.dialect.recursive_procedure, "RECURSIVE_FIND_CHILDREN");
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = EngineConfig::from_toml_str("allow_empty_where = 'yes'").unwrap_err();
        assert!(matches!(err, crate::SqlError::Parse(_)));
    }
}
