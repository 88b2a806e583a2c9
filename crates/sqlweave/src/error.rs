//! Error types for sqlweave

use thiserror::Error;

/// Result type alias for sqlweave operations
pub type SqlResult<T> = Result<T, SqlError>;

/// Error types raised while building SQL.
///
/// None of these are recovered locally: they propagate to the caller, which
/// decides whether to fix the input, report a validation failure, or abort.
#[derive(Debug, Error)]
pub enum SqlError {
    /// A field reference matched more than one column and carried no table alias.
    #[error("Ambiguous field '{field}', matched: {}", candidates.join(", "))]
    AmbiguousField {
        field: String,
        candidates: Vec<String>,
    },

    /// A field or operator is not supported by the target entity or dialect.
    #[error("Unsupported field(s) [{}] on '{entity}': {reason}", fields.join(", "))]
    UnsupportedField {
        entity: String,
        fields: Vec<String>,
        reason: String,
    },

    /// Malformed registration or configuration input, raised at startup.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A list-valued operator received no values.
    #[error("Empty input for operator '{operator}' on '{field}'")]
    EmptyInput { operator: String, field: String },

    /// A statement request that would produce unsafe or invalid SQL.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration text could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl SqlError {
    /// Create an ambiguous field error
    pub fn ambiguous(field: impl Into<String>, candidates: Vec<String>) -> Self {
        Self::AmbiguousField {
            field: field.into(),
            candidates,
        }
    }

    /// Create an unsupported field error
    pub fn unsupported(
        entity: impl Into<String>,
        fields: Vec<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::UnsupportedField {
            entity: entity.into(),
            fields,
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create an empty input error
    pub fn empty_input(operator: impl Into<String>, field: impl Into<String>) -> Self {
        Self::EmptyInput {
            operator: operator.into(),
            field: field.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Check if this is an ambiguous field error
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Self::AmbiguousField { .. })
    }

    /// Check if this is an unsupported field error
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedField { .. })
    }

    /// Check if this is an empty input error
    pub fn is_empty_input(&self) -> bool {
        matches!(self, Self::EmptyInput { .. })
    }
}

impl From<toml::de::Error> for SqlError {
    fn from(err: toml::de::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
