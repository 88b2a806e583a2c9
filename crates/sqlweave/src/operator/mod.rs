//! Pluggable SQL operators.
//!
//! An operator turns `(column, value[s], dialect)` into a predicate or an
//! assignment. Operators come in four arities, modelled as the tagged
//! [`Operator`] enum so lookups dispatch with an exhaustive `match`:
//!
//! - [`UnaryOperator`]: no value (`IS NULL`, `= NULL`)
//! - [`BinaryOperator`]: one value (`=`, `>`, `LIKE`)
//! - [`TernaryOperator`]: two values (`BETWEEN`)
//! - [`MultivariateOperator`]: a list (`IN`)
//!
//! Every `build_sql` is pure: the same inputs always yield the same buffer.
//!
//! # Custom operators
//!
//! ```ignore
//! use sqlweave::operator::{BinaryOperator, Operator, OperatorMeta, OperatorRegistry};
//!
//! #[derive(Debug)]
//! struct RegexMatch(OperatorMeta);
//!
//! impl BinaryOperator for RegexMatch {
//!     fn meta(&self) -> &OperatorMeta { &self.0 }
//!     fn build_sql(&self, column: &str, value: &Value, _: &dyn Dialect) -> SqlResult<SqlBuffer> {
//!         let mut sql = SqlBuffer::with_text(format!("{column} ~ "));
//!         sql.add_variable(value.clone());
//!         Ok(sql)
//!     }
//! }
//!
//! let mut registry = OperatorRegistry::with_defaults();
//! registry.register_where(Operator::binary(RegexMatch(OperatorMeta::new("~", &["RegexMatch"]))))?;
//! ```

mod builtin;
mod registry;
mod update;

pub use builtin::*;
pub use registry::{OperatorRegistry, OperatorScope};
pub use update::{AddOperator, SetOperator, ToNullOperator, update_operators};

use crate::buffer::SqlBuffer;
use crate::dialect::Dialect;
use crate::error::SqlResult;
use crate::value::Value;
use regex::Regex;
use std::fmt;
use std::sync::{Arc, OnceLock};

fn is_ascii_identifier(token: &str) -> bool {
    static IDENT_RE: OnceLock<Regex> = OnceLock::new();
    IDENT_RE
        .get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("invalid built-in identifier regex"))
        .is_match(token)
}

/// Operator identity: SQL token, derived name and human readable aliases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorMeta {
    name: Option<String>,
    op_type: String,
    aliases: Vec<String>,
}

impl OperatorMeta {
    /// Create metadata from the SQL token and aliases.
    ///
    /// The name is the first plain ASCII identifier among `[op_type,
    /// aliases...]`. Metadata without one is rejected at registration.
    pub fn new(op_type: &str, aliases: &[&str]) -> Self {
        let name = std::iter::once(op_type)
            .chain(aliases.iter().copied())
            .map(str::trim)
            .find(|candidate| is_ascii_identifier(candidate))
            .map(str::to_string);
        Self {
            name,
            op_type: op_type.trim().to_string(),
            aliases: aliases.iter().map(|a| a.trim().to_string()).collect(),
        }
    }

    /// The identifier used in `field$Name` request parameters.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The SQL token, e.g. `>=`.
    pub fn op_type(&self) -> &str {
        &self.op_type
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Every token this operator answers to, uppercased.
    pub fn tokens(&self) -> Vec<String> {
        let mut tokens: Vec<String> = std::iter::once(self.op_type.as_str())
            .chain(self.name.as_deref())
            .chain(self.aliases.iter().map(String::as_str))
            .filter(|t| !t.is_empty())
            .map(str::to_uppercase)
            .collect();
        tokens.sort();
        tokens.dedup();
        tokens
    }

    /// Case-insensitive match against type, name or any alias.
    pub fn matches(&self, token: &str) -> bool {
        let token = token.trim().to_uppercase();
        !token.is_empty() && self.tokens().contains(&token)
    }
}

impl fmt::Display for OperatorMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name.as_deref().unwrap_or(&self.op_type))
    }
}

/// An operator taking no value.
pub trait UnaryOperator: Send + Sync + fmt::Debug {
    fn meta(&self) -> &OperatorMeta;

    fn build_sql(&self, column: &str, dialect: &dyn Dialect) -> SqlResult<SqlBuffer>;
}

/// An operator taking one value.
pub trait BinaryOperator: Send + Sync + fmt::Debug {
    fn meta(&self) -> &OperatorMeta;

    fn build_sql(&self, column: &str, value: &Value, dialect: &dyn Dialect) -> SqlResult<SqlBuffer>;
}

/// An operator taking two values.
pub trait TernaryOperator: Send + Sync + fmt::Debug {
    fn meta(&self) -> &OperatorMeta;

    fn build_sql(
        &self,
        column: &str,
        first: &Value,
        second: &Value,
        dialect: &dyn Dialect,
    ) -> SqlResult<SqlBuffer>;
}

/// An operator taking a list of values.
pub trait MultivariateOperator: Send + Sync + fmt::Debug {
    fn meta(&self) -> &OperatorMeta;

    fn build_sql(&self, column: &str, values: &[Value], dialect: &dyn Dialect) -> SqlResult<SqlBuffer>;
}

/// Operator arity family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arity {
    Unary,
    Binary,
    Ternary,
    Multivariate,
}

/// A registered operator, tagged by arity.
#[derive(Debug, Clone)]
pub enum Operator {
    Unary(Arc<dyn UnaryOperator>),
    Binary(Arc<dyn BinaryOperator>),
    Ternary(Arc<dyn TernaryOperator>),
    Multivariate(Arc<dyn MultivariateOperator>),
}

impl Operator {
    pub fn unary(op: impl UnaryOperator + 'static) -> Self {
        Operator::Unary(Arc::new(op))
    }

    pub fn binary(op: impl BinaryOperator + 'static) -> Self {
        Operator::Binary(Arc::new(op))
    }

    pub fn ternary(op: impl TernaryOperator + 'static) -> Self {
        Operator::Ternary(Arc::new(op))
    }

    pub fn multivariate(op: impl MultivariateOperator + 'static) -> Self {
        Operator::Multivariate(Arc::new(op))
    }

    pub fn meta(&self) -> &OperatorMeta {
        match self {
            Operator::Unary(op) => op.meta(),
            Operator::Binary(op) => op.meta(),
            Operator::Ternary(op) => op.meta(),
            Operator::Multivariate(op) => op.meta(),
        }
    }

    /// The registered name. Registered operators always have one.
    pub fn name(&self) -> &str {
        self.meta().name().unwrap_or_default()
    }

    pub fn arity(&self) -> Arity {
        match self {
            Operator::Unary(_) => Arity::Unary,
            Operator::Binary(_) => Arity::Binary,
            Operator::Ternary(_) => Arity::Ternary,
            Operator::Multivariate(_) => Arity::Multivariate,
        }
    }

    /// Check that `value` has the shape this operator consumes.
    ///
    /// Returns a human readable reason on mismatch.
    pub fn check_value(&self, value: &Value) -> Result<(), String> {
        match (self, value) {
            (Operator::Unary(_), _) => Ok(()),
            (Operator::Binary(_), Value::List(_)) => Err(format!(
                "operator '{}' takes a single value, got a list",
                self.name()
            )),
            (Operator::Binary(_), _) => Ok(()),
            (Operator::Ternary(_), Value::List(items)) if items.len() == 2 => Ok(()),
            (Operator::Ternary(_), _) => Err(format!(
                "operator '{}' takes exactly two values",
                self.name()
            )),
            (Operator::Multivariate(_), Value::List(_)) => Ok(()),
            (Operator::Multivariate(_), _) => Err(format!(
                "operator '{}' takes a list of values, got a scalar",
                self.name()
            )),
        }
    }

    /// Render `column <op> value`.
    ///
    /// `value` is interpreted per arity: ignored for unary operators, a
    /// two-element list for ternary ones and a list for multivariate ones.
    /// Call [`check_value`](Self::check_value) first for a descriptive
    /// mismatch reason.
    pub fn build_sql(&self, column: &str, value: &Value, dialect: &dyn Dialect) -> SqlResult<SqlBuffer> {
        match self {
            Operator::Unary(op) => op.build_sql(column, dialect),
            Operator::Binary(op) => op.build_sql(column, value, dialect),
            Operator::Ternary(op) => {
                let (first, second) = match value {
                    Value::List(items) => (
                        items.first().unwrap_or(&Value::Null),
                        items.get(1).unwrap_or(&Value::Null),
                    ),
                    other => (other, &Value::Null),
                };
                op.build_sql(column, first, second, dialect)
            }
            Operator::Multivariate(op) => match value {
                Value::List(items) => op.build_sql(column, items, dialect),
                other => op.build_sql(column, std::slice::from_ref(other), dialect),
            },
        }
    }
}

#[cfg(test)]
mod tests;
