//! Building conditions from request-style key/value parameters.
//!
//! Keys use the `field$Operator` grammar. Multi-value operators (`In`,
//! `NotIn`, `Between`, `NotBetween`) take every value; all others take the
//! first. Blank parameters are skipped so unset form fields impose no filter.

use super::{DbUpdate, DbWhere, split_operator};
use crate::value::Value;

const MULTI_VALUE_OPERATORS: [&str; 4] = ["IN", "NOTIN", "BETWEEN", "NOTBETWEEN"];

fn is_multi_value(operator: &str) -> bool {
    MULTI_VALUE_OPERATORS
        .iter()
        .any(|op| op.eq_ignore_ascii_case(operator))
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Text(s) => s.trim().is_empty(),
        Value::List(items) => items.iter().all(is_blank),
        _ => false,
    }
}

fn shape(operator: Option<&str>, value: Value) -> Value {
    match operator {
        Some(op) if is_multi_value(op) => Value::List(value.into_list()),
        _ => value.into_first(),
    }
}

impl DbWhere {
    /// Build conditions from `(key, value)` pairs.
    ///
    /// ```ignore
    /// let w = DbWhere::from_params([
    ///     ("age$GreaterThen", Value::from("18")),
    ///     ("state$In", Value::from(vec!["1", "2"])),
    ///     ("name", Value::from("")), // skipped
    /// ]);
    /// ```
    pub fn from_params<K, V, I>(params: I) -> DbWhere
    where
        K: AsRef<str>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut out = DbWhere::new();
        for (key, value) in params {
            let value = value.into();
            if is_blank(&value) {
                continue;
            }
            let (field, operator) = split_operator(key.as_ref());
            if field.is_empty() {
                continue;
            }
            let value = shape(operator, value);
            match operator {
                Some(op) => out.on_op(field, op, value),
                None => out.on_op(field, super::DEFAULT_WHERE_OPERATOR, value),
            };
        }
        out
    }
}

impl DbUpdate {
    /// Build assignments from `(key, value)` pairs.
    ///
    /// Unlike [`DbWhere::from_params`] blank values are kept: assigning an
    /// empty string is a real update.
    pub fn from_params<K, V, I>(params: I) -> DbUpdate
    where
        K: AsRef<str>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut out = DbUpdate::new();
        for (key, value) in params {
            let (field, _) = split_operator(key.as_ref());
            if field.is_empty() {
                continue;
            }
            out.on(key.as_ref(), value.into().into_first());
        }
        out
    }
}
