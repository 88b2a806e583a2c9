//! Built-in WHERE operators.

use super::{
    BinaryOperator, MultivariateOperator, Operator, OperatorMeta, TernaryOperator, UnaryOperator,
};
use crate::buffer::SqlBuffer;
use crate::dialect::{Dialect, build_in_sql, build_not_in_sql, format_datetime};
use crate::error::{SqlError, SqlResult};
use crate::value::Value;

/// Every built-in WHERE operator.
pub fn where_operators() -> Vec<Operator> {
    vec![
        Operator::unary(IsNullOperator::default()),
        Operator::unary(IsNotNullOperator::default()),
        Operator::binary(EqualsOperator::default()),
        Operator::binary(NotEqualsOperator::default()),
        Operator::binary(CompareOperator::less_then()),
        Operator::binary(CompareOperator::less_equals_then()),
        Operator::binary(CompareOperator::greater_then()),
        Operator::binary(CompareOperator::greater_equals_then()),
        Operator::binary(LikeOperator::like()),
        Operator::binary(LikeOperator::not_like()),
        Operator::binary(LikeOperator::starts_with()),
        Operator::binary(LikeOperator::ends_with()),
        Operator::ternary(BetweenOperator::between()),
        Operator::ternary(BetweenOperator::not_between()),
        Operator::multivariate(InOperator::in_list()),
        Operator::multivariate(InOperator::not_in_list()),
    ]
}

// ==================== Unary ====================

/// `column IS NULL`. Any supplied value is ignored.
#[derive(Debug, Clone)]
pub struct IsNullOperator(OperatorMeta);

impl Default for IsNullOperator {
    fn default() -> Self {
        Self(OperatorMeta::new("IS NULL", &["IsNull"]))
    }
}

impl UnaryOperator for IsNullOperator {
    fn meta(&self) -> &OperatorMeta {
        &self.0
    }

    fn build_sql(&self, column: &str, _dialect: &dyn Dialect) -> SqlResult<SqlBuffer> {
        Ok(SqlBuffer::with_text(format!("{column} IS NULL")))
    }
}

/// `column IS NOT NULL`. Any supplied value is ignored.
#[derive(Debug, Clone)]
pub struct IsNotNullOperator(OperatorMeta);

impl Default for IsNotNullOperator {
    fn default() -> Self {
        Self(OperatorMeta::new("IS NOT NULL", &["IsNotNull"]))
    }
}

impl UnaryOperator for IsNotNullOperator {
    fn meta(&self) -> &OperatorMeta {
        &self.0
    }

    fn build_sql(&self, column: &str, _dialect: &dyn Dialect) -> SqlResult<SqlBuffer> {
        Ok(SqlBuffer::with_text(format!("{column} IS NOT NULL")))
    }
}

// ==================== Binary ====================

/// `column = ?`, or `column IS NULL` for null and empty text.
#[derive(Debug, Clone)]
pub struct EqualsOperator(OperatorMeta);

impl Default for EqualsOperator {
    fn default() -> Self {
        Self(OperatorMeta::new("=", &["Equals", "eq"]))
    }
}

impl BinaryOperator for EqualsOperator {
    fn meta(&self) -> &OperatorMeta {
        &self.0
    }

    fn build_sql(&self, column: &str, value: &Value, _dialect: &dyn Dialect) -> SqlResult<SqlBuffer> {
        if value.is_null_or_empty() {
            return Ok(SqlBuffer::with_text(format!("{column} IS NULL")));
        }
        let mut sql = SqlBuffer::with_text(format!("{column} = "));
        sql.add_variable(value.clone());
        Ok(sql)
    }
}

/// `column != ?`, or `column IS NOT NULL` for null and empty text.
#[derive(Debug, Clone)]
pub struct NotEqualsOperator(OperatorMeta);

impl Default for NotEqualsOperator {
    fn default() -> Self {
        Self(OperatorMeta::new("!=", &["NotEquals", "<>", "ne"]))
    }
}

impl BinaryOperator for NotEqualsOperator {
    fn meta(&self) -> &OperatorMeta {
        &self.0
    }

    fn build_sql(&self, column: &str, value: &Value, _dialect: &dyn Dialect) -> SqlResult<SqlBuffer> {
        if value.is_null_or_empty() {
            return Ok(SqlBuffer::with_text(format!("{column} IS NOT NULL")));
        }
        let mut sql = SqlBuffer::with_text(format!("{column} != "));
        sql.add_variable(value.clone());
        Ok(sql)
    }
}

/// Ordering comparisons: `<`, `<=`, `>`, `>=`.
///
/// Comparing with null is always unknown in SQL, so a null value is
/// rejected.
#[derive(Debug, Clone)]
pub struct CompareOperator(OperatorMeta);

impl CompareOperator {
    pub fn less_then() -> Self {
        Self(OperatorMeta::new("<", &["LessThen", "LessThan", "lt"]))
    }

    pub fn less_equals_then() -> Self {
        Self(OperatorMeta::new("<=", &["LessEqualsThen", "LessThanOrEquals", "le"]))
    }

    pub fn greater_then() -> Self {
        Self(OperatorMeta::new(">", &["GreaterThen", "GreaterThan", "gt"]))
    }

    pub fn greater_equals_then() -> Self {
        Self(OperatorMeta::new(">=", &["GreaterEqualsThen", "GreaterThanOrEquals", "ge"]))
    }
}

impl BinaryOperator for CompareOperator {
    fn meta(&self) -> &OperatorMeta {
        &self.0
    }

    fn build_sql(&self, column: &str, value: &Value, _dialect: &dyn Dialect) -> SqlResult<SqlBuffer> {
        if value.is_null() {
            return Err(SqlError::empty_input(self.0.to_string(), column));
        }
        let mut sql = SqlBuffer::with_text(format!("{column} {} ", self.0.op_type()));
        sql.add_variable(value.clone());
        Ok(sql)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LikeKind {
    Contains,
    StartsWith,
    EndsWith,
}

/// LIKE family. Wildcards and concatenation come from the dialect.
#[derive(Debug, Clone)]
pub struct LikeOperator {
    meta: OperatorMeta,
    kind: LikeKind,
    negate: bool,
}

impl LikeOperator {
    /// `column LIKE '%' || ? || '%'`
    pub fn like() -> Self {
        Self {
            meta: OperatorMeta::new("LIKE", &["Like", "Contains"]),
            kind: LikeKind::Contains,
            negate: false,
        }
    }

    /// `column NOT LIKE '%' || ? || '%'`
    pub fn not_like() -> Self {
        Self {
            meta: OperatorMeta::new("NOT LIKE", &["NotLike", "NotContains"]),
            kind: LikeKind::Contains,
            negate: true,
        }
    }

    /// `column LIKE ? || '%'`
    pub fn starts_with() -> Self {
        Self {
            meta: OperatorMeta::new("STARTS WITH", &["StartsWith"]),
            kind: LikeKind::StartsWith,
            negate: false,
        }
    }

    /// `column LIKE '%' || ?`
    pub fn ends_with() -> Self {
        Self {
            meta: OperatorMeta::new("ENDS WITH", &["EndsWith"]),
            kind: LikeKind::EndsWith,
            negate: false,
        }
    }
}

/// Plain text of a scalar, for LIKE patterns.
fn pattern_text(value: &Value) -> Option<String> {
    match value {
        Value::Text(s) => Some(s.clone()),
        Value::Int(i) => Some(i.to_string()),
        Value::Float(f) => Some(f.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Uuid(u) => Some(u.to_string()),
        Value::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
        Value::DateTime(dt) => Some(format_datetime(dt)),
        Value::Null | Value::Bytes(_) | Value::List(_) => None,
    }
}

impl BinaryOperator for LikeOperator {
    fn meta(&self) -> &OperatorMeta {
        &self.meta
    }

    fn build_sql(&self, column: &str, value: &Value, dialect: &dyn Dialect) -> SqlResult<SqlBuffer> {
        let Some(text) = pattern_text(value) else {
            return Err(SqlError::empty_input(self.meta.to_string(), column));
        };
        let suffix = match self.kind {
            LikeKind::Contains => dialect.build_like_sql(&text),
            LikeKind::StartsWith => dialect.build_starts_with_sql(&text),
            LikeKind::EndsWith => dialect.build_ends_with_sql(&text),
        };

        let head = if self.negate {
            format!("{column} NOT ")
        } else {
            format!("{column} ")
        };
        let mut sql = SqlBuffer::with_text(head);
        sql.push_buffer(suffix);
        Ok(sql)
    }
}

// ==================== Ternary ====================

/// `column [NOT] BETWEEN ? AND ?`
///
/// With one null bound the range is open: BETWEEN degrades to `>=` / `<=`
/// and NOT BETWEEN to `<` / `>`. Two null bounds are rejected.
#[derive(Debug, Clone)]
pub struct BetweenOperator {
    meta: OperatorMeta,
    negate: bool,
}

impl BetweenOperator {
    pub fn between() -> Self {
        Self {
            meta: OperatorMeta::new("BETWEEN", &["Between"]),
            negate: false,
        }
    }

    pub fn not_between() -> Self {
        Self {
            meta: OperatorMeta::new("NOT BETWEEN", &["NotBetween"]),
            negate: true,
        }
    }
}

impl TernaryOperator for BetweenOperator {
    fn meta(&self) -> &OperatorMeta {
        &self.meta
    }

    fn build_sql(
        &self,
        column: &str,
        first: &Value,
        second: &Value,
        _dialect: &dyn Dialect,
    ) -> SqlResult<SqlBuffer> {
        let (lower, upper) = if self.negate { ("<", ">") } else { (">=", "<=") };

        let mut sql = SqlBuffer::new();
        match (first.is_null(), second.is_null()) {
            (true, true) => return Err(SqlError::empty_input(self.meta.to_string(), column)),
            (false, true) => {
                sql.append(&format!("{column} {lower} ")).add_variable(first.clone());
            }
            (true, false) => {
                sql.append(&format!("{column} {upper} ")).add_variable(second.clone());
            }
            (false, false) => {
                sql.append(&format!("{column} {} ", self.meta.op_type()))
                    .add_variable(first.clone())
                    .append(" AND ")
                    .add_variable(second.clone());
            }
        }
        Ok(sql)
    }
}

// ==================== Multivariate ====================

/// `column [NOT] IN (?, ?, ...)` through the shared IN builder.
#[derive(Debug, Clone)]
pub struct InOperator {
    meta: OperatorMeta,
    negate: bool,
}

impl InOperator {
    pub fn in_list() -> Self {
        Self {
            meta: OperatorMeta::new("IN", &["In"]),
            negate: false,
        }
    }

    pub fn not_in_list() -> Self {
        Self {
            meta: OperatorMeta::new("NOT IN", &["NotIn"]),
            negate: true,
        }
    }
}

impl MultivariateOperator for InOperator {
    fn meta(&self) -> &OperatorMeta {
        &self.meta
    }

    fn build_sql(&self, column: &str, values: &[Value], dialect: &dyn Dialect) -> SqlResult<SqlBuffer> {
        if self.negate {
            build_not_in_sql(dialect, column, values.to_vec())
        } else {
            build_in_sql(dialect, column, values.to_vec())
        }
    }
}
