//! Built-in UPDATE assignment operators.

use super::{BinaryOperator, Operator, OperatorMeta, UnaryOperator};
use crate::buffer::SqlBuffer;
use crate::dialect::Dialect;
use crate::error::SqlResult;
use crate::value::Value;

/// Every built-in UPDATE operator.
pub fn update_operators() -> Vec<Operator> {
    vec![
        Operator::binary(SetOperator::default()),
        Operator::binary(AddOperator::default()),
        Operator::unary(ToNullOperator::default()),
    ]
}

/// `column = ?`
#[derive(Debug, Clone)]
pub struct SetOperator(OperatorMeta);

impl Default for SetOperator {
    fn default() -> Self {
        Self(OperatorMeta::new("=", &["Set"]))
    }
}

impl BinaryOperator for SetOperator {
    fn meta(&self) -> &OperatorMeta {
        &self.0
    }

    fn build_sql(&self, column: &str, value: &Value, _dialect: &dyn Dialect) -> SqlResult<SqlBuffer> {
        let mut sql = SqlBuffer::with_text(format!("{column} = "));
        sql.add_variable(value.clone());
        Ok(sql)
    }
}

/// `column = column + ?`
#[derive(Debug, Clone)]
pub struct AddOperator(OperatorMeta);

impl Default for AddOperator {
    fn default() -> Self {
        Self(OperatorMeta::new("+=", &["Add", "Increment"]))
    }
}

impl BinaryOperator for AddOperator {
    fn meta(&self) -> &OperatorMeta {
        &self.0
    }

    fn build_sql(&self, column: &str, value: &Value, _dialect: &dyn Dialect) -> SqlResult<SqlBuffer> {
        let mut sql = SqlBuffer::with_text(format!("{column} = {column} + "));
        sql.add_variable(value.clone());
        Ok(sql)
    }
}

/// `column = NULL`, no bound variable.
#[derive(Debug, Clone)]
pub struct ToNullOperator(OperatorMeta);

impl Default for ToNullOperator {
    fn default() -> Self {
        Self(OperatorMeta::new("= NULL", &["ToNull"]))
    }
}

impl UnaryOperator for ToNullOperator {
    fn meta(&self) -> &OperatorMeta {
        &self.0
    }

    fn build_sql(&self, column: &str, _dialect: &dyn Dialect) -> SqlResult<SqlBuffer> {
        Ok(SqlBuffer::with_text(format!("{column} = NULL")))
    }
}
