//! IN / NOT IN rendering shared by every dialect.

use super::Dialect;
use crate::buffer::SqlBuffer;
use crate::error::{SqlError, SqlResult};
use crate::value::Value;

/// `column IN (?, ?, ...)`
///
/// A single value still renders `IN (?)`. An empty list is an error. When
/// the dialect caps IN list length the values are split into chunks:
/// `(column IN (...) OR column IN (...))`.
pub fn build_in_sql(dialect: &dyn Dialect, column: &str, values: Vec<Value>) -> SqlResult<SqlBuffer> {
    build(dialect, column, values, false)
}

/// `column NOT IN (?, ?, ...)`
///
/// Chunks are joined with `AND`: `(column NOT IN (...) AND column NOT IN (...))`.
pub fn build_not_in_sql(dialect: &dyn Dialect, column: &str, values: Vec<Value>) -> SqlResult<SqlBuffer> {
    build(dialect, column, values, true)
}

fn build(dialect: &dyn Dialect, column: &str, values: Vec<Value>, negate: bool) -> SqlResult<SqlBuffer> {
    let (operator, keyword, joiner) = if negate {
        ("NotIn", "NOT IN", " AND ")
    } else {
        ("In", "IN", " OR ")
    };
    if values.is_empty() {
        return Err(SqlError::empty_input(operator, column));
    }

    let chunk_size = dialect
        .max_in_items()
        .filter(|max| *max > 0)
        .unwrap_or(values.len());

    if values.len() <= chunk_size {
        return Ok(in_clause(column, keyword, values));
    }

    let mut sql = SqlBuffer::with_text("(");
    let mut values = values.into_iter().peekable();
    let mut first = true;
    while values.peek().is_some() {
        let chunk: Vec<Value> = values.by_ref().take(chunk_size).collect();
        if !first {
            sql.append(joiner);
        }
        first = false;
        sql.push_buffer(in_clause(column, keyword, chunk));
    }
    sql.append(")");
    Ok(sql)
}

fn in_clause(column: &str, keyword: &str, values: Vec<Value>) -> SqlBuffer {
    let mut sql = SqlBuffer::with_text(format!("{column} {keyword} ("));
    sql.add_variables(values).append(")");
    sql
}
