//! Complete statements.
//!
//! Builders compose [`FragmentHelper`](crate::FragmentHelper) output into
//! SELECT, COUNT, INSERT, UPDATE and DELETE statements for one entity
//! ([`TableSqlBuilder`]) or a join ([`JoinSqlBuilder`]).
//!
//! ## Safety defaults
//!
//! - UPDATE and DELETE refuse to run without conditions unless the
//!   condition set is [`DbWhere::everything`](crate::DbWhere::everything)
//!   or the builder was told to allow it.
//! - UPDATE requires at least one assignment, INSERT at least one value.

pub mod join;
pub mod table;

pub use join::JoinSqlBuilder;
pub use table::TableSqlBuilder;

use crate::buffer::SqlBuffer;
use crate::dialect::Dialect;

/// Log a finished statement at `debug`, rendering literals only when the
/// level is enabled.
pub(crate) fn traced(statement: &'static str, sql: SqlBuffer, dialect: &dyn Dialect) -> SqlBuffer {
    if tracing::enabled!(target: "sqlweave.sql", tracing::Level::DEBUG) {
        tracing::debug!(
            target: "sqlweave.sql",
            statement,
            db = %dialect.version(),
            variables = sql.variable_count(),
            sql = %sql.to_executable_sql(dialect),
            "built statement"
        );
    }
    sql
}

/// `SELECT <fields> <from>[ <where>][ <order>]`.
pub(crate) fn select_sql(fields: SqlBuffer, from: SqlBuffer, where_sql: SqlBuffer, order_sql: SqlBuffer) -> SqlBuffer {
    let mut sql = SqlBuffer::with_text("SELECT ");
    sql.push_buffer(fields).append(" ").push_buffer(from);
    append_clause(&mut sql, where_sql);
    append_clause(&mut sql, order_sql);
    sql
}

/// Append ` <clause>` unless blank.
pub(crate) fn append_clause(sql: &mut SqlBuffer, clause: SqlBuffer) {
    if !clause.is_blank() {
        sql.append(" ").push_buffer(clause);
    }
}
