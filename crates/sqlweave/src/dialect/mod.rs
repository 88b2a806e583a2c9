//! Database product specific SQL spelling.
//!
//! Every other component takes a [`Dialect`] instead of hard-coding syntax.
//! A dialect is an immutable strategy object selected once per data source
//! with [`create_dialect`] and shared through an `Arc`.
//!
//! | Concern          | Oracle            | MySQL / MariaDB  | PostgreSQL / SQLite | SQL Server           | DB2                    |
//! |------------------|-------------------|------------------|---------------------|----------------------|------------------------|
//! | LIKE concat      | `\|\|`            | `CONCAT()`       | `\|\|`              | `+`                  | `\|\|`                 |
//! | Paging (current) | `OFFSET/FETCH`    | `LIMIT ?, ?`     | `LIMIT ? OFFSET ?`  | `OFFSET/FETCH`       | `OFFSET/FETCH FIRST`   |
//! | Paging (legacy)  | `ROWNUM` wrapping | -                | -                   | `TOP`/`ROW_NUMBER()` | `ROW_NUMBER()`         |
//! | Children lookup  | `CONNECT BY`      | CTE / procedure  | `WITH RECURSIVE`    | `WITH ... UNION ALL` | `WITH ... UNION ALL`   |

mod children;
mod db2;
mod in_list;
mod mysql;
mod oracle;
mod postgres;
mod sqlite;
mod sqlserver;
mod version;

pub use children::ChildrenQuery;
pub use db2::Db2Dialect;
pub use in_list::{build_in_sql, build_not_in_sql};
pub use mysql::MySqlDialect;
pub use oracle::OracleDialect;
pub use postgres::PostgresDialect;
pub use sqlite::SqliteDialect;
pub use sqlserver::SqlServerDialect;
pub use version::{DbType, DbVersion};

use crate::buffer::SqlBuffer;
use crate::condition::{NullsOrder, OrderType, Paging};
use crate::config::DialectOptions;
use crate::error::{SqlError, SqlResult};
use crate::value::Value;
use chrono::{NaiveDate, NaiveDateTime};
use std::fmt;
use std::sync::Arc;

/// Per-product SQL rendering.
///
/// Only [`version`](Dialect::version), [`options`](Dialect::options),
/// [`process_paging_sql`](Dialect::process_paging_sql) and
/// [`build_find_children_sql`](Dialect::build_find_children_sql) are
/// required; everything else has an ANSI default that products override
/// where they differ.
pub trait Dialect: Send + Sync + fmt::Debug {
    /// Product and version this dialect renders for.
    fn version(&self) -> &DbVersion;

    /// Rendering options.
    fn options(&self) -> &DialectOptions;

    fn db_type(&self) -> DbType {
        self.version().db_type
    }

    // ==================== Literals ====================

    /// Render a value as an SQL literal, for logged SQL only.
    fn variable_to_string(&self, value: &Value) -> String {
        match value {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => self.boolean_literal(*b),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Text(s) => self.string_literal(s),
            Value::Date(d) => self.date_literal(d),
            Value::DateTime(dt) => self.datetime_literal(dt),
            Value::Uuid(u) => self.string_literal(&u.to_string()),
            Value::Bytes(b) => self.bytes_literal(b),
            Value::List(items) => items
                .iter()
                .map(|v| self.variable_to_string(v))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    fn string_literal(&self, text: &str) -> String {
        format!("'{}'", text.replace('\'', "''"))
    }

    fn boolean_literal(&self, value: bool) -> String {
        let literal = if value { "TRUE" } else { "FALSE" };
        literal.to_string()
    }

    fn date_literal(&self, date: &NaiveDate) -> String {
        format!("DATE '{}'", date.format("%Y-%m-%d"))
    }

    fn datetime_literal(&self, datetime: &NaiveDateTime) -> String {
        format!("TIMESTAMP '{}'", format_datetime(datetime))
    }

    fn bytes_literal(&self, bytes: &[u8]) -> String {
        format!("X'{}'", to_hex(bytes))
    }

    // ==================== LIKE ====================

    /// Concatenate optional `%` wildcards around a bound pattern.
    fn concat_pattern(&self, leading: bool, pattern: String, trailing: bool) -> SqlBuffer {
        let mut sql = SqlBuffer::new();
        if leading {
            sql.append("'%' || ");
        }
        sql.add_variable(pattern);
        if trailing {
            sql.append(" || '%'");
        }
        sql
    }

    /// The `ESCAPE` clause literal.
    fn like_escape(&self) -> &'static str {
        r"'\'"
    }

    /// `LIKE '%' || ? || '%' ESCAPE '\'`
    ///
    /// The column is not included; callers prepend it.
    fn build_like_sql(&self, value: &str) -> SqlBuffer {
        like_suffix(self, true, value, true)
    }

    /// `LIKE ? || '%' ESCAPE '\'`
    fn build_starts_with_sql(&self, value: &str) -> SqlBuffer {
        like_suffix(self, false, value, true)
    }

    /// `LIKE '%' || ? ESCAPE '\'`
    fn build_ends_with_sql(&self, value: &str) -> SqlBuffer {
        like_suffix(self, true, value, false)
    }

    // ==================== IN lists ====================

    /// Largest IN list the product accepts; longer lists are split.
    fn max_in_items(&self) -> Option<usize> {
        self.options().max_in_items
    }

    // ==================== ORDER BY ====================

    /// Whether `NULLS FIRST` / `NULLS LAST` is native syntax.
    fn supports_nulls_ordering(&self) -> bool {
        true
    }

    /// Render one ORDER BY item for an already resolved column.
    fn build_order_item(&self, column: &str, order: OrderType, nulls: Option<NullsOrder>) -> String {
        match nulls {
            None => format!("{column} {}", order.to_sql()),
            Some(nulls) if self.supports_nulls_ordering() => {
                format!("{column} {} {}", order.to_sql(), nulls.to_sql())
            }
            Some(nulls) => {
                let (null_key, other_key) = match nulls {
                    NullsOrder::First => (0, 1),
                    NullsOrder::Last => (1, 0),
                };
                format!(
                    "CASE WHEN {column} IS NULL THEN {null_key} ELSE {other_key} END, {column} {}",
                    order.to_sql()
                )
            }
        }
    }

    // ==================== Statements ====================

    /// Apply `paging` to a complete SELECT.
    ///
    /// Does nothing when `paging` has no rows. Bounds are bound variables.
    fn process_paging_sql(&self, sql: &mut SqlBuffer, paging: &Paging) -> SqlResult<()>;

    /// Recursive descendant lookup, roots included.
    fn build_find_children_sql(&self, query: &ChildrenQuery) -> SqlResult<SqlBuffer>;
}

/// Create the dialect for a product version.
///
/// ```ignore
/// let dialect = create_dialect("mysql.8".parse()?, DialectOptions::default());
/// ```
pub fn create_dialect(version: DbVersion, options: DialectOptions) -> Arc<dyn Dialect> {
    match version.db_type {
        DbType::Oracle => Arc::new(OracleDialect::new(version, options)),
        DbType::MySql | DbType::MariaDb => Arc::new(MySqlDialect::new(version, options)),
        DbType::PostgreSql => Arc::new(PostgresDialect::new(version, options)),
        DbType::SqlServer => Arc::new(SqlServerDialect::new(version, options)),
        DbType::Db2 => Arc::new(Db2Dialect::new(version, options)),
        DbType::Sqlite => Arc::new(SqliteDialect::new(version, options)),
    }
}

/// Escape `\`, `%` and `_` so a value matches literally inside LIKE.
pub fn escape_like(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn like_suffix<D: Dialect + ?Sized>(dialect: &D, leading: bool, value: &str, trailing: bool) -> SqlBuffer {
    let mut sql = SqlBuffer::with_text("LIKE ");
    sql.push_buffer(dialect.concat_pattern(leading, escape_like(value), trailing));
    sql.append(" ESCAPE ").append(dialect.like_escape());
    sql
}

/// Bind a paging bound.
pub(crate) fn paging_value(n: u64) -> Value {
    Value::Int(i64::try_from(n).unwrap_or(i64::MAX))
}

/// `ROW_NUMBER()` paging for products without OFFSET.
///
/// The statement's top-level ORDER BY moves into the `OVER (...)` clause so
/// the numbering follows it; `unordered` is the window used without one.
/// With `inline` the row number is added to the statement's own select list,
/// where the ORDER BY items stay in scope. Otherwise the statement is wrapped
/// as `T_` first, which only works when the ORDER BY items are result labels.
pub(crate) fn row_number_paging(
    sql: &mut SqlBuffer,
    paging: &Paging,
    unordered: &str,
    inline: bool,
) -> SqlResult<()> {
    let window = match sql.take_top_level_clause("ORDER BY") {
        Some(items) => format!("ORDER BY {items}"),
        None if sql.has_top_level_keyword("ORDER BY") => {
            return Err(SqlError::validation(
                "ROW_NUMBER() paging needs an ORDER BY without bound values",
            ));
        }
        None => unordered.to_string(),
    };

    let numbered = inline
        && sql.insert_before_top_level("FROM", &format!(", ROW_NUMBER() OVER ({window}) AS ROW_NUM_"));
    if !numbered {
        sql.surround(
            &format!("SELECT ROW_NUMBER() OVER ({window}) AS ROW_NUM_, T_.* FROM ("),
            ") T_",
        );
    }

    sql.surround("SELECT * FROM (", ") R_ WHERE ");
    if paging.offset > 0 {
        sql.append("ROW_NUM_ > ")
            .add_variable(paging_value(paging.offset))
            .append(" AND ");
    }
    sql.append("ROW_NUM_ <= ")
        .add_variable(paging_value(paging.end()))
        .append(" ORDER BY ROW_NUM_");
    Ok(())
}

/// `1` / `0` for products without a boolean literal.
pub(crate) fn numeric_boolean(value: bool) -> String {
    let literal = if value { "1" } else { "0" };
    literal.to_string()
}

pub(crate) fn format_datetime(datetime: &NaiveDateTime) -> String {
    datetime.format("%Y-%m-%d %H:%M:%S%.f").to_string()
}

pub(crate) fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02X}")).collect()
}

#[cfg(test)]
mod tests;
