use super::children::recursive_cte_sql;
use super::{
    ChildrenQuery, DbVersion, Dialect, format_datetime, numeric_boolean, paging_value, row_number_paging, to_hex,
};
use crate::buffer::SqlBuffer;
use crate::condition::Paging;
use crate::config::DialectOptions;
use crate::error::{SqlError, SqlResult};
use chrono::{NaiveDate, NaiveDateTime};

/// SQL Server.
///
/// 2012 and later page with `OFFSET ... FETCH`; older releases use `TOP`
/// and `ROW_NUMBER()` wrapping.
#[derive(Debug, Clone)]
pub struct SqlServerDialect {
    version: DbVersion,
    options: DialectOptions,
}

impl SqlServerDialect {
    pub fn new(version: DbVersion, options: DialectOptions) -> Self {
        Self { version, options }
    }

    /// Rewrite `SELECT [DISTINCT] ...` into `SELECT [DISTINCT] TOP (?) ...`.
    fn insert_top(sql: &mut SqlBuffer, rows: u64) -> SqlResult<()> {
        if !sql.trim_leading_token("SELECT") {
            return Err(SqlError::validation(
                "SQL Server legacy paging requires a statement starting with SELECT",
            ));
        }
        let distinct = sql.trim_leading_token("DISTINCT");

        let mut head = SqlBuffer::with_text(if distinct {
            "SELECT DISTINCT TOP ("
        } else {
            "SELECT TOP ("
        });
        head.add_variable(paging_value(rows)).append(") ");
        sql.prepend_buffer(&head);
        Ok(())
    }
}

impl Dialect for SqlServerDialect {
    fn version(&self) -> &DbVersion {
        &self.version
    }

    fn options(&self) -> &DialectOptions {
        &self.options
    }

    fn boolean_literal(&self, value: bool) -> String {
        numeric_boolean(value)
    }

    fn date_literal(&self, date: &NaiveDate) -> String {
        format!("'{}'", date.format("%Y-%m-%d"))
    }

    fn datetime_literal(&self, datetime: &NaiveDateTime) -> String {
        format!("'{}'", format_datetime(datetime))
    }

    fn bytes_literal(&self, bytes: &[u8]) -> String {
        format!("0x{}", to_hex(bytes))
    }

    fn concat_pattern(&self, leading: bool, pattern: String, trailing: bool) -> SqlBuffer {
        let mut sql = SqlBuffer::new();
        if leading {
            sql.append("'%' + ");
        }
        sql.add_variable(pattern);
        if trailing {
            sql.append(" + '%'");
        }
        sql
    }

    fn supports_nulls_ordering(&self) -> bool {
        false
    }

    fn process_paging_sql(&self, sql: &mut SqlBuffer, paging: &Paging) -> SqlResult<()> {
        if !paging.is_paged() {
            return Ok(());
        }

        if self.version.at_least(2012, 0) {
            if !sql.has_top_level_keyword("ORDER BY") {
                sql.append(" ORDER BY (SELECT NULL)");
            }
            sql.append(" OFFSET ")
                .add_variable(paging_value(paging.offset))
                .append(" ROWS FETCH NEXT ")
                .add_variable(paging_value(paging.rows))
                .append(" ROWS ONLY");
            return Ok(());
        }

        if paging.offset == 0 {
            return Self::insert_top(sql, paging.rows);
        }

        if !sql.starts_with_keyword("SELECT") {
            return Err(SqlError::validation(
                "SQL Server legacy paging requires a statement starting with SELECT",
            ));
        }
        // A row number in a DISTINCT select list would defeat the DISTINCT.
        let inline = !sql.starts_with_keyword("SELECT DISTINCT");
        row_number_paging(sql, paging, "ORDER BY (SELECT NULL)", inline)
    }

    fn build_find_children_sql(&self, query: &ChildrenQuery) -> SqlResult<SqlBuffer> {
        recursive_cte_sql(query, false, true)
    }
}
