use super::children::recursive_cte_sql;
use super::postgres::limit_offset;
use super::{ChildrenQuery, DbVersion, Dialect, format_datetime, numeric_boolean};
use crate::buffer::SqlBuffer;
use crate::condition::Paging;
use crate::config::DialectOptions;
use crate::error::SqlResult;
use chrono::{NaiveDate, NaiveDateTime};

/// SQLite. Dates are stored as ISO-8601 text.
#[derive(Debug, Clone)]
pub struct SqliteDialect {
    version: DbVersion,
    options: DialectOptions,
}

impl SqliteDialect {
    pub fn new(version: DbVersion, options: DialectOptions) -> Self {
        Self { version, options }
    }
}

impl Dialect for SqliteDialect {
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

    fn process_paging_sql(&self, sql: &mut SqlBuffer, paging: &Paging) -> SqlResult<()> {
        limit_offset(sql, paging);
        Ok(())
    }

    fn build_find_children_sql(&self, query: &ChildrenQuery) -> SqlResult<SqlBuffer> {
        recursive_cte_sql(query, true, false)
    }
}
