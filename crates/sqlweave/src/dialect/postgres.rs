use super::children::recursive_cte_sql;
use super::{ChildrenQuery, DbVersion, Dialect, paging_value, to_hex};
use crate::buffer::SqlBuffer;
use crate::condition::Paging;
use crate::config::DialectOptions;
use crate::error::SqlResult;

/// PostgreSQL.
#[derive(Debug, Clone)]
pub struct PostgresDialect {
    version: DbVersion,
    options: DialectOptions,
}

impl PostgresDialect {
    pub fn new(version: DbVersion, options: DialectOptions) -> Self {
        Self { version, options }
    }
}

impl Dialect for PostgresDialect {
    fn version(&self) -> &DbVersion {
        &self.version
    }

    fn options(&self) -> &DialectOptions {
        &self.options
    }

    fn bytes_literal(&self, bytes: &[u8]) -> String {
        format!("'\\x{}'::bytea", to_hex(bytes))
    }

    fn process_paging_sql(&self, sql: &mut SqlBuffer, paging: &Paging) -> SqlResult<()> {
        limit_offset(sql, paging);
        Ok(())
    }

    fn build_find_children_sql(&self, query: &ChildrenQuery) -> SqlResult<SqlBuffer> {
        recursive_cte_sql(query, true, false)
    }
}

/// `LIMIT ?` / `LIMIT ? OFFSET ?`
pub(crate) fn limit_offset(sql: &mut SqlBuffer, paging: &Paging) {
    if !paging.is_paged() {
        return;
    }
    sql.append(" LIMIT ").add_variable(paging_value(paging.rows));
    if paging.offset > 0 {
        sql.append(" OFFSET ").add_variable(paging_value(paging.offset));
    }
}
