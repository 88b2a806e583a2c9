use super::children::recursive_cte_sql;
use super::{ChildrenQuery, DbVersion, Dialect, numeric_boolean, paging_value, row_number_paging};
use crate::buffer::SqlBuffer;
use crate::condition::Paging;
use crate::config::DialectOptions;
use crate::error::SqlResult;

/// IBM DB2.
///
/// 11.1 and later page with `OFFSET ... FETCH FIRST`; older releases wrap
/// the statement in `ROW_NUMBER()`.
#[derive(Debug, Clone)]
pub struct Db2Dialect {
    version: DbVersion,
    options: DialectOptions,
}

impl Db2Dialect {
    pub fn new(version: DbVersion, options: DialectOptions) -> Self {
        Self { version, options }
    }
}

impl Dialect for Db2Dialect {
    fn version(&self) -> &DbVersion {
        &self.version
    }

    fn options(&self) -> &DialectOptions {
        &self.options
    }

    fn boolean_literal(&self, value: bool) -> String {
        numeric_boolean(value)
    }

    fn process_paging_sql(&self, sql: &mut SqlBuffer, paging: &Paging) -> SqlResult<()> {
        if !paging.is_paged() {
            return Ok(());
        }

        if self.version.at_least(11, 1) {
            if paging.offset > 0 {
                sql.append(" OFFSET ")
                    .add_variable(paging_value(paging.offset))
                    .append(" ROWS");
            }
            sql.append(" FETCH FIRST ")
                .add_variable(paging_value(paging.rows))
                .append(" ROWS ONLY");
            return Ok(());
        }

        // DB2 rejects a bare `*` next to other select items.
        let inline = !sql.starts_with_keyword("SELECT DISTINCT") && !sql.starts_with_keyword("SELECT *");
        row_number_paging(sql, paging, "", inline)
    }

    fn build_find_children_sql(&self, query: &ChildrenQuery) -> SqlResult<SqlBuffer> {
        recursive_cte_sql(query, false, true)
    }
}
