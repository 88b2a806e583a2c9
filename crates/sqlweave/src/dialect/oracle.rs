use super::{ChildrenQuery, DbVersion, Dialect, numeric_boolean, paging_value, to_hex};
use crate::buffer::SqlBuffer;
use crate::condition::Paging;
use crate::config::DialectOptions;
use crate::error::SqlResult;
use chrono::NaiveDate;

/// Oracle rejects IN lists longer than this (ORA-01795).
const ORACLE_MAX_IN_ITEMS: usize = 1000;

/// Oracle.
///
/// Paging uses `OFFSET ... FETCH` from 12c on and nested `ROWNUM` filtering
/// before that. Descendant lookups use `CONNECT BY`.
#[derive(Debug, Clone)]
pub struct OracleDialect {
    version: DbVersion,
    options: DialectOptions,
}

impl OracleDialect {
    pub fn new(version: DbVersion, options: DialectOptions) -> Self {
        Self { version, options }
    }
}

impl Dialect for OracleDialect {
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
        format!("TO_DATE('{}', 'YYYY-MM-DD')", date.format("%Y-%m-%d"))
    }

    fn bytes_literal(&self, bytes: &[u8]) -> String {
        format!("HEXTORAW('{}')", to_hex(bytes))
    }

    fn max_in_items(&self) -> Option<usize> {
        self.options.max_in_items.or(Some(ORACLE_MAX_IN_ITEMS))
    }

    fn process_paging_sql(&self, sql: &mut SqlBuffer, paging: &Paging) -> SqlResult<()> {
        if !paging.is_paged() {
            return Ok(());
        }

        if self.version.at_least(12, 0) {
            if paging.offset > 0 {
                sql.append(" OFFSET ")
                    .add_variable(paging_value(paging.offset))
                    .append(" ROWS FETCH NEXT ")
                    .add_variable(paging_value(paging.rows))
                    .append(" ROWS ONLY");
            } else {
                sql.append(" FETCH FIRST ")
                    .add_variable(paging_value(paging.rows))
                    .append(" ROWS ONLY");
            }
            return Ok(());
        }

        if paging.offset > 0 {
            sql.surround("SELECT * FROM (SELECT T_.*, ROWNUM ROWNUM_ FROM (", ") T_ WHERE ROWNUM <= ");
            sql.add_variable(paging_value(paging.end()))
                .append(") WHERE ROWNUM_ > ")
                .add_variable(paging_value(paging.offset));
        } else {
            sql.surround("SELECT * FROM (", ") WHERE ROWNUM <= ");
            sql.add_variable(paging_value(paging.rows));
        }
        Ok(())
    }

    fn build_find_children_sql(&self, query: &ChildrenQuery) -> SqlResult<SqlBuffer> {
        query.check_roots()?;

        let mut roots = SqlBuffer::with_text(format!(
            "SELECT {} FROM {} START WITH {} IN (",
            query.code_column, query.table, query.code_column
        ));
        roots
            .add_variables(query.start_codes.iter().cloned())
            .append(&format!(
                ") CONNECT BY NOCYCLE PRIOR {} = {}",
                query.code_column, query.parent_column
            ));

        let mut sql = SqlBuffer::with_text(format!(
            "SELECT {} FROM (SELECT * FROM {} WHERE {} IN (",
            query.select_list(),
            query.table,
            query.code_column
        ));
        sql.push_buffer(roots).append(")) D_");
        query.append_filters(&mut sql);
        Ok(sql)
    }
}
