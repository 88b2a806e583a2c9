use crate::buffer::SqlBuffer;
use crate::error::{SqlError, SqlResult};
use crate::value::Value;

/// Name of the recursive CTE used by descendant lookups.
pub(crate) const CHILDREN_CTE: &str = "RECURSIVE_CHILDREN";

/// Input of [`Dialect::build_find_children_sql`](super::Dialect::build_find_children_sql).
///
/// All names are physical column names. `where_sql` and `order_sql` are
/// complete `WHERE ...` / `ORDER BY ...` fragments (or blank) over those
/// columns; they filter and sort the final result, never the recursion.
#[derive(Debug, Clone, Default)]
pub struct ChildrenQuery {
    pub table: String,
    pub code_column: String,
    pub parent_column: String,
    pub select_columns: Vec<String>,
    pub start_codes: Vec<Value>,
    pub where_sql: SqlBuffer,
    pub order_sql: SqlBuffer,
}

impl ChildrenQuery {
    /// Fail on an empty root set.
    pub(crate) fn check_roots(&self) -> SqlResult<()> {
        if self.start_codes.is_empty() {
            return Err(SqlError::empty_input("FindChildren", &self.code_column));
        }
        Ok(())
    }

    /// Comma separated select list; `*` when none is given.
    pub(crate) fn select_list(&self) -> String {
        if self.select_columns.is_empty() {
            "*".to_string()
        } else {
            self.select_columns.join(", ")
        }
    }

    /// Append ` WHERE ...` and ` ORDER BY ...` when present.
    pub(crate) fn append_filters(&self, sql: &mut SqlBuffer) {
        for fragment in [&self.where_sql, &self.order_sql] {
            if !fragment.is_blank() {
                sql.append(" ").append_buffer(fragment);
            }
        }
    }
}

/// Recursive CTE form shared by the products that support one:
///
/// ```text
/// WITH [RECURSIVE] RECURSIVE_CHILDREN AS (
///     SELECT * FROM T WHERE CODE IN (?, ?)
///     UNION [ALL]
///     SELECT T.* FROM T INNER JOIN RECURSIVE_CHILDREN C ON T.PARENT = C.CODE
/// ) SELECT ... FROM RECURSIVE_CHILDREN WHERE ... ORDER BY ...
/// ```
///
/// `UNION ALL` keeps a row once per path reaching it, so that form reads the
/// final rows back from the table by code (see [`distinct_by_code`]). It has
/// no cycle guard: cyclic parent links run into the server's recursion limit.
pub(crate) fn recursive_cte_sql(query: &ChildrenQuery, recursive_keyword: bool, union_all: bool) -> SqlResult<SqlBuffer> {
    query.check_roots()?;

    let table = &query.table;
    let mut sql = SqlBuffer::with_text(if recursive_keyword { "WITH RECURSIVE " } else { "WITH " });
    sql.append(CHILDREN_CTE)
        .append(" AS (SELECT * FROM ")
        .append(table)
        .append(" WHERE ")
        .append(&query.code_column)
        .append(" IN (")
        .add_variables(query.start_codes.iter().cloned())
        .append(")")
        .append(if union_all { " UNION ALL " } else { " UNION " })
        .append(&format!(
            "SELECT T_.* FROM {table} T_ INNER JOIN {CHILDREN_CTE} C_ ON T_.{} = C_.{}",
            query.parent_column, query.code_column
        ))
        .append(")");
    if union_all {
        sql.append(" ");
        distinct_by_code(query, &format!("SELECT {} FROM {CHILDREN_CTE}", query.code_column), &mut sql);
    } else {
        sql.append(" SELECT ")
            .append(&query.select_list())
            .append(" FROM ")
            .append(CHILDREN_CTE);
        query.append_filters(&mut sql);
    }
    Ok(sql)
}

/// `SELECT ... FROM (SELECT * FROM T WHERE CODE IN (<codes>)) D_ WHERE ... ORDER BY ...`
///
/// Returns each matched row once, however many roots reach it. Avoids
/// `SELECT DISTINCT`, which rejects LOB columns and ORDER BY expressions
/// outside the select list on some products.
pub(crate) fn distinct_by_code(query: &ChildrenQuery, codes: &str, sql: &mut SqlBuffer) {
    sql.append(&format!(
        "SELECT {} FROM (SELECT * FROM {} WHERE {} IN ({codes})) D_",
        query.select_list(),
        query.table,
        query.code_column
    ));
    query.append_filters(sql);
}
