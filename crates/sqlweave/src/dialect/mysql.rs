use super::children::recursive_cte_sql;
use super::{ChildrenQuery, DbType, DbVersion, Dialect, paging_value};
use crate::buffer::SqlBuffer;
use crate::condition::Paging;
use crate::config::DialectOptions;
use crate::error::{SqlError, SqlResult};
use crate::value::Value;

/// MySQL and MariaDB.
///
/// Recursive CTEs exist from MySQL 8.0 and MariaDB 10.2; older servers fall
/// back to a stored procedure named by
/// [`DialectOptions::recursive_procedure`].
#[derive(Debug, Clone)]
pub struct MySqlDialect {
    version: DbVersion,
    options: DialectOptions,
}

impl MySqlDialect {
    pub fn new(version: DbVersion, options: DialectOptions) -> Self {
        Self { version, options }
    }

    fn supports_recursive_cte(&self) -> bool {
        match self.version.db_type {
            DbType::MariaDb => self.version.at_least(10, 2),
            _ => self.version.at_least(8, 0),
        }
    }

    /// `CALL <procedure>(table, code, parent, roots, columns, where, order)`
    ///
    /// Filters are handed over as literal SQL text, fully inlined, since the
    /// procedure builds its statement dynamically.
    fn build_procedure_call(&self, query: &ChildrenQuery) -> SqlResult<SqlBuffer> {
        query.check_roots()?;

        let mut codes = Vec::with_capacity(query.start_codes.len());
        for code in &query.start_codes {
            let text = match code {
                Value::Text(s) => s.clone(),
                other => self.variable_to_string(other),
            };
            // The procedure splits the root list on commas.
            if text.contains(',') {
                return Err(SqlError::validation(format!(
                    "root code '{text}' contains a comma and cannot be passed to {}",
                    self.options.recursive_procedure
                )));
            }
            codes.push(text);
        }
        let roots = codes.join(",");
        let where_text = render_filter(self, &query.where_sql);
        let order_text = render_filter(self, &query.order_sql);

        let mut sql = SqlBuffer::with_text(format!("CALL {}(", self.options.recursive_procedure));
        sql.add_variables([
            Value::from(query.table.as_str()),
            Value::from(query.code_column.as_str()),
            Value::from(query.parent_column.as_str()),
            Value::Text(roots),
            Value::Text(query.select_list()),
            Value::Text(where_text),
            Value::Text(order_text),
        ])
        .append(")");
        Ok(sql)
    }
}

fn render_filter(dialect: &MySqlDialect, fragment: &SqlBuffer) -> String {
    if fragment.is_blank() {
        String::new()
    } else {
        fragment.to_inlined_sql(dialect)
    }
}

impl Dialect for MySqlDialect {
    fn version(&self) -> &DbVersion {
        &self.version
    }

    fn options(&self) -> &DialectOptions {
        &self.options
    }

    fn string_literal(&self, text: &str) -> String {
        format!("'{}'", text.replace('\\', r"\\").replace('\'', "''"))
    }

    fn date_literal(&self, date: &chrono::NaiveDate) -> String {
        format!("'{}'", date.format("%Y-%m-%d"))
    }

    fn datetime_literal(&self, datetime: &chrono::NaiveDateTime) -> String {
        format!("'{}'", super::format_datetime(datetime))
    }

    fn concat_pattern(&self, leading: bool, pattern: String, trailing: bool) -> SqlBuffer {
        let mut sql = SqlBuffer::with_text("CONCAT(");
        if leading {
            sql.append("'%', ");
        }
        sql.add_variable(pattern);
        if trailing {
            sql.append(", '%'");
        }
        sql.append(")");
        sql
    }

    fn like_escape(&self) -> &'static str {
        r"'\\'"
    }

    fn supports_nulls_ordering(&self) -> bool {
        false
    }

    fn process_paging_sql(&self, sql: &mut SqlBuffer, paging: &Paging) -> SqlResult<()> {
        if !paging.is_paged() {
            return Ok(());
        }
        if paging.offset > 0 {
            sql.append(" LIMIT ")
                .add_variable(paging_value(paging.offset))
                .append(", ")
                .add_variable(paging_value(paging.rows));
        } else {
            sql.append(" LIMIT ").add_variable(paging_value(paging.rows));
        }
        Ok(())
    }

    fn build_find_children_sql(&self, query: &ChildrenQuery) -> SqlResult<SqlBuffer> {
        if self.supports_recursive_cte() {
            recursive_cte_sql(query, true, false)
        } else {
            self.build_procedure_call(query)
        }
    }
}
