use super::{append_clause, select_sql, traced};
use crate::buffer::SqlBuffer;
use crate::condition::{DbInsert, DbUpdate, DbWhere, Orderings, Paging};
use crate::dialect::Dialect;
use crate::error::{SqlError, SqlResult};
use crate::fragment::FragmentHelper;
use crate::model::{AllFieldColumn, FieldColumns, TableInfo};
use crate::operator::OperatorRegistry;
use crate::value::Value;
use std::sync::Arc;

/// Statement builder for one entity.
///
/// ```ignore
/// let users = engine.table("User")?;
/// let mut conditions = DbWhere::new();
/// conditions.on("age$GreaterThen", 18);
/// let sql = users.list(&conditions, &Orderings::parse("name")?, &Paging::page(1, 20)?)?;
/// ```
#[derive(Debug, Clone)]
pub struct TableSqlBuilder {
    dialect: Arc<dyn Dialect>,
    operators: Arc<OperatorRegistry>,
    table: Arc<TableInfo>,
    allow_empty_where: bool,
}

impl TableSqlBuilder {
    pub fn new(dialect: Arc<dyn Dialect>, operators: Arc<OperatorRegistry>, table: Arc<TableInfo>) -> Self {
        Self {
            dialect,
            operators,
            table,
            allow_empty_where: false,
        }
    }

    /// Allow UPDATE/DELETE without conditions.
    pub fn allow_empty_where(mut self, allow: bool) -> Self {
        self.allow_empty_where = allow;
        self
    }

    pub fn entity(&self) -> &str {
        &self.table.entity
    }

    pub fn table_name(&self) -> &str {
        &self.table.table_name
    }

    pub fn columns(&self) -> &AllFieldColumn {
        &self.table.columns
    }

    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    /// Fragment helper over this entity's fields.
    pub fn fragments(&self) -> FragmentHelper<'_> {
        FragmentHelper::new(self.dialect.as_ref(), &self.operators, &self.table.columns)
    }

    fn from_sql(&self) -> SqlBuffer {
        SqlBuffer::with_text(format!("FROM {}", self.table.table_name))
    }

    fn require_where(&self, statement: &str, conditions: &DbWhere, where_sql: &SqlBuffer) -> SqlResult<()> {
        if where_sql.is_blank() && !conditions.is_everything() && !self.allow_empty_where {
            return Err(SqlError::validation(format!(
                "{statement} on '{}' without conditions; use DbWhere::everything() to target all rows",
                self.entity()
            )));
        }
        Ok(())
    }

    // ==================== Queries ====================

    /// SELECT every field.
    pub fn find(&self, conditions: &DbWhere, orderings: &Orderings) -> SqlResult<SqlBuffer> {
        self.find_fields(self.table.columns.all(), conditions, orderings)
    }

    /// SELECT the given fields only.
    pub fn find_fields(
        &self,
        fields: &FieldColumns,
        conditions: &DbWhere,
        orderings: &Orderings,
    ) -> SqlResult<SqlBuffer> {
        let helper = self.fragments();
        let sql = select_sql(
            helper.build_select_fields_sql(fields),
            self.from_sql(),
            helper.build_where_sql(conditions)?,
            helper.build_order_by_sql(orderings)?,
        );
        Ok(traced("select", sql, self.dialect()))
    }

    /// SELECT one row by primary key.
    ///
    /// Entities with a composite key need a regular [`find`](Self::find).
    pub fn find_by_id(&self, id: impl Into<Value>) -> SqlResult<SqlBuffer> {
        let keys = self.table.columns.primary_keys();
        let [key] = keys.items() else {
            return Err(SqlError::configuration(format!(
                "entity '{}' has {} primary key fields, expected one",
                self.entity(),
                keys.len()
            )));
        };
        let mut conditions = DbWhere::new();
        conditions.on(&key.field_name, id);
        self.find(&conditions, &Orderings::new())
    }

    /// SELECT with paging applied. Unpaged when `paging` has no rows.
    pub fn list(&self, conditions: &DbWhere, orderings: &Orderings, paging: &Paging) -> SqlResult<SqlBuffer> {
        let helper = self.fragments();
        let mut sql = select_sql(
            helper.build_select_fields_sql(self.table.columns.all()),
            self.from_sql(),
            helper.build_where_sql(conditions)?,
            helper.build_order_by_sql(orderings)?,
        );
        if paging.is_paged() {
            self.dialect.process_paging_sql(&mut sql, paging)?;
        }
        Ok(traced("list", sql, self.dialect()))
    }

    /// `SELECT COUNT(*) FROM ...`.
    pub fn count(&self, conditions: &DbWhere) -> SqlResult<SqlBuffer> {
        let mut sql = SqlBuffer::with_text("SELECT COUNT(*) ");
        sql.push_buffer(self.from_sql());
        append_clause(&mut sql, self.fragments().build_where_sql(conditions)?);
        Ok(traced("count", sql, self.dialect()))
    }

    /// Row count per distinct combination of `group_fields`:
    /// `SELECT A, B, COUNT(*) AS TOTAL_COUNT ... GROUP BY A, B`.
    pub fn group_count<S: AsRef<str>>(
        &self,
        group_fields: &[S],
        conditions: &DbWhere,
        orderings: &Orderings,
    ) -> SqlResult<SqlBuffer> {
        if group_fields.is_empty() {
            return Err(SqlError::validation("group count needs at least one group field"));
        }
        let helper = self.fragments();
        let groups = self.table.columns.include(group_fields)?;
        let columns = groups
            .iter()
            .map(|c| c.full_column_name())
            .collect::<Vec<_>>()
            .join(", ");

        let mut sql = helper.build_select_fields_sql(&groups);
        sql.prepend("SELECT ")
            .append(", COUNT(*) AS TOTAL_COUNT ")
            .push_buffer(self.from_sql());
        append_clause(&mut sql, helper.build_where_sql(conditions)?);
        sql.append(" GROUP BY ").append(&columns);
        append_clause(&mut sql, helper.build_order_by_sql(orderings)?);
        Ok(traced("group_count", sql, self.dialect()))
    }

    /// Every row reachable from `start_codes` through the
    /// `parent_field -> code_field` relation, roots included.
    pub fn find_children(
        &self,
        code_field: &str,
        parent_field: &str,
        start_codes: Vec<Value>,
        conditions: &DbWhere,
        orderings: &Orderings,
    ) -> SqlResult<SqlBuffer> {
        let sql = self.fragments().build_find_children_sql(
            &self.table.table_name,
            code_field,
            parent_field,
            start_codes,
            conditions,
            orderings,
        )?;
        Ok(traced("find_children", sql, self.dialect()))
    }

    // ==================== Mutations ====================

    /// `INSERT INTO T (A, B) VALUES (?, ?)`.
    pub fn insert(&self, values: &DbInsert) -> SqlResult<SqlBuffer> {
        let (columns, placeholders) = self.fragments().build_insert_sql(values)?;
        let mut sql = SqlBuffer::with_text(format!("INSERT INTO {} ", self.table.table_name));
        sql.push_buffer(columns).append(" VALUES ").push_buffer(placeholders);
        Ok(traced("insert", sql, self.dialect()))
    }

    /// `UPDATE T SET ... WHERE ...`.
    pub fn update(&self, update: &DbUpdate, conditions: &DbWhere) -> SqlResult<SqlBuffer> {
        let helper = self.fragments();
        let set_sql = helper.build_update_set_sql(update)?;
        if set_sql.is_blank() {
            return Err(SqlError::validation(format!(
                "UPDATE on '{}' requires at least one assignment",
                self.entity()
            )));
        }
        let where_sql = helper.build_where_sql(conditions)?;
        self.require_where("UPDATE", conditions, &where_sql)?;

        let mut sql = SqlBuffer::with_text(format!("UPDATE {} ", self.table.table_name));
        sql.push_buffer(set_sql);
        append_clause(&mut sql, where_sql);
        Ok(traced("update", sql, self.dialect()))
    }

    /// `DELETE FROM T WHERE ...`.
    pub fn delete(&self, conditions: &DbWhere) -> SqlResult<SqlBuffer> {
        let where_sql = self.fragments().build_where_sql(conditions)?;
        self.require_where("DELETE", conditions, &where_sql)?;

        let mut sql = SqlBuffer::with_text("DELETE ");
        sql.push_buffer(self.from_sql());
        append_clause(&mut sql, where_sql);
        Ok(traced("delete", sql, self.dialect()))
    }
}
