use super::{append_clause, select_sql, traced};
use crate::buffer::SqlBuffer;
use crate::condition::{DbWhere, Orderings, Paging};
use crate::dialect::Dialect;
use crate::error::SqlResult;
use crate::fragment::FragmentHelper;
use crate::model::{ColumnRoute, FieldColumns, JoinFieldColumns};
use crate::operator::OperatorRegistry;
use serde_json::{Map, Value as JsonValue};
use std::sync::Arc;

/// Statement builder for a [`TableJoin`](crate::TableJoin).
///
/// Field references in conditions and orderings may be qualified
/// (`d.name`); a bare name shared by several tables is ambiguous.
#[derive(Debug, Clone)]
pub struct JoinSqlBuilder {
    dialect: Arc<dyn Dialect>,
    operators: Arc<OperatorRegistry>,
    join: Arc<JoinFieldColumns>,
}

impl JoinSqlBuilder {
    pub fn new(dialect: Arc<dyn Dialect>, operators: Arc<OperatorRegistry>, join: Arc<JoinFieldColumns>) -> Self {
        Self {
            dialect,
            operators,
            join,
        }
    }

    pub fn join(&self) -> &JoinFieldColumns {
        &self.join
    }

    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    /// Fragment helper over every joined field.
    pub fn fragments(&self) -> FragmentHelper<'_> {
        FragmentHelper::new(self.dialect.as_ref(), &self.operators, self.join.columns())
    }

    /// Result label to `(result field, field)` routing, in select order.
    pub fn routes(&self) -> &[ColumnRoute] {
        self.join.routes()
    }

    /// Split one flat result row into nested objects.
    pub fn split_row<L, I>(&self, row: I) -> Map<String, JsonValue>
    where
        L: AsRef<str>,
        I: IntoIterator<Item = (L, JsonValue)>,
    {
        self.join.split_row(row)
    }

    fn select(&self, fields: &FieldColumns, conditions: &DbWhere, orderings: &Orderings) -> SqlResult<SqlBuffer> {
        let helper = self.fragments();
        Ok(select_sql(
            helper.build_select_fields_sql(fields),
            helper.build_join_from_sql(&self.join)?,
            helper.build_where_sql(conditions)?,
            helper.build_order_by_sql(orderings)?,
        ))
    }

    /// SELECT every joined field.
    pub fn find(&self, conditions: &DbWhere, orderings: &Orderings) -> SqlResult<SqlBuffer> {
        let sql = self.select(self.join.columns().all(), conditions, orderings)?;
        Ok(traced("join_select", sql, self.dialect()))
    }

    /// SELECT the given fields only.
    pub fn find_fields(
        &self,
        fields: &FieldColumns,
        conditions: &DbWhere,
        orderings: &Orderings,
    ) -> SqlResult<SqlBuffer> {
        let sql = self.select(fields, conditions, orderings)?;
        Ok(traced("join_select", sql, self.dialect()))
    }

    /// SELECT with paging applied.
    pub fn list(&self, conditions: &DbWhere, orderings: &Orderings, paging: &Paging) -> SqlResult<SqlBuffer> {
        let mut sql = self.select(self.join.columns().all(), conditions, orderings)?;
        if paging.is_paged() {
            self.dialect.process_paging_sql(&mut sql, paging)?;
        }
        Ok(traced("join_list", sql, self.dialect()))
    }

    /// `SELECT COUNT(*) FROM ... JOIN ...`.
    pub fn count(&self, conditions: &DbWhere) -> SqlResult<SqlBuffer> {
        let helper = self.fragments();
        let mut sql = SqlBuffer::with_text("SELECT COUNT(*) ");
        sql.push_buffer(helper.build_join_from_sql(&self.join)?);
        append_clause(&mut sql, helper.build_where_sql(conditions)?);
        Ok(traced("join_count", sql, self.dialect()))
    }
}
