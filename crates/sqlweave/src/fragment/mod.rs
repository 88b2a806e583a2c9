//! Statement fragments rendered from abstract conditions.
//!
//! [`FragmentHelper`] ties one field set to a dialect and an operator
//! registry and turns [`DbWhere`], [`DbUpdate`], [`DbInsert`] and
//! [`Orderings`] into [`SqlBuffer`] fragments. Field references are resolved
//! through the field set; every field a request names but the entity does
//! not have is reported in one [`UnsupportedField`](SqlError::UnsupportedField)
//! error.

use crate::buffer::SqlBuffer;
use crate::condition::{DbInsert, DbUpdate, DbWhere, LogicType, Orderings, WhereItem};
use crate::dialect::{self, ChildrenQuery, Dialect};
use crate::error::{SqlError, SqlResult};
use crate::model::{AllFieldColumn, FieldColumn, FieldColumns, FieldScene, JoinFieldColumns};
use crate::operator::{Arity, OperatorRegistry, OperatorScope};
use crate::value::Value;
use std::borrow::Cow;

/// Collects unknown field references while a fragment is built.
#[derive(Debug)]
struct Unknown {
    fields: Vec<String>,
    reason: &'static str,
}

impl Unknown {
    fn new(reason: &'static str) -> Self {
        Self {
            fields: Vec::new(),
            reason,
        }
    }

    fn push(&mut self, field: &str) {
        if !self.fields.iter().any(|f| f == field) {
            self.fields.push(field.to_string());
        }
    }

    fn finish(self, owner: &str) -> SqlResult<()> {
        if self.fields.is_empty() {
            Ok(())
        } else {
            Err(SqlError::unsupported(owner, self.fields, self.reason))
        }
    }
}

/// Renders fragments for one field set.
#[derive(Debug, Clone, Copy)]
pub struct FragmentHelper<'a> {
    dialect: &'a dyn Dialect,
    operators: &'a OperatorRegistry,
    columns: &'a AllFieldColumn,
}

impl<'a> FragmentHelper<'a> {
    pub fn new(dialect: &'a dyn Dialect, operators: &'a OperatorRegistry, columns: &'a AllFieldColumn) -> Self {
        Self {
            dialect,
            operators,
            columns,
        }
    }

    pub fn dialect(&self) -> &'a dyn Dialect {
        self.dialect
    }

    pub fn columns(&self) -> &'a AllFieldColumn {
        self.columns
    }

    fn owner(&self) -> &'a str {
        self.columns.owner()
    }

    // ==================== WHERE ====================

    /// `WHERE ...`, or a blank buffer when there are no conditions.
    pub fn build_where_sql(&self, conditions: &DbWhere) -> SqlResult<SqlBuffer> {
        let mut sql = self.build_conditions_sql(conditions)?;
        sql.insert_prefix("WHERE", Some("AND|OR"));
        Ok(sql)
    }

    /// The conditions as `AND a = ? AND b IN (?, ?)`, leading keyword kept
    /// so the caller can prefix or splice it.
    pub fn build_conditions_sql(&self, conditions: &DbWhere) -> SqlResult<SqlBuffer> {
        let scene = self.columns.filter(FieldScene::Condition);
        let mut unknown = Unknown::new("unknown field in condition");
        let sql = self.render_conditions(&scene, conditions, LogicType::And, &mut unknown)?;
        unknown.finish(self.owner())?;
        Ok(sql)
    }

    fn render_conditions(
        &self,
        scene: &FieldColumns,
        conditions: &DbWhere,
        logic: LogicType,
        unknown: &mut Unknown,
    ) -> SqlResult<SqlBuffer> {
        let mut sql = SqlBuffer::new();
        for item in conditions.items() {
            let fragment = match item {
                WhereItem::Condition(c) => {
                    let Some(column) = scene.find_by_field_name(&c.field)? else {
                        unknown.push(&c.field);
                        continue;
                    };
                    self.render_condition(column, &c.field, &c.operator, &c.value)?
                }
                WhereItem::Group(group) => {
                    let mut inner = self.render_conditions(scene, &group.conditions, group.logic, unknown)?;
                    if inner.is_blank() {
                        continue;
                    }
                    inner.trim_leading_token("AND|OR");
                    inner.surround(if group.negate { "NOT (" } else { "(" }, ")");
                    inner
                }
            };
            if !sql.is_empty() {
                sql.append(" ");
            }
            sql.append(logic.keyword()).append(" ").push_buffer(fragment);
        }
        Ok(sql)
    }

    fn render_condition(&self, column: &FieldColumn, field: &str, token: &str, value: &Value) -> SqlResult<SqlBuffer> {
        let Some(operator) = self.operators.resolve(OperatorScope::Where, token, value) else {
            return Err(SqlError::unsupported(
                self.owner(),
                vec![field.to_string()],
                format!("unknown operator '{token}'"),
            ));
        };
        let value = match (operator.arity(), value) {
            (Arity::Ternary | Arity::Multivariate, Value::List(items)) if items.is_empty() => {
                return Err(SqlError::empty_input(operator.name(), field));
            }
            // `vec![1u8, 2]` converts to bytes; a list operator reads it as numbers.
            (Arity::Multivariate, Value::Bytes(bytes)) => {
                Cow::Owned(Value::List(bytes.iter().map(|b| Value::from(*b)).collect()))
            }
            _ => Cow::Borrowed(value),
        };
        operator
            .check_value(&value)
            .map_err(|reason| SqlError::unsupported(self.owner(), vec![field.to_string()], reason))?;
        operator.build_sql(&column.full_column_name(), &value, self.dialect)
    }

    // ==================== ORDER BY ====================

    /// `ORDER BY ...`, or a blank buffer without orderings.
    pub fn build_order_by_sql(&self, orderings: &Orderings) -> SqlResult<SqlBuffer> {
        let mut unknown = Unknown::new("unknown field in ordering");
        let mut items = Vec::with_capacity(orderings.items().len());
        for ordering in orderings.items() {
            match self.columns.find_by_field_name(&ordering.field)? {
                Some(column) => items.push(self.dialect.build_order_item(
                    &column.full_column_name(),
                    ordering.order,
                    ordering.nulls,
                )),
                None => unknown.push(&ordering.field),
            }
        }
        unknown.finish(self.owner())?;

        if items.is_empty() {
            return Ok(SqlBuffer::new());
        }
        Ok(SqlBuffer::with_text(format!("ORDER BY {}", items.join(", "))))
    }

    // ==================== UPDATE ====================

    /// `SET A = ?, B = B + ?`, or a blank buffer without assignments.
    ///
    /// Only updatable fields may be assigned.
    pub fn build_update_set_sql(&self, update: &DbUpdate) -> SqlResult<SqlBuffer> {
        let scene = self.columns.filter(FieldScene::Update);
        let mut unknown = Unknown::new("unknown or non-updatable field");
        let mut sql = SqlBuffer::new();
        for item in update.items() {
            let Some(column) = scene.find_by_field_name(&item.field)? else {
                unknown.push(&item.field);
                continue;
            };
            let Some(operator) = self.operators.resolve(OperatorScope::Update, &item.operator, &item.value) else {
                return Err(SqlError::unsupported(
                    self.owner(),
                    vec![item.field.clone()],
                    format!("unknown update operator '{}'", item.operator),
                ));
            };
            operator
                .check_value(&item.value)
                .map_err(|reason| SqlError::unsupported(self.owner(), vec![item.field.clone()], reason))?;
            let fragment = operator.build_sql(&column.full_column_name(), &item.value, self.dialect)?;
            sql.append(", ").push_buffer(fragment);
        }
        unknown.finish(self.owner())?;
        sql.insert_prefix("SET", Some(","));
        Ok(sql)
    }

    // ==================== SELECT / INSERT ====================

    /// Comma separated select list of `fields`.
    pub fn build_select_fields_sql(&self, fields: &FieldColumns) -> SqlBuffer {
        let list = fields.iter().map(FieldColumn::select_expr).collect::<Vec<_>>();
        SqlBuffer::with_text(list.join(", "))
    }

    /// Column list and value list of an INSERT: `(A, B)` and `(?, ?)`.
    ///
    /// Columns follow declaration order. Insertable fields missing from
    /// `values` are filled from their default value, or left out.
    pub fn build_insert_sql(&self, values: &DbInsert) -> SqlResult<(SqlBuffer, SqlBuffer)> {
        let scene = self.columns.filter(FieldScene::Insert);
        let mut unknown = Unknown::new("unknown or non-insertable field");
        for (field, _) in values.items() {
            if scene.find_by_field_name(field)?.is_none() {
                unknown.push(field);
            }
        }
        unknown.finish(self.owner())?;

        let mut names = Vec::new();
        let mut placeholders = SqlBuffer::new();
        for column in scene.iter() {
            let supplied = values
                .items()
                .iter()
                .find(|(field, _)| column.matches_field(field))
                .map(|(_, v)| v);
            let Some(value) = supplied.or(column.default_value.as_ref()) else {
                continue;
            };
            if !names.is_empty() {
                placeholders.append(", ");
            }
            names.push(column.column_name.as_str());
            placeholders.add_variable(value.clone());
        }
        if names.is_empty() {
            return Err(SqlError::validation(format!(
                "nothing to insert into '{}'",
                self.owner()
            )));
        }

        let mut columns = SqlBuffer::with_text(names.join(", "));
        columns.surround("(", ")");
        placeholders.surround("(", ")");
        Ok((columns, placeholders))
    }

    // ==================== FROM / IN / children ====================

    /// `FROM MAJOR a LEFT JOIN OTHER b ON a.X = b.Y ...` for a resolved join.
    pub fn build_join_from_sql(&self, join: &JoinFieldColumns) -> SqlResult<SqlBuffer> {
        let mut sql = SqlBuffer::new();
        let mut unknown = Unknown::new("unknown field in join condition");
        for table in join.tables() {
            let Some(join_type) = table.join_type else {
                sql.append(&format!("FROM {} {}", table.table_name, table.item.alias));
                continue;
            };
            if table.on.is_empty() {
                return Err(SqlError::configuration(format!(
                    "joined table '{}' has no ON condition",
                    table.item.alias
                )));
            }
            let mut on = Vec::with_capacity(table.on.len());
            for (left, right) in &table.on {
                let l = join.columns().find_by_field_name(left)?;
                let r = join.columns().find_by_field_name(right)?;
                match (l, r) {
                    (Some(l), Some(r)) => {
                        on.push(format!("{} = {}", l.full_column_name(), r.full_column_name()))
                    }
                    (l, r) => {
                        if l.is_none() {
                            unknown.push(left);
                        }
                        if r.is_none() {
                            unknown.push(right);
                        }
                    }
                }
            }
            sql.append(&format!(
                " {} {} {} ON {}",
                join_type.to_sql(),
                table.table_name,
                table.item.alias,
                on.join(" AND ")
            ));
        }
        unknown.finish(join.columns().owner())?;
        Ok(sql)
    }

    /// `COLUMN IN (?, ...)` for a field.
    pub fn build_in_sql(&self, field: &str, values: Vec<Value>) -> SqlResult<SqlBuffer> {
        let column = self.require(field)?;
        dialect::build_in_sql(self.dialect, &column.full_column_name(), values)
    }

    /// `COLUMN NOT IN (?, ...)` for a field.
    pub fn build_not_in_sql(&self, field: &str, values: Vec<Value>) -> SqlResult<SqlBuffer> {
        let column = self.require(field)?;
        dialect::build_not_in_sql(self.dialect, &column.full_column_name(), values)
    }

    /// Every row of `table` reachable from `start_codes` through the
    /// `parent_field -> code_field` edge, roots included. `conditions` and
    /// `orderings` apply to the final result.
    pub fn build_find_children_sql(
        &self,
        table: &str,
        code_field: &str,
        parent_field: &str,
        start_codes: Vec<Value>,
        conditions: &DbWhere,
        orderings: &Orderings,
    ) -> SqlResult<SqlBuffer> {
        let code = self.require(code_field)?;
        let parent = self.require(parent_field)?;
        let query = ChildrenQuery {
            table: table.to_string(),
            code_column: code.column_name.clone(),
            parent_column: parent.column_name.clone(),
            select_columns: self.columns.items().iter().map(FieldColumn::select_expr).collect(),
            start_codes,
            where_sql: self.build_where_sql(conditions)?,
            order_sql: self.build_order_by_sql(orderings)?,
        };
        self.dialect.build_find_children_sql(&query)
    }

    fn require(&self, field: &str) -> SqlResult<&'a FieldColumn> {
        self.columns
            .find_by_field_name(field)?
            .ok_or_else(|| SqlError::unsupported(self.owner(), vec![field.to_string()], "unknown field"))
    }
}

#[cfg(test)]
mod tests;
