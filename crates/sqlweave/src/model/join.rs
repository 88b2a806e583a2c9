//! Multi-table field sets.
//!
//! A [`TableJoin`] declares a major table and joined tables. Resolving it
//! against table metadata yields [`JoinFieldColumns`]: every column tagged
//! with its table alias, collision-free result labels, and the routing table
//! that splits a flat result row back into one object per result field.

use super::cache::TableInfo;
use super::{AllFieldColumn, FieldColumn, FieldColumns};
use crate::error::{SqlError, SqlResult};
use serde_json::{Map, Value as JsonValue};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// SQL join type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum JoinType {
    #[default]
    Inner,
    Left,
    Right,
    Full,
}

impl JoinType {
    pub fn to_sql(self) -> &'static str {
        match self {
            JoinType::Inner => "INNER JOIN",
            JoinType::Left => "LEFT JOIN",
            JoinType::Right => "RIGHT JOIN",
            JoinType::Full => "FULL JOIN",
        }
    }
}

/// One table of a join: entity, alias and the result field receiving its
/// columns (`None` puts them at the top level of the result).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableItem {
    pub entity: String,
    pub alias: String,
    pub result_field: Option<String>,
}

impl TableItem {
    pub fn new(entity: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            alias: alias.into(),
            result_field: None,
        }
    }

    pub fn result_field(mut self, field: impl Into<String>) -> Self {
        self.result_field = Some(field.into());
        self
    }
}

/// A joined table with its ON conditions, as pairs of field references
/// (`u.id = o.userId`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JoinItem {
    pub join_type: JoinType,
    pub table: TableItem,
    pub on: Vec<(String, String)>,
}

impl JoinItem {
    pub fn new(join_type: JoinType, table: TableItem) -> Self {
        Self {
            join_type,
            table,
            on: Vec::new(),
        }
    }

    /// Add an `left = right` ON condition between field references.
    pub fn on(mut self, left: impl Into<String>, right: impl Into<String>) -> Self {
        self.on.push((left.into(), right.into()));
        self
    }
}

/// Declarative multi-table query source.
///
/// ```ignore
/// let join = TableJoin::new(TableItem::new("User", "u"))
///     .join(JoinItem::new(JoinType::Left, TableItem::new("Dept", "d").result_field("dept"))
///         .on("u.deptId", "d.id"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableJoin {
    pub major: TableItem,
    pub joins: Vec<JoinItem>,
}

impl TableJoin {
    pub fn new(major: TableItem) -> Self {
        Self {
            major,
            joins: Vec::new(),
        }
    }

    pub fn join(mut self, item: JoinItem) -> Self {
        self.joins.push(item);
        self
    }

    /// Every table in join order, major first.
    pub fn tables(&self) -> impl Iterator<Item = &TableItem> {
        std::iter::once(&self.major).chain(self.joins.iter().map(|j| &j.table))
    }

    /// Short name for messages: `Entity:alias,...` in join order.
    pub fn name(&self) -> String {
        self.tables()
            .map(|t| format!("{}:{}", t.entity, t.alias))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Deterministic cache key covering the whole join shape: tables,
    /// aliases, result fields, join types and ON pairs.
    pub fn cache_key(&self) -> String {
        let mut key = table_key(&self.major);
        for item in &self.joins {
            key.push_str(&format!(" {} {}", item.join_type.to_sql(), table_key(&item.table)));
            let on: Vec<String> = item.on.iter().map(|(l, r)| format!("{l}={r}")).collect();
            key.push_str(&format!(" ON {}", on.join("&")));
        }
        key
    }
}

fn table_key(item: &TableItem) -> String {
    match &item.result_field {
        Some(field) => format!("{}:{}[{}]", item.entity, item.alias, field),
        None => format!("{}:{}", item.entity, item.alias),
    }
}

/// Where one result column goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRoute {
    /// Result-set column label.
    pub label: String,
    /// Result field (sub-object), `None` for top level.
    pub result_field: Option<String>,
    /// Field within that object.
    pub field_name: String,
}

/// A resolved table of a join.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinTable {
    pub item: TableItem,
    pub table_name: String,
    /// `None` for the major table.
    pub join_type: Option<JoinType>,
    pub on: Vec<(String, String)>,
}

/// Field metadata of a [`TableJoin`].
///
/// Built deterministically from the join definition and table metadata
/// only; the same definition always yields the same aliases in the same
/// order.
#[derive(Debug)]
pub struct JoinFieldColumns {
    key: String,
    tables: Vec<JoinTable>,
    columns: AllFieldColumn,
    routes: Vec<ColumnRoute>,
    route_index: HashMap<String, usize>,
}

impl JoinFieldColumns {
    /// Resolve `join` against the metadata of its tables, given in join order.
    ///
    /// A field or column name occurring in more than one table gets the
    /// result label `<alias>_<COLUMN>` in every table that has it.
    pub fn build(join: &TableJoin, infos: &[Arc<TableInfo>]) -> SqlResult<Self> {
        let items: Vec<&TableItem> = join.tables().collect();
        if items.len() != infos.len() {
            return Err(SqlError::configuration(format!(
                "join '{}' has {} tables but {} were resolved",
                join.name(),
                items.len(),
                infos.len()
            )));
        }

        let mut aliases = HashSet::new();
        for item in &items {
            if item.alias.trim().is_empty() {
                return Err(SqlError::configuration(format!(
                    "table '{}' in a join needs an alias",
                    item.entity
                )));
            }
            if !aliases.insert(item.alias.to_ascii_lowercase()) {
                return Err(SqlError::configuration(format!(
                    "duplicate table alias '{}' in join '{}'",
                    item.alias,
                    join.name()
                )));
            }
        }

        let mut field_counts: HashMap<&str, usize> = HashMap::new();
        let mut column_counts: HashMap<String, usize> = HashMap::new();
        for info in infos {
            for column in info.columns.items() {
                *field_counts.entry(column.field_name.as_str()).or_default() += 1;
                *column_counts.entry(column.column_name.to_ascii_uppercase()).or_default() += 1;
            }
        }

        let mut columns = Vec::new();
        let mut routes = Vec::new();
        for (item, info) in items.iter().zip(infos) {
            for column in info.columns.items() {
                let duplicated = field_counts[column.field_name.as_str()] > 1
                    || column_counts[&column.column_name.to_ascii_uppercase()] > 1;

                let mut joined = FieldColumn {
                    table_alias: Some(item.alias.clone()),
                    ..column.clone()
                };
                if duplicated {
                    joined.column_alias = Some(format!("{}_{}", item.alias, column.column_name));
                }
                routes.push(ColumnRoute {
                    label: joined.result_label().to_string(),
                    result_field: item.result_field.clone(),
                    field_name: column.field_name.clone(),
                });
                columns.push(joined);
            }
        }

        let key = join.cache_key();
        let route_index = routes
            .iter()
            .enumerate()
            .map(|(i, r)| (r.label.to_ascii_uppercase(), i))
            .collect();
        let tables = std::iter::once((&join.major, None, Vec::new()))
            .chain(
                join.joins
                    .iter()
                    .map(|j| (&j.table, Some(j.join_type), j.on.clone())),
            )
            .zip(infos)
            .map(|((item, join_type, on), info)| JoinTable {
                item: item.clone(),
                table_name: info.table_name.clone(),
                join_type,
                on,
            })
            .collect();

        Ok(Self {
            columns: AllFieldColumn::new(FieldColumns::new(join.name(), columns)?),
            key,
            tables,
            routes,
            route_index,
        })
    }

    pub fn cache_key(&self) -> &str {
        &self.key
    }

    /// Resolved tables in join order, major first.
    pub fn tables(&self) -> &[JoinTable] {
        &self.tables
    }

    /// Every column of every table.
    pub fn columns(&self) -> &AllFieldColumn {
        &self.columns
    }

    /// Routing table, in select order.
    pub fn routes(&self) -> &[ColumnRoute] {
        &self.routes
    }

    /// Route of a result-set label (case-insensitive).
    pub fn route(&self, label: &str) -> Option<&ColumnRoute> {
        self.route_index
            .get(&label.to_ascii_uppercase())
            .map(|i| &self.routes[*i])
    }

    /// Split one flat row of `(label, value)` pairs into nested objects.
    ///
    /// Columns of a table with a result field land in a sub-object under
    /// that name; the rest go to the top level. Labels without a route are
    /// skipped.
    pub fn split_row<L, I>(&self, row: I) -> Map<String, JsonValue>
    where
        L: AsRef<str>,
        I: IntoIterator<Item = (L, JsonValue)>,
    {
        let mut out = Map::new();
        for (label, value) in row {
            let Some(route) = self.route(label.as_ref()) else {
                tracing::trace!(target: "sqlweave.sql", label = label.as_ref(), "no route for result column");
                continue;
            };
            match &route.result_field {
                None => {
                    out.insert(route.field_name.clone(), value);
                }
                Some(field) => {
                    let slot = out
                        .entry(field.clone())
                        .or_insert_with(|| JsonValue::Object(Map::new()));
                    if let JsonValue::Object(nested) = slot {
                        nested.insert(route.field_name.clone(), value);
                    }
                }
            }
        }
        out
    }
}
