use super::{AllFieldColumn, FieldColumn, FieldColumns, JoinFieldColumns, TableJoin};
use crate::error::{SqlError, SqlResult};
use crate::value::{Value, ValueType};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Raw table metadata as produced by a scanner.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDef {
    pub table_name: String,
    pub columns: Vec<FieldColumn>,
}

impl TableDef {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            columns: Vec::new(),
        }
    }

    pub fn column(mut self, column: FieldColumn) -> Self {
        self.columns.push(column);
        self
    }
}

/// Validated metadata of one entity.
#[derive(Debug)]
pub struct TableInfo {
    pub entity: String,
    pub table_name: String,
    pub columns: AllFieldColumn,
}

impl TableInfo {
    /// Validate a scanned definition.
    pub fn new(entity: impl Into<String>, def: TableDef) -> SqlResult<Self> {
        let entity = entity.into();
        if def.table_name.trim().is_empty() {
            return Err(SqlError::configuration(format!(
                "entity '{entity}' has no table name"
            )));
        }
        if def.columns.is_empty() {
            return Err(SqlError::configuration(format!(
                "entity '{entity}' has no columns"
            )));
        }
        let columns = FieldColumns::new(entity.as_str(), def.columns)?;
        Ok(Self {
            entity,
            table_name: def.table_name,
            columns: AllFieldColumn::new(columns),
        })
    }
}

/// Source of table metadata.
///
/// Implementations may reflect over a database, read generated code, or
/// serve a fixed registry; the cache calls them at most once per entity
/// in the common case.
pub trait TableInfoScans: Send + Sync {
    /// Metadata of `entity`. Unknown entities are a configuration error.
    fn scan_table(&self, entity: &str) -> SqlResult<TableDef>;
}

/// A fixed, in-memory [`TableInfoScans`] implementation.
#[derive(Debug, Clone, Default)]
pub struct TableRegistry {
    tables: HashMap<String, TableDef>,
}

#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    tables: HashMap<String, TableEntry>,
}

#[derive(Debug, Deserialize)]
struct TableEntry {
    table: String,
    #[serde(default)]
    columns: Vec<ColumnEntry>,
}

#[derive(Debug, Deserialize)]
struct ColumnEntry {
    field: String,
    column: Option<String>,
    column_text: Option<String>,
    #[serde(default, rename = "type")]
    value_type: ValueType,
    sql_type: Option<String>,
    #[serde(default)]
    primary_key: bool,
    insertable: Option<bool>,
    updatable: Option<bool>,
    default: Option<toml::Value>,
}

impl ColumnEntry {
    fn into_column(self) -> SqlResult<FieldColumn> {
        let mut column = match self.column {
            Some(name) => FieldColumn::new(&self.field, name),
            None => FieldColumn::from_field(&self.field),
        };
        column = column.value_type(self.value_type);
        if self.primary_key {
            column = column.primary_key();
        }
        if let Some(text) = self.column_text {
            column = column.column_text(text);
        }
        if let Some(sql_type) = self.sql_type {
            column = column.sql_type(sql_type);
        }
        if let Some(insertable) = self.insertable {
            column = column.insertable(insertable);
        }
        if let Some(updatable) = self.updatable {
            column = column.updatable(updatable);
        }
        if let Some(default) = self.default {
            column = column.default_value(toml_to_value(&self.field, default)?);
        }
        Ok(column)
    }
}

fn toml_to_value(field: &str, value: toml::Value) -> SqlResult<Value> {
    Ok(match value {
        toml::Value::String(s) => Value::Text(s),
        toml::Value::Integer(i) => Value::Int(i),
        toml::Value::Float(f) => Value::Float(f),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::Text(dt.to_string()),
        toml::Value::Array(items) => Value::List(
            items
                .into_iter()
                .map(|item| toml_to_value(field, item))
                .collect::<SqlResult<_>>()?,
        ),
        toml::Value::Table(_) => {
            return Err(SqlError::configuration(format!(
                "default of field '{field}' must be a scalar or an array"
            )));
        }
    })
}

impl TableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) an entity.
    pub fn register(&mut self, entity: impl Into<String>, def: TableDef) -> &mut Self {
        self.tables.insert(entity.into(), def);
        self
    }

    /// Builder form of [`register`](Self::register).
    pub fn table(mut self, entity: impl Into<String>, def: TableDef) -> Self {
        self.register(entity, def);
        self
    }

    pub fn contains(&self, entity: &str) -> bool {
        self.tables.contains_key(entity)
    }

    /// Load a registry from TOML.
    ///
    /// ```toml
    /// [tables.User]
    /// table = "TB_USER"
    ///
    /// [[tables.User.columns]]
    /// field = "id"
    /// type = "integer"
    /// primary_key = true
    ///
    /// [[tables.User.columns]]
    /// field = "userName"          # column defaults to USER_NAME
    /// ```
    pub fn from_toml_str(text: &str) -> SqlResult<Self> {
        let file: RegistryFile = toml::from_str(text)?;
        let mut registry = Self::new();
        for (entity, entry) in file.tables {
            let columns = entry
                .columns
                .into_iter()
                .map(ColumnEntry::into_column)
                .collect::<SqlResult<Vec<_>>>()?;
            registry.register(
                entity,
                TableDef {
                    table_name: entry.table,
                    columns,
                },
            );
        }
        Ok(registry)
    }
}

impl TableInfoScans for TableRegistry {
    fn scan_table(&self, entity: &str) -> SqlResult<TableDef> {
        self.tables
            .get(entity)
            .cloned()
            .ok_or_else(|| SqlError::configuration(format!("unknown entity '{entity}'")))
    }
}

/// Shared cache of table and join metadata.
///
/// Lookups take a read lock; a miss scans outside any lock and then
/// publishes with first-insert-wins, so concurrent first lookups of the
/// same entity all observe one instance.
pub struct MetadataCache {
    scanner: Arc<dyn TableInfoScans>,
    tables: RwLock<HashMap<String, Arc<TableInfo>>>,
    joins: RwLock<HashMap<String, Arc<JoinFieldColumns>>>,
}

impl std::fmt::Debug for MetadataCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataCache")
            .field("tables", &self.tables.read().unwrap_or_else(PoisonError::into_inner).len())
            .field("joins", &self.joins.read().unwrap_or_else(PoisonError::into_inner).len())
            .finish()
    }
}

impl MetadataCache {
    pub fn new(scanner: Arc<dyn TableInfoScans>) -> Self {
        Self {
            scanner,
            tables: RwLock::new(HashMap::new()),
            joins: RwLock::new(HashMap::new()),
        }
    }

    /// Metadata of `entity`, scanning it on first use.
    pub fn table(&self, entity: &str) -> SqlResult<Arc<TableInfo>> {
        if let Some(info) = self
            .tables
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(entity)
        {
            return Ok(info.clone());
        }

        let info = Arc::new(TableInfo::new(entity, self.scanner.scan_table(entity)?)?);
        tracing::debug!(
            target: "sqlweave.cache",
            entity,
            table = %info.table_name,
            columns = info.columns.len(),
            "scanned table metadata"
        );

        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        Ok(tables.entry(entity.to_string()).or_insert(info).clone())
    }

    /// Field metadata of a join, built on first use.
    pub fn join(&self, join: &TableJoin) -> SqlResult<Arc<JoinFieldColumns>> {
        let key = join.cache_key();
        if let Some(columns) = self
            .joins
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
        {
            return Ok(columns.clone());
        }

        let infos = join
            .tables()
            .map(|t| self.table(&t.entity))
            .collect::<SqlResult<Vec<_>>>()?;
        let built = Arc::new(JoinFieldColumns::build(join, &infos)?);
        tracing::debug!(target: "sqlweave.cache", join = %key, columns = built.columns().len(), "built join metadata");

        let mut joins = self.joins.write().unwrap_or_else(PoisonError::into_inner);
        Ok(joins.entry(key).or_insert(built).clone())
    }

    /// Drop cached metadata of `entity` and every join using it.
    pub fn invalidate(&self, entity: &str) {
        self.tables
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(entity);
        self.joins
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|_, j| j.tables().iter().all(|t| t.item.entity != entity));
        tracing::debug!(target: "sqlweave.cache", entity, "invalidated");
    }

    /// Drop everything.
    pub fn clear(&self) {
        self.tables.write().unwrap_or_else(PoisonError::into_inner).clear();
        self.joins.write().unwrap_or_else(PoisonError::into_inner).clear();
    }
}
