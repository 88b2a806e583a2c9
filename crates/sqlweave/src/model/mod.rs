//! Field to column metadata.
//!
//! A [`FieldColumn`] maps one logical field to a physical column. Field sets
//! ([`FieldColumns`], [`AllFieldColumn`]) resolve field references, including
//! `alias.field` references across joined tables, and derive scene, include
//! and exclude views without mutating the source.
//!
//! Metadata comes from a [`TableInfoScans`] implementation and is cached by a
//! [`MetadataCache`] injected into the engine.

mod cache;
mod columns;
mod join;

pub use cache::{MetadataCache, TableDef, TableInfo, TableInfoScans, TableRegistry};
pub use columns::{AllFieldColumn, FieldColumns};
pub use join::{ColumnRoute, JoinFieldColumns, JoinItem, JoinTable, JoinType, TableItem, TableJoin};

use crate::value::{Value, ValueType};
use heck::ToShoutySnakeCase;

/// Usage context deciding which fields apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldScene {
    /// Insertable fields.
    Insert,
    /// Updatable fields.
    Update,
    /// Fields usable in conditions: insertable or updatable.
    Condition,
    /// Every field.
    Result,
}

impl FieldScene {
    pub(crate) const ALL: [FieldScene; 4] = [
        FieldScene::Insert,
        FieldScene::Update,
        FieldScene::Condition,
        FieldScene::Result,
    ];

    pub(crate) fn index(self) -> usize {
        match self {
            FieldScene::Insert => 0,
            FieldScene::Update => 1,
            FieldScene::Condition => 2,
            FieldScene::Result => 3,
        }
    }

    /// Whether `column` belongs to this scene.
    pub fn accepts(self, column: &FieldColumn) -> bool {
        match self {
            FieldScene::Insert => column.insertable,
            FieldScene::Update => column.updatable,
            FieldScene::Condition => column.insertable || column.updatable,
            FieldScene::Result => true,
        }
    }
}

/// Split `alias.name` into `(Some(alias), name)`.
pub(crate) fn split_reference(reference: &str) -> (Option<&str>, &str) {
    match reference.trim().split_once('.') {
        Some((alias, name)) if !alias.is_empty() => (Some(alias), name),
        Some((_, name)) => (None, name),
        None => (None, reference.trim()),
    }
}

/// Default column name for a field: `createTime` becomes `CREATE_TIME`.
pub fn default_column_name(field_name: &str) -> String {
    field_name.to_shouty_snake_case()
}

/// One field's mapping to a physical column.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldColumn {
    pub field_name: String,
    pub column_name: String,
    pub table_alias: Option<String>,
    /// Result-set label when the column must be renamed (joins).
    pub column_alias: Option<String>,
    /// SQL expression replacing the plain column (computed columns).
    pub column_text: Option<String>,
    pub value_type: ValueType,
    pub sql_type: Option<String>,
    pub primary_key: bool,
    pub insertable: bool,
    pub updatable: bool,
    /// Value used on INSERT when the field is not supplied.
    pub default_value: Option<Value>,
}

impl FieldColumn {
    /// Create a column mapping.
    ///
    /// A dotted field name (`u.name`) is split into a table alias and the
    /// bare field name.
    pub fn new(field_name: &str, column_name: impl Into<String>) -> Self {
        let (alias, name) = split_reference(field_name);
        Self {
            field_name: name.to_string(),
            column_name: column_name.into(),
            table_alias: alias.map(str::to_string),
            column_alias: None,
            column_text: None,
            value_type: ValueType::default(),
            sql_type: None,
            primary_key: false,
            insertable: true,
            updatable: true,
            default_value: None,
        }
    }

    /// Create a mapping whose column name is derived from the field name.
    pub fn from_field(field_name: &str) -> Self {
        let (_, name) = split_reference(field_name);
        let column = default_column_name(name);
        Self::new(field_name, column)
    }

    pub fn table_alias(mut self, alias: impl Into<String>) -> Self {
        self.table_alias = Some(alias.into());
        self
    }

    pub fn column_alias(mut self, alias: impl Into<String>) -> Self {
        self.column_alias = Some(alias.into());
        self
    }

    pub fn column_text(mut self, text: impl Into<String>) -> Self {
        self.column_text = Some(text.into());
        self
    }

    pub fn value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = value_type;
        self
    }

    pub fn sql_type(mut self, sql_type: impl Into<String>) -> Self {
        self.sql_type = Some(sql_type.into());
        self
    }

    /// Mark as primary key. Primary keys are not updatable.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.updatable = false;
        self
    }

    pub fn insertable(mut self, insertable: bool) -> Self {
        self.insertable = insertable;
        self
    }

    pub fn updatable(mut self, updatable: bool) -> Self {
        self.updatable = updatable;
        self
    }

    /// Neither insertable nor updatable (e.g. computed columns).
    pub fn read_only(self) -> Self {
        self.insertable(false).updatable(false)
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// `alias.field`, or the bare field name without an alias.
    pub fn qualified_field_name(&self) -> String {
        match &self.table_alias {
            Some(alias) => format!("{alias}.{}", self.field_name),
            None => self.field_name.clone(),
        }
    }

    /// The column as referenced in SQL: the column text, `alias.COLUMN`, or
    /// `COLUMN`.
    pub fn full_column_name(&self) -> String {
        if let Some(text) = &self.column_text {
            return text.clone();
        }
        match &self.table_alias {
            Some(alias) => format!("{alias}.{}", self.column_name),
            None => self.column_name.clone(),
        }
    }

    /// Select list entry: `alias.COLUMN AS alias_COLUMN` when aliased.
    pub fn select_expr(&self) -> String {
        match &self.column_alias {
            Some(label) => format!("{} AS {label}", self.full_column_name()),
            None if self.column_text.is_some() => {
                format!("{} AS {}", self.full_column_name(), self.column_name)
            }
            None => self.full_column_name(),
        }
    }

    /// Result-set label of this column.
    pub fn result_label(&self) -> &str {
        self.column_alias.as_deref().unwrap_or(&self.column_name)
    }

    fn alias_matches(&self, alias: Option<&str>) -> bool {
        match (self.table_alias.as_deref(), alias) {
            (Some(mine), Some(theirs)) => mine.eq_ignore_ascii_case(theirs),
            _ => true,
        }
    }

    /// Whether a field reference (`name` or `alias.name`) refers to this
    /// field. Aliases compare case-insensitively and only when both sides
    /// have one; field names compare case-sensitively.
    pub fn matches_field(&self, reference: &str) -> bool {
        let (alias, name) = split_reference(reference);
        self.field_name == name && self.alias_matches(alias)
    }

    /// Like [`matches_field`](Self::matches_field) for column names, which
    /// compare case-insensitively.
    pub fn matches_column(&self, reference: &str) -> bool {
        let (alias, name) = split_reference(reference);
        self.column_name.eq_ignore_ascii_case(name) && self.alias_matches(alias)
    }
}
