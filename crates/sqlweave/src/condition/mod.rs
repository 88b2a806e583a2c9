//! Abstract statement inputs: WHERE conditions, UPDATE assignments, INSERT
//! values, orderings and paging.
//!
//! These types refer to *fields* (logical names), never to columns; the
//! [`FragmentHelper`](crate::FragmentHelper) resolves fields to columns and
//! operators to SQL.
//!
//! # Example
//! ```ignore
//! use sqlweave::{DbWhere, SubWhere};
//!
//! let mut w = DbWhere::new();
//! w.on("age$GreaterThen", 18)
//!     .on("state$In", vec![1, 2, 3])
//!     .or_group(|g| {
//!         g.on("name$StartsWith", "A").on("name$StartsWith", "B");
//!     });
//! ```

mod order;
mod paging;
mod params;

pub use order::{NullsOrder, OrderType, Ordering, Orderings};
pub use paging::Paging;

use crate::value::Value;

/// Default operator token for WHERE conditions.
pub const DEFAULT_WHERE_OPERATOR: &str = "Equals";
/// Default operator token for UPDATE assignments.
pub const DEFAULT_UPDATE_OPERATOR: &str = "Set";

/// Split `field$Operator` into the field and the optional operator token.
pub fn split_operator(token: &str) -> (&str, Option<&str>) {
    match token.split_once('$') {
        Some((field, op)) if !op.trim().is_empty() => (field.trim(), Some(op.trim())),
        Some((field, _)) => (field.trim(), None),
        None => (token.trim(), None),
    }
}

/// One `(field, operator, value)` tuple.
#[derive(Debug, Clone, PartialEq)]
pub struct DbCondition {
    pub field: String,
    pub operator: String,
    pub value: Value,
}

impl DbCondition {
    pub fn new(field: impl Into<String>, operator: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator: operator.into(),
            value: value.into(),
        }
    }
}

/// How the members of a group are joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogicType {
    #[default]
    And,
    Or,
}

impl LogicType {
    pub fn keyword(self) -> &'static str {
        match self {
            LogicType::And => "AND",
            LogicType::Or => "OR",
        }
    }
}

/// A parenthesized group of conditions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SubWhere {
    pub logic: LogicType,
    pub negate: bool,
    pub conditions: DbWhere,
}

/// An entry of a [`DbWhere`].
#[derive(Debug, Clone, PartialEq)]
pub enum WhereItem {
    Condition(DbCondition),
    Group(SubWhere),
}

/// Ordered WHERE conditions, joined by `AND`.
///
/// Order only affects the order of the rendered clauses.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DbWhere {
    items: Vec<WhereItem>,
    everything: bool,
}

impl DbWhere {
    /// Create an empty condition set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Explicitly match every row.
    ///
    /// UPDATE and DELETE refuse an empty `DbWhere` unless it is this marker.
    pub fn everything() -> Self {
        Self {
            items: Vec::new(),
            everything: true,
        }
    }

    /// Add a condition from a `field` or `field$Operator` token.
    ///
    /// `Vec<u8>` converts to [`Value::Bytes`]; list operators such as `In`
    /// read it as a list of numbers.
    pub fn on(&mut self, token: &str, value: impl Into<Value>) -> &mut Self {
        let (field, op) = split_operator(token);
        self.on_op(field, op.unwrap_or(DEFAULT_WHERE_OPERATOR), value)
    }

    /// Add a condition with an explicit operator token.
    pub fn on_op(&mut self, field: &str, operator: &str, value: impl Into<Value>) -> &mut Self {
        self.items
            .push(WhereItem::Condition(DbCondition::new(field, operator, value)));
        self.everything = false;
        self
    }

    /// Add a prebuilt condition.
    pub fn push(&mut self, condition: DbCondition) -> &mut Self {
        self.items.push(WhereItem::Condition(condition));
        self.everything = false;
        self
    }

    /// Add a group.
    pub fn group(&mut self, group: SubWhere) -> &mut Self {
        self.items.push(WhereItem::Group(group));
        self.everything = false;
        self
    }

    /// Add an `AND` group built by `f`.
    pub fn and_group(&mut self, f: impl FnOnce(&mut DbWhere)) -> &mut Self {
        self.build_group(LogicType::And, false, f)
    }

    /// Add an `OR` group built by `f`.
    pub fn or_group(&mut self, f: impl FnOnce(&mut DbWhere)) -> &mut Self {
        self.build_group(LogicType::Or, false, f)
    }

    /// Add a `NOT (... AND ...)` group built by `f`.
    pub fn not_group(&mut self, f: impl FnOnce(&mut DbWhere)) -> &mut Self {
        self.build_group(LogicType::And, true, f)
    }

    fn build_group(&mut self, logic: LogicType, negate: bool, f: impl FnOnce(&mut DbWhere)) -> &mut Self {
        let mut conditions = DbWhere::new();
        f(&mut conditions);
        self.group(SubWhere {
            logic,
            negate,
            conditions,
        })
    }

    /// `true` when there are no conditions (including the `everything` marker).
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// `true` for [`DbWhere::everything`].
    pub fn is_everything(&self) -> bool {
        self.everything && self.items.is_empty()
    }

    pub fn items(&self) -> &[WhereItem] {
        &self.items
    }

    /// Every field referenced, including inside groups.
    pub fn fields(&self) -> Vec<&str> {
        let mut out = Vec::new();
        for item in &self.items {
            match item {
                WhereItem::Condition(c) => out.push(c.field.as_str()),
                WhereItem::Group(g) => out.extend(g.conditions.fields()),
            }
        }
        out
    }
}

/// Ordered UPDATE assignments.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DbUpdate {
    items: Vec<DbCondition>,
}

impl DbUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an assignment from a `field` or `field$Operator` token.
    pub fn on(&mut self, token: &str, value: impl Into<Value>) -> &mut Self {
        let (field, op) = split_operator(token);
        self.items.push(DbCondition::new(
            field,
            op.unwrap_or(DEFAULT_UPDATE_OPERATOR),
            value,
        ));
        self
    }

    /// `field = value`
    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> &mut Self {
        self.items
            .push(DbCondition::new(field, DEFAULT_UPDATE_OPERATOR, value));
        self
    }

    /// `field = field + value`
    pub fn add(&mut self, field: &str, value: impl Into<Value>) -> &mut Self {
        self.items.push(DbCondition::new(field, "Add", value));
        self
    }

    /// `field = NULL`
    pub fn to_null(&mut self, field: &str) -> &mut Self {
        self.items.push(DbCondition::new(field, "ToNull", Value::Null));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[DbCondition] {
        &self.items
    }
}

/// Ordered INSERT values.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DbInsert {
    items: Vec<(String, Value)>,
}

impl DbInsert {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field value; a repeated field replaces the earlier value.
    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> &mut Self {
        let value = value.into();
        match self.items.iter_mut().find(|(f, _)| f == field) {
            Some(slot) => slot.1 = value,
            None => self.items.push((field.to_string(), value)),
        }
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.items.iter().find(|(f, _)| f == field).map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[(String, Value)] {
        &self.items
    }
}
