//! Composable SQL fragment buffer.
//!
//! [`SqlBuffer`] stores literal SQL and bound variables as separate items, so
//! fragments can be built independently, concatenated, and trimmed without
//! ever losing track of which value belongs to which placeholder.
//!
//! # Example
//!
//! ```ignore
//! use sqlweave::SqlBuffer;
//!
//! let mut where_sql = SqlBuffer::new();
//! if let Some(age) = age {
//!     where_sql.append(" AND age > ").add_variable(age);
//! }
//! if let Some(name) = name {
//!     where_sql.append(" AND name = ").add_variable(name);
//! }
//! // " AND age > ? AND name = ?" becomes "WHERE age > ? AND name = ?"
//! where_sql.insert_prefix("WHERE", Some("AND|OR"));
//! ```

mod scan;

use crate::config::OmissionConfig;
use crate::dialect::Dialect;
use crate::value::Value;
use std::fmt::{self, Write};

pub(crate) use scan::contains_top_level_keyword;

#[derive(Debug, Clone, PartialEq)]
enum Item {
    Raw(String),
    Variable(Value),
    /// A run of variables rendered `?, ?, ?`. Kept as one item so logged SQL
    /// can elide the middle of long IN lists.
    Variables(Vec<Value>),
}

impl Item {
    fn is_whitespace(&self) -> bool {
        matches!(self, Item::Raw(s) if s.trim().is_empty())
    }
}

/// Placeholder spelling used by [`SqlBuffer::to_prepared_sql_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaceholderStyle {
    /// `?` (JDBC, MySQL drivers, SQLite)
    #[default]
    Question,
    /// `$1, $2, ...` (native PostgreSQL drivers)
    Numbered,
}

/// SQL text with placeholders plus the values bound to them, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedSql {
    pub sql: String,
    pub values: Vec<Value>,
}

/// An ordered sequence of literal SQL and bound variables.
///
/// `Clone` is a deep copy: a cloned buffer never shares item storage with its
/// source, so one buffer can serve as a template for many statements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlBuffer {
    items: Vec<Item>,
}

/// Start a buffer with an initial SQL fragment.
pub fn sql(initial_sql: impl Into<String>) -> SqlBuffer {
    SqlBuffer::with_text(initial_sql)
}

impl SqlBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Create a buffer holding one literal fragment.
    pub fn with_text(text: impl Into<String>) -> Self {
        let mut buffer = Self::new();
        buffer.push_raw(text.into());
        buffer
    }

    fn push_raw(&mut self, text: String) {
        if text.is_empty() {
            return;
        }
        match self.items.last_mut() {
            Some(Item::Raw(last)) => last.push_str(&text),
            _ => self.items.push(Item::Raw(text)),
        }
    }

    fn push_item(&mut self, item: Item) {
        match item {
            Item::Raw(text) => self.push_raw(text),
            other => self.items.push(other),
        }
    }

    /// Append literal SQL.
    pub fn append(&mut self, text: &str) -> &mut Self {
        self.push_raw(text.to_string());
        self
    }

    /// Append a copy of another buffer's items (variables stay bound).
    pub fn append_buffer(&mut self, other: &SqlBuffer) -> &mut Self {
        for item in &other.items {
            self.push_item(item.clone());
        }
        self
    }

    /// Append another buffer, consuming it.
    pub fn push_buffer(&mut self, other: SqlBuffer) -> &mut Self {
        for item in other.items {
            self.push_item(item);
        }
        self
    }

    /// Insert literal SQL at the start.
    pub fn prepend(&mut self, text: &str) -> &mut Self {
        if text.is_empty() {
            return self;
        }
        match self.items.first_mut() {
            Some(Item::Raw(first)) => first.insert_str(0, text),
            _ => self.items.insert(0, Item::Raw(text.to_string())),
        }
        self
    }

    /// Insert a copy of another buffer's items at the start.
    pub fn prepend_buffer(&mut self, other: &SqlBuffer) -> &mut Self {
        let mut items = other.clone();
        items.push_buffer(std::mem::take(self));
        *self = items;
        self
    }

    /// Append a bound variable.
    pub fn add_variable(&mut self, value: impl Into<Value>) -> &mut Self {
        self.items.push(Item::Variable(value.into()));
        self
    }

    /// Append a comma-separated run of bound variables.
    ///
    /// An empty iterator appends nothing; callers that need a non-empty list
    /// (IN, NOT IN) must check beforehand.
    pub fn add_variables<V: Into<Value>>(&mut self, values: impl IntoIterator<Item = V>) -> &mut Self {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        if !values.is_empty() {
            self.items.push(Item::Variables(values));
        }
        self
    }

    /// Wrap the content: `prefix + content + suffix`.
    pub fn surround(&mut self, prefix: &str, suffix: &str) -> &mut Self {
        self.prepend(prefix);
        self.append(suffix)
    }

    /// `true` if there are no items at all.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// `true` if there are no variables and the literal text trims to empty.
    pub fn is_blank(&self) -> bool {
        self.items.iter().all(Item::is_whitespace)
    }

    /// Number of bound values.
    pub fn variable_count(&self) -> usize {
        self.items
            .iter()
            .map(|item| match item {
                Item::Raw(_) => 0,
                Item::Variable(_) => 1,
                Item::Variables(values) => values.len(),
            })
            .sum()
    }

    /// Bound values in placeholder order.
    pub fn values(&self) -> Vec<Value> {
        let mut out = Vec::with_capacity(self.variable_count());
        for item in &self.items {
            match item {
                Item::Raw(_) => {}
                Item::Variable(v) => out.push(v.clone()),
                Item::Variables(values) => out.extend(values.iter().cloned()),
            }
        }
        out
    }

    // ==================== Prefix / suffix trimming ====================

    /// Insert `prefix` at the start, first removing a leading keyword.
    ///
    /// `overrides` is a `|`-separated list of keywords (`"AND|OR"`). The first
    /// literal text is checked for one of them (case-insensitive, whole tokens
    /// only); a match is removed together with the whitespace after it.
    /// Without a match the prefix is inserted anyway.
    ///
    /// Returns `false` (and does nothing) when the buffer is blank.
    pub fn insert_prefix(&mut self, prefix: &str, overrides: Option<&str>) -> bool {
        if self.is_blank() {
            return false;
        }

        let removed = match overrides {
            Some(pattern) => {
                let removed = self.trim_leading_token(pattern);
                if !removed {
                    tracing::trace!(
                        target: "sqlweave.sql",
                        prefix,
                        overrides = pattern,
                        "no leading keyword matched, inserting prefix as-is"
                    );
                }
                removed
            }
            None => false,
        };

        if !prefix.is_empty() {
            if !prefix.ends_with(char::is_whitespace) && !self.starts_with_whitespace() {
                self.prepend(" ");
            }
            self.prepend(prefix);
        }
        removed || !prefix.is_empty()
    }

    /// Append `suffix` at the end, first removing a trailing keyword.
    ///
    /// Mirror image of [`insert_prefix`](Self::insert_prefix): the removed
    /// token takes the whitespace immediately before it along.
    pub fn insert_suffix(&mut self, suffix: &str, overrides: Option<&str>) -> bool {
        if self.is_blank() {
            return false;
        }

        let removed = match overrides {
            Some(pattern) => {
                let removed = self.trim_trailing_token(pattern);
                if !removed {
                    tracing::trace!(
                        target: "sqlweave.sql",
                        suffix,
                        overrides = pattern,
                        "no trailing keyword matched, appending suffix as-is"
                    );
                }
                removed
            }
            None => false,
        };

        if !suffix.is_empty() {
            if !suffix.starts_with(char::is_whitespace) && !self.ends_with_whitespace() {
                self.append(" ");
            }
            self.append(suffix);
        }
        removed || !suffix.is_empty()
    }

    /// Remove a leading keyword from `overrides`, if present.
    pub fn trim_leading_token(&mut self, overrides: &str) -> bool {
        let alternatives = scan::split_overrides(overrides);
        if alternatives.is_empty() {
            return false;
        }
        let Some(index) = self.items.iter().position(|item| !item.is_whitespace()) else {
            return false;
        };
        let Item::Raw(text) = &mut self.items[index] else {
            return false;
        };

        let body_start = text.len() - text.trim_start().len();
        let Some(len) = scan::match_leading(&text[body_start..], &alternatives) else {
            return false;
        };
        let rest = text[body_start + len..].trim_start();
        *text = format!("{}{}", &text[..body_start], rest);
        self.compact();
        true
    }

    /// Remove a trailing keyword from `overrides`, if present.
    pub fn trim_trailing_token(&mut self, overrides: &str) -> bool {
        let alternatives = scan::split_overrides(overrides);
        if alternatives.is_empty() {
            return false;
        }
        let Some(index) = self.items.iter().rposition(|item| !item.is_whitespace()) else {
            return false;
        };
        let Item::Raw(text) = &mut self.items[index] else {
            return false;
        };

        let body_end = text.trim_end().len();
        let Some(len) = scan::match_trailing(&text[..body_end], &alternatives) else {
            return false;
        };
        let kept = text[..body_end - len].trim_end();
        *text = format!("{}{}", kept, &text[body_end..]);
        self.compact();
        true
    }

    fn compact(&mut self) {
        self.items.retain(|item| !matches!(item, Item::Raw(s) if s.is_empty()));
    }

    fn starts_with_whitespace(&self) -> bool {
        match self.items.first() {
            Some(Item::Raw(s)) => s.starts_with(char::is_whitespace),
            _ => false,
        }
    }

    fn ends_with_whitespace(&self) -> bool {
        match self.items.last() {
            Some(Item::Raw(s)) => s.ends_with(char::is_whitespace),
            _ => false,
        }
    }

    /// Whether the literal text contains `keyword` outside parentheses/quotes.
    pub(crate) fn has_top_level_keyword(&self, keyword: &str) -> bool {
        contains_top_level_keyword(&self.to_prepared_sql().sql, keyword)
    }

    /// Whether the first literal token is `keyword`.
    pub(crate) fn starts_with_keyword(&self, keyword: &str) -> bool {
        let Some(Item::Raw(text)) = self.items.iter().find(|item| !item.is_whitespace()) else {
            return false;
        };
        scan::match_leading(text.trim_start(), &[keyword]).is_some()
    }

    /// Literal text with every variable item collapsed to one `?`, plus the
    /// starting offset of each item in that text.
    fn shape(&self) -> (String, Vec<usize>) {
        let mut text = String::new();
        let mut starts = Vec::with_capacity(self.items.len());
        for item in &self.items {
            starts.push(text.len());
            match item {
                Item::Raw(s) => text.push_str(s),
                Item::Variable(_) | Item::Variables(_) => text.push('?'),
            }
        }
        (text, starts)
    }

    /// Index of the item holding a position in
    /// [`shape`](Self::shape) text.
    fn locate(starts: &[usize], pos: usize) -> usize {
        starts.iter().rposition(|start| *start <= pos).unwrap_or(0)
    }

    /// Remove a trailing top-level clause such as `ORDER BY ...` and return
    /// its body without the keyword.
    ///
    /// Only a clause made of literal text can be taken; `None` when the
    /// keyword is absent or variables follow it.
    pub(crate) fn take_top_level_clause(&mut self, keyword: &str) -> Option<String> {
        let (text, starts) = self.shape();
        let pos = *scan::top_level_keyword_positions(&text, keyword).last()?;
        let index = Self::locate(&starts, pos);
        if self.items[index..].iter().any(|item| !matches!(item, Item::Raw(_))) {
            return None;
        }

        let words: Vec<&str> = keyword.split_whitespace().collect();
        let keyword_len = scan::words_match_at(&text[pos..], &words)?;
        let body = text[pos + keyword_len..].trim().to_string();

        let offset = pos - starts[index];
        self.items.truncate(index + 1);
        if let Some(Item::Raw(last)) = self.items.last_mut() {
            last.truncate(offset);
            let kept = last.trim_end().len();
            last.truncate(kept);
        }
        self.compact();
        Some(body)
    }

    /// Insert literal `text` right after the last non-blank character before
    /// the first top-level `keyword`. Returns `false` when there is none.
    pub(crate) fn insert_before_top_level(&mut self, keyword: &str, text: &str) -> bool {
        let (shape, starts) = self.shape();
        let Some(pos) = scan::top_level_keyword_positions(&shape, keyword).first().copied() else {
            return false;
        };
        let index = Self::locate(&starts, pos);
        let Item::Raw(raw) = &mut self.items[index] else {
            return false;
        };
        let offset = pos - starts[index];
        let at = raw[..offset].trim_end().len();
        raw.insert_str(at, text);
        true
    }

    // ==================== Rendering ====================

    /// Render with `?` placeholders and the parallel value list.
    pub fn to_prepared_sql(&self) -> PreparedSql {
        self.to_prepared_sql_with(PlaceholderStyle::Question)
    }

    /// Render with the given placeholder style.
    pub fn to_prepared_sql_with(&self, style: PlaceholderStyle) -> PreparedSql {
        let mut sql = String::new();
        let mut values = Vec::with_capacity(self.variable_count());

        let placeholder = |sql: &mut String, index: usize| match style {
            PlaceholderStyle::Question => sql.push('?'),
            PlaceholderStyle::Numbered => {
                let _ = write!(sql, "${}", index);
            }
        };

        for item in &self.items {
            match item {
                Item::Raw(s) => sql.push_str(s),
                Item::Variable(v) => {
                    values.push(v.clone());
                    placeholder(&mut sql, values.len());
                }
                Item::Variables(list) => {
                    for (i, v) in list.iter().enumerate() {
                        if i > 0 {
                            sql.push_str(", ");
                        }
                        values.push(v.clone());
                        placeholder(&mut sql, values.len());
                    }
                }
            }
        }
        PreparedSql { sql, values }
    }

    /// Render with every value inlined as a dialect literal.
    ///
    /// For logging and diagnostics only; never execute the result.
    pub fn to_executable_sql(&self, dialect: &dyn Dialect) -> String {
        self.render_inlined(dialect, dialect.options().omission)
    }

    /// Render with every value inlined and no list shortened.
    ///
    /// For products that take a statement fragment as text, such as the
    /// MySQL children procedure.
    pub(crate) fn to_inlined_sql(&self, dialect: &dyn Dialect) -> String {
        self.render_inlined(dialect, OmissionConfig::disabled())
    }

    fn render_inlined(&self, dialect: &dyn Dialect, omission: OmissionConfig) -> String {
        let mut sql = String::new();

        for item in &self.items {
            match item {
                Item::Raw(s) => sql.push_str(s),
                Item::Variable(v) => sql.push_str(&dialect.variable_to_string(v)),
                Item::Variables(list) => {
                    let len = list.len();
                    let elide = omission.applies_to(len);
                    for (i, v) in list.iter().enumerate() {
                        if elide && i >= omission.keep && i < len - omission.keep {
                            if i == omission.keep {
                                if i > 0 {
                                    sql.push_str(", ");
                                }
                                let _ = write!(sql, "/* ... {} more ... */", len - 2 * omission.keep);
                            }
                            continue;
                        }
                        if i > 0 {
                            sql.push_str(", ");
                        }
                        sql.push_str(&dialect.variable_to_string(v));
                    }
                }
            }
        }
        sql
    }
}

impl fmt::Display for SqlBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_prepared_sql().sql)
    }
}

impl From<&str> for SqlBuffer {
    fn from(text: &str) -> Self {
        SqlBuffer::with_text(text)
    }
}

impl From<String> for SqlBuffer {
    fn from(text: String) -> Self {
        SqlBuffer::with_text(text)
    }
}
