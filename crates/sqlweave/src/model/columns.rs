use super::{FieldColumn, FieldScene};
use crate::error::{SqlError, SqlResult};
use std::collections::HashSet;
use std::sync::{Arc, OnceLock};

/// An immutable, cheaply clonable set of field columns.
///
/// `owner` names the entity (or join) the set belongs to and is used in
/// error messages.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldColumns {
    owner: Arc<str>,
    items: Arc<[FieldColumn]>,
}

impl FieldColumns {
    /// Create a field set.
    ///
    /// Fails when a field name occurs twice under the same table alias.
    pub fn new(owner: impl Into<Arc<str>>, items: Vec<FieldColumn>) -> SqlResult<Self> {
        let owner = owner.into();
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            let key = (
                item.table_alias.as_deref().map(str::to_ascii_lowercase),
                item.field_name.as_str(),
            );
            if !seen.insert(key) {
                return Err(SqlError::configuration(format!(
                    "duplicate field '{}' in '{owner}'",
                    item.qualified_field_name()
                )));
            }
        }
        Ok(Self {
            owner,
            items: items.into(),
        })
    }

    /// Subset of an already validated set; uniqueness holds by construction.
    fn subset(&self, items: Vec<FieldColumn>) -> Self {
        Self {
            owner: self.owner.clone(),
            items: items.into(),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn items(&self) -> &[FieldColumn] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldColumn> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn single<'a>(&self, reference: &str, matches: Vec<&'a FieldColumn>) -> SqlResult<Option<&'a FieldColumn>> {
        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.into_iter().next()),
            _ => Err(SqlError::ambiguous(
                reference,
                matches.iter().map(|c| c.qualified_field_name()).collect(),
            )),
        }
    }

    /// Resolve a field reference to at most one column.
    ///
    /// Zero matches is `Ok(None)`; several matches (a bare name shared by
    /// joined tables) is an [`AmbiguousField`](SqlError::AmbiguousField)
    /// error listing every `alias.field` candidate.
    pub fn find_by_field_name(&self, reference: &str) -> SqlResult<Option<&FieldColumn>> {
        self.single(reference, self.find_all_by_field_name(reference))
    }

    /// Every column matching a field reference.
    pub fn find_all_by_field_name(&self, reference: &str) -> Vec<&FieldColumn> {
        self.items.iter().filter(|c| c.matches_field(reference)).collect()
    }

    /// Resolve a column reference to at most one column.
    pub fn find_by_column_name(&self, reference: &str) -> SqlResult<Option<&FieldColumn>> {
        self.single(reference, self.find_all_by_column_name(reference))
    }

    /// Every column matching a column reference.
    pub fn find_all_by_column_name(&self, reference: &str) -> Vec<&FieldColumn> {
        self.items.iter().filter(|c| c.matches_column(reference)).collect()
    }

    /// Only the named fields, in the order given.
    ///
    /// Unknown names fail with one [`UnsupportedField`](SqlError::UnsupportedField)
    /// error listing all of them; ambiguous names fail as ambiguous.
    pub fn include<S: AsRef<str>>(&self, names: &[S]) -> SqlResult<FieldColumns> {
        let mut picked: Vec<FieldColumn> = Vec::with_capacity(names.len());
        let mut unknown = Vec::new();
        for name in names {
            let name = name.as_ref();
            match self.find_by_field_name(name)? {
                Some(column) => {
                    if !picked.contains(column) {
                        picked.push(column.clone());
                    }
                }
                None => unknown.push(name.to_string()),
            }
        }
        if !unknown.is_empty() {
            return Err(SqlError::unsupported(self.owner(), unknown, "unknown field"));
        }
        Ok(self.subset(picked))
    }

    /// Everything except the named fields.
    ///
    /// A bare name removes the field from every joined table; unknown names
    /// are ignored.
    pub fn exclude<S: AsRef<str>>(&self, names: &[S]) -> FieldColumns {
        let kept = self
            .items
            .iter()
            .filter(|c| !names.iter().any(|n| c.matches_field(n.as_ref())))
            .cloned()
            .collect();
        self.subset(kept)
    }

    /// Columns accepted by `scene`.
    pub fn filter(&self, scene: FieldScene) -> FieldColumns {
        let kept = self.items.iter().filter(|c| scene.accepts(c)).cloned().collect();
        self.subset(kept)
    }

    /// Primary key columns, in declaration order.
    pub fn primary_keys(&self) -> FieldColumns {
        let kept = self.items.iter().filter(|c| c.primary_key).cloned().collect();
        self.subset(kept)
    }
}

impl<'a> IntoIterator for &'a FieldColumns {
    type Item = &'a FieldColumn;
    type IntoIter = std::slice::Iter<'a, FieldColumn>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Every field of an entity, with memoized scene and primary key views.
///
/// Views are computed on first use and then shared: calling
/// [`filter`](Self::filter) twice with one scene returns the same `Arc`.
#[derive(Debug, Clone)]
pub struct AllFieldColumn {
    all: FieldColumns,
    scenes: [OnceLock<Arc<FieldColumns>>; 4],
    primary_keys: OnceLock<Arc<FieldColumns>>,
}

impl AllFieldColumn {
    pub fn new(all: FieldColumns) -> Self {
        Self {
            all,
            scenes: Default::default(),
            primary_keys: OnceLock::new(),
        }
    }

    /// The full field set.
    pub fn all(&self) -> &FieldColumns {
        &self.all
    }

    pub fn owner(&self) -> &str {
        self.all.owner()
    }

    pub fn items(&self) -> &[FieldColumn] {
        self.all.items()
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    /// Scene view, memoized per instance.
    pub fn filter(&self, scene: FieldScene) -> Arc<FieldColumns> {
        self.scenes[scene.index()]
            .get_or_init(|| Arc::new(self.all.filter(scene)))
            .clone()
    }

    /// Primary key view, memoized per instance.
    pub fn primary_keys(&self) -> Arc<FieldColumns> {
        self.primary_keys
            .get_or_init(|| Arc::new(self.all.primary_keys()))
            .clone()
    }

    pub fn find_by_field_name(&self, reference: &str) -> SqlResult<Option<&FieldColumn>> {
        self.all.find_by_field_name(reference)
    }

    pub fn find_all_by_field_name(&self, reference: &str) -> Vec<&FieldColumn> {
        self.all.find_all_by_field_name(reference)
    }

    pub fn find_by_column_name(&self, reference: &str) -> SqlResult<Option<&FieldColumn>> {
        self.all.find_by_column_name(reference)
    }

    pub fn find_all_by_column_name(&self, reference: &str) -> Vec<&FieldColumn> {
        self.all.find_all_by_column_name(reference)
    }

    pub fn include<S: AsRef<str>>(&self, names: &[S]) -> SqlResult<FieldColumns> {
        self.all.include(names)
    }

    pub fn exclude<S: AsRef<str>>(&self, names: &[S]) -> FieldColumns {
        self.all.exclude(names)
    }
}

impl From<FieldColumns> for AllFieldColumn {
    fn from(all: FieldColumns) -> Self {
        AllFieldColumn::new(all)
    }
}

