use crate::error::{SqlError, SqlResult};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderType {
    #[default]
    Asc,
    Desc,
}

impl OrderType {
    pub fn to_sql(self) -> &'static str {
        match self {
            OrderType::Asc => "ASC",
            OrderType::Desc => "DESC",
        }
    }
}

/// NULLS ordering for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullsOrder {
    First,
    Last,
}

impl NullsOrder {
    pub fn to_sql(self) -> &'static str {
        match self {
            NullsOrder::First => "NULLS FIRST",
            NullsOrder::Last => "NULLS LAST",
        }
    }
}

/// One ORDER BY entry, referring to a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ordering {
    pub field: String,
    pub order: OrderType,
    pub nulls: Option<NullsOrder>,
}

impl Ordering {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: OrderType::Asc,
            nulls: None,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: OrderType::Desc,
            nulls: None,
        }
    }

    /// Set NULLS ordering.
    pub fn nulls(mut self, nulls: NullsOrder) -> Self {
        self.nulls = Some(nulls);
        self
    }

    /// Parse `field [asc|desc] [nulls first|last]`.
    pub fn parse(text: &str) -> SqlResult<Self> {
        let words: Vec<&str> = text.split_whitespace().collect();
        let Some((field, rest)) = words.split_first() else {
            return Err(SqlError::Parse("empty ordering".to_string()));
        };

        let mut ordering = Ordering::asc(*field);
        let mut rest = rest;
        if let Some((word, tail)) = rest.split_first() {
            if word.eq_ignore_ascii_case("asc") {
                rest = tail;
            } else if word.eq_ignore_ascii_case("desc") {
                ordering.order = OrderType::Desc;
                rest = tail;
            }
        }

        match rest {
            [] => {}
            [nulls, which] if nulls.eq_ignore_ascii_case("nulls") => {
                if which.eq_ignore_ascii_case("first") {
                    ordering.nulls = Some(NullsOrder::First);
                } else if which.eq_ignore_ascii_case("last") {
                    ordering.nulls = Some(NullsOrder::Last);
                } else {
                    return Err(SqlError::Parse(format!("invalid ordering: {text}")));
                }
            }
            _ => return Err(SqlError::Parse(format!("invalid ordering: {text}"))),
        }
        Ok(ordering)
    }
}

/// An ordered list of [`Ordering`]s.
///
/// ```ignore
/// let orderings = Orderings::parse("name asc, createTime desc nulls last")?;
/// let orderings = Orderings::new().asc("name").desc("createTime");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Orderings {
    items: Vec<Ordering>,
}

impl Orderings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a comma separated list. Blank entries are ignored.
    pub fn parse(text: &str) -> SqlResult<Self> {
        let items = text
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(Ordering::parse)
            .collect::<SqlResult<Vec<_>>>()?;
        Ok(Self { items })
    }

    pub fn asc(mut self, field: impl Into<String>) -> Self {
        self.items.push(Ordering::asc(field));
        self
    }

    pub fn desc(mut self, field: impl Into<String>) -> Self {
        self.items.push(Ordering::desc(field));
        self
    }

    /// Add an ordering.
    #[allow(clippy::should_implement_trait)]
    pub fn add(mut self, ordering: Ordering) -> Self {
        self.items.push(ordering);
        self
    }

    pub fn push(&mut self, ordering: Ordering) {
        self.items.push(ordering);
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[Ordering] {
        &self.items
    }
}

impl From<Vec<Ordering>> for Orderings {
    fn from(items: Vec<Ordering>) -> Self {
        Self { items }
    }
}
