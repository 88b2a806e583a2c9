use crate::error::{SqlError, SqlResult};

/// Row range for list queries.
///
/// `rows == 0` means "no paging": dialects leave the statement untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Paging {
    /// Rows skipped before the first returned row.
    pub offset: u64,
    /// Page size.
    pub rows: u64,
    /// Whether the caller also wants a total count.
    pub need_count: bool,
}

impl Paging {
    /// No paging.
    pub const NONE: Paging = Paging {
        offset: 0,
        rows: 0,
        need_count: false,
    };

    /// Create paging from a 1-based page number and a page size.
    pub fn page(page: u64, rows: u64) -> SqlResult<Self> {
        if page < 1 {
            return Err(SqlError::validation(format!("page must be >= 1, got {page}")));
        }
        let offset = (page - 1).checked_mul(rows).ok_or_else(|| {
            SqlError::validation(format!("page {page} with {rows} rows overflows the row offset"))
        })?;
        Ok(Self {
            offset,
            rows,
            need_count: false,
        })
    }

    /// Create paging from an explicit offset.
    pub fn offset(offset: u64, rows: u64) -> Self {
        Self {
            offset,
            rows,
            need_count: false,
        }
    }

    /// Request a total count alongside the page.
    pub fn with_count(mut self) -> Self {
        self.need_count = true;
        self
    }

    /// `true` when a row range applies.
    pub fn is_paged(&self) -> bool {
        self.rows > 0
    }

    /// Exclusive end row (`offset + rows`), saturating at `u64::MAX`.
    pub fn end(&self) -> u64 {
        self.offset.saturating_add(self.rows)
    }
}
