//! Convenient imports for typical `sqlweave` usage.
//!
//! ```ignore
//! use sqlweave::prelude::*;
//! ```

pub use crate::{
    DbInsert, DbUpdate, DbVersion, DbWhere, Dialect, EngineConfig, FieldColumn, Orderings, Paging,
    SqlBuffer, SqlEngine, SqlError, SqlResult, TableDef, TableJoin, TableRegistry, Value,
};
pub use crate::{JoinItem, JoinType, TableItem};
