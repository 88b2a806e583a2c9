//! # sqlweave
//!
//! Dialect-aware dynamic SQL construction.
//!
//! Describe a statement abstractly (field/operator/value conditions,
//! orderings, paging, assignments) and get back prepared SQL with an ordered
//! list of bound values, correct for the target database product and
//! version.
//!
//! ## Features
//!
//! - **Composable buffers**: [`SqlBuffer`] keeps literal text and bound
//!   variables apart, so fragments can be appended, prepended and trimmed
//!   without losing bindings
//! - **Operators by name**: `age$GreaterThen`, `state$In` resolve through an
//!   explicit [`OperatorRegistry`]; custom operators register at startup
//! - **Dialects**: Oracle, MySQL/MariaDB, PostgreSQL, SQL Server, DB2 and
//!   SQLite paging, LIKE, IN-list and recursive lookup syntax
//! - **Field metadata**: pluggable [`TableInfoScans`] sources cached in an
//!   injected [`MetadataCache`], with alias-aware field resolution for joins
//! - **Safe defaults**: UPDATE/DELETE require conditions, empty IN lists are
//!   rejected, unknown fields are reported rather than skipped
//!
//! ## Quick start
//!
//! ```ignore
//! use sqlweave::prelude::*;
//! use std::sync::Arc;
//!
//! let engine = SqlEngine::builder("mysql.8".parse()?)
//!     .scanner(Arc::new(TableRegistry::from_toml_str(TABLES)?))
//!     .build()?;
//!
//! let mut conditions = DbWhere::new();
//! conditions.on("age$GreaterThen", 18).on("state$In", vec![1, 2, 3]);
//!
//! let sql = engine.table("User")?.list(&conditions, &Orderings::parse("name")?, &Paging::page(1, 20)?)?;
//! let prepared = sql.to_prepared_sql();
//! // prepared.sql: SELECT ... FROM TB_USER WHERE AGE > ? AND STATE IN (?, ?, ?) ORDER BY NAME ASC LIMIT ?, ?
//! ```
//!
//! ## Logging
//!
//! Events are emitted with `tracing` under these targets:
//!
//! - `sqlweave.sql`: built statements (`debug`, rendered with inlined
//!   literals) and fragment trimming details (`trace`)
//! - `sqlweave.registry`: operator registration and engine setup
//! - `sqlweave.cache`: metadata scans and invalidation

pub mod buffer;
pub mod builder;
pub mod condition;
pub mod config;
pub mod dialect;
pub mod engine;
pub mod error;
pub mod fragment;
pub mod model;
pub mod operator;
pub mod prelude;
pub mod value;

pub use buffer::{PlaceholderStyle, PreparedSql, SqlBuffer, sql};
pub use builder::{JoinSqlBuilder, TableSqlBuilder};
pub use condition::{
    DbCondition, DbInsert, DbUpdate, DbWhere, LogicType, NullsOrder, OrderType, Ordering, Orderings,
    Paging, SubWhere, WhereItem,
};
pub use config::{DialectOptions, EngineConfig, OmissionConfig};
pub use dialect::{ChildrenQuery, DbType, DbVersion, Dialect, create_dialect};
pub use engine::{SqlEngine, SqlEngineBuilder};
pub use error::{SqlError, SqlResult};
pub use fragment::FragmentHelper;
pub use model::{
    AllFieldColumn, ColumnRoute, FieldColumn, FieldColumns, FieldScene, JoinFieldColumns, JoinItem,
    JoinType, MetadataCache, TableDef, TableInfo, TableInfoScans, TableItem, TableJoin, TableRegistry,
};
pub use operator::{Arity, Operator, OperatorMeta, OperatorRegistry, OperatorScope};
pub use value::{Value, ValueType};
