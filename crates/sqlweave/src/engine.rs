//! Engine wiring: one dialect, one operator registry and one metadata cache
//! shared by every builder handed out.

use crate::builder::{JoinSqlBuilder, TableSqlBuilder};
use crate::config::EngineConfig;
use crate::dialect::{DbVersion, Dialect, create_dialect};
use crate::error::{SqlError, SqlResult};
use crate::model::{MetadataCache, TableInfoScans, TableJoin};
use crate::operator::{OperatorRegistry, OperatorScope};
use std::sync::Arc;

/// Shared SQL construction engine.
///
/// Cheap to clone; every component is behind an `Arc` and read-only after
/// construction, so one engine serves any number of threads.
///
/// ```ignore
/// let engine = SqlEngine::builder("mysql.8".parse()?)
///     .scanner(Arc::new(TableRegistry::from_toml_str(TABLES)?))
///     .build()?;
/// let sql = engine.table("User")?.count(&DbWhere::new())?;
/// ```
#[derive(Debug, Clone)]
pub struct SqlEngine {
    dialect: Arc<dyn Dialect>,
    operators: Arc<OperatorRegistry>,
    cache: Arc<MetadataCache>,
    config: EngineConfig,
}

impl SqlEngine {
    pub fn new(
        dialect: Arc<dyn Dialect>,
        operators: Arc<OperatorRegistry>,
        cache: Arc<MetadataCache>,
        config: EngineConfig,
    ) -> Self {
        Self {
            dialect,
            operators,
            cache,
            config,
        }
    }

    /// Start building an engine for a database version.
    pub fn builder(version: DbVersion) -> SqlEngineBuilder {
        SqlEngineBuilder::new(version)
    }

    pub fn dialect(&self) -> &Arc<dyn Dialect> {
        &self.dialect
    }

    pub fn operators(&self) -> &Arc<OperatorRegistry> {
        &self.operators
    }

    pub fn cache(&self) -> &Arc<MetadataCache> {
        &self.cache
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Statement builder for an entity.
    pub fn table(&self, entity: &str) -> SqlResult<TableSqlBuilder> {
        let table = self.cache.table(entity)?;
        Ok(
            TableSqlBuilder::new(self.dialect.clone(), self.operators.clone(), table)
                .allow_empty_where(self.config.allow_empty_where),
        )
    }

    /// Statement builder for a join.
    pub fn join(&self, join: &TableJoin) -> SqlResult<JoinSqlBuilder> {
        let columns = self.cache.join(join)?;
        Ok(JoinSqlBuilder::new(
            self.dialect.clone(),
            self.operators.clone(),
            columns,
        ))
    }
}

/// Builder for [`SqlEngine`].
pub struct SqlEngineBuilder {
    version: DbVersion,
    config: EngineConfig,
    operators: Option<OperatorRegistry>,
    scanner: Option<Arc<dyn TableInfoScans>>,
    cache: Option<Arc<MetadataCache>>,
}

impl SqlEngineBuilder {
    pub fn new(version: DbVersion) -> Self {
        Self {
            version,
            config: EngineConfig::default(),
            operators: None,
            scanner: None,
            cache: None,
        }
    }

    /// Set the engine configuration.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a custom operator registry instead of the built-in one.
    pub fn operators(mut self, operators: OperatorRegistry) -> Self {
        self.operators = Some(operators);
        self
    }

    /// Table metadata source; a fresh cache is created over it.
    pub fn scanner(mut self, scanner: Arc<dyn TableInfoScans>) -> Self {
        self.scanner = Some(scanner);
        self
    }

    /// Share an existing metadata cache. Takes precedence over [`scanner`](Self::scanner).
    pub fn cache(mut self, cache: Arc<MetadataCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn build(self) -> SqlResult<SqlEngine> {
        let cache = match (self.cache, self.scanner) {
            (Some(cache), _) => cache,
            (None, Some(scanner)) => Arc::new(MetadataCache::new(scanner)),
            (None, None) => {
                return Err(SqlError::configuration(
                    "SqlEngine needs a table metadata scanner or cache",
                ));
            }
        };
        let dialect = create_dialect(self.version, self.config.dialect.clone());
        let operators = Arc::new(self.operators.unwrap_or_else(OperatorRegistry::with_defaults));

        tracing::debug!(
            target: "sqlweave.registry",
            db = %dialect.version(),
            where_operators = operators.operators(OperatorScope::Where).len(),
            update_operators = operators.operators(OperatorScope::Update).len(),
            "sql engine ready"
        );
        Ok(SqlEngine::new(dialect, operators, cache, self.config))
    }
}
