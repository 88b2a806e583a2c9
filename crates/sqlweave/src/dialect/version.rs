use crate::error::{SqlError, SqlResult};
use std::fmt;
use std::str::FromStr;

/// Supported database products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DbType {
    Oracle,
    MySql,
    MariaDb,
    PostgreSql,
    SqlServer,
    Db2,
    Sqlite,
}

impl DbType {
    pub fn name(self) -> &'static str {
        match self {
            DbType::Oracle => "oracle",
            DbType::MySql => "mysql",
            DbType::MariaDb => "mariadb",
            DbType::PostgreSql => "postgresql",
            DbType::SqlServer => "sqlserver",
            DbType::Db2 => "db2",
            DbType::Sqlite => "sqlite",
        }
    }
}

impl fmt::Display for DbType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DbType {
    type Err = SqlError;

    fn from_str(s: &str) -> SqlResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "oracle" => Ok(DbType::Oracle),
            "mysql" => Ok(DbType::MySql),
            "mariadb" => Ok(DbType::MariaDb),
            "postgresql" | "postgres" | "pg" => Ok(DbType::PostgreSql),
            "sqlserver" | "mssql" => Ok(DbType::SqlServer),
            "db2" => Ok(DbType::Db2),
            "sqlite" => Ok(DbType::Sqlite),
            other => Err(SqlError::Parse(format!("unknown database type: {other}"))),
        }
    }
}

/// A database product plus an optional version.
///
/// Parsed from `"<type>[.<major>[.<minor>]]"`, e.g. `"mysql.8"`,
/// `"oracle.12.2"`, `"sqlserver.2008"`. A missing version means "current":
/// every version check passes.
///
/// SQL Server versions are kept as release years; internal version numbers
/// (`9`, `10`, `11`, ...) are mapped to their year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DbVersion {
    pub db_type: DbType,
    pub major: Option<u32>,
    pub minor: Option<u32>,
}

impl DbVersion {
    /// A product without a version.
    pub fn new(db_type: DbType) -> Self {
        Self {
            db_type,
            major: None,
            minor: None,
        }
    }

    /// A product with a major version.
    pub fn with_major(db_type: DbType, major: u32) -> Self {
        Self {
            db_type,
            major: Some(normalize_major(db_type, major)),
            minor: None,
        }
    }

    /// Whether this version is `major.minor` or newer.
    pub fn at_least(&self, major: u32, minor: u32) -> bool {
        match self.major {
            None => true,
            Some(m) if m != major => m > major,
            Some(_) => self.minor.unwrap_or(0) >= minor,
        }
    }
}

fn normalize_major(db_type: DbType, major: u32) -> u32 {
    if db_type != DbType::SqlServer {
        return major;
    }
    match major {
        8 => 2000,
        9 => 2005,
        10 => 2008,
        11 => 2012,
        12 => 2014,
        13 => 2016,
        14 => 2017,
        15 => 2019,
        16 => 2022,
        other => other,
    }
}

impl fmt::Display for DbVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.db_type)?;
        if let Some(major) = self.major {
            write!(f, ".{major}")?;
            if let Some(minor) = self.minor {
                write!(f, ".{minor}")?;
            }
        }
        Ok(())
    }
}

impl FromStr for DbVersion {
    type Err = SqlError;

    fn from_str(s: &str) -> SqlResult<Self> {
        let mut parts = s.trim().split('.');
        let db_type: DbType = parts.next().unwrap_or_default().parse()?;

        let mut numbers = Vec::with_capacity(2);
        for part in parts {
            let n = part
                .trim()
                .parse::<u32>()
                .map_err(|_| SqlError::Parse(format!("invalid database version: {s}")))?;
            numbers.push(n);
        }
        if numbers.len() > 2 {
            return Err(SqlError::Parse(format!("invalid database version: {s}")));
        }

        Ok(Self {
            db_type,
            major: numbers.first().map(|m| normalize_major(db_type, *m)),
            minor: numbers.get(1).copied(),
        })
    }
}

impl From<DbType> for DbVersion {
    fn from(db_type: DbType) -> Self {
        DbVersion::new(db_type)
    }
}
