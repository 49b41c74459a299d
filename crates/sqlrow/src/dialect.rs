//! SQL dialect families and type classification.
//!
//! Two backend families are supported. They answer schema questions through
//! different metadata queries (see [`crate::introspect`]) and name their
//! column types differently; everything dialect-specific branches on the
//! [`Dialect`] tag, which a connection handle reports once at construction.

use crate::schema::PrimitiveClass;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The dialect family a connection speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dialect {
    /// MariaDB / MySQL: `SHOW COLUMNS` metadata, `auto_increment` extra flag.
    MariaDb,
    /// SQLite: `PRAGMA table_info` metadata, `sqlite_sequence` tracking.
    Sqlite,
}

/// Type names that classify as NUMERIC for MariaDB/MySQL, per the MariaDB
/// data-type reference. Everything else, dates and BLOBs included, is TEXT.
const MARIADB_NUMERIC: &[&str] = &["int", "decimal", "double", "bit"];

/// Type names that classify as NUMERIC for SQLite. SQLite columns are
/// dynamically typed; the declared type is only trustworthy on STRICT tables
/// or with disciplined writers.
const SQLITE_NUMERIC: &[&str] = &["int", "real"];

impl Dialect {
    /// Classify a database-reported column type into a primitive class.
    ///
    /// The classification exists solely to choose an escaping strategy, not
    /// to preserve the backend's type system. Matching is a case-insensitive
    /// substring test, so `BIGINT(20) UNSIGNED` and `integer` both land on
    /// NUMERIC. Unknown types fall back to TEXT, the safe quoted form.
    pub fn classify(self, declared_type: &str) -> PrimitiveClass {
        let keywords = match self {
            Self::MariaDb => MARIADB_NUMERIC,
            Self::Sqlite => SQLITE_NUMERIC,
        };
        let lower = declared_type.to_ascii_lowercase();
        if keywords.iter().any(|k| lower.contains(k)) {
            PrimitiveClass::Numeric
        } else {
            PrimitiveClass::Text
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MariaDb => f.write_str("mariadb"),
            Self::Sqlite => f.write_str("sqlite"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mariadb_numeric_types() {
        for ty in ["int(11)", "BIGINT(20) unsigned", "tinyint(1)", "decimal(10,2)", "double", "bit(1)"] {
            assert_eq!(Dialect::MariaDb.classify(ty), PrimitiveClass::Numeric, "{ty}");
        }
    }

    #[test]
    fn mariadb_text_types() {
        for ty in ["varchar(255)", "text", "datetime", "date", "blob", "float"] {
            assert_eq!(Dialect::MariaDb.classify(ty), PrimitiveClass::Text, "{ty}");
        }
    }

    #[test]
    fn sqlite_numeric_types() {
        for ty in ["INTEGER", "int", "BIGINT", "REAL"] {
            assert_eq!(Dialect::Sqlite.classify(ty), PrimitiveClass::Numeric, "{ty}");
        }
    }

    #[test]
    fn sqlite_text_types() {
        for ty in ["TEXT", "BLOB", "NUMERIC", "", "CLOB"] {
            assert_eq!(Dialect::Sqlite.classify(ty), PrimitiveClass::Text, "{ty}");
        }
    }
}
