//! Error types for sqlrow

use crate::schema::PrimitiveClass;
use thiserror::Error;

/// Result type alias for mapper operations
pub type MapperResult<T> = Result<T, MapperError>;

/// Error types for single-record operations
#[derive(Debug, Error)]
pub enum MapperError {
    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Statement execution error
    #[error("Query error: {message}; statement: {sql}")]
    Query { sql: String, message: String },

    /// Table metadata could not be loaded
    #[error("Schema error for table '{table}': {message}")]
    Schema { table: String, message: String },

    /// Column is not part of the table schema (lookups are case-sensitive)
    #[error("Unknown column '{column}' (column names are case-sensitive)")]
    UnknownColumn { column: String },

    /// Value does not match the column's primitive class
    #[error("Column '{column}' expects a {expected} value, got {value}")]
    TypeMismatch {
        column: String,
        expected: PrimitiveClass,
        value: String,
    },

    /// Column identifies the record and must not be modified
    #[error("Column '{column}' is immutable: {reason}")]
    ImmutableField { column: String, reason: String },

    /// NOT NULL column holds no value
    #[error("Column '{column}' is NOT NULL but holds no value")]
    NotNullViolation { column: String },

    /// Caller assigned a value to an auto-increment primary key
    #[error("Column '{column}' is auto-increment and must not be assigned on insert")]
    AutoIncrementConflict { column: String },

    /// A point operation did not touch exactly one row
    #[error("Statement matched {actual} rows, exactly 1 expected")]
    Cardinality { actual: u64 },

    /// No primary key, loaded record, or filter identifies the target row
    #[error("Cannot identify a single record: {0}")]
    MissingIdentity(String),

    /// Generated statement would contain no columns
    #[error("Nothing to write to table '{table}': no column values present")]
    EmptyWrite { table: String },
}

impl MapperError {
    /// Create a connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create a query error for a specific statement
    pub fn query(sql: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Query {
            sql: sql.into(),
            message: message.into(),
        }
    }

    /// Create a schema error for a specific table
    pub fn schema(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Schema {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Create an unknown-column error
    pub fn unknown_column(column: impl Into<String>) -> Self {
        Self::UnknownColumn {
            column: column.into(),
        }
    }

    /// Create a missing-identity error
    pub fn missing_identity(message: impl Into<String>) -> Self {
        Self::MissingIdentity(message.into())
    }

    /// Check if this is a cardinality error
    pub fn is_cardinality(&self) -> bool {
        matches!(self, Self::Cardinality { .. })
    }

    /// Check if this is an unknown-column error
    pub fn is_unknown_column(&self) -> bool {
        matches!(self, Self::UnknownColumn { .. })
    }

    /// Check if this is a type-mismatch error
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, Self::TypeMismatch { .. })
    }
}
