//! Insert a new record built field by field.

use crate::connection::Connection;
use crate::error::MapperResult;
use crate::record::{Mode, RecordState};
use crate::schema::TableSchema;
use crate::sql;
use crate::value::Value;
use tracing::debug;

/// Builds one new record and inserts it.
///
/// An auto-increment primary key is filled by the database and must be left
/// untouched; explicit primary keys may be assigned like any other field.
///
/// ```ignore
/// let mut record = NewRecord::open(&mut conn, "contacts")?;
/// record.set("first_name", "Ada")?;
/// record.set("last_name", "Lovelace")?;
/// let id = record.insert()?;
/// ```
pub struct NewRecord<'c, C: Connection> {
    state: RecordState<'c, C>,
}

impl<'c, C: Connection> NewRecord<'c, C> {
    /// Bind to `table`, introspecting its schema through `conn`.
    pub fn open(conn: &'c mut C, table: &str) -> MapperResult<Self> {
        Ok(Self {
            state: RecordState::open(conn, table, Mode::Insert)?,
        })
    }

    /// Current value of a column.
    pub fn get(&self, column: &str) -> MapperResult<&Value> {
        self.state.get(column)
    }

    /// Set a column value for the insert.
    pub fn set(&mut self, column: &str, value: impl Into<Value>) -> MapperResult<()> {
        self.state.set(column, value.into())
    }

    /// The introspected schema, with current values.
    pub fn schema(&self) -> &TableSchema {
        &self.state.schema
    }

    /// Insert the record over the full schema, the auto-increment primary
    /// key excepted, and return the generated identity when the backend
    /// reports one.
    pub fn insert(&mut self) -> MapperResult<Option<i64>> {
        let statement = sql::insert_statement(&self.state.schema)?;
        debug!(table = self.state.schema.table(), %statement, "inserting record");
        self.state.conn.execute(&statement)?;
        self.state.conn.last_insert_id()
    }
}
