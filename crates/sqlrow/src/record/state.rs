//! Shared per-instance state and the field get/set contract.

use crate::connection::Connection;
use crate::error::{MapperError, MapperResult};
use crate::introspect;
use crate::row::Row;
use crate::schema::{PrimitiveClass, TableSchema};
use crate::sql::{self, WhereSet};
use crate::value::Value;
use tracing::debug;

/// Whether field sets follow update-mode or insert-mode rules. The primary
/// key is only immutable in update mode; insert mode must allow assigning
/// explicit (non-auto-increment) keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    ReadUpdate,
    Insert,
}

pub(crate) struct RecordState<'c, C: Connection> {
    pub(crate) conn: &'c mut C,
    pub(crate) schema: TableSchema,
    pub(crate) shadow: TableSchema,
    pub(crate) wheres: WhereSet,
    pub(crate) mode: Mode,
    pub(crate) loaded: bool,
}

impl<'c, C: Connection> RecordState<'c, C> {
    pub(crate) fn open(conn: &'c mut C, table: &str, mode: Mode) -> MapperResult<Self> {
        let schema = introspect::describe(&mut *conn, table)?;
        let shadow = schema.cleared();
        Ok(Self {
            conn,
            schema,
            shadow,
            wheres: WhereSet::new(),
            mode,
            loaded: false,
        })
    }

    /// Current value of a column. Fails `UnknownColumn` on a miss; lookups
    /// are case-sensitive because both backends can be.
    pub(crate) fn get(&self, column: &str) -> MapperResult<&Value> {
        Ok(&self.schema.get(column)?.value)
    }

    /// Set a column value, enforcing the field contract: the column must
    /// exist, the value must match a NUMERIC column's class, and identity
    /// columns (the primary key in update mode, filter columns on keyless
    /// tables) are immutable.
    pub(crate) fn set(&mut self, column: &str, value: Value) -> MapperResult<()> {
        let descriptor = self.schema.get(column)?;
        if descriptor.class == PrimitiveClass::Numeric && !value.is_null() && !value.is_numeric() {
            return Err(MapperError::TypeMismatch {
                column: column.to_string(),
                expected: PrimitiveClass::Numeric,
                value: value.to_string(),
            });
        }

        match self.schema.primary_key() {
            Some(pk) => {
                if column == pk && self.mode == Mode::ReadUpdate {
                    return Err(MapperError::ImmutableField {
                        column: column.to_string(),
                        reason: "the primary key identifies the record being updated".to_string(),
                    });
                }
            }
            None => {
                if self.wheres.contains_key(column) {
                    return Err(MapperError::ImmutableField {
                        column: column.to_string(),
                        reason: "the column is part of the filter identifying the record"
                            .to_string(),
                    });
                }
            }
        }

        let descriptor = self.schema.get_mut(column)?;
        descriptor.value = value;
        descriptor.changed = true;
        Ok(())
    }

    /// Add a `column = value` filter condition. The column must exist and
    /// the value must match a NUMERIC column's class.
    pub(crate) fn add_where(&mut self, column: &str, value: Value) -> MapperResult<()> {
        let descriptor = self.schema.get(column)?;
        if descriptor.class == PrimitiveClass::Numeric && !value.is_numeric() {
            return Err(MapperError::TypeMismatch {
                column: column.to_string(),
                expected: PrimitiveClass::Numeric,
                value: value.to_string(),
            });
        }
        self.wheres.insert(column.to_string(), value);
        Ok(())
    }

    /// Read exactly one record matching the filter set into the schema
    /// state. Zero rows and multiple rows both fail `Cardinality`: zero
    /// means the filter or the data is wrong, more than one means the filter
    /// under-specifies identity. No `LIMIT 1` is forced for that reason.
    pub(crate) fn load_one(&mut self) -> MapperResult<()> {
        let statement = sql::select_statement(&self.schema, &self.wheres)?;
        debug!(table = self.schema.table(), %statement, "loading record");
        let rows: Vec<Row> = self.conn.query(&statement)?.collect();
        if rows.len() != 1 {
            return Err(MapperError::Cardinality {
                actual: rows.len() as u64,
            });
        }
        let row = rows.into_iter().next().expect("len == 1");
        for (column, value) in row.fields() {
            self.schema.load_value(column, value.clone());
        }
        self.loaded = true;
        Ok(())
    }

    /// Restore the value-cleared shadow schema for a fresh cycle.
    pub(crate) fn reset(&mut self) {
        self.schema = self.shadow.clone();
        self.wheres.clear();
        self.loaded = false;
    }
}
