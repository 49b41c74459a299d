//! Table schema model.
//!
//! A [`TableSchema`] is built once per table binding by the introspector and
//! then carries live per-column state (current value, changed flag) through a
//! record cycle. A value-cleared snapshot, the shadow schema, lets one mapper
//! instance run many independent cycles against the same table without
//! re-issuing introspection queries.

use crate::error::{MapperError, MapperResult};
use crate::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Two-valued simplification of a column's SQL type.
///
/// Chosen by the dialect's type classifier and used only to pick an escaping
/// strategy. Dates and BLOBs are deliberately TEXT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveClass {
    Numeric,
    Text,
}

impl fmt::Display for PrimitiveClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric => f.write_str("numeric"),
            Self::Text => f.write_str("text"),
        }
    }
}

/// Schema metadata and live state for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub class: PrimitiveClass,
    pub nullable: bool,
    pub primary_key: bool,
    pub auto_increment: bool,
    /// Current value, populated by a read or an explicit set.
    #[serde(default)]
    pub value: Value,
    /// Set only by explicit field sets; distinguishes "loaded but untouched"
    /// from "intentionally modified".
    #[serde(default)]
    pub changed: bool,
}

impl ColumnDescriptor {
    pub fn new(
        class: PrimitiveClass,
        nullable: bool,
        primary_key: bool,
        auto_increment: bool,
    ) -> Self {
        Self {
            class,
            nullable,
            primary_key,
            auto_increment,
            value: Value::Null,
            changed: false,
        }
    }
}

/// Ordered column name → descriptor mapping for one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    table: String,
    columns: IndexMap<String, ColumnDescriptor>,
    primary_key: Option<String>,
}

impl TableSchema {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: IndexMap::new(),
            primary_key: None,
        }
    }

    /// Append a column, enforcing the schema invariants: unique names, at
    /// most one primary key, auto-increment only on the primary key.
    pub fn push_column(
        &mut self,
        name: impl Into<String>,
        descriptor: ColumnDescriptor,
    ) -> MapperResult<()> {
        let name = name.into();
        if self.columns.contains_key(&name) {
            return Err(MapperError::schema(
                &self.table,
                format!("duplicate column '{name}' in metadata"),
            ));
        }
        if descriptor.primary_key {
            if let Some(existing) = &self.primary_key {
                return Err(MapperError::schema(
                    &self.table,
                    format!(
                        "composite primary keys are not supported ('{existing}' and '{name}')"
                    ),
                ));
            }
            self.primary_key = Some(name.clone());
        } else if descriptor.auto_increment {
            return Err(MapperError::schema(
                &self.table,
                format!("column '{name}' is auto-increment but not the primary key"),
            ));
        }
        self.columns.insert(name, descriptor);
        Ok(())
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Name of the primary key column, if the table has one.
    pub fn primary_key(&self) -> Option<&str> {
        self.primary_key.as_deref()
    }

    /// Look up a column by exact name.
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.get(name)
    }

    /// Look up a column, failing with `UnknownColumn` when absent.
    pub fn get(&self, name: &str) -> MapperResult<&ColumnDescriptor> {
        self.columns
            .get(name)
            .ok_or_else(|| MapperError::unknown_column(name))
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> MapperResult<&mut ColumnDescriptor> {
        self.columns
            .get_mut(name)
            .ok_or_else(|| MapperError::unknown_column(name))
    }

    /// Store a value loaded from the database without flipping the changed
    /// flag. Result columns absent from the schema are ignored.
    pub(crate) fn load_value(&mut self, name: &str, value: Value) {
        if let Some(descriptor) = self.columns.get_mut(name) {
            descriptor.value = value;
            descriptor.changed = false;
        }
    }

    /// Iterate columns in table order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &ColumnDescriptor)> {
        self.columns.iter().map(|(name, d)| (name.as_str(), d))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Value-cleared copy: same metadata, every value null, nothing changed.
    /// This is the shadow schema a mapper resets from.
    pub fn cleared(&self) -> TableSchema {
        let mut copy = self.clone();
        for descriptor in copy.columns.values_mut() {
            descriptor.value = Value::Null;
            descriptor.changed = false;
        }
        copy
    }
}
