//! SQL statement synthesis.
//!
//! Pure functions from schema state to statement text. Every field check
//! (type, nullability, auto-increment policy, identity presence) happens
//! here, before any statement is handed to the connection, so a failed
//! validation never leaves a half-applied write behind.

use crate::error::{MapperError, MapperResult};
use crate::escape::escape;
use crate::schema::TableSchema;
use crate::value::Value;
use indexmap::IndexMap;
use tracing::trace;

/// Filter conditions for tables without a primary key: column name → value.
pub(crate) type WhereSet = IndexMap<String, Value>;

/// `SELECT * FROM table [WHERE ...]` over the filter set.
pub(crate) fn select_statement(schema: &TableSchema, wheres: &WhereSet) -> MapperResult<String> {
    let mut sql = format!("SELECT * FROM {}", schema.table());
    push_where(&mut sql, schema, wheres)?;
    Ok(sql)
}

/// Full-schema `UPDATE`, excluding the identity column(s) from the SET list.
///
/// Identity is the primary key when one exists, the filter columns
/// otherwise. Every written column is null-checked against the schema first.
pub(crate) fn update_statement(schema: &TableSchema, wheres: &WhereSet) -> MapperResult<String> {
    let mut assignments = Vec::new();
    for (name, descriptor) in schema.columns() {
        let skip = match schema.primary_key() {
            Some(pk) => name == pk,
            None => wheres.contains_key(name),
        };
        if skip {
            trace!(column = name, "skipping identity column");
            continue;
        }
        if descriptor.value.is_null() && !descriptor.nullable {
            return Err(MapperError::NotNullViolation {
                column: name.to_string(),
            });
        }
        assignments.push(format!(
            "{name} = {}",
            escape(name, &descriptor.value, descriptor.class)?
        ));
    }
    if assignments.is_empty() {
        return Err(MapperError::EmptyWrite {
            table: schema.table().to_string(),
        });
    }

    let mut sql = format!("UPDATE {} SET {}", schema.table(), assignments.join(", "));
    push_identity(&mut sql, schema, wheres)?;
    Ok(sql)
}

/// Full-schema `INSERT`, excluding an auto-increment primary key.
pub(crate) fn insert_statement(schema: &TableSchema) -> MapperResult<String> {
    let mut columns = Vec::new();
    let mut values = Vec::new();
    for (name, descriptor) in schema.columns() {
        if descriptor.primary_key && descriptor.auto_increment {
            if !descriptor.value.is_null() {
                return Err(MapperError::AutoIncrementConflict {
                    column: name.to_string(),
                });
            }
            trace!(column = name, "skipping auto-increment primary key");
            continue;
        }
        if descriptor.value.is_null() && !descriptor.nullable {
            return Err(MapperError::NotNullViolation {
                column: name.to_string(),
            });
        }
        columns.push(name);
        values.push(escape(name, &descriptor.value, descriptor.class)?);
    }
    if columns.is_empty() {
        return Err(MapperError::EmptyWrite {
            table: schema.table().to_string(),
        });
    }

    Ok(format!(
        "INSERT INTO {} ({}) VALUES ({})",
        schema.table(),
        columns.join(", "),
        values.join(", ")
    ))
}

/// Minimal-diff `INSERT`: only columns explicitly marked changed.
pub(crate) fn changed_insert_statement(schema: &TableSchema) -> MapperResult<String> {
    let mut columns = Vec::new();
    let mut values = Vec::new();
    for (name, descriptor) in schema.columns() {
        if descriptor.primary_key && descriptor.auto_increment {
            if !descriptor.value.is_null() {
                return Err(MapperError::AutoIncrementConflict {
                    column: name.to_string(),
                });
            }
            continue;
        }
        if !descriptor.changed {
            continue;
        }
        if descriptor.value.is_null() && !descriptor.nullable {
            return Err(MapperError::NotNullViolation {
                column: name.to_string(),
            });
        }
        columns.push(name);
        values.push(escape(name, &descriptor.value, descriptor.class)?);
    }
    if columns.is_empty() {
        return Err(MapperError::EmptyWrite {
            table: schema.table().to_string(),
        });
    }

    Ok(format!(
        "INSERT INTO {} ({}) VALUES ({})",
        schema.table(),
        columns.join(", "),
        values.join(", ")
    ))
}

/// Minimal-diff `UPDATE` keyed on the primary key: only changed columns in
/// the SET list, the primary key itself always excluded.
pub(crate) fn changed_update_statement(schema: &TableSchema) -> MapperResult<String> {
    let pk = schema.primary_key().ok_or_else(|| {
        MapperError::missing_identity(format!(
            "table '{}' has no primary key to update by",
            schema.table()
        ))
    })?;

    let mut assignments = Vec::new();
    for (name, descriptor) in schema.columns() {
        if name == pk || !descriptor.changed {
            continue;
        }
        if descriptor.value.is_null() && !descriptor.nullable {
            return Err(MapperError::NotNullViolation {
                column: name.to_string(),
            });
        }
        assignments.push(format!(
            "{name} = {}",
            escape(name, &descriptor.value, descriptor.class)?
        ));
    }
    if assignments.is_empty() {
        return Err(MapperError::EmptyWrite {
            table: schema.table().to_string(),
        });
    }

    let mut sql = format!("UPDATE {} SET {}", schema.table(), assignments.join(", "));
    push_identity(&mut sql, schema, &WhereSet::new())?;
    Ok(sql)
}

/// `DELETE FROM table WHERE pk = id`.
pub(crate) fn delete_statement(schema: &TableSchema, id: i64) -> MapperResult<String> {
    let pk = schema.primary_key().ok_or_else(|| {
        MapperError::missing_identity(format!(
            "table '{}' has no primary key to delete by",
            schema.table()
        ))
    })?;
    Ok(format!(
        "DELETE FROM {} WHERE {pk} = {id}",
        schema.table()
    ))
}

/// Append the identifying predicate: primary key when present, the filter
/// set otherwise.
fn push_identity(sql: &mut String, schema: &TableSchema, wheres: &WhereSet) -> MapperResult<()> {
    match schema.primary_key() {
        Some(pk) => {
            let descriptor = schema.get(pk)?;
            if descriptor.value.is_null() {
                return Err(MapperError::missing_identity(format!(
                    "primary key '{pk}' holds no value"
                )));
            }
            sql.push_str(" WHERE ");
            sql.push_str(pk);
            sql.push_str(" = ");
            sql.push_str(&escape(pk, &descriptor.value, descriptor.class)?);
            Ok(())
        }
        None => {
            if wheres.is_empty() {
                return Err(MapperError::missing_identity(
                    "no primary key and no filter conditions".to_string(),
                ));
            }
            push_where(sql, schema, wheres)
        }
    }
}

fn push_where(sql: &mut String, schema: &TableSchema, wheres: &WhereSet) -> MapperResult<()> {
    for (i, (column, value)) in wheres.iter().enumerate() {
        sql.push_str(if i == 0 { " WHERE " } else { " AND " });
        let descriptor = schema.get(column)?;
        sql.push_str(column);
        sql.push_str(" = ");
        sql.push_str(&escape(column, value, descriptor.class)?);
    }
    Ok(())
}
