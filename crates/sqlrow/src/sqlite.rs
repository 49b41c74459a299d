//! SQLite connection handle (dialect family B), over rusqlite.

use crate::connection::Connection;
use crate::dialect::Dialect;
use crate::error::{MapperError, MapperResult};
use crate::row::{Row, Rows};
use crate::value::Value;
use rusqlite::types::ValueRef;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// An open SQLite database, file-backed or in-memory.
///
/// Values come back in SQLite's own storage classes: integers, reals, text
/// and nulls map directly; BLOBs surface as (lossy) text, consistent with
/// their TEXT classification. Store hex or base64 text if binary fidelity
/// matters.
pub struct SqliteConnection {
    conn: rusqlite::Connection,
}

impl SqliteConnection {
    /// Open (or create) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> MapperResult<Self> {
        rusqlite::Connection::open(path)
            .map(|conn| Self { conn })
            .map_err(|e| MapperError::connection(e.to_string()))
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> MapperResult<Self> {
        rusqlite::Connection::open_in_memory()
            .map(|conn| Self { conn })
            .map_err(|e| MapperError::connection(e.to_string()))
    }

    /// Wrap an already configured rusqlite connection.
    pub fn from_rusqlite(conn: rusqlite::Connection) -> Self {
        Self { conn }
    }

    /// Hand the underlying rusqlite connection back.
    pub fn into_inner(self) -> rusqlite::Connection {
        self.conn
    }
}

impl Connection for SqliteConnection {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn execute(&mut self, sql: &str) -> MapperResult<u64> {
        debug!(%sql, "execute");
        self.conn
            .execute(sql, [])
            .map(|n| n as u64)
            .map_err(|e| MapperError::query(sql, e.to_string()))
    }

    fn query(&mut self, sql: &str) -> MapperResult<Rows> {
        debug!(%sql, "query");
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| MapperError::query(sql, e.to_string()))?;
        let columns: Arc<[String]> = stmt
            .column_names()
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .into();

        let mut rows = stmt
            .query([])
            .map_err(|e| MapperError::query(sql, e.to_string()))?;
        let mut out = Vec::new();
        while let Some(row) = rows
            .next()
            .map_err(|e| MapperError::query(sql, e.to_string()))?
        {
            let mut values = Vec::with_capacity(columns.len());
            for i in 0..columns.len() {
                let value = match row
                    .get_ref(i)
                    .map_err(|e| MapperError::query(sql, e.to_string()))?
                {
                    ValueRef::Null => Value::Null,
                    ValueRef::Integer(v) => Value::Int(v),
                    ValueRef::Real(v) => Value::Float(v),
                    ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
                    ValueRef::Blob(b) => Value::Text(String::from_utf8_lossy(b).into_owned()),
                };
                values.push(value);
            }
            out.push(Row::new(Arc::clone(&columns), values));
        }
        Ok(Rows::new(out))
    }

    fn last_insert_id(&mut self) -> MapperResult<Option<i64>> {
        let id = self.conn.last_insert_rowid();
        Ok((id != 0).then_some(id))
    }
}
