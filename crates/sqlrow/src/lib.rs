//! # sqlrow
//!
//! A dynamic, schema-aware single-record mapper for MariaDB/MySQL and
//! SQLite.
//!
//! Given an open connection and a table name, sqlrow introspects the table's
//! column structure at runtime (names, primitive class, nullability, primary
//! key, auto-increment) and offers typed, validated CRUD against exactly one
//! record at a time. There is no compile-time model: the schema *is* the
//! model.
//!
//! ## Operations
//!
//! - [`Record`] reads one identified record, lets you modify its fields, and
//!   writes the full record back (or deletes by key).
//! - [`NewRecord`] builds and inserts one new record over the full schema.
//! - [`Upsert`] inserts or updates writing **only the fields you set** (the
//!   minimal diff), and can be reset and reused for batch loads without
//!   re-introspecting.
//!
//! Every point operation enforces exactly-one-row semantics: a read that
//! matches zero or several rows, or a write that affects anything other than
//! one row, fails with [`MapperError::Cardinality`] instead of guessing.
//!
//! ## Example
//!
//! ```no_run
//! use sqlrow::{MapperResult, NewRecord, Record, SqliteConnection};
//!
//! fn main() -> MapperResult<()> {
//!     let mut conn = SqliteConnection::open("contacts.db")?;
//!
//!     let mut new = NewRecord::open(&mut conn, "contacts")?;
//!     new.set("first_name", "Ada")?;
//!     new.set("last_name", "Lovelace")?;
//!     let id = new.insert()?.expect("generated identity");
//!     drop(new);
//!
//!     let mut record = Record::open(&mut conn, "contacts")?;
//!     record.add_where("contact_id", id)?;
//!     record.load_one()?;
//!     record.set("last_name", "King")?;
//!     record.update()?;
//!     Ok(())
//! }
//! ```
//!
//! ## Scope and caveats
//!
//! - Column lookups are case-sensitive; the mapper never folds case because
//!   the backends disagree about identifier case rules.
//! - Composite primary keys are unsupported and rejected at introspection.
//! - Statement text is plain SQL assembled with primitive-class escaping and
//!   validated identifiers; see [`Connection`] for the binding note.
//! - Single-threaded, blocking. A connection is exclusively borrowed by one
//!   operation instance at a time; there is no pooling and no transaction
//!   management.

pub mod connection;
pub mod dialect;
pub mod error;
pub mod escape;
mod ident;
pub mod introspect;
pub mod record;
pub mod row;
pub mod schema;
pub(crate) mod sql;
pub mod value;

pub use connection::Connection;
pub use dialect::Dialect;
pub use error::{MapperError, MapperResult};
pub use escape::escape;
pub use introspect::describe;
pub use record::{NewRecord, Record, Upsert};
pub use row::{Row, Rows};
pub use schema::{ColumnDescriptor, PrimitiveClass, TableSchema};
pub use value::Value;

#[cfg(feature = "mysql")]
pub mod maria;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "mysql")]
pub use maria::MariaDbConnection;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteConnection;
