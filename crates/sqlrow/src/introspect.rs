//! Runtime schema introspection.
//!
//! Given a connection and a table name, issue the dialect-appropriate
//! metadata queries and produce a [`TableSchema`]. This is the only module
//! that knows how the two families expose their metadata:
//!
//! - MariaDB/MySQL answers everything through one `SHOW COLUMNS` query;
//!   auto-increment is a substring of the `Extra` modifier column.
//! - SQLite splits the answer: `PRAGMA table_info` covers names, types,
//!   nullability and the primary key, but auto-increment only shows up
//!   indirectly, as a row in the internal `sqlite_sequence` table.

use crate::connection::Connection;
use crate::dialect::Dialect;
use crate::error::{MapperError, MapperResult};
use crate::ident::is_valid_ident;
use crate::row::Row;
use crate::schema::{ColumnDescriptor, TableSchema};
use crate::value::Value;
use tracing::debug;

/// Introspect `table` and build its schema.
///
/// Fails with a `Schema` error when the metadata query errors, the table
/// does not exist, or the table shape is unsupported (composite primary key,
/// exotic identifiers).
pub fn describe<C: Connection>(conn: &mut C, table: &str) -> MapperResult<TableSchema> {
    if !is_valid_ident(table) {
        return Err(MapperError::schema(
            table,
            "table name is not a plain SQL identifier",
        ));
    }
    let dialect = conn.dialect();
    debug!(%table, %dialect, "describing table");
    let schema = match dialect {
        Dialect::MariaDb => describe_mariadb(conn, table),
        Dialect::Sqlite => describe_sqlite(conn, table),
    }?;
    if schema.is_empty() {
        return Err(MapperError::schema(table, "table does not exist"));
    }
    Ok(schema)
}

fn describe_mariadb<C: Connection>(conn: &mut C, table: &str) -> MapperResult<TableSchema> {
    let sql = format!("SHOW COLUMNS FROM {table}");
    let rows = conn.query(&sql)?;

    let mut schema = TableSchema::new(table);
    for row in rows {
        let name = required_text(&row, "Field", table)?;
        if !is_valid_ident(&name) {
            return Err(MapperError::schema(
                table,
                format!("column '{name}' is not a plain SQL identifier"),
            ));
        }
        let declared = required_text(&row, "Type", table)?;
        let nullable = required_text(&row, "Null", table)?.eq_ignore_ascii_case("YES");
        let primary_key = optional_text(&row, "Key").eq_ignore_ascii_case("PRI");
        // Extra carries modifiers such as "auto_increment DEFAULT_GENERATED";
        // a substring match is the documented way to find the flag.
        let extra = optional_text(&row, "Extra").to_ascii_lowercase();
        let auto_increment = primary_key && extra.contains("auto_increment");

        schema.push_column(
            name,
            ColumnDescriptor::new(
                Dialect::MariaDb.classify(&declared),
                nullable,
                primary_key,
                auto_increment,
            ),
        )?;
    }
    Ok(schema)
}

fn describe_sqlite<C: Connection>(conn: &mut C, table: &str) -> MapperResult<TableSchema> {
    let sql = format!("PRAGMA table_info('{table}')");
    let rows: Vec<Row> = conn.query(&sql)?.collect();

    let mut schema = TableSchema::new(table);
    for row in rows {
        let name = required_text(&row, "name", table)?;
        if !is_valid_ident(&name) {
            return Err(MapperError::schema(
                table,
                format!("column '{name}' is not a plain SQL identifier"),
            ));
        }
        let declared = optional_text(&row, "type");
        let not_null = required_int(&row, "notnull", table)? != 0;
        let pk_ordinal = required_int(&row, "pk", table)?;
        if pk_ordinal > 1 {
            return Err(MapperError::schema(
                table,
                "composite primary keys are not supported",
            ));
        }
        let primary_key = pk_ordinal == 1;
        let auto_increment = primary_key && pk_auto_increments(conn, table)?;

        schema.push_column(
            name,
            ColumnDescriptor::new(
                Dialect::Sqlite.classify(&declared),
                !not_null,
                primary_key,
                auto_increment,
            ),
        )?;
    }
    Ok(schema)
}

/// SQLite does not expose auto-increment on the column metadata. A table's
/// primary key auto-increments exactly when the internal `sqlite_sequence`
/// table exists and holds a row for the table, which is only the case once
/// an AUTOINCREMENT table has allocated its first rowid.
fn pk_auto_increments<C: Connection>(conn: &mut C, table: &str) -> MapperResult<bool> {
    let sql = "SELECT count(*) AS num \
               FROM sqlite_master WHERE type = 'table' AND name = 'sqlite_sequence'";
    if scalar_count(conn, sql)? != 1 {
        return Ok(false);
    }
    let sql = format!("SELECT count(*) AS num FROM sqlite_sequence WHERE name = '{table}'");
    Ok(scalar_count(conn, &sql)? == 1)
}

fn scalar_count<C: Connection>(conn: &mut C, sql: &str) -> MapperResult<i64> {
    let row = conn
        .query(sql)?
        .next()
        .ok_or_else(|| MapperError::query(sql, "count query returned no rows"))?;
    match row.get("num") {
        Some(Value::Int(n)) => Ok(*n),
        other => Err(MapperError::query(
            sql,
            format!("count query returned {other:?}"),
        )),
    }
}

fn required_text(row: &Row, column: &str, table: &str) -> MapperResult<String> {
    match row.get(column) {
        Some(Value::Text(s)) => Ok(s.clone()),
        Some(Value::Null) | None => Err(MapperError::schema(
            table,
            format!("metadata column '{column}' missing from result"),
        )),
        Some(other) => Ok(other.to_string()),
    }
}

fn optional_text(row: &Row, column: &str) -> String {
    match row.get(column) {
        Some(Value::Text(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

fn required_int(row: &Row, column: &str, table: &str) -> MapperResult<i64> {
    match row.get(column) {
        Some(Value::Int(n)) => Ok(*n),
        Some(Value::Text(s)) => s.trim().parse().map_err(|_| {
            MapperError::schema(table, format!("metadata column '{column}' is not numeric"))
        }),
        _ => Err(MapperError::schema(
            table,
            format!("metadata column '{column}' missing from result"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::mock::MockConnection;
    use crate::schema::PrimitiveClass;

    fn text(s: &str) -> Value {
        Value::Text(s.into())
    }

    const SHOW_COLUMNS: &[&str] = &["Field", "Type", "Null", "Key", "Default", "Extra"];

    fn push_contacts_metadata(conn: &mut MockConnection) {
        conn.push_rows(
            SHOW_COLUMNS,
            vec![
                vec![
                    text("contact_id"),
                    text("int(11)"),
                    text("NO"),
                    text("PRI"),
                    Value::Null,
                    text("auto_increment"),
                ],
                vec![
                    text("first_name"),
                    text("varchar(120)"),
                    text("YES"),
                    text(""),
                    Value::Null,
                    text(""),
                ],
            ],
        );
    }

    #[test]
    fn mariadb_show_columns_maps_flags() {
        let mut conn = MockConnection::new(Dialect::MariaDb);
        push_contacts_metadata(&mut conn);

        let schema = describe(&mut conn, "contacts").unwrap();
        assert_eq!(conn.log, vec!["SHOW COLUMNS FROM contacts"]);
        assert_eq!(schema.primary_key(), Some("contact_id"));

        let id = schema.get("contact_id").unwrap();
        assert_eq!(id.class, PrimitiveClass::Numeric);
        assert!(!id.nullable);
        assert!(id.auto_increment);

        let name = schema.get("first_name").unwrap();
        assert_eq!(name.class, PrimitiveClass::Text);
        assert!(name.nullable);
        assert!(!name.primary_key);
    }

    #[test]
    fn introspection_is_stable_across_runs() {
        let mut conn = MockConnection::new(Dialect::MariaDb);
        push_contacts_metadata(&mut conn);
        push_contacts_metadata(&mut conn);

        let first = describe(&mut conn, "contacts").unwrap();
        let second = describe(&mut conn, "contacts").unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn empty_metadata_means_missing_table() {
        let mut conn = MockConnection::new(Dialect::MariaDb);
        conn.push_rows(SHOW_COLUMNS, vec![]);
        let err = describe(&mut conn, "nope").unwrap_err();
        assert!(matches!(err, MapperError::Schema { .. }));
    }

    #[test]
    fn rejects_unsafe_table_name() {
        let mut conn = MockConnection::new(Dialect::MariaDb);
        let err = describe(&mut conn, "contacts; DROP TABLE x").unwrap_err();
        assert!(matches!(err, MapperError::Schema { .. }));
    }

    const TABLE_INFO: &[&str] = &["cid", "name", "type", "notnull", "dflt_value", "pk"];

    #[test]
    fn sqlite_pragma_with_sequence_row_marks_auto_increment() {
        let mut conn = MockConnection::new(Dialect::Sqlite);
        conn.push_rows(
            TABLE_INFO,
            vec![
                vec![Value::Int(0), text("id"), text("INTEGER"), Value::Int(0), Value::Null, Value::Int(1)],
                vec![Value::Int(1), text("body"), text("TEXT"), Value::Int(1), Value::Null, Value::Int(0)],
            ],
        );
        // sqlite_sequence exists and tracks this table
        conn.push_rows(&["num"], vec![vec![Value::Int(1)]]);
        conn.push_rows(&["num"], vec![vec![Value::Int(1)]]);

        let schema = describe(&mut conn, "notes").unwrap();
        let id = schema.get("id").unwrap();
        assert!(id.primary_key);
        assert!(id.auto_increment);
        assert_eq!(id.class, PrimitiveClass::Numeric);

        let body = schema.get("body").unwrap();
        assert!(!body.nullable);
        assert_eq!(body.class, PrimitiveClass::Text);
    }

    #[test]
    fn sqlite_without_sequence_table_is_not_auto_increment() {
        let mut conn = MockConnection::new(Dialect::Sqlite);
        conn.push_rows(
            TABLE_INFO,
            vec![vec![Value::Int(0), text("id"), text("INTEGER"), Value::Int(0), Value::Null, Value::Int(1)]],
        );
        conn.push_rows(&["num"], vec![vec![Value::Int(0)]]);

        let schema = describe(&mut conn, "notes").unwrap();
        assert!(!schema.get("id").unwrap().auto_increment);
    }

    #[test]
    fn sqlite_composite_primary_key_is_rejected() {
        let mut conn = MockConnection::new(Dialect::Sqlite);
        conn.push_rows(
            TABLE_INFO,
            vec![
                vec![Value::Int(0), text("a"), text("INTEGER"), Value::Int(1), Value::Null, Value::Int(1)],
                vec![Value::Int(1), text("b"), text("INTEGER"), Value::Int(1), Value::Null, Value::Int(2)],
            ],
        );
        conn.push_rows(&["num"], vec![vec![Value::Int(0)]]);

        let err = describe(&mut conn, "pair").unwrap_err();
        assert!(matches!(err, MapperError::Schema { .. }));
    }
}
