//! Read one record, modify it, write it back. Also the home of delete.

use crate::connection::Connection;
use crate::error::{MapperError, MapperResult};
use crate::record::{Mode, RecordState};
use crate::schema::TableSchema;
use crate::sql;
use crate::value::Value;
use tracing::debug;

/// Loads one identified record for reading and updating.
///
/// With a primary key on the table, the loaded key value is the update
/// identity and the key itself becomes immutable. Without one, the filter
/// conditions added before the read are the only identity, so those columns
/// become immutable instead.
///
/// ```ignore
/// let mut record = Record::open(&mut conn, "contacts")?;
/// record.add_where("contact_id", 42)?;
/// record.load_one()?;
/// record.set("last_name", "King")?;
/// record.update()?;
/// ```
pub struct Record<'c, C: Connection> {
    state: RecordState<'c, C>,
}

impl<'c, C: Connection> std::fmt::Debug for Record<'c, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Record").finish_non_exhaustive()
    }
}

impl<'c, C: Connection> Record<'c, C> {
    /// Bind to `table`, introspecting its schema through `conn`.
    pub fn open(conn: &'c mut C, table: &str) -> MapperResult<Self> {
        Ok(Self {
            state: RecordState::open(conn, table, Mode::ReadUpdate)?,
        })
    }

    /// Add a `column = value` condition for the read (and, on a keyless
    /// table, for the update that follows it).
    pub fn add_where(&mut self, column: &str, value: impl Into<Value>) -> MapperResult<()> {
        self.state.add_where(column, value.into())
    }

    /// Read exactly one matching record into this instance.
    pub fn load_one(&mut self) -> MapperResult<()> {
        self.state.load_one()
    }

    /// Current value of a column, as loaded or last set.
    pub fn get(&self, column: &str) -> MapperResult<&Value> {
        self.state.get(column)
    }

    /// Set a column value for the next update.
    pub fn set(&mut self, column: &str, value: impl Into<Value>) -> MapperResult<()> {
        self.state.set(column, value.into())
    }

    /// The introspected schema, with current values.
    pub fn schema(&self) -> &TableSchema {
        &self.state.schema
    }

    /// Write the full record back, keyed on the primary key or the filter
    /// set. Fails `Cardinality` unless exactly one row was affected.
    pub fn update(&mut self) -> MapperResult<()> {
        if !self.state.loaded {
            return Err(MapperError::missing_identity(
                "update requires a previously loaded record",
            ));
        }
        let statement = sql::update_statement(&self.state.schema, &self.state.wheres)?;
        debug!(table = self.state.schema.table(), %statement, "updating record");
        let affected = self.state.conn.execute(&statement)?;
        if affected != 1 {
            return Err(MapperError::Cardinality { actual: affected });
        }
        Ok(())
    }

    /// Delete the record with the given primary-key value.
    ///
    /// Fails `Cardinality` unless exactly one row was deleted, the same
    /// check every other write path makes.
    pub fn delete(self, id: i64) -> MapperResult<()> {
        let statement = sql::delete_statement(&self.state.schema, id)?;
        debug!(table = self.state.schema.table(), %statement, "deleting record");
        let affected = self.state.conn.execute(&statement)?;
        if affected != 1 {
            return Err(MapperError::Cardinality { actual: affected });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::mock::MockConnection;
    use crate::dialect::Dialect;

    fn text(s: &str) -> Value {
        Value::Text(s.into())
    }

    const SHOW_COLUMNS: &[&str] = &["Field", "Type", "Null", "Key", "Default", "Extra"];

    /// contacts(contact_id PK auto-increment, first_name, last_name) on the
    /// MariaDB family.
    fn contacts_conn() -> MockConnection {
        let mut conn = MockConnection::new(Dialect::MariaDb);
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
                vec![
                    text("last_name"),
                    text("varchar(120)"),
                    text("YES"),
                    text(""),
                    Value::Null,
                    text(""),
                ],
            ],
        );
        conn
    }

    fn push_ada(conn: &mut MockConnection) {
        conn.push_rows(
            &["contact_id", "first_name", "last_name"],
            vec![vec![Value::Int(7), text("Ada"), text("Lovelace")]],
        );
    }

    #[test]
    fn read_then_update_issues_key_based_update() {
        let mut conn = contacts_conn();
        push_ada(&mut conn);
        conn.push_affected(1);

        let mut record = Record::open(&mut conn, "contacts").unwrap();
        record.add_where("contact_id", 7).unwrap();
        record.load_one().unwrap();
        assert_eq!(record.get("first_name").unwrap(), &text("Ada"));

        record.set("last_name", "King").unwrap();
        record.update().unwrap();

        assert_eq!(
            conn.log.last().unwrap(),
            "UPDATE contacts SET first_name = 'Ada', last_name = 'King' WHERE contact_id = 7"
        );
    }

    #[test]
    fn zero_and_many_rows_fail_cardinality() {
        let mut conn = contacts_conn();
        conn.push_rows(&["contact_id", "first_name", "last_name"], vec![]);

        let mut record = Record::open(&mut conn, "contacts").unwrap();
        record.add_where("contact_id", 999).unwrap();
        let err = record.load_one().unwrap_err();
        assert!(matches!(err, MapperError::Cardinality { actual: 0 }));

        let mut conn = contacts_conn();
        conn.push_rows(
            &["contact_id", "first_name", "last_name"],
            vec![
                vec![Value::Int(1), text("Ada"), text("Lovelace")],
                vec![Value::Int(2), text("Ada"), text("King")],
            ],
        );
        let mut record = Record::open(&mut conn, "contacts").unwrap();
        record.add_where("first_name", "Ada").unwrap();
        let err = record.load_one().unwrap_err();
        assert!(matches!(err, MapperError::Cardinality { actual: 2 }));
    }

    #[test]
    fn primary_key_is_immutable() {
        let mut conn = contacts_conn();
        push_ada(&mut conn);

        let mut record = Record::open(&mut conn, "contacts").unwrap();
        record.add_where("contact_id", 7).unwrap();
        record.load_one().unwrap();

        let err = record.set("contact_id", 99).unwrap_err();
        assert!(matches!(err, MapperError::ImmutableField { .. }));
    }

    #[test]
    fn update_before_load_is_rejected() {
        let mut conn = contacts_conn();
        let mut record = Record::open(&mut conn, "contacts").unwrap();
        record.set("last_name", "King").unwrap();
        let err = record.update().unwrap_err();
        assert!(matches!(err, MapperError::MissingIdentity(_)));
    }

    #[test]
    fn update_affecting_no_rows_fails_cardinality() {
        let mut conn = contacts_conn();
        push_ada(&mut conn);
        conn.push_affected(0);

        let mut record = Record::open(&mut conn, "contacts").unwrap();
        record.add_where("contact_id", 7).unwrap();
        record.load_one().unwrap();
        record.set("last_name", "King").unwrap();
        let err = record.update().unwrap_err();
        assert!(matches!(err, MapperError::Cardinality { actual: 0 }));
    }

    #[test]
    fn unknown_filter_column_is_rejected() {
        let mut conn = contacts_conn();
        let mut record = Record::open(&mut conn, "contacts").unwrap();
        assert!(record.add_where("nick_name", "ada").unwrap_err().is_unknown_column());
    }

    #[test]
    fn numeric_filter_rejects_text() {
        let mut conn = contacts_conn();
        let mut record = Record::open(&mut conn, "contacts").unwrap();
        assert!(record.add_where("contact_id", "abc").unwrap_err().is_type_mismatch());
    }

    #[test]
    fn delete_issues_key_based_delete() {
        let mut conn = contacts_conn();
        conn.push_affected(1);

        let record = Record::open(&mut conn, "contacts").unwrap();
        record.delete(7).unwrap();
        assert_eq!(conn.log.last().unwrap(), "DELETE FROM contacts WHERE contact_id = 7");
    }
}
