//! Minimal-diff insert-or-update keyed on an optional identity.

use crate::connection::Connection;
use crate::error::{MapperError, MapperResult};
use crate::record::{Mode, RecordState};
use crate::schema::TableSchema;
use crate::sql;
use crate::value::Value;
use tracing::debug;

/// One operation for both insert and update, chosen by the identity given at
/// construction: absent means insert, present means update keyed on that
/// primary-key value.
///
/// Unlike [`Record`](crate::Record) and [`NewRecord`](crate::NewRecord),
/// which write the full schema, an upsert writes **only the columns
/// explicitly set since the last reset** (the minimal diff). [`Upsert::reset`]
/// restores the shadow schema, so one instance can run a whole batch of
/// record cycles against one introspection call:
///
/// ```ignore
/// let mut upsert = Upsert::open(&mut conn, "contacts", None)?;
/// for (first, last) in rows {
///     upsert.set("first_name", first)?;
///     upsert.set("last_name", last)?;
///     upsert.save()?;
///     upsert.reset(None)?;
/// }
/// ```
pub struct Upsert<'c, C: Connection> {
    state: RecordState<'c, C>,
    identity: Option<Value>,
}

impl<'c, C: Connection> std::fmt::Debug for Upsert<'c, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Upsert")
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

impl<'c, C: Connection> Upsert<'c, C> {
    /// Bind to `table`. With `identity` present the instance updates the
    /// record whose primary key equals it; otherwise it inserts.
    pub fn open(conn: &'c mut C, table: &str, identity: Option<Value>) -> MapperResult<Self> {
        let state = RecordState::open(conn, table, Mode::Insert)?;
        let mut upsert = Self {
            state,
            identity: None,
        };
        upsert.bind_identity(identity)?;
        Ok(upsert)
    }

    /// Current value of a column.
    pub fn get(&self, column: &str) -> MapperResult<&Value> {
        self.state.get(column)
    }

    /// Set a column value and mark it changed; only changed columns are
    /// written by [`Upsert::save`].
    pub fn set(&mut self, column: &str, value: impl Into<Value>) -> MapperResult<()> {
        self.state.set(column, value.into())
    }

    /// The introspected schema, with current values.
    pub fn schema(&self) -> &TableSchema {
        &self.state.schema
    }

    /// True when this cycle will update rather than insert.
    pub fn is_update(&self) -> bool {
        self.identity.is_some()
    }

    /// Write the changed columns: an INSERT in insert mode, an UPDATE keyed
    /// on the identity in update mode. Fails `Cardinality` unless exactly
    /// one row was created or affected. Returns the record's identity: the
    /// one given at construction, or the generated one on insert.
    pub fn save(&mut self) -> MapperResult<Value> {
        let statement = match self.identity {
            Some(_) => sql::changed_update_statement(&self.state.schema)?,
            None => sql::changed_insert_statement(&self.state.schema)?,
        };
        debug!(table = self.state.schema.table(), %statement, "saving record");
        let affected = self.state.conn.execute(&statement)?;
        if affected != 1 {
            return Err(MapperError::Cardinality { actual: affected });
        }
        match &self.identity {
            Some(id) => Ok(id.clone()),
            None => Ok(self
                .state
                .conn
                .last_insert_id()?
                .map(Value::Int)
                .unwrap_or(Value::Null)),
        }
    }

    /// Restore the value-cleared shadow schema and re-select the mode from
    /// `identity`, readying the instance for another cycle.
    pub fn reset(&mut self, identity: Option<Value>) -> MapperResult<()> {
        self.state.reset();
        self.identity = None;
        self.bind_identity(identity)
    }

    fn bind_identity(&mut self, identity: Option<Value>) -> MapperResult<()> {
        match identity {
            Some(id) => {
                let pk = self.state.schema.primary_key().ok_or_else(|| {
                    MapperError::missing_identity(format!(
                        "table '{}' has no primary key to upsert by",
                        self.state.schema.table()
                    ))
                })?;
                // the key value is identity, not a change; it feeds the
                // WHERE clause and stays out of the SET list
                let pk = pk.to_string();
                self.state.schema.load_value(&pk, id.clone());
                self.identity = Some(id);
                self.state.mode = Mode::ReadUpdate;
            }
            None => {
                self.identity = None;
                self.state.mode = Mode::Insert;
            }
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

    #[test]
    fn update_mode_writes_only_changed_columns() {
        let mut conn = contacts_conn();
        conn.push_affected(1);

        let mut upsert = Upsert::open(&mut conn, "contacts", Some(Value::Int(7))).unwrap();
        assert!(upsert.is_update());
        upsert.set("last_name", "King").unwrap();
        assert_eq!(upsert.save().unwrap(), Value::Int(7));

        assert_eq!(
            conn.log.last().unwrap(),
            "UPDATE contacts SET last_name = 'King' WHERE contact_id = 7"
        );
    }

    #[test]
    fn insert_mode_returns_generated_identity() {
        let mut conn = contacts_conn();
        conn.push_affected(1);
        conn.last_id = Some(31);

        let mut upsert = Upsert::open(&mut conn, "contacts", None).unwrap();
        upsert.set("first_name", "Grace").unwrap();
        upsert.set("last_name", "Hopper").unwrap();
        assert_eq!(upsert.save().unwrap(), Value::Int(31));

        assert_eq!(
            conn.log.last().unwrap(),
            "INSERT INTO contacts (first_name, last_name) VALUES ('Grace', 'Hopper')"
        );
    }

    #[test]
    fn primary_key_is_immutable_in_update_mode() {
        let mut conn = contacts_conn();
        let mut upsert = Upsert::open(&mut conn, "contacts", Some(Value::Int(7))).unwrap();
        let err = upsert.set("contact_id", 9).unwrap_err();
        assert!(matches!(err, MapperError::ImmutableField { .. }));
    }

    #[test]
    fn save_with_no_changes_is_rejected() {
        let mut conn = contacts_conn();
        let mut upsert = Upsert::open(&mut conn, "contacts", Some(Value::Int(7))).unwrap();
        let err = upsert.save().unwrap_err();
        assert!(matches!(err, MapperError::EmptyWrite { .. }));
    }

    #[test]
    fn reset_restores_shadow_schema_and_mode() {
        let mut conn = contacts_conn();
        conn.push_affected(1);

        let mut upsert = Upsert::open(&mut conn, "contacts", Some(Value::Int(7))).unwrap();
        upsert.set("last_name", "King").unwrap();
        upsert.save().unwrap();

        upsert.reset(None).unwrap();
        assert!(!upsert.is_update());
        assert!(upsert.get("last_name").unwrap().is_null());
        assert!(upsert.get("contact_id").unwrap().is_null());
        // every value cleared, nothing changed: identical to a fresh snapshot
        assert_eq!(upsert.schema(), &upsert.schema().cleared());
    }

    #[test]
    fn identity_on_keyless_table_is_rejected() {
        let mut conn = MockConnection::new(Dialect::MariaDb);
        conn.push_rows(
            SHOW_COLUMNS,
            vec![vec![
                text("name"),
                text("varchar(64)"),
                text("YES"),
                text(""),
                Value::Null,
                text(""),
            ]],
        );
        let err = Upsert::open(&mut conn, "settings", Some(Value::Int(1))).unwrap_err();
        assert!(matches!(err, MapperError::MissingIdentity(_)));
    }

    #[test]
    fn update_affecting_two_rows_fails_cardinality() {
        let mut conn = contacts_conn();
        conn.push_affected(2);

        let mut upsert = Upsert::open(&mut conn, "contacts", Some(Value::Int(7))).unwrap();
        upsert.set("last_name", "King").unwrap();
        let err = upsert.save().unwrap_err();
        assert!(matches!(err, MapperError::Cardinality { actual: 2 }));
    }
}
