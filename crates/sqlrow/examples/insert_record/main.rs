//! Insert one record into a runtime-discovered table.

use sqlrow::{Connection, MapperResult, NewRecord, SqliteConnection};

fn main() -> MapperResult<()> {
    let mut conn = SqliteConnection::open_in_memory()?;
    conn.execute(
        "CREATE TABLE contacts (\
           contact_id INTEGER PRIMARY KEY AUTOINCREMENT, \
           first_name TEXT NOT NULL, \
           last_name TEXT NOT NULL)",
    )?;

    let mut record = NewRecord::open(&mut conn, "contacts")?;
    record.set("first_name", "Ada")?;
    record.set("last_name", "Lovelace")?;
    let id = record.insert()?;

    println!("inserted contact with identity {id:?}");
    Ok(())
}
