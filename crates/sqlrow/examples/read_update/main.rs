//! Load one identified record, change a field, write it back.

use sqlrow::{Connection, MapperResult, Record, SqliteConnection};

fn main() -> MapperResult<()> {
    let mut conn = SqliteConnection::open_in_memory()?;
    conn.execute(
        "CREATE TABLE contacts (\
           contact_id INTEGER PRIMARY KEY AUTOINCREMENT, \
           first_name TEXT NOT NULL, \
           last_name TEXT NOT NULL)",
    )?;
    conn.execute("INSERT INTO contacts (first_name, last_name) VALUES ('Ada', 'Lovelace')")?;

    let mut record = Record::open(&mut conn, "contacts")?;
    record.add_where("contact_id", 1)?;
    record.load_one()?;
    println!(
        "loaded: {} {}",
        record.get("first_name")?,
        record.get("last_name")?
    );

    record.set("last_name", "King")?;
    record.update()?;
    println!("updated exactly one row");
    Ok(())
}
