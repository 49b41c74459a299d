//! Batch-load rows through one Upsert instance: a single introspection
//! call, one minimal-diff INSERT per row, reset in between.

use sqlrow::{Connection, MapperResult, SqliteConnection, Upsert};

const CONTACTS: &[(&str, &str)] = &[
    ("Ada", "Lovelace"),
    ("Alan", "Turing"),
    ("Grace", "Hopper"),
];

fn main() -> MapperResult<()> {
    let mut conn = SqliteConnection::open_in_memory()?;
    conn.execute(
        "CREATE TABLE contacts (\
           contact_id INTEGER PRIMARY KEY AUTOINCREMENT, \
           first_name TEXT NOT NULL, \
           last_name TEXT NOT NULL)",
    )?;

    let mut upsert = Upsert::open(&mut conn, "contacts", None)?;
    let mut last_id = None;
    for (first, last) in CONTACTS {
        upsert.set("first_name", *first)?;
        upsert.set("last_name", *last)?;
        last_id = Some(upsert.save()?);
        upsert.reset(None)?;
    }
    println!("loaded {} contacts, last identity {last_id:?}", CONTACTS.len());

    // flip the same instance into update mode for a one-column fix
    upsert.reset(last_id)?;
    upsert.set("last_name", "Hopper-Murray")?;
    let id = upsert.save()?;
    println!("updated contact {id}");
    Ok(())
}
