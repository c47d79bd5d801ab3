use rusqlite::{Connection, OptionalExtension};

use crate::error::StorageError;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS storage (
    key        TEXT PRIMARY KEY,
    value      TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
);
";

const UPSERT: &str = "
INSERT INTO storage (key, value) VALUES (?1, ?2)
ON CONFLICT(key) DO UPDATE SET
    value = excluded.value,
    updated_at = strftime('%Y-%m-%dT%H:%M:%SZ', 'now')
";

fn set_pragmas(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA busy_timeout = 5000;",
    )?;
    Ok(())
}

pub fn open(path: &str) -> Result<Connection, StorageError> {
    let conn = Connection::open(path)?;
    set_pragmas(&conn)?;
    Ok(conn)
}

pub fn init(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

pub fn open_memory() -> Result<Connection, StorageError> {
    let conn = Connection::open_in_memory()?;
    set_pragmas(&conn)?;
    init(&conn)?;
    Ok(conn)
}

pub fn get_item(conn: &Connection, key: &str) -> Result<Option<String>, StorageError> {
    let value = conn
        .query_row("SELECT value FROM storage WHERE key = ?1", [key], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(value)
}

pub fn set_item(conn: &Connection, key: &str, value: &str) -> Result<(), StorageError> {
    conn.execute(UPSERT, rusqlite::params![key, value])?;
    Ok(())
}
