//! Catalogue schema creation and versioning.

use rusqlite::Connection;

use crate::error::Result;

/// The schema version this build reads and writes, recorded in SQLite's
/// `user_version` pragma.
pub const SCHEMA_VERSION: i64 = 1;

/// Creates the catalogue tables and indexes and stamps the schema version.
pub fn create(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS tag (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            CONSTRAINT con_tag_name UNIQUE (name)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS value (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            CONSTRAINT con_value_name UNIQUE (name)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS file (
            id INTEGER PRIMARY KEY,
            directory TEXT NOT NULL,
            name TEXT NOT NULL,
            mod_time INTEGER NOT NULL,
            size INTEGER NOT NULL,
            is_dir BOOLEAN NOT NULL,
            CONSTRAINT con_file_path UNIQUE (directory, name)
        )",
        [],
    )?;

    // value_id 0 denotes "no value"; it references no value row, so the
    // column carries no foreign key
    conn.execute(
        "CREATE TABLE IF NOT EXISTS file_tag (
            file_id INTEGER NOT NULL,
            tag_id INTEGER NOT NULL,
            value_id INTEGER NOT NULL,
            PRIMARY KEY (file_id, tag_id, value_id)
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_file_tag_file_id ON file_tag(file_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_file_tag_tag_id ON file_tag(tag_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_file_tag_value_id ON file_tag(value_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS implication (
            tag_id INTEGER NOT NULL,
            value_id INTEGER NOT NULL,
            implied_tag_id INTEGER NOT NULL,
            implied_value_id INTEGER NOT NULL,
            PRIMARY KEY (tag_id, value_id, implied_tag_id, implied_value_id)
        )",
        [],
    )?;

    conn.pragma_update(None, "user_version", SCHEMA_VERSION)?;

    Ok(())
}

/// Reads the schema version of an open database.
pub fn version(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row("PRAGMA user_version", [], |row| row.get(0))?)
}
