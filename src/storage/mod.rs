//! SQLite-backed catalogue storage.
//!
//! The catalogue is a single SQLite database holding tags, values, files,
//! taggings and implication edges. All reads and writes go through a
//! caller-supplied transaction so that multi-step operations (notably the
//! implication closure) observe one consistent snapshot.

use std::path::Path;

use rusqlite::{Connection, Transaction};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// File rows and query execution.
pub mod file;

/// Tagging rows.
pub mod filetag;

/// Implication edges and their transitive closure.
pub mod implication;

/// Table creation and schema versioning.
pub mod schema;

/// Tag rows.
pub mod tag;

/// Value rows.
pub mod value;

pub use file::FileSort;

/// An open catalogue database.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Creates a new catalogue at `path`, including any missing parent
    /// directories. Fails if a file already exists there.
    pub fn create(path: &Path) -> Result<Self> {
        if path.exists() {
            return Err(Error::DatabaseExists(path.display().to_string()));
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        schema::create(&conn)?;

        info!(path = %path.display(), "catalogue created");
        Ok(Self { conn })
    }

    /// Opens an existing catalogue, verifying its schema version.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::NoDatabase);
        }

        let conn = Connection::open(path)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;

        let version = schema::version(&conn)?;
        if version != schema::SCHEMA_VERSION {
            return Err(Error::UnsupportedSchema(version));
        }

        debug!(path = %path.display(), "catalogue opened");
        Ok(Self { conn })
    }

    /// Begins a transaction; all storage operations take one.
    pub fn transaction(&mut self) -> Result<Transaction<'_>> {
        Ok(self.conn.transaction()?)
    }
}
