//! Crate-wide error type and result alias.

use std::io;

use thiserror::Error;

use crate::query::QueryError;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the catalogue and its command surface.
#[derive(Debug, Error)]
pub enum Error {
    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Failure reported by the SQLite layer.
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// The query text could not be lexed, parsed or compiled.
    #[error("could not parse query: {0}")]
    Query(#[from] QueryError),
    /// Output serialization failure.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    /// No catalogue database could be located.
    #[error("no catalogue found; run 'quarry init' or set QUARRY_DB")]
    NoDatabase,
    /// The catalogue already exists at the requested location.
    #[error("catalogue already exists at '{0}'")]
    DatabaseExists(String),
    /// The database schema version is not one this build understands.
    #[error("unsupported catalogue schema version {0}")]
    UnsupportedSchema(i64),
    /// A tag name was referenced that the catalogue does not contain.
    #[error("no such tag '{0}'")]
    NoSuchTag(String),
    /// A value name was referenced that the catalogue does not contain.
    #[error("no such value '{0}'")]
    NoSuchValue(String),
    /// A file path was referenced that the catalogue does not track.
    #[error("file '{0}' is not in the catalogue")]
    NoSuchFile(String),
    /// An implication was referenced that the catalogue does not contain.
    #[error("no such implication")]
    NoSuchImplication,
    /// A tag or value name failed validation.
    #[error("{0}")]
    InvalidName(String),
    /// A malformed command-line argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The configuration file could not be read or parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
}
