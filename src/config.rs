//! Catalogue discovery and user settings.
//!
//! The database is located, in order, from an explicit path (the
//! `--database` flag or the `QUARRY_DB` environment variable, both handled
//! by the CLI), a `.quarry/db` found by walking up from the working
//! directory, or the per-user default under the platform data directory.
//! Defaults for query options live in an optional `config.toml` beside the
//! database file.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::storage::FileSort;

/// Directory holding a catalogue, searched for in ancestor directories.
pub const DATABASE_DIR: &str = ".quarry";
/// Database file name within [`DATABASE_DIR`].
pub const DATABASE_FILE: &str = "db";
/// Settings file name, looked up beside the database file.
pub const SETTINGS_FILE: &str = "config.toml";

/// User-configurable defaults applied when the corresponding command-line
/// flag is absent.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Compare tag and value names case-insensitively.
    pub ignore_case: bool,
    /// Default result ordering for `files`.
    pub sort: FileSort,
}

impl Settings {
    /// Loads the settings stored beside the given database file, falling
    /// back to defaults when no settings file exists.
    pub fn load(database_path: &Path) -> Result<Self> {
        let path = match database_path.parent() {
            Some(parent) => parent.join(SETTINGS_FILE),
            None => return Ok(Self::default()),
        };

        if !path.is_file() {
            return Ok(Self::default());
        }

        debug!(path = %path.display(), "loading settings");
        let text = fs::read_to_string(&path)?;
        toml::from_str(&text).map_err(|error| Error::Config(error.to_string()))
    }
}

/// The path `init` creates a catalogue at when none is given: `.quarry/db`
/// under the working directory.
pub fn default_database_path() -> Result<PathBuf> {
    Ok(env::current_dir()?.join(DATABASE_DIR).join(DATABASE_FILE))
}

/// Resolves the database to operate on. An explicit path always wins;
/// otherwise ancestors of the working directory are searched, then the
/// per-user default location.
pub fn resolve_database(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }

    if let Some(found) = find_database()? {
        return Ok(found);
    }

    if let Some(user) = user_database_path() {
        if user.is_file() {
            return Ok(user);
        }
    }

    Err(Error::NoDatabase)
}

/// Searches the working directory and its ancestors for `.quarry/db`.
fn find_database() -> Result<Option<PathBuf>> {
    let mut directory = Some(env::current_dir()?);

    while let Some(current) = directory {
        let candidate = current.join(DATABASE_DIR).join(DATABASE_FILE);
        if candidate.is_file() {
            debug!(path = %candidate.display(), "catalogue found");
            return Ok(Some(candidate));
        }
        directory = current.parent().map(Path::to_path_buf);
    }

    Ok(None)
}

/// The per-user fallback database location.
fn user_database_path() -> Option<PathBuf> {
    dirs::data_dir().map(|data| data.join("quarry").join(DATABASE_FILE))
}
