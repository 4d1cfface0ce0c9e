//! Catalogue entities: tags, values, files, taggings and implications.

use std::path::PathBuf;

use serde::Serialize;

use crate::error::{Error, Result};

/// Surrogate identifier of a tag.
pub type TagId = i64;
/// Surrogate identifier of a value.
pub type ValueId = i64;
/// Surrogate identifier of a file.
pub type FileId = i64;

/// The value id recorded for a tagging that carries no value, and the
/// source-side wildcard in an implication ("regardless of value").
pub const NO_VALUE_ID: ValueId = 0;

/// A named label that can be applied to files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    /// Surrogate id.
    pub id: TagId,
    /// Unique name.
    pub name: String,
}

/// A named attribute paired with a tag when applied to a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Value {
    /// Surrogate id.
    pub id: ValueId,
    /// Unique name.
    pub name: String,
}

/// A file tracked by the catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct File {
    /// Surrogate id.
    pub id: FileId,
    /// Absolute directory containing the file.
    pub directory: String,
    /// File name within the directory.
    pub name: String,
    /// Modification time as unix seconds.
    pub mod_time: i64,
    /// Size in bytes.
    pub size: i64,
    /// Whether the entry is a directory.
    pub is_dir: bool,
}

impl File {
    /// The full path of the file.
    pub fn path(&self) -> PathBuf {
        PathBuf::from(&self.directory).join(&self.name)
    }
}

/// The association of a file with a (tag, value) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileTag {
    /// The tagged file.
    pub file_id: FileId,
    /// The applied tag.
    pub tag_id: TagId,
    /// The paired value, or [`NO_VALUE_ID`].
    pub value_id: ValueId,
}

/// A (tag, value) pair; the unit the implication graph is defined over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TagValuePair {
    /// Tag component.
    pub tag_id: TagId,
    /// Value component; [`NO_VALUE_ID`] means "no value" (or, on the source
    /// side of an implication, "regardless of value").
    pub value_id: ValueId,
}

impl TagValuePair {
    /// Builds a pair.
    pub fn new(tag_id: TagId, value_id: ValueId) -> Self {
        Self { tag_id, value_id }
    }
}

/// A directed implication edge between two (tag, value) pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Implication {
    /// Source tag.
    pub tag: Tag,
    /// Source value, if the edge is value-specific.
    pub value: Option<Value>,
    /// Implied tag.
    pub implied_tag: Tag,
    /// Implied value, if any.
    pub implied_value: Option<Value>,
}

impl Implication {
    /// The source side as an id pair.
    pub fn source_pair(&self) -> TagValuePair {
        TagValuePair::new(self.tag.id, self.value.as_ref().map_or(NO_VALUE_ID, |v| v.id))
    }

    /// The implied side as an id pair.
    pub fn implied_pair(&self) -> TagValuePair {
        TagValuePair::new(
            self.implied_tag.id,
            self.implied_value.as_ref().map_or(NO_VALUE_ID, |v| v.id),
        )
    }
}

/// Checks that a tag name is usable: non-empty, not a path special, not a
/// query keyword or operator alias, and free of control characters.
pub fn validate_tag_name(name: &str) -> Result<()> {
    validate_name("tag", name)
}

/// Checks that a value name is usable under the same rules as tag names.
pub fn validate_value_name(name: &str) -> Result<()> {
    validate_name("value", name)
}

fn validate_name(kind: &str, name: &str) -> Result<()> {
    match name {
        "" => return Err(Error::InvalidName(format!("{kind} name cannot be empty"))),
        "." | ".." => {
            return Err(Error::InvalidName(format!(
                "{kind} name cannot be '.' or '..'"
            )))
        }
        _ => {}
    }

    let lowered = name.to_lowercase();
    match lowered.as_str() {
        "and" | "or" | "not" => {
            return Err(Error::InvalidName(format!(
                "{kind} name cannot be a logical operator: 'and', 'or' or 'not'"
            )))
        }
        "eq" | "ne" | "lt" | "gt" | "le" | "ge" => {
            return Err(Error::InvalidName(format!(
                "{kind} name cannot be a comparison operator: 'eq', 'ne', 'lt', 'gt', 'le' or 'ge'"
            )))
        }
        _ => {}
    }

    for ch in name.chars() {
        if ch.is_control() {
            return Err(Error::InvalidName(format!(
                "{kind} names cannot contain {}",
                ch.escape_unicode()
            )));
        }
    }

    Ok(())
}
