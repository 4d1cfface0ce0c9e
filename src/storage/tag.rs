//! Tag rows.

use rusqlite::{OptionalExtension, Transaction};

use crate::error::Result;
use crate::model::{Tag, TagId};
use crate::query::builder::SqlBuilder;
use crate::query::compile::collation_for;

/// The complete set of tags, ordered by name.
pub fn all_tags(tx: &Transaction) -> Result<Vec<Tag>> {
    let mut stmt = tx.prepare("SELECT id, name FROM tag ORDER BY name")?;
    let tags = stmt
        .query_map([], read_tag)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(tags)
}

/// Retrieves a tag by id.
pub fn tag_by_id(tx: &Transaction, id: TagId) -> Result<Option<Tag>> {
    let tag = tx
        .query_row("SELECT id, name FROM tag WHERE id = ?1", [id], read_tag)
        .optional()?;
    Ok(tag)
}

/// Retrieves a tag by name under the given case rule.
pub fn tag_by_name(tx: &Transaction, name: &str, ignore_case: bool) -> Result<Option<Tag>> {
    let collation = collation_for(ignore_case);
    let tag = tx
        .query_row(
            &format!("SELECT id, name FROM tag WHERE name{collation} = ?1"),
            [name],
            read_tag,
        )
        .optional()?;
    Ok(tag)
}

/// Retrieves the tags matching any of the given names.
pub fn tags_by_names(tx: &Transaction, names: &[&str], ignore_case: bool) -> Result<Vec<Tag>> {
    if names.is_empty() {
        return Ok(Vec::new());
    }

    let mut builder = SqlBuilder::new();
    builder.append_sql(&format!(
        "SELECT id, name
FROM tag
WHERE name{} IN (",
        collation_for(ignore_case)
    ));
    for name in names {
        builder.append_param((*name).to_owned());
    }
    builder.append_sql(")");

    let mut stmt = tx.prepare(builder.sql())?;
    let tags = stmt
        .query_map(rusqlite::params_from_iter(builder.params().iter()), read_tag)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(tags)
}

/// Adds a tag.
pub fn insert_tag(tx: &Transaction, name: &str) -> Result<Tag> {
    tx.execute("INSERT INTO tag (name) VALUES (?1)", [name])?;
    Ok(Tag {
        id: tx.last_insert_rowid(),
        name: name.to_owned(),
    })
}

fn read_tag(row: &rusqlite::Row) -> rusqlite::Result<Tag> {
    Ok(Tag {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}
