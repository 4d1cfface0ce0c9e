//! Tagging rows: the association of files with (tag, value) pairs.

use rusqlite::Transaction;

use crate::error::Result;
use crate::model::{FileId, FileTag, TagId, ValueId};

/// Records a tagging; already-present taggings are left untouched.
pub fn insert_file_tag(
    tx: &Transaction,
    file_id: FileId,
    tag_id: TagId,
    value_id: ValueId,
) -> Result<FileTag> {
    tx.execute(
        "INSERT OR IGNORE INTO file_tag (file_id, tag_id, value_id) VALUES (?1, ?2, ?3)",
        [file_id, tag_id, value_id],
    )?;

    Ok(FileTag {
        file_id,
        tag_id,
        value_id,
    })
}

/// Removes a tagging; returns whether a row was actually removed.
pub fn delete_file_tag(
    tx: &Transaction,
    file_id: FileId,
    tag_id: TagId,
    value_id: ValueId,
) -> Result<bool> {
    let affected = tx.execute(
        "DELETE FROM file_tag WHERE file_id = ?1 AND tag_id = ?2 AND value_id = ?3",
        [file_id, tag_id, value_id],
    )?;
    Ok(affected > 0)
}

/// The explicit taggings of a file.
pub fn file_tags_by_file_id(tx: &Transaction, file_id: FileId) -> Result<Vec<FileTag>> {
    let mut stmt = tx.prepare(
        "SELECT file_id, tag_id, value_id
FROM file_tag
WHERE file_id = ?1
ORDER BY tag_id, value_id",
    )?;
    let file_tags = stmt
        .query_map([file_id], |row| {
            Ok(FileTag {
                file_id: row.get(0)?,
                tag_id: row.get(1)?,
                value_id: row.get(2)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(file_tags)
}
