//! File rows and execution of compiled queries.

use std::path::Path;

use rusqlite::{OptionalExtension, Transaction};
use serde::Deserialize;
use tracing::debug;

use crate::error::Result;
use crate::model::{File, FileId};
use crate::query::builder::SqlBuilder;
use crate::query::compile::{append_expression, CompileOptions};
use crate::query::Expression;

/// Result ordering for file queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileSort {
    /// Storage order.
    None,
    /// By surrogate id.
    Id,
    /// By full path.
    #[default]
    Name,
    /// By modification time, then path.
    Time,
    /// By size, then path.
    Size,
}

/// Retrieves the file with the given directory and name.
pub fn file_by_path(tx: &Transaction, directory: &str, name: &str) -> Result<Option<File>> {
    let file = tx
        .query_row(
            "SELECT id, directory, name, mod_time, size, is_dir
FROM file
WHERE directory = ?1 AND name = ?2",
            [directory, name],
            read_file,
        )
        .optional()?;
    Ok(file)
}

/// Adds a file.
pub fn insert_file(
    tx: &Transaction,
    directory: &str,
    name: &str,
    mod_time: i64,
    size: i64,
    is_dir: bool,
) -> Result<File> {
    tx.execute(
        "INSERT INTO file (directory, name, mod_time, size, is_dir)
VALUES (?1, ?2, ?3, ?4, ?5)",
        rusqlite::params![directory, name, mod_time, size, is_dir],
    )?;

    Ok(File {
        id: tx.last_insert_rowid(),
        directory: directory.to_owned(),
        name: name.to_owned(),
        mod_time,
        size,
        is_dir,
    })
}

/// Removes the file row if no tagging references it any more.
pub fn delete_file_if_untagged(tx: &Transaction, file_id: FileId) -> Result<()> {
    tx.execute(
        "DELETE FROM file
WHERE id = ?1
AND (SELECT count(1) FROM file_tag WHERE file_id = ?1) = 0",
        [file_id],
    )?;
    Ok(())
}

/// Retrieves the files matching the expression, optionally scoped to a path.
pub fn files_for_query(
    tx: &Transaction,
    expression: &Expression,
    path: Option<&Path>,
    options: CompileOptions,
    sort: FileSort,
) -> Result<Vec<File>> {
    let mut builder = SqlBuilder::new();
    builder.append_sql(
        "SELECT id, directory, name, mod_time, size, is_dir
FROM file
WHERE",
    );
    append_expression(expression, &mut builder, options)?;
    if let Some(path) = path {
        append_path_clause(path, &mut builder);
    }
    append_sort(sort, &mut builder);

    debug!(sql = builder.sql(), "executing file query");

    let mut stmt = tx.prepare(builder.sql())?;
    let files = stmt
        .query_map(
            rusqlite::params_from_iter(builder.params().iter()),
            read_file,
        )?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(files)
}

/// Retrieves the number of files matching the expression.
pub fn file_count_for_query(
    tx: &Transaction,
    expression: &Expression,
    path: Option<&Path>,
    options: CompileOptions,
) -> Result<u64> {
    let mut builder = SqlBuilder::new();
    builder.append_sql(
        "SELECT count(id)
FROM file
WHERE",
    );
    append_expression(expression, &mut builder, options)?;
    if let Some(path) = path {
        append_path_clause(path, &mut builder);
    }

    debug!(sql = builder.sql(), "executing file count query");

    let count = tx.query_row(
        builder.sql(),
        rusqlite::params_from_iter(builder.params().iter()),
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Scopes the statement to files at or under `path`, including the case
/// where `path` names a tagged file rather than a directory.
fn append_path_clause(path: &Path, builder: &mut SqlBuilder) {
    let path_text = path.to_string_lossy().into_owned();

    builder.append_sql("AND (directory = ");
    builder.append_param(path_text.clone());
    builder.append_sql(" OR directory LIKE ");
    builder.append_param(format!("{}/%", path_text.trim_end_matches('/')));

    if let (Some(parent), Some(name)) = (path.parent(), path.file_name()) {
        builder.append_sql(" OR (directory = ");
        builder.append_param(parent.to_string_lossy().into_owned());
        builder.append_sql(" AND name = ");
        builder.append_param(name.to_string_lossy().into_owned());
        builder.append_sql(")");
    }

    builder.append_sql(")");
}

fn append_sort(sort: FileSort, builder: &mut SqlBuilder) {
    match sort {
        FileSort::None => {}
        FileSort::Id => builder.append_sql("ORDER BY id"),
        FileSort::Name => builder.append_sql("ORDER BY directory || '/' || name"),
        FileSort::Time => builder.append_sql("ORDER BY mod_time, directory || '/' || name"),
        FileSort::Size => builder.append_sql("ORDER BY size, directory || '/' || name"),
    }
}

fn read_file(row: &rusqlite::Row) -> rusqlite::Result<File> {
    Ok(File {
        id: row.get(0)?,
        directory: row.get(1)?,
        name: row.get(2)?,
        mod_time: row.get(3)?,
        size: row.get(4)?,
        is_dir: row.get(5)?,
    })
}
