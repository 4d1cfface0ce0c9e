//! Value rows.

use rusqlite::{OptionalExtension, Transaction};

use crate::error::Result;
use crate::model::{TagId, Value, ValueId};
use crate::query::builder::SqlBuilder;
use crate::query::compile::collation_for;

/// The complete set of values, ordered by name.
pub fn all_values(tx: &Transaction) -> Result<Vec<Value>> {
    let mut stmt = tx.prepare("SELECT id, name FROM value ORDER BY name")?;
    let values = stmt
        .query_map([], read_value)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(values)
}

/// Retrieves a value by id.
pub fn value_by_id(tx: &Transaction, id: ValueId) -> Result<Option<Value>> {
    let value = tx
        .query_row("SELECT id, name FROM value WHERE id = ?1", [id], read_value)
        .optional()?;
    Ok(value)
}

/// Retrieves a value by name under the given case rule.
pub fn value_by_name(tx: &Transaction, name: &str, ignore_case: bool) -> Result<Option<Value>> {
    let collation = collation_for(ignore_case);
    let value = tx
        .query_row(
            &format!("SELECT id, name FROM value WHERE name{collation} = ?1"),
            [name],
            read_value,
        )
        .optional()?;
    Ok(value)
}

/// Retrieves the values matching any of the given names.
pub fn values_by_names(tx: &Transaction, names: &[&str], ignore_case: bool) -> Result<Vec<Value>> {
    if names.is_empty() {
        return Ok(Vec::new());
    }

    let mut builder = SqlBuilder::new();
    builder.append_sql(&format!(
        "SELECT id, name
FROM value
WHERE name{} IN (",
        collation_for(ignore_case)
    ));
    for name in names {
        builder.append_param((*name).to_owned());
    }
    builder.append_sql(")");

    let mut stmt = tx.prepare(builder.sql())?;
    let values = stmt
        .query_map(
            rusqlite::params_from_iter(builder.params().iter()),
            read_value,
        )?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(values)
}

/// The values in use with the given tag, ordered by name.
pub fn values_by_tag_id(tx: &Transaction, tag_id: TagId) -> Result<Vec<Value>> {
    let mut stmt = tx.prepare(
        "SELECT DISTINCT v.id, v.name
FROM value v
INNER JOIN file_tag ft ON ft.value_id = v.id
WHERE ft.tag_id = ?1
ORDER BY v.name",
    )?;
    let values = stmt
        .query_map([tag_id], read_value)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(values)
}

/// Adds a value.
pub fn insert_value(tx: &Transaction, name: &str) -> Result<Value> {
    tx.execute("INSERT INTO value (name) VALUES (?1)", [name])?;
    Ok(Value {
        id: tx.last_insert_rowid(),
        name: name.to_owned(),
    })
}

fn read_value(row: &rusqlite::Row) -> rusqlite::Result<Value> {
    Ok(Value {
        id: row.get(0)?,
        name: row.get(1)?,
    })
}
