//! Implication edges and their transitive closure.
//!
//! The closure walk keeps an explicit visited set keyed on (tag, value)
//! pairs, so it terminates on cyclic graphs. Cycle-forming edges are legal
//! catalogue state.

use std::collections::HashSet;

use rusqlite::Transaction;
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::{Implication, Tag, TagValuePair, Value};
use crate::query::builder::SqlBuilder;

const SELECT_COLUMNS: &str = "SELECT t.id, t.name,
       v.id, v.name,
       it.id, it.name,
       iv.id, iv.name
FROM implication i
INNER JOIN tag t ON i.tag_id = t.id
LEFT OUTER JOIN value v ON i.value_id = v.id
INNER JOIN tag it ON i.implied_tag_id = it.id
LEFT OUTER JOIN value iv ON i.implied_value_id = iv.id";

/// The complete set of implication edges, ordered by the involved names.
pub fn implications(tx: &Transaction) -> Result<Vec<Implication>> {
    let mut stmt = tx.prepare(&format!(
        "{SELECT_COLUMNS}
ORDER BY t.name, v.name, it.name, iv.name"
    ))?;
    let implications = stmt
        .query_map([], read_implication)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(implications)
}

/// The transitive closure of implications reachable from the given seed
/// pairs: repeatedly fetch the edges whose source matches a frontier pair
/// and follow unvisited implied pairs until a fixpoint.
pub fn implications_for(tx: &Transaction, pairs: &[TagValuePair]) -> Result<Vec<Implication>> {
    let mut closure: Vec<Implication> = Vec::new();
    let mut visited: HashSet<TagValuePair> = pairs.iter().copied().collect();
    let mut frontier: Vec<TagValuePair> = pairs.to_vec();

    while !frontier.is_empty() {
        let edges = direct_implications_for(tx, &frontier)?;
        frontier = Vec::new();

        for edge in edges {
            let implied = edge.implied_pair();
            if visited.insert(implied) {
                frontier.push(implied);
            }
            if !closure.contains(&edge) {
                closure.push(edge);
            }
        }
    }

    debug!(seeds = pairs.len(), edges = closure.len(), "implication closure computed");
    Ok(closure)
}

/// Adds an implication edge. Cycle-forming edges are accepted; every closure
/// computation is guarded against them.
pub fn add_implication(
    tx: &Transaction,
    pair: TagValuePair,
    implied_pair: TagValuePair,
) -> Result<()> {
    tx.execute(
        "INSERT OR IGNORE INTO implication (tag_id, value_id, implied_tag_id, implied_value_id)
VALUES (?1, ?2, ?3, ?4)",
        [
            pair.tag_id,
            pair.value_id,
            implied_pair.tag_id,
            implied_pair.value_id,
        ],
    )?;
    Ok(())
}

/// Removes an implication edge.
pub fn delete_implication(
    tx: &Transaction,
    pair: TagValuePair,
    implied_pair: TagValuePair,
) -> Result<()> {
    let affected = tx.execute(
        "DELETE FROM implication
WHERE tag_id = ?1 AND value_id = ?2 AND implied_tag_id = ?3 AND implied_value_id = ?4",
        [
            pair.tag_id,
            pair.value_id,
            implied_pair.tag_id,
            implied_pair.value_id,
        ],
    )?;

    if affected == 0 {
        return Err(Error::NoSuchImplication);
    }
    Ok(())
}

/// One step of the closure: the edges whose source side matches any of the
/// given pairs. A source value of 0 matches regardless of the pair's value.
fn direct_implications_for(
    tx: &Transaction,
    pairs: &[TagValuePair],
) -> Result<Vec<Implication>> {
    if pairs.is_empty() {
        return Ok(Vec::new());
    }

    let mut builder = SqlBuilder::new();
    builder.append_sql(SELECT_COLUMNS);
    builder.append_sql("WHERE");

    for (index, pair) in pairs.iter().enumerate() {
        if index > 0 {
            builder.append_sql("   OR ");
        }

        builder.append_sql("(i.tag_id = ");
        builder.append_param(pair.tag_id);
        builder.append_sql(" AND i.value_id IN (0, ");
        builder.append_param(pair.value_id);
        builder.append_sql("))");
    }

    builder.append_sql("ORDER BY t.name, v.name, it.name, iv.name");

    let mut stmt = tx.prepare(builder.sql())?;
    let implications = stmt
        .query_map(
            rusqlite::params_from_iter(builder.params().iter()),
            read_implication,
        )?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(implications)
}

fn read_implication(row: &rusqlite::Row) -> rusqlite::Result<Implication> {
    let value = match (row.get::<_, Option<i64>>(2)?, row.get::<_, Option<String>>(3)?) {
        (Some(id), Some(name)) => Some(Value { id, name }),
        _ => None,
    };
    let implied_value = match (row.get::<_, Option<i64>>(6)?, row.get::<_, Option<String>>(7)?) {
        (Some(id), Some(name)) => Some(Value { id, name }),
        _ => None,
    };

    Ok(Implication {
        tag: Tag {
            id: row.get(0)?,
            name: row.get(1)?,
        },
        value,
        implied_tag: Tag {
            id: row.get(4)?,
            name: row.get(5)?,
        },
        implied_value,
    })
}
