//! Worklist-closure tests over the implication graph.

use quarry::model::{TagValuePair, NO_VALUE_ID};
use quarry::storage::{implication, tag, value, Database};
use quarry::{Error, Result};
use rusqlite::Transaction;

fn new_catalogue() -> Result<(tempfile::TempDir, Database)> {
    let dir = tempfile::tempdir()?;
    let db = Database::create(&dir.path().join("db"))?;
    Ok((dir, db))
}

fn tag_pair(tx: &Transaction, name: &str) -> Result<TagValuePair> {
    let row = match tag::tag_by_name(tx, name, false)? {
        Some(row) => row,
        None => tag::insert_tag(tx, name)?,
    };
    Ok(TagValuePair::new(row.id, NO_VALUE_ID))
}

fn valued_pair(tx: &Transaction, tag_name: &str, value_name: &str) -> Result<TagValuePair> {
    let tag_row = match tag::tag_by_name(tx, tag_name, false)? {
        Some(row) => row,
        None => tag::insert_tag(tx, tag_name)?,
    };
    let value_row = match value::value_by_name(tx, value_name, false)? {
        Some(row) => row,
        None => value::insert_value(tx, value_name)?,
    };
    Ok(TagValuePair::new(tag_row.id, value_row.id))
}

#[test]
fn closure_of_a_single_edge() -> Result<()> {
    let (_dir, mut db) = new_catalogue()?;
    let tx = db.transaction()?;

    let mp3 = tag_pair(&tx, "mp3")?;
    let music = tag_pair(&tx, "music")?;
    implication::add_implication(&tx, mp3, music)?;

    let closure = implication::implications_for(&tx, &[mp3])?;
    assert_eq!(closure.len(), 1);
    assert_eq!(closure[0].tag.name, "mp3");
    assert_eq!(closure[0].implied_tag.name, "music");
    Ok(())
}

#[test]
fn closure_follows_chains_transitively() -> Result<()> {
    let (_dir, mut db) = new_catalogue()?;
    let tx = db.transaction()?;

    let mp3 = tag_pair(&tx, "mp3")?;
    let music = tag_pair(&tx, "music")?;
    let media = tag_pair(&tx, "media")?;
    implication::add_implication(&tx, mp3, music)?;
    implication::add_implication(&tx, music, media)?;

    let closure = implication::implications_for(&tx, &[mp3])?;
    let implied: Vec<_> = closure.iter().map(|i| i.implied_tag.name.as_str()).collect();
    assert_eq!(implied, vec!["music", "media"]);

    // seeding mid-chain sees only the tail
    let closure = implication::implications_for(&tx, &[music])?;
    assert_eq!(closure.len(), 1);
    assert_eq!(closure[0].implied_tag.name, "media");
    Ok(())
}

#[test]
fn closure_terminates_on_cycles() -> Result<()> {
    let (_dir, mut db) = new_catalogue()?;
    let tx = db.transaction()?;

    let alpha = tag_pair(&tx, "alpha")?;
    let beta = tag_pair(&tx, "beta")?;
    implication::add_implication(&tx, alpha, beta)?;
    implication::add_implication(&tx, beta, alpha)?;

    let closure = implication::implications_for(&tx, &[alpha])?;
    assert_eq!(closure.len(), 2);

    // a self-loop is equally harmless
    let selfish = tag_pair(&tx, "selfish")?;
    implication::add_implication(&tx, selfish, selfish)?;
    let closure = implication::implications_for(&tx, &[selfish])?;
    assert_eq!(closure.len(), 1);
    Ok(())
}

#[test]
fn wildcard_sources_match_any_value() -> Result<()> {
    let (_dir, mut db) = new_catalogue()?;
    let tx = db.transaction()?;

    let mp3_any = tag_pair(&tx, "mp3")?;
    let music = tag_pair(&tx, "music")?;
    implication::add_implication(&tx, mp3_any, music)?;

    // seed carries a concrete value; the wildcard edge still applies
    let mp3_128k = valued_pair(&tx, "mp3", "128k")?;
    let closure = implication::implications_for(&tx, &[mp3_128k])?;
    assert_eq!(closure.len(), 1);
    assert_eq!(closure[0].implied_tag.name, "music");
    Ok(())
}

#[test]
fn value_specific_sources_require_that_value() -> Result<()> {
    let (_dir, mut db) = new_catalogue()?;
    let tx = db.transaction()?;

    let high = valued_pair(&tx, "quality", "high")?;
    let keeper = tag_pair(&tx, "keeper")?;
    implication::add_implication(&tx, high, keeper)?;

    let low = valued_pair(&tx, "quality", "low")?;
    assert!(implication::implications_for(&tx, &[low])?.is_empty());
    assert_eq!(implication::implications_for(&tx, &[high])?.len(), 1);
    Ok(())
}

#[test]
fn adding_an_edge_twice_is_idempotent() -> Result<()> {
    let (_dir, mut db) = new_catalogue()?;
    let tx = db.transaction()?;

    let mp3 = tag_pair(&tx, "mp3")?;
    let music = tag_pair(&tx, "music")?;
    implication::add_implication(&tx, mp3, music)?;
    implication::add_implication(&tx, mp3, music)?;

    assert_eq!(implication::implications(&tx)?.len(), 1);
    Ok(())
}

#[test]
fn deleting_a_missing_edge_fails() -> Result<()> {
    let (_dir, mut db) = new_catalogue()?;
    let tx = db.transaction()?;

    let mp3 = tag_pair(&tx, "mp3")?;
    let music = tag_pair(&tx, "music")?;

    assert!(matches!(
        implication::delete_implication(&tx, mp3, music),
        Err(Error::NoSuchImplication)
    ));

    implication::add_implication(&tx, mp3, music)?;
    implication::delete_implication(&tx, mp3, music)?;
    assert!(implication::implications(&tx)?.is_empty());
    Ok(())
}

#[test]
fn listing_orders_by_names() -> Result<()> {
    let (_dir, mut db) = new_catalogue()?;
    let tx = db.transaction()?;

    let zebra = tag_pair(&tx, "zebra")?;
    let apple = tag_pair(&tx, "apple")?;
    let mango = tag_pair(&tx, "mango")?;
    implication::add_implication(&tx, zebra, mango)?;
    implication::add_implication(&tx, apple, mango)?;

    let all = implication::implications(&tx)?;
    let sources: Vec<_> = all.iter().map(|i| i.tag.name.as_str()).collect();
    assert_eq!(sources, vec!["apple", "zebra"]);
    Ok(())
}
