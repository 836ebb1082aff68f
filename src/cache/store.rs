use rusqlite::{Connection, OptionalExtension, ToSql};

use super::{
    entry::StoredEntry,
    worker::Record,
};
use crate::prelude::*;

/// Inserts a row if it is not there yet, then reads back its id.
fn upsert(conn: &Connection, insert: &str, select: &str, params: &[&dyn ToSql]) -> Result<i64>
{
    conn.execute(insert, params)?;
    let id = conn.query_row(select, params, |row| row.get(0))?;
    Ok(id)
}

/// Resolves the id of an engine configuration, creating its rows as needed.
pub fn register(conn: &mut Connection, config: &EngineConfig) -> Result<i64>
{
    let tx = conn.transaction()?;

    let engine_id = upsert(
        &tx,
        "INSERT OR IGNORE INTO engine (name) VALUES (?1)",
        "SELECT engine_id FROM engine WHERE name = ?1",
        &[&config.name],
    )?;

    let existing: Option<i64> = tx
        .query_row("SELECT set_id FROM option_set WHERE hash = ?1", [config.hash()], |row| row.get(0))
        .optional()?;

    let set_id = match existing
    {
        | Some(set_id) => set_id,
        | None =>
        {
            tx.execute("INSERT INTO option_set (hash) VALUES (?1)", [config.hash()])?;
            let set_id = tx.last_insert_rowid();

            for (name, value) in config.options.iter().filter(|(name, _)| !is_multipv(name))
            {
                let key_id = upsert(
                    &tx,
                    "INSERT OR IGNORE INTO option_key (engine_id, name) VALUES (?1, ?2)",
                    "SELECT key_id FROM option_key WHERE engine_id = ?1 AND name = ?2",
                    &[&engine_id, &name],
                )?;
                let pair_id = upsert(
                    &tx,
                    "INSERT OR IGNORE INTO option_pair (key_id, value) VALUES (?1, ?2)",
                    "SELECT pair_id FROM option_pair WHERE key_id = ?1 AND value = ?2",
                    &[&key_id, &value],
                )?;
                tx.execute(
                    "INSERT OR IGNORE INTO option_set_pair (set_id, pair_id) VALUES (?1, ?2)",
                    [set_id, pair_id],
                )?;
            }
            set_id
        }
    };

    let config_id = upsert(
        &tx,
        "INSERT OR IGNORE INTO engine_config (engine_id, set_id) VALUES (?1, ?2)",
        "SELECT config_id FROM engine_config WHERE engine_id = ?1 AND set_id = ?2",
        &[&engine_id, &set_id],
    )?;

    tx.commit()?;
    Ok(config_id)
}

/// Every stored entry of a position under a configuration.
pub fn candidates(conn: &Connection, config_id: i64, digest: Digest) -> Result<Vec<StoredEntry>>
{
    let mut stmt = conn.prepare_cached(
        "SELECT b.kind, b.amount, b.lines, e.nodes, e.data
         FROM entry e
         JOIN search_budget b ON b.budget_id = e.budget_id
         JOIN position p ON p.position_id = e.position_id
         WHERE b.config_id = ?1 AND p.digest = ?2",
    )?;

    let rows = stmt.query_map(rusqlite::params![config_id, digest.to_bytes().to_vec()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, i64>(1)?,
            row.get::<_, i64>(2)?,
            row.get::<_, i64>(3)?,
            row.get::<_, String>(4)?,
        ))
    })?;

    let mut entries = Vec::new();
    for row in rows
    {
        let (kind, amount, lines, nodes, data) = row?;
        let limit = Limit::from_parts(&kind, amount as u64)?;
        entries.push(StoredEntry {
            budget: SearchBudget::new(limit, lines as usize),
            nodes:  nodes as u64,
            lines:  serde_json::from_str(&data)?,
        });
    }
    Ok(entries)
}

/// Stores a search result unless one already exists for the same position and budget.
///
/// Returns whether a new entry was written.
pub fn insert(conn: &mut Connection, config_id: i64, record: &Record) -> Result<bool>
{
    let tx = conn.transaction()?;

    let kind = record.budget.limit.kind();
    let amount = record.budget.limit.amount() as i64;
    let lines = record.budget.lines as i64;
    let budget_id = upsert(
        &tx,
        "INSERT OR IGNORE INTO search_budget (config_id, kind, amount, lines) VALUES (?1, ?2, ?3, ?4)",
        "SELECT budget_id FROM search_budget WHERE config_id = ?1 AND kind = ?2 AND amount = ?3 AND lines = ?4",
        &[&config_id, &kind, &amount, &lines],
    )?;

    let digest = record.digest.to_bytes().to_vec();
    tx.execute(
        "INSERT OR IGNORE INTO position (digest, fen) VALUES (?1, ?2)",
        rusqlite::params![digest, record.fen],
    )?;
    let position_id: i64 =
        tx.query_row("SELECT position_id FROM position WHERE digest = ?1", [&digest], |row| row.get(0))?;

    let inserted = tx.execute(
        "INSERT OR IGNORE INTO entry (position_id, budget_id, nodes, data) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![position_id, budget_id, record.nodes as i64, record.data],
    )?;

    tx.commit()?;
    Ok(inserted > 0)
}
