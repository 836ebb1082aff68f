use std::path::Path;

use rusqlite::Connection;

use crate::prelude::*;

/// The layout version this build reads and writes.
pub const SCHEMA_VERSION: i64 = 1;

const PRAGMAS: &str = "
PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;
PRAGMA busy_timeout = 5000;
PRAGMA foreign_keys = ON;
PRAGMA temp_store = MEMORY;
";

const DROP_SQL: &str = "
DROP TABLE IF EXISTS entry;
DROP TABLE IF EXISTS position;
DROP TABLE IF EXISTS search_budget;
DROP TABLE IF EXISTS engine_config;
DROP TABLE IF EXISTS option_set_pair;
DROP TABLE IF EXISTS option_set;
DROP TABLE IF EXISTS option_pair;
DROP TABLE IF EXISTS option_key;
DROP TABLE IF EXISTS engine;
DROP TABLE IF EXISTS schema_version;
";

const SCHEMA_SQL: &str = "
CREATE TABLE schema_version (
    version INTEGER NOT NULL
);

CREATE TABLE engine (
    engine_id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE option_key (
    key_id INTEGER PRIMARY KEY,
    engine_id INTEGER NOT NULL REFERENCES engine(engine_id),
    name TEXT NOT NULL,
    UNIQUE (engine_id, name)
);

CREATE TABLE option_pair (
    pair_id INTEGER PRIMARY KEY,
    key_id INTEGER NOT NULL REFERENCES option_key(key_id),
    value TEXT NOT NULL,
    UNIQUE (key_id, value)
);

CREATE TABLE option_set (
    set_id INTEGER PRIMARY KEY,
    hash TEXT NOT NULL UNIQUE
);

CREATE TABLE option_set_pair (
    set_id INTEGER NOT NULL REFERENCES option_set(set_id),
    pair_id INTEGER NOT NULL REFERENCES option_pair(pair_id),
    PRIMARY KEY (set_id, pair_id)
);

CREATE TABLE engine_config (
    config_id INTEGER PRIMARY KEY,
    engine_id INTEGER NOT NULL REFERENCES engine(engine_id),
    set_id INTEGER NOT NULL REFERENCES option_set(set_id),
    UNIQUE (engine_id, set_id)
);

CREATE TABLE search_budget (
    budget_id INTEGER PRIMARY KEY,
    config_id INTEGER NOT NULL REFERENCES engine_config(config_id),
    kind TEXT NOT NULL,
    amount INTEGER NOT NULL,
    lines INTEGER NOT NULL,
    UNIQUE (config_id, kind, amount, lines)
);

CREATE TABLE position (
    position_id INTEGER PRIMARY KEY,
    digest BLOB NOT NULL UNIQUE,
    fen TEXT NOT NULL
);

CREATE TABLE entry (
    position_id INTEGER NOT NULL REFERENCES position(position_id),
    budget_id INTEGER NOT NULL REFERENCES search_budget(budget_id),
    nodes INTEGER NOT NULL,
    data TEXT NOT NULL,
    PRIMARY KEY (position_id, budget_id)
);
CREATE INDEX idx_entry_budget ON entry(budget_id);
";

/// Opens a connection to the store with the pragmas every connection uses.
pub fn connect(path: &Path) -> Result<Connection>
{
    let conn = Connection::open(path)?;
    conn.execute_batch(PRAGMAS)?;
    Ok(conn)
}

/// Opens the store, initializing it from scratch if its layout version cannot be read or is not ours.
///
/// When the tables cannot even be dropped, the file itself is removed and created anew.
pub fn prepare(path: &Path) -> Result<Connection>
{
    let mut conn = match connect(path)
    {
        | Ok(conn) => conn,
        | Err(err) =>
        {
            log::warn!("Could not open cache {}, recreating the file: {}", path.display(), err);
            remove_store(path)?;
            connect(path)?
        }
    };

    match version(&conn)
    {
        | Ok(v) if v == SCHEMA_VERSION => return Ok(conn),
        | Ok(v) => log::warn!("Cache {} has layout version {}, resetting it.", path.display(), v),
        | Err(_) => log::info!("Initializing cache {}.", path.display()),
    }

    if let Err(err) = reset(&mut conn)
    {
        log::warn!("Could not reset cache {}, recreating the file: {}", path.display(), err);
        drop(conn);
        remove_store(path)?;
        conn = connect(path)?;
        reset(&mut conn)?;
    }

    Ok(conn)
}

/// Reads the stored layout version.
pub fn version(conn: &Connection) -> Result<i64>
{
    let version = conn.query_row("SELECT version FROM schema_version", [], |row| row.get(0))?;
    Ok(version)
}

/// Drops and recreates every table.
pub fn reset(conn: &mut Connection) -> Result<()>
{
    let tx = conn.transaction()?;
    tx.execute_batch(DROP_SQL)?;
    tx.execute_batch(SCHEMA_SQL)?;
    tx.execute("INSERT INTO schema_version (version) VALUES (?1)", [SCHEMA_VERSION])?;
    tx.commit()?;
    Ok(())
}

fn remove_store(path: &Path) -> Result<()>
{
    for suffix in ["", "-wal", "-shm"]
    {
        let mut name = path.as_os_str().to_owned();
        name.push(suffix);
        match std::fs::remove_file(&name)
        {
            | Err(err) if err.kind() != std::io::ErrorKind::NotFound => return Err(err.into()),
            | _ => (),
        }
    }
    Ok(())
}
