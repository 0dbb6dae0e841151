// src/store/mod.rs

//! Durable key-value store backed by SQLite
//!
//! Minimal binding of the transactional store the state core relies on:
//! string keys mapped to byte values, with explicit read and write
//! transaction scopes. A write scope's mutations become visible all at once
//! on commit; returning an error from the scope discards every one of them,
//! even across a process crash (SQLite's journal guarantees this). Removing
//! an absent key is not an error.

use crate::error::{Error, Result};
use rusqlite::{Connection, OptionalExtension};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Durable key-value store
///
/// One store maps to one SQLite database file. SQLite serializes
/// transactions, so no locking happens at this layer; callers must not nest
/// an independent write transaction inside another.
pub struct KeyValueStore {
    conn: Connection,
}

/// An open transaction scope against the store
///
/// Handed to the closures passed to [`KeyValueStore::read_transaction`] and
/// [`KeyValueStore::write_transaction`]. All reads and writes through the
/// handle observe and join the same transaction.
pub struct Transaction<'conn> {
    tx: rusqlite::Transaction<'conn>,
}

impl KeyValueStore {
    /// Open (creating if necessary) the store at the given path
    ///
    /// Parent directories are created as needed. Durability pragmas are set
    /// so a committed transaction survives power loss.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        init_connection(&conn)?;

        debug!("Opened key-value store at {}", path.display());
        Ok(Self { conn })
    }

    /// Open an in-memory store, for tests
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        init_connection(&conn)?;
        Ok(Self { conn })
    }

    /// Run a closure inside a read transaction
    ///
    /// The transaction is rolled back when the closure returns, so any
    /// writes made through the handle are discarded; use
    /// [`write_transaction`](Self::write_transaction) to persist.
    pub fn read_transaction<T>(&self, f: impl FnOnce(&Transaction) -> Result<T>) -> Result<T> {
        let txn = Transaction {
            tx: self.conn.unchecked_transaction()?,
        };
        // Dropping the inner transaction rolls it back.
        f(&txn)
    }

    /// Run a closure inside a write transaction
    ///
    /// Commits if the closure returns `Ok`, rolls back every write if it
    /// returns `Err`. No partially committed state is ever observable.
    pub fn write_transaction<T>(&self, f: impl FnOnce(&Transaction) -> Result<T>) -> Result<T> {
        let txn = Transaction {
            tx: self.conn.unchecked_transaction()?,
        };
        let result = f(&txn)?;
        txn.tx.commit()?;
        Ok(result)
    }

    /// Read a single key outside any explicit transaction scope
    pub fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        read_value(&self.conn, key)
    }

    /// Write a single key in its own transaction
    pub fn write(&self, key: &str, value: &[u8]) -> Result<()> {
        self.write_transaction(|txn| txn.write(key, value))
    }

    /// Remove a single key in its own transaction; absent keys are fine
    pub fn remove(&self, key: &str) -> Result<()> {
        self.write_transaction(|txn| txn.remove(key))
    }
}

impl Transaction<'_> {
    /// Read the value stored under `key`, `None` if absent
    pub fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        read_value(&self.tx, key)
    }

    /// Read the value stored under `key` as UTF-8 text
    ///
    /// Absent keys yield an empty string. Non-UTF-8 content is reported as
    /// corrupted database state.
    pub fn read_string(&self, key: &str) -> Result<String> {
        match self.read(key)? {
            None => Ok(String::new()),
            Some(bytes) => String::from_utf8(bytes)
                .map_err(|_| Error::DatabaseValue(format!("key '{key}' holds non-UTF-8 data"))),
        }
    }

    /// Write `value` under `key`, replacing any previous value
    pub fn write(&self, key: &str, value: &[u8]) -> Result<()> {
        self.tx.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            rusqlite::params![key, value],
        )?;
        Ok(())
    }

    /// Remove `key`; removing an absent key is not an error
    pub fn remove(&self, key: &str) -> Result<()> {
        self.tx.execute("DELETE FROM kv WHERE key = ?1", [key])?;
        Ok(())
    }
}

fn init_connection(conn: &Connection) -> Result<()> {
    // WAL keeps readers unblocked; synchronous=FULL keeps commits durable
    // across power loss on embedded flash.
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=FULL;")?;
    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv (
            key TEXT PRIMARY KEY,
            value BLOB NOT NULL
        )",
        [],
    )?;
    Ok(())
}

fn read_value(conn: &Connection, key: &str) -> Result<Option<Vec<u8>>> {
    let value = conn
        .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(value)
}
