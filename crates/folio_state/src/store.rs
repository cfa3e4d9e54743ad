use std::collections::BTreeMap;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{Connection, OptionalExtension, params};

use crate::error::StateError;

/// Key/value persistence port for UI state. Implementations hold opaque
/// strings; typed access lives in the hub.
pub trait StateStore {
    fn get(&mut self, key: &str) -> Result<Option<String>, StateError>;
    fn put(&mut self, key: &str, value: &str) -> Result<(), StateError>;
    fn remove(&mut self, key: &str) -> Result<(), StateError>;
}

pub struct SqliteStateStore {
    conn: Connection,
}

const SCHEMA_VERSION: i64 = 1;

impl SqliteStateStore {
    pub fn open(path: &Path) -> Result<Self, StateError> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS meta(\
                key TEXT PRIMARY KEY,\
                value INTEGER NOT NULL\
            );",
        )?;
        let version: Option<i64> = conn
            .query_row(
                "SELECT value FROM meta WHERE key = 'schema_version'",
                [],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(version) = version {
            if version != SCHEMA_VERSION {
                eprintln!(
                    "warning: state schema version mismatch (found {}, expected {}), recreating state",
                    version, SCHEMA_VERSION
                );
                conn.execute_batch(
                    "DROP TABLE IF EXISTS state;\
                    DROP TABLE IF EXISTS meta;",
                )?;
            }
        }
        create_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn create_schema(conn: &Connection) -> Result<(), StateError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS meta(\
            key TEXT PRIMARY KEY,\
            value INTEGER NOT NULL\
        );\
        CREATE TABLE IF NOT EXISTS state(\
            key TEXT PRIMARY KEY,\
            value TEXT NOT NULL,\
            updated_utc INTEGER NULL\
        );",
    )?;
    conn.execute(
        "INSERT OR REPLACE INTO meta (key, value) VALUES ('schema_version', ?1)",
        params![SCHEMA_VERSION],
    )?;
    Ok(())
}

impl StateStore for SqliteStateStore {
    fn get(&mut self, key: &str) -> Result<Option<String>, StateError> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM state WHERE key = ?1")?;
        let value: Option<String> = stmt.query_row(params![key], |row| row.get(0)).optional()?;
        Ok(value)
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), StateError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64;
        self.conn.execute(
            "INSERT INTO state (key, value, updated_utc)\n\
                VALUES (?1, ?2, ?3)\n\
                ON CONFLICT(key) DO UPDATE SET\n\
                    value = excluded.value,\n\
                    updated_utc = excluded.updated_utc",
            params![key, value, now],
        )?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StateError> {
        self.conn
            .execute("DELETE FROM state WHERE key = ?1", params![key])?;
        Ok(())
    }
}

/// Volatile store for tests and disabled-persistence environments.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    entries: BTreeMap<String, String>,
}

impl StateStore for MemoryStateStore {
    fn get(&mut self, key: &str) -> Result<Option<String>, StateError> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: &str) -> Result<(), StateError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StateError> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn sqlite_round_trip() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("state.db");
        let mut store = SqliteStateStore::open(&path).expect("open");
        assert_eq!(store.get("missing").expect("get"), None);

        store.put("k", "v1").expect("put");
        store.put("k", "v2").expect("overwrite");
        assert_eq!(store.get("k").expect("get").as_deref(), Some("v2"));

        store.remove("k").expect("remove");
        assert_eq!(store.get("k").expect("get"), None);
    }

    #[test]
    fn sqlite_persists_across_reopen() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("state.db");
        {
            let mut store = SqliteStateStore::open(&path).expect("open");
            store.put("k", "v").expect("put");
        }
        let mut store = SqliteStateStore::open(&path).expect("reopen");
        assert_eq!(store.get("k").expect("get").as_deref(), Some("v"));
    }

    #[test]
    fn schema_mismatch_recreates_state() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("state.db");
        {
            let mut store = SqliteStateStore::open(&path).expect("open");
            store.put("k", "v").expect("put");
        }
        {
            let conn = Connection::open(&path).expect("raw open");
            conn.execute("UPDATE meta SET value = 999 WHERE key = 'schema_version'", [])
                .expect("bump version");
        }
        let mut store = SqliteStateStore::open(&path).expect("reopen");
        assert_eq!(store.get("k").expect("get"), None);
    }

    #[test]
    fn memory_store_round_trip() {
        let mut store = MemoryStateStore::default();
        store.put("k", "v").expect("put");
        assert_eq!(store.get("k").expect("get").as_deref(), Some("v"));
        store.remove("k").expect("remove");
        assert_eq!(store.get("k").expect("get"), None);
    }
}
