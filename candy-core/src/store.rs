//! Key-value persistence for [`PlayerState`](crate::state::PlayerState).
//!
//! The engine writes through on every mutation, one key at a time, using the
//! keys in [`keys`]. Values are JSON text. Two backends ship:
//!
//! - [`MemoryStore`]: an ordered map, for tests and throwaway sessions.
//! - [`SqliteStore`]: a single table in a SQLite file:
//!
//! ```sql
//! CREATE TABLE IF NOT EXISTS kv_store (
//!     key        TEXT PRIMARY KEY,
//!     value      TEXT NOT NULL,
//!     updated_at TEXT NOT NULL,
//!     checksum   TEXT
//! );
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use rusqlite::{Connection, OpenFlags, params};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::config::{PersistenceConfig, StoreBackend};
use crate::error::{CandyError, Result};

/// Store keys, shared with the browser build's local storage layout.
pub mod keys {
    /// Current currency balance (integer).
    pub const CANDY_COUNT: &str = "candyCount";
    /// Current level (integer).
    pub const LEVEL: &str = "level";
    /// Modifier ownership flags.
    pub const OWNED_ITEMS: &str = "ownedItems";
    /// Modifier activation flags.
    pub const ACTIVE_ITEMS: &str = "activeItems";
    /// Click-object ownership flags.
    pub const CLICKING_OBJECTS: &str = "clickingObjects";
    /// Equipped click-object name or `null`.
    pub const ACTIVE_CLICKING_OBJECT: &str = "activeClickingObject";

    /// Every key the engine reads at startup.
    pub const ALL: [&str; 6] = [
        CANDY_COUNT,
        LEVEL,
        OWNED_ITEMS,
        ACTIVE_ITEMS,
        CLICKING_OBJECTS,
        ACTIVE_CLICKING_OBJECT,
    ];
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Durable string-to-JSON mapping.
///
/// Every call is synchronous; the engine treats a failed write as fatal to
/// the operation in progress.
pub trait KeyValueStore {
    /// Raw JSON text stored under `key`, if any.
    ///
    /// # Errors
    /// Backend failures.
    fn get_raw(&self, key: &str) -> Result<Option<String>>;

    /// Store raw JSON text under `key`, replacing any previous value.
    ///
    /// # Errors
    /// Backend failures.
    fn set_raw(&mut self, key: &str, value: &str) -> Result<()>;

    /// Delete `key`. Returns `true` if something was removed.
    ///
    /// # Errors
    /// Backend failures.
    fn remove(&mut self, key: &str) -> Result<bool>;

    /// Delete every key.
    ///
    /// # Errors
    /// Backend failures.
    fn clear(&mut self) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get_raw(&self, key: &str) -> Result<Option<String>> {
        (**self).get_raw(key)
    }

    fn set_raw(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set_raw(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<bool> {
        (**self).remove(key)
    }

    fn clear(&mut self) -> Result<()> {
        (**self).clear()
    }
}

/// Typed helpers over [`KeyValueStore`].
pub trait KeyValueStoreExt: KeyValueStore {
    /// Deserialize the value under `key`.
    ///
    /// # Errors
    /// Backend failures, or [`CandyError::Serialization`] if the stored text
    /// is not a valid `T`.
    fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get_raw(key)? {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    /// Serialize `value` and store it under `key`.
    ///
    /// # Errors
    /// Backend failures or serialization failures.
    fn save<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<()> {
        let text = serde_json::to_string(value)?;
        self.set_raw(key, &text)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStoreExt for S {}

/// Open the backend selected by `config`.
///
/// # Errors
/// Returns [`CandyError::Store`] if the SQLite file cannot be opened.
pub fn open_store(config: &PersistenceConfig) -> Result<Box<dyn KeyValueStore + Send>> {
    match config.backend {
        StoreBackend::Sqlite => Ok(Box::new(SqliteStore::open(&config.path, config)?)),
        StoreBackend::Memory => Ok(Box::new(MemoryStore::new())),
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// In-process store. Counts writes and can be told to reject them.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
    writes: u64,
    fail_writes: bool,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `set_raw`/`remove`/`clear` calls so far.
    #[must_use]
    pub fn writes(&self) -> u64 {
        self.writes
    }

    /// Make every subsequent write fail with [`CandyError::WriteRejected`].
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn check_writable(&self, key: &str) -> Result<()> {
        if self.fail_writes {
            return Err(CandyError::WriteRejected {
                key: key.to_string(),
                reason: "store is read-only".to_string(),
            });
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    fn get_raw(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set_raw(&mut self, key: &str, value: &str) -> Result<()> {
        self.check_writable(key)?;
        self.entries.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool> {
        self.check_writable(key)?;
        self.writes += 1;
        Ok(self.entries.remove(key).is_some())
    }

    fn clear(&mut self) -> Result<()> {
        self.check_writable("*")?;
        self.writes += 1;
        self.entries.clear();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// CRC-32 checksum helper
// ---------------------------------------------------------------------------

/// CRC-32 (ISO 3309) of `data` as lowercase hex.
fn crc32_hex(data: &[u8]) -> String {
    const POLY: u32 = 0xEDB8_8320;
    let mut crc: u32 = 0xFFFF_FFFF;
    for &byte in data {
        crc ^= u32::from(byte);
        for _ in 0..8 {
            crc = if crc & 1 == 1 { (crc >> 1) ^ POLY } else { crc >> 1 };
        }
    }
    format!("{:08x}", !crc)
}

// ---------------------------------------------------------------------------
// SqliteStore
// ---------------------------------------------------------------------------

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS kv_store (
    key        TEXT PRIMARY KEY,
    value      TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    checksum   TEXT
);";

/// SQLite-backed store.
///
/// ```no_run
/// # use candy_core::config::PersistenceConfig;
/// # use candy_core::store::{KeyValueStoreExt, SqliteStore, keys};
/// let mut store = SqliteStore::open("candy_save.db", &PersistenceConfig::default())?;
/// store.save(keys::LEVEL, &3u32)?;
/// let level: Option<u32> = store.load(keys::LEVEL)?;
/// # Ok::<(), candy_core::CandyError>(())
/// ```
pub struct SqliteStore {
    conn: Connection,
    checksum_enabled: bool,
    db_path: PathBuf,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("db_path", &self.db_path)
            .field("checksum_enabled", &self.checksum_enabled)
            .finish_non_exhaustive()
    }
}

impl SqliteStore {
    /// Open (or create) a store at `path`.
    ///
    /// # Errors
    /// Returns [`CandyError::Store`] on SQLite failures.
    pub fn open<P: AsRef<Path>>(path: P, config: &PersistenceConfig) -> Result<Self> {
        let db_path = path.as_ref().to_path_buf();
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(&db_path, flags)?;

        if config.wal_mode {
            conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        }
        conn.execute_batch("PRAGMA synchronous = NORMAL;")?;
        conn.execute_batch("PRAGMA busy_timeout = 5000;")?;
        conn.execute_batch(SCHEMA)?;

        info!(
            path = %db_path.display(),
            wal = config.wal_mode,
            "Candy store opened"
        );

        Ok(Self {
            conn,
            checksum_enabled: config.checksum_enabled,
            db_path,
        })
    }

    /// Open an in-memory database.
    ///
    /// # Errors
    /// Returns [`CandyError::Store`] on SQLite failures.
    pub fn open_in_memory(config: &PersistenceConfig) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn,
            checksum_enabled: config.checksum_enabled,
            db_path: PathBuf::from(":memory:"),
        })
    }

    /// Every stored key, sorted.
    ///
    /// # Errors
    /// Returns [`CandyError::Store`] on SQLite failures.
    pub fn keys(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare_cached("SELECT key FROM kv_store ORDER BY key")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut keys = Vec::new();
        for row in rows {
            keys.push(row?);
        }
        Ok(keys)
    }

    /// Path to the database file (or `:memory:`).
    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Run `PRAGMA integrity_check`.
    ///
    /// # Errors
    /// Returns [`CandyError::Store`] if the check itself fails.
    pub fn integrity_check(&self) -> Result<bool> {
        let result: String = self
            .conn
            .query_row("PRAGMA integrity_check", [], |row| row.get(0))?;
        Ok(result == "ok")
    }
}

impl KeyValueStore for SqliteStore {
    fn get_raw(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT value, checksum FROM kv_store WHERE key = ?1")?;
        let row = match stmt.query_row(params![key], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?))
        }) {
            Ok(row) => row,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let (value, stored_checksum) = row;

        if self.checksum_enabled {
            if let Some(expected) = stored_checksum {
                let actual = crc32_hex(value.as_bytes());
                if expected != actual {
                    warn!(
                        key,
                        expected = %expected,
                        actual = %actual,
                        "Checksum mismatch, save may be corrupt"
                    );
                }
            }
        }

        Ok(Some(value))
    }

    fn set_raw(&mut self, key: &str, value: &str) -> Result<()> {
        let checksum = self.checksum_enabled.then(|| crc32_hex(value.as_bytes()));
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO kv_store (key, value, updated_at, checksum)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at,
                checksum = excluded.checksum",
            params![key, value, now, checksum],
        )?;
        debug!(key, bytes = value.len(), "Stored value");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM kv_store WHERE key = ?1", params![key])?;
        Ok(deleted > 0)
    }

    fn clear(&mut self) -> Result<()> {
        self.conn.execute_batch("DELETE FROM kv_store;")?;
        info!(path = %self.db_path.display(), "Candy store cleared");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ModifierFlags;

    fn test_config() -> PersistenceConfig {
        PersistenceConfig {
            checksum_enabled: true,
            wal_mode: false,
            ..PersistenceConfig::default()
        }
    }

    #[test]
    fn memory_store_counts_writes() {
        let mut store = MemoryStore::new();
        store.save(keys::LEVEL, &2u32).expect("save");
        store.save(keys::CANDY_COUNT, &7u64).expect("save");
        assert_eq!(store.writes(), 2);
        assert_eq!(store.load::<u32>(keys::LEVEL).expect("load"), Some(2));
    }

    #[test]
    fn memory_store_rejects_writes_when_told() {
        let mut store = MemoryStore::new();
        store.set_fail_writes(true);
        let err = store.save(keys::LEVEL, &2u32).expect_err("should fail");
        assert!(matches!(err, CandyError::WriteRejected { .. }));
        assert_eq!(store.writes(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn sqlite_typed_values_survive() {
        let mut store = SqliteStore::open_in_memory(&test_config()).expect("open");
        let flags = ModifierFlags {
            golden_click: true,
            ..ModifierFlags::default()
        };
        store.save(keys::OWNED_ITEMS, &flags).expect("save");
        store
            .save(keys::ACTIVE_CLICKING_OBJECT, &Option::<String>::None)
            .expect("save");

        let loaded: ModifierFlags = store.load(keys::OWNED_ITEMS).expect("load").expect("Some");
        assert_eq!(loaded, flags);
        assert_eq!(
            store.get_raw(keys::ACTIVE_CLICKING_OBJECT).expect("get").as_deref(),
            Some("null")
        );
    }

    #[test]
    fn sqlite_missing_key_is_none() {
        let store = SqliteStore::open_in_memory(&test_config()).expect("open");
        assert!(store.get_raw(keys::LEVEL).expect("get").is_none());
    }

    #[test]
    fn sqlite_upsert_overwrites_and_remove() {
        let mut store = SqliteStore::open_in_memory(&test_config()).expect("open");
        store.save(keys::LEVEL, &1u32).expect("save");
        store.save(keys::LEVEL, &4u32).expect("save");
        assert_eq!(store.load::<u32>(keys::LEVEL).expect("load"), Some(4));
        assert_eq!(store.keys().expect("keys"), vec![keys::LEVEL.to_string()]);

        assert!(store.remove(keys::LEVEL).expect("remove"));
        assert!(!store.remove(keys::LEVEL).expect("remove again"));
    }

    #[test]
    fn sqlite_checksum_mismatch_still_loads() {
        let mut store = SqliteStore::open_in_memory(&test_config()).expect("open");
        store.save(keys::CANDY_COUNT, &12u64).expect("save");
        store
            .conn
            .execute(
                "UPDATE kv_store SET checksum = 'deadbeef' WHERE key = ?1",
                params![keys::CANDY_COUNT],
            )
            .expect("corrupt checksum");
        assert_eq!(store.load::<u64>(keys::CANDY_COUNT).expect("load"), Some(12));
    }

    #[test]
    fn sqlite_file_survives_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("candy.db");
        {
            let mut store = SqliteStore::open(&path, &test_config()).expect("open");
            store.save(keys::LEVEL, &9u32).expect("save");
            assert!(store.integrity_check().expect("check"));
        }
        let store = SqliteStore::open(&path, &test_config()).expect("reopen");
        assert_eq!(store.load::<u32>(keys::LEVEL).expect("load"), Some(9));
    }

    #[test]
    fn clear_removes_everything() {
        let mut store = SqliteStore::open_in_memory(&test_config()).expect("open");
        for key in keys::ALL {
            store.set_raw(key, "0").expect("set");
        }
        store.clear().expect("clear");
        assert!(store.keys().expect("keys").is_empty());
    }

    #[test]
    fn crc32_known_vector() {
        assert_eq!(crc32_hex(b"123456789"), "cbf43926");
    }
}
