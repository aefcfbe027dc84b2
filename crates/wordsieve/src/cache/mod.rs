//! Persistent cache of built tries.
//!
//! Building a large dictionary on every process start is wasteful, so a built
//! trie can be memoized under a key derived from the dictionary content. The
//! [`TrieCache`] trait is the seam the dictionary loader talks to;
//! [`SqliteTrieCache`] is the bundled `SQLite` implementation.
//!
//! The cache is only consulted while a dictionary is being loaded, never
//! while text is matched.

pub mod migrations;
pub mod schema;

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::config::CacheConfig;
use crate::error::{Error, Result};
use crate::trie::{FlatTrie, Trie};

/// Prefix shared by every cache key.
const KEY_PREFIX: &str = "wordsieve";

/// Key under which a built trie is cached.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Key for a dictionary whose content hashes to `content_hash`.
    #[must_use]
    pub fn for_content_hash(content_hash: &str) -> Self {
        Self(format!("{KEY_PREFIX}:{content_hash}"))
    }

    /// The key as stored.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Storage for previously built tries.
pub trait TrieCache {
    /// Fetch the trie stored under `key`, if present and still live.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store fails or the entry is corrupt.
    fn fetch(&self, key: &CacheKey) -> Result<Option<Trie>>;

    /// Store `trie` under `key`, replacing any previous entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store fails.
    fn store(&self, key: &CacheKey, trie: &Trie) -> Result<()>;
}

/// `SQLite`-backed [`TrieCache`].
///
/// Tries are stored as the JSON encoding of their flat arena form, whose
/// nesting depth is the same for every dictionary. Entries may carry an
/// expiry; expired entries read as misses until pruned.
#[derive(Debug)]
pub struct SqliteTrieCache {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
    /// Lifetime of newly stored entries, `None` for no expiry.
    expire_after: Option<Duration>,
}

impl SqliteTrieCache {
    /// Open or create a cache database at the given path.
    ///
    /// Creates parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening trie cache at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&conn)?;

        info!("Trie cache opened at {}", path.display());
        Ok(Self {
            path,
            conn,
            expire_after: None,
        })
    }

    /// Create an in-memory cache, mostly useful for tests.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
            expire_after: None,
        })
    }

    /// Open the cache described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn from_config(config: &CacheConfig) -> Result<Self> {
        Ok(Self::open(config.resolved_path())?.with_expiry(config.expiry()))
    }

    /// Set the lifetime of entries stored from now on.
    #[must_use]
    pub fn with_expiry(mut self, expire_after: Option<Duration>) -> Self {
        self.expire_after = expire_after;
        self
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the entry stored under `key`.
    ///
    /// Returns `true` if an entry was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn invalidate(&self, key: &CacheKey) -> Result<bool> {
        let affected = self
            .conn
            .execute("DELETE FROM tries WHERE cache_key = ?1", [key.as_str()])?;
        Ok(affected > 0)
    }

    /// Remove every entry, returning how many were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn clear(&self) -> Result<usize> {
        let affected = self.conn.execute("DELETE FROM tries", [])?;
        info!("Cleared {} cached tries", affected);
        Ok(affected)
    }

    /// Remove expired entries, returning how many were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn prune_expired(&self) -> Result<usize> {
        let affected = self.conn.execute(
            "DELETE FROM tries WHERE expires_at IS NOT NULL AND expires_at <= ?1",
            [format_timestamp(Utc::now())],
        )?;

        if affected > 0 {
            info!("Pruned {} expired cached tries", affected);
        }
        Ok(affected)
    }

    /// Count stored entries, expired ones included.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn count(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM tries", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Get cache statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<CacheStats> {
        let entries = self.count()?;

        let expired_entries: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM tries WHERE expires_at IS NOT NULL AND expires_at <= ?1",
            [format_timestamp(Utc::now())],
            |row| row.get(0),
        )?;

        let newest: Option<String> = self
            .conn
            .query_row(
                "SELECT stored_at FROM tries ORDER BY stored_at DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(CacheStats {
            entries,
            expired_entries,
            newest_entry: newest.as_deref().and_then(parse_timestamp),
            db_size_bytes,
        })
    }
}

impl TrieCache for SqliteTrieCache {
    fn fetch(&self, key: &CacheKey) -> Result<Option<Trie>> {
        let row: Option<(String, Option<String>)> = self
            .conn
            .query_row(
                "SELECT trie_json, expires_at FROM tries WHERE cache_key = ?1",
                [key.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((json, expires_at)) = row else {
            debug!(%key, "Trie cache miss");
            return Ok(None);
        };

        if let Some(expires_at) = expires_at {
            let expired = parse_timestamp(&expires_at).map_or(true, |at| at <= Utc::now());
            if expired {
                debug!(%key, %expires_at, "Cached trie expired");
                return Ok(None);
            }
        }

        let flat: FlatTrie = serde_json::from_str(&json)
            .map_err(|e| Error::corrupt_cache_entry(key.as_str(), e.to_string()))?;
        let trie = Trie::from_flat(&flat)
            .ok_or_else(|| Error::corrupt_cache_entry(key.as_str(), "nodes do not form a trie"))?;

        debug!(%key, phrases = trie.phrase_count(), "Trie cache hit");
        Ok(Some(trie))
    }

    fn store(&self, key: &CacheKey, trie: &Trie) -> Result<()> {
        let json = serde_json::to_string(&trie.to_flat())?;
        let now = Utc::now();
        let expires_at = self
            .expire_after
            .and_then(|ttl| now.checked_add_signed(ttl))
            .map(format_timestamp);

        let phrase_count = i64::try_from(trie.phrase_count()).unwrap_or(i64::MAX);
        let node_count = i64::try_from(trie.node_count()).unwrap_or(i64::MAX);

        self.conn.execute(
            r"
            INSERT OR REPLACE INTO tries
                (cache_key, trie_json, phrase_count, node_count, stored_at, expires_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
            params![
                key.as_str(),
                json,
                phrase_count,
                node_count,
                format_timestamp(now),
                expires_at,
            ],
        )?;

        debug!(%key, phrases = phrase_count, "Stored trie in cache");
        Ok(())
    }
}

/// Fixed-width UTC timestamps so SQL string comparison orders them correctly.
fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Statistics about the trie cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    /// Total number of stored entries.
    pub entries: i64,
    /// Entries past their expiry that have not been pruned yet.
    pub expired_entries: i64,
    /// When the most recent entry was stored.
    pub newest_entry: Option<DateTime<Utc>>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}
