//! `SQLite` schema for the trie cache.

/// One row per built dictionary, keyed by the dictionary content hash.
pub const CREATE_TRIES_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS tries (
    cache_key TEXT PRIMARY KEY,
    trie_json TEXT NOT NULL,
    phrase_count INTEGER NOT NULL,
    node_count INTEGER NOT NULL,
    stored_at TEXT NOT NULL,
    expires_at TEXT
)
";

/// Index on `expires_at` for pruning.
pub const CREATE_EXPIRES_INDEX: &str = r"
CREATE INDEX IF NOT EXISTS idx_tries_expires ON tries(expires_at)
";

/// Key-value table holding the schema version.
pub const CREATE_METADATA_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS metadata (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
)
";

/// Drops every cache table, used when the on-disk schema is unusable.
pub const DROP_STATEMENTS: &[&str] = &[
    "DROP INDEX IF EXISTS idx_tries_expires",
    "DROP TABLE IF EXISTS tries",
    "DROP TABLE IF EXISTS metadata",
];

/// All schema creation statements in order.
pub const SCHEMA_STATEMENTS: &[&str] = &[
    CREATE_TRIES_TABLE,
    CREATE_EXPIRES_INDEX,
    CREATE_METADATA_TABLE,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tries_table_columns() {
        assert!(CREATE_TRIES_TABLE.contains("cache_key TEXT PRIMARY KEY"));
        assert!(CREATE_TRIES_TABLE.contains("trie_json TEXT NOT NULL"));
        assert!(CREATE_TRIES_TABLE.contains("expires_at TEXT"));
    }

    #[test]
    fn test_drop_covers_every_table() {
        for table in ["tries", "metadata"] {
            assert!(DROP_STATEMENTS
                .iter()
                .any(|stmt| stmt.ends_with(&format!("TABLE IF EXISTS {table}"))));
        }
    }
}
