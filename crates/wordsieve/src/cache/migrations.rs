//! Schema versioning for the trie cache.
//!
//! Cached tries can always be rebuilt from their dictionary, so a database
//! written by an unknown (newer or corrupt) schema is wiped and recreated
//! rather than rejected.

use rusqlite::Connection;
use tracing::warn;

use crate::error::{Error, Result};

use super::schema::{DROP_STATEMENTS, SCHEMA_STATEMENTS};

/// The current schema version.
///
/// Version 2 stores tries in their flat arena form.
pub const CURRENT_VERSION: i32 = 2;

/// Key used to store the schema version in the metadata table.
const VERSION_KEY: &str = "schema_version";

/// Create the cache schema, resetting it if the stored version is unusable.
///
/// # Errors
///
/// Returns an error if schema creation fails.
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    create_tables(conn)?;

    match get_schema_version(conn) {
        Ok(0) => set_schema_version(conn, CURRENT_VERSION),
        Ok(CURRENT_VERSION) => Ok(()),
        Ok(version) => {
            warn!(
                found = version,
                expected = CURRENT_VERSION,
                "Trie cache schema version mismatch, resetting cache"
            );
            reset_schema(conn)
        }
        Err(Error::DatabaseMigration { message }) => {
            warn!(%message, "Unreadable trie cache schema version, resetting cache");
            reset_schema(conn)
        }
        Err(e) => Err(e),
    }
}

fn create_tables(conn: &Connection) -> Result<()> {
    for statement in SCHEMA_STATEMENTS {
        conn.execute(statement, [])?;
    }
    Ok(())
}

/// Drop and recreate every cache table.
fn reset_schema(conn: &Connection) -> Result<()> {
    for statement in DROP_STATEMENTS {
        conn.execute(statement, [])?;
    }
    create_tables(conn)?;
    set_schema_version(conn, CURRENT_VERSION)
}

/// Get the schema version, 0 when none is recorded.
fn get_schema_version(conn: &Connection) -> Result<i32> {
    let result: std::result::Result<String, rusqlite::Error> = conn.query_row(
        "SELECT value FROM metadata WHERE key = ?1",
        [VERSION_KEY],
        |row| row.get(0),
    );

    match result {
        Ok(value) => value.parse().map_err(|_| Error::DatabaseMigration {
            message: format!("invalid schema version: {value}"),
        }),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(0),
        Err(e) => Err(e.into()),
    }
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
        (VERSION_KEY, version.to_string()),
    )?;
    Ok(())
}
