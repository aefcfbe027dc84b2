//! Error types for wordsieve.
//!
//! This module defines all error types used throughout the wordsieve crate.
//! Only [`Error::InvalidEncoding`] and [`Error::EmptyDictionary`] can come out
//! of the matching core; everything else belongs to the dictionary loader,
//! the trie cache or configuration loading.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for wordsieve operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Core Errors ===
    /// Input bytes are not valid UTF-8.
    #[error("invalid UTF-8 input at byte offset {offset}")]
    InvalidEncoding {
        /// Offset of the first byte that could not be decoded.
        offset: usize,
    },

    /// A strict dictionary build found no usable phrase.
    #[error("dictionary contains no phrases after trimming empty entries")]
    EmptyDictionary,

    // === Dictionary Errors ===
    /// The dictionary file could not be read.
    #[error("failed to read dictionary at {path}: {source}")]
    DictionaryOpen {
        /// Path to the dictionary file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Cache Errors ===
    /// Failed to open or create the cache database.
    #[error("failed to open trie cache at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A cache query failed.
    #[error("trie cache query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run cache schema migrations.
    #[error("trie cache migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    /// A cached trie could not be decoded.
    #[error("corrupt trie cache entry '{key}': {message}")]
    CorruptCacheEntry {
        /// Cache key of the offending entry.
        key: String,
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for wordsieve operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(err: std::str::Utf8Error) -> Self {
        Self::InvalidEncoding {
            offset: err.valid_up_to(),
        }
    }
}

impl Error {
    /// Create a corrupt cache entry error.
    #[must_use]
    pub fn corrupt_cache_entry(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CorruptCacheEntry {
            key: key.into(),
            message: message.into(),
        }
    }
}
