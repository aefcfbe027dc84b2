//! `wordsieve` - Dictionary-driven phrase detection and redaction
//!
//! Phrases from a dictionary are stored in a [`Trie`]. Text is split into
//! Unicode scalar values and walked against the trie, tolerating a bounded
//! number of filler characters inserted between the letters of a phrase
//! (`b.a.d` still matches `bad` with a gap budget of 2).
//!
//! ```
//! use wordsieve::{build, contains_match, redact};
//!
//! let trie = build(["badword"]);
//! assert_eq!(redact("this is a badword here", &trie, 0, '*'), "this is a ******* here");
//! assert!(contains_match("b-a-d-w-o-r-d", &trie, 6));
//! assert!(!contains_match("b-a-d-w-o-r-d", &trie, 5));
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cache;
pub mod cli;
pub mod config;
pub mod dictionary;
pub mod error;
pub mod filter;
pub mod logging;
pub mod matcher;
pub mod segment;
pub mod trie;

pub use cache::{CacheKey, SqliteTrieCache, TrieCache};
pub use config::Config;
pub use dictionary::{build, build_strict, load_trie, DictionarySource};
pub use error::{Error, Result};
pub use filter::{contains_match, redact, FilterResult, SharedTrie, WordFilter};
pub use logging::init_logging;
pub use matcher::{find_matches, MatchSpan, Matches};
pub use segment::{segment, segment_bytes, Unit};
pub use trie::{FlatNode, FlatTrie, NodeId, Trie, TrieNode};
