//! Redaction and detection of dictionary phrases.
//!
//! - **Free functions**: [`redact`] and [`contains_match`] run the matcher
//!   over text against any trie.
//!
//! - **Configured filter**: [`WordFilter`] applies a [`FilterConfig`] (gap
//!   budget, replacement unit, mode) and returns a [`FilterResult`].
//!
//! - **Hot reload**: [`SharedTrie`] lets a rebuilt dictionary replace the
//!   old one in a single swap while readers keep matching.
//!
//! # Example
//!
//! ```
//! use wordsieve::dictionary::build;
//! use wordsieve::filter::{FilterConfig, FilterResult, WordFilter};
//!
//! let trie = build(["badword"]);
//! let filter = WordFilter::with_config(trie, FilterConfig { max_gap: 1, ..Default::default() });
//!
//! match filter.filter("a bad-word here") {
//!     FilterResult::Passed => println!("clean"),
//!     FilterResult::Blocked { span } => println!("blocked at {}", span.start),
//!     FilterResult::Redacted { content, .. } => assert_eq!(content, "a ******** here"),
//! }
//! ```

mod redact;
mod shared;
mod word_filter;

pub use redact::{contains_match, first_match, redact, redact_units};
pub use shared::SharedTrie;
pub use word_filter::{FilterConfig, FilterMode, FilterResult, WordFilter};
