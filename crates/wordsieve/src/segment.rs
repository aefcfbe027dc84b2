//! Splitting text into matchable units.
//!
//! A [`Unit`] is one Unicode scalar value. Every character is kept, including
//! whitespace and punctuation, so indices into a segmented sequence line up
//! one-to-one with the characters of the original text.

use crate::error::Result;

/// One Unicode scalar value, the alphabet symbol of the trie.
pub type Unit = char;

/// Segment already-decoded text into its units, in order.
#[must_use]
pub fn segment(text: &str) -> Vec<Unit> {
    text.chars().collect()
}

/// Decode raw bytes as UTF-8 and segment them.
///
/// # Errors
///
/// Returns [`Error::InvalidEncoding`](crate::Error::InvalidEncoding) carrying
/// the offset of the first malformed byte.
pub fn segment_bytes(bytes: &[u8]) -> Result<Vec<Unit>> {
    let text = std::str::from_utf8(bytes)?;
    Ok(segment(text))
}

/// Join units back into a string.
#[must_use]
pub fn join(units: &[Unit]) -> String {
    units.iter().collect()
}
