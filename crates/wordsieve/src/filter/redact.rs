//! Redaction and detection over raw text.

use crate::matcher::{find_matches, MatchSpan};
use crate::segment::{join, segment, Unit};
use crate::trie::Trie;

/// Replace every unit of every match in `text` with `replacement`.
///
/// The result has exactly as many characters as the input; only units
/// inside a match span change.
#[must_use]
pub fn redact(text: &str, trie: &Trie, max_gap: usize, replacement: Unit) -> String {
    let units = segment(text);
    let (redacted, _) = redact_units(&units, trie, max_gap, replacement);
    join(&redacted)
}

/// Redact a segmented sequence, returning the new units and the spans applied.
#[must_use]
pub fn redact_units(
    units: &[Unit],
    trie: &Trie,
    max_gap: usize,
    replacement: Unit,
) -> (Vec<Unit>, Vec<MatchSpan>) {
    let spans: Vec<MatchSpan> = find_matches(units, trie, max_gap).collect();
    let mut redacted = units.to_vec();
    for span in &spans {
        redacted[span.start..=span.end].fill(replacement);
    }
    (redacted, spans)
}

/// Whether `text` contains at least one match.
///
/// Stops at the first match found.
#[must_use]
pub fn contains_match(text: &str, trie: &Trie, max_gap: usize) -> bool {
    first_match(&segment(text), trie, max_gap).is_some()
}

/// The leftmost match in `units`, if any.
#[must_use]
pub fn first_match(units: &[Unit], trie: &Trie, max_gap: usize) -> Option<MatchSpan> {
    find_matches(units, trie, max_gap).next()
}
