//! Gap-tolerant phrase matching over a segmented sequence.
//!
//! The walk starting at index `i` follows trie edges for every unit it can.
//! A unit with no edge from the current node is skipped as filler and counts
//! against the gap budget; the walk ends once `max_gap + 1` fillers have been
//! seen or the text runs out. The furthest terminal node reached wins, so of
//! `ab` and `abc` the longer phrase is reported.
//!
//! With `max_gap = 0` the first filler ends the walk, which is plain
//! contiguous matching.

use std::iter::FusedIterator;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::segment::Unit;
use crate::trie::{NodeId, Trie};

/// Inclusive `[start, end]` range of unit indices covering one match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MatchSpan {
    /// Index of the first unit of the match.
    pub start: usize,
    /// Index of the last unit of the match.
    pub end: usize,
}

impl MatchSpan {
    /// Number of units covered, fillers included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// Always false; a span covers at least one unit.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether `index` falls inside the span.
    #[must_use]
    pub fn contains(&self, index: usize) -> bool {
        (self.start..=self.end).contains(&index)
    }
}

/// Lazy iterator over the matches in a unit sequence.
///
/// Produced by [`find_matches`]. Spans come out left to right, never
/// overlap, and strictly increase in start index. Cloning the iterator gives
/// an independent cursor at the same position.
#[derive(Debug, Clone)]
pub struct Matches<'a> {
    units: &'a [Unit],
    trie: &'a Trie,
    max_distance: usize,
    pos: usize,
}

/// Find every non-overlapping match of a dictionary phrase in `units`.
///
/// `max_gap` is the number of filler units tolerated inside one match.
#[must_use]
pub fn find_matches<'a>(units: &'a [Unit], trie: &'a Trie, max_gap: usize) -> Matches<'a> {
    Matches {
        units,
        trie,
        max_distance: max_gap.saturating_add(1),
        pos: 0,
    }
}

impl Matches<'_> {
    /// Walk from `start`, whose unit has already matched a root edge.
    fn walk(&self, start: usize, first: NodeId) -> Option<usize> {
        let mut current = first;
        let mut best_end = self.trie.is_terminal(current).then_some(start);
        let mut dist = 0;
        let mut j = start + 1;

        while j < self.units.len() && dist < self.max_distance {
            if !self.trie.has_children(current) {
                break;
            }

            match self.trie.child_at(current, self.units[j]) {
                Some(next) => {
                    current = next;
                    if self.trie.is_terminal(current) {
                        best_end = Some(j);
                    }
                }
                None => dist += 1,
            }
            j += 1;
        }

        best_end
    }
}

impl Iterator for Matches<'_> {
    type Item = MatchSpan;

    fn next(&mut self) -> Option<MatchSpan> {
        let root = self.trie.root();

        while self.pos < self.units.len() {
            let start = self.pos;
            let Some(first) = self.trie.child_at(root, self.units[start]) else {
                self.pos += 1;
                continue;
            };

            if let Some(end) = self.walk(start, first) {
                self.pos = end + 1;
                trace!(start, end, "phrase matched");
                return Some(MatchSpan { start, end });
            }
            self.pos += 1;
        }

        None
    }
}

impl FusedIterator for Matches<'_> {}
