//! Publishing rebuilt tries to concurrent readers.

use std::sync::{Arc, PoisonError, RwLock};

use tracing::info;

use crate::trie::Trie;

/// A trie shared between readers, replaceable as a whole.
///
/// Readers take a [`snapshot`](Self::snapshot) and match against it without
/// holding any lock. A rebuild happens elsewhere and is published with
/// [`replace`](Self::replace); readers see either the old trie or the new
/// one, never a partially built structure.
#[derive(Debug, Default)]
pub struct SharedTrie {
    current: RwLock<Arc<Trie>>,
}

impl SharedTrie {
    /// Wrap a finished trie.
    #[must_use]
    pub fn new(trie: Trie) -> Self {
        Self {
            current: RwLock::new(Arc::new(trie)),
        }
    }

    /// The trie currently published.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Trie> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }

    /// Publish `trie`, returning the one it replaces.
    pub fn replace(&self, trie: Trie) -> Arc<Trie> {
        let next = Arc::new(trie);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        info!(
            phrases = next.phrase_count(),
            nodes = next.node_count(),
            "Publishing rebuilt dictionary"
        );
        std::mem::replace(&mut *guard, next)
    }
}

impl From<Trie> for SharedTrie {
    fn from(trie: Trie) -> Self {
        Self::new(trie)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::segment;

    fn trie_of(phrases: &[&str]) -> Trie {
        let mut trie = Trie::new();
        for phrase in phrases {
            trie.insert(&segment(phrase));
        }
        trie
    }

    #[test]
    fn test_snapshot_returns_published_trie() {
        let shared = SharedTrie::new(trie_of(&["one"]));
        assert!(shared.snapshot().contains(&segment("one")));
    }

    #[test]
    fn test_replace_swaps_whole_trie() {
        let shared = SharedTrie::from(trie_of(&["old"]));
        let before = shared.snapshot();

        let previous = shared.replace(trie_of(&["new"]));

        assert!(previous.contains(&segment("old")));
        // Existing snapshots keep the trie they started with.
        assert!(before.contains(&segment("old")));
        let after = shared.snapshot();
        assert!(after.contains(&segment("new")));
        assert!(!after.contains(&segment("old")));
    }

    #[test]
    fn test_default_is_empty() {
        let shared = SharedTrie::default();
        assert!(shared.snapshot().is_empty());
    }

    #[test]
    fn test_concurrent_readers_during_replace() {
        let shared = Arc::new(SharedTrie::new(trie_of(&["alpha"])));

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let shared = Arc::clone(&shared);
                std::thread::spawn(move || {
                    for _ in 0..200 {
                        let trie = shared.snapshot();
                        let alpha = trie.contains(&segment("alpha"));
                        let beta = trie.contains(&segment("beta"));
                        // Exactly one generation is visible at a time.
                        assert!(alpha ^ beta);
                    }
                })
            })
            .collect();

        shared.replace(trie_of(&["beta"]));

        for reader in readers {
            reader.join().unwrap();
        }
        assert!(shared.snapshot().contains(&segment("beta")));
    }
}
