//! Dictionary filter applying a configured mode to incoming text.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use super::redact::{first_match, redact_units};
use super::shared::SharedTrie;
use crate::error::Result;
use crate::matcher::{find_matches, MatchSpan};
use crate::segment::{join, segment, segment_bytes, Unit};
use crate::trie::Trie;

/// Result of filtering text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterResult {
    /// No dictionary phrase was found.
    Passed,

    /// Text was rejected because it contains a dictionary phrase.
    Blocked {
        /// The leftmost match.
        span: MatchSpan,
    },

    /// Matched phrases were replaced.
    Redacted {
        /// The redacted text.
        content: String,

        /// Spans that were replaced, left to right.
        spans: Vec<MatchSpan>,
    },
}

/// What the filter does when it finds a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    /// Replace matched units with the replacement unit.
    #[default]
    Redact,

    /// Reject text that contains a match.
    Block,

    /// Only log warnings, don't filter.
    WarnOnly,
}

/// Runtime settings for a [`WordFilter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterConfig {
    /// Whether filtering is enabled.
    pub enabled: bool,

    /// Filter mode.
    pub mode: FilterMode,

    /// Filler units tolerated inside one match.
    pub max_gap: usize,

    /// Unit written over every matched unit.
    pub replacement: Unit,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: FilterMode::Redact,
            max_gap: 0,
            replacement: '*',
        }
    }
}

/// Filter backed by a replaceable dictionary trie.
#[derive(Debug)]
pub struct WordFilter {
    config: FilterConfig,
    trie: SharedTrie,
}

impl WordFilter {
    /// Create a filter over `trie` with default configuration.
    #[must_use]
    pub fn new(trie: Trie) -> Self {
        Self::with_config(trie, FilterConfig::default())
    }

    /// Create a filter over `trie` with custom configuration.
    #[must_use]
    pub fn with_config(trie: Trie, config: FilterConfig) -> Self {
        debug!(
            phrases = trie.phrase_count(),
            max_gap = config.max_gap,
            mode = ?config.mode,
            "Word filter ready"
        );
        Self {
            config,
            trie: SharedTrie::new(trie),
        }
    }

    /// Check if filtering is enabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// The dictionary trie currently in use.
    #[must_use]
    pub fn trie(&self) -> Arc<Trie> {
        self.trie.snapshot()
    }

    /// Swap in a rebuilt dictionary, returning the previous one.
    pub fn reload(&self, trie: Trie) -> Arc<Trie> {
        self.trie.replace(trie)
    }

    /// Filter text according to the configured mode.
    #[must_use]
    pub fn filter(&self, text: &str) -> FilterResult {
        if !self.config.enabled {
            return FilterResult::Passed;
        }
        self.filter_units(&segment(text))
    }

    /// Decode raw bytes as UTF-8 and filter them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEncoding`](crate::Error::InvalidEncoding) if
    /// the bytes are not valid UTF-8.
    pub fn filter_bytes(&self, bytes: &[u8]) -> Result<FilterResult> {
        let units = segment_bytes(bytes)?;
        if !self.config.enabled {
            return Ok(FilterResult::Passed);
        }
        Ok(self.filter_units(&units))
    }

    fn filter_units(&self, units: &[Unit]) -> FilterResult {
        let trie = self.trie.snapshot();
        match self.config.mode {
            FilterMode::Block => self.filter_block(units, &trie),
            FilterMode::Redact => self.filter_redact(units, &trie),
            FilterMode::WarnOnly => self.filter_warn(units, &trie),
        }
    }

    /// Block mode: return Blocked on the first match.
    fn filter_block(&self, units: &[Unit], trie: &Trie) -> FilterResult {
        match first_match(units, trie, self.config.max_gap) {
            Some(span) => {
                debug!(start = span.start, end = span.end, "Text blocked by dictionary");
                FilterResult::Blocked { span }
            }
            None => FilterResult::Passed,
        }
    }

    /// Redact mode: replace every match with the replacement unit.
    fn filter_redact(&self, units: &[Unit], trie: &Trie) -> FilterResult {
        let (redacted, spans) =
            redact_units(units, trie, self.config.max_gap, self.config.replacement);

        if spans.is_empty() {
            FilterResult::Passed
        } else {
            trace!(count = spans.len(), "Text redacted");
            FilterResult::Redacted {
                content: join(&redacted),
                spans,
            }
        }
    }

    /// Warn mode: log every match but pass text through.
    fn filter_warn(&self, units: &[Unit], trie: &Trie) -> FilterResult {
        for span in find_matches(units, trie, self.config.max_gap) {
            warn!(
                start = span.start,
                end = span.end,
                "Dictionary phrase detected (warn mode)"
            );
        }
        FilterResult::Passed
    }

    /// Redact text regardless of mode. Returns the input unchanged when disabled.
    #[must_use]
    pub fn redact(&self, text: &str) -> String {
        if !self.config.enabled {
            return text.to_string();
        }
        let trie = self.trie.snapshot();
        let (redacted, _) = redact_units(
            &segment(text),
            &trie,
            self.config.max_gap,
            self.config.replacement,
        );
        join(&redacted)
    }

    /// Whether text contains any dictionary phrase. Always false when disabled.
    #[must_use]
    pub fn contains_match(&self, text: &str) -> bool {
        if !self.config.enabled {
            return false;
        }
        let trie = self.trie.snapshot();
        first_match(&segment(text), &trie, self.config.max_gap).is_some()
    }

    /// All match spans in text, left to right.
    #[must_use]
    pub fn matches(&self, text: &str) -> Vec<MatchSpan> {
        if !self.config.enabled {
            return Vec::new();
        }
        let trie = self.trie.snapshot();
        find_matches(&segment(text), &trie, self.config.max_gap).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trie_of(phrases: &[&str]) -> Trie {
        let mut trie = Trie::new();
        for phrase in phrases {
            trie.insert(&segment(phrase));
        }
        trie
    }

    #[test]
    fn test_filter_mode_default() {
        assert_eq!(FilterMode::default(), FilterMode::Redact);
    }

    #[test]
    fn test_filter_mode_serde_names() {
        assert_eq!(
            serde_json::to_string(&FilterMode::WarnOnly).unwrap(),
            "\"warn_only\""
        );
        let mode: FilterMode = serde_json::from_str("\"block\"").unwrap();
        assert_eq!(mode, FilterMode::Block);
    }

    #[test]
    fn test_filter_config_default() {
        let config = FilterConfig::default();
        assert!(config.enabled);
        assert_eq!(config.mode, FilterMode::Redact);
        assert_eq!(config.max_gap, 0);
        assert_eq!(config.replacement, '*');
    }

    #[test]
    fn test_filter_redact_mode() {
        let filter = WordFilter::new(trie_of(&["badword"]));

        let result = filter.filter("this is a badword here");
        assert_eq!(
            result,
            FilterResult::Redacted {
                content: "this is a ******* here".to_string(),
                spans: vec![MatchSpan { start: 10, end: 16 }],
            }
        );
    }

    #[test]
    fn test_filter_passes_clean_text() {
        let filter = WordFilter::new(trie_of(&["badword"]));
        assert_eq!(filter.filter("perfectly fine"), FilterResult::Passed);
    }

    #[test]
    fn test_filter_block_mode() {
        let config = FilterConfig {
            mode: FilterMode::Block,
            max_gap: 2,
            ..Default::default()
        };
        let filter = WordFilter::with_config(trie_of(&["abc"]), config);

        let result = filter.filter("zz a1b2c");
        assert_eq!(
            result,
            FilterResult::Blocked {
                span: MatchSpan { start: 3, end: 7 }
            }
        );
    }

    #[test]
    fn test_filter_warn_mode_passes() {
        let config = FilterConfig {
            mode: FilterMode::WarnOnly,
            ..Default::default()
        };
        let filter = WordFilter::with_config(trie_of(&["badword"]), config);

        assert_eq!(filter.filter("a badword"), FilterResult::Passed);
    }

    #[test]
    fn test_filter_disabled() {
        let config = FilterConfig {
            enabled: false,
            ..Default::default()
        };
        let filter = WordFilter::with_config(trie_of(&["badword"]), config);

        assert!(!filter.is_enabled());
        assert_eq!(filter.filter("badword"), FilterResult::Passed);
        assert_eq!(filter.redact("badword"), "badword");
        assert!(!filter.contains_match("badword"));
        assert!(filter.matches("badword").is_empty());
    }

    #[test]
    fn test_filter_bytes_invalid_encoding() {
        let filter = WordFilter::new(trie_of(&["x"]));
        let result = filter.filter_bytes(&[b'x', 0xff]);
        assert!(matches!(result, Err(crate::Error::InvalidEncoding { offset: 1 })));
    }

    #[test]
    fn test_filter_bytes_valid() {
        let filter = WordFilter::new(trie_of(&["坏"]));
        let result = filter.filter_bytes("好坏".as_bytes()).unwrap();
        assert!(matches!(result, FilterResult::Redacted { ref content, .. } if content == "好*"));
    }

    #[test]
    fn test_custom_replacement_and_gap() {
        let config = FilterConfig {
            max_gap: 2,
            replacement: '#',
            ..Default::default()
        };
        let filter = WordFilter::with_config(trie_of(&["abc"]), config);

        assert_eq!(filter.redact("a1b2c!"), "#####!");
        assert!(filter.contains_match("a1b2c"));
        assert_eq!(filter.matches("a1b2c"), vec![MatchSpan { start: 0, end: 4 }]);
    }

    #[test]
    fn test_reload_swaps_dictionary() {
        let filter = WordFilter::new(trie_of(&["old"]));
        assert!(filter.contains_match("old"));

        let previous = filter.reload(trie_of(&["new"]));

        assert_eq!(previous.phrase_count(), 1);
        assert!(!filter.contains_match("old"));
        assert!(filter.contains_match("new"));
        assert_eq!(filter.trie().phrase_count(), 1);
    }
}
