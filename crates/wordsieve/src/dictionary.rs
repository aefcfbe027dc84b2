//! Building tries from dictionary phrases.
//!
//! Every phrase is trimmed; empty phrases are skipped. [`build`] accepts a
//! dictionary that ends up empty, [`build_strict`] rejects it with
//! [`Error::EmptyDictionary`].
//!
//! [`load_trie`] adds the optional cache in front of the build: the source
//! content is hashed with BLAKE3 and a previously built trie is reused when
//! the cache holds one for that hash. File sources hold one phrase per line;
//! inline phrases are used as given, embedded newlines included.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::cache::{CacheKey, TrieCache};
use crate::error::{Error, Result};
use crate::segment::segment;
use crate::trie::Trie;

/// Build a trie from phrases, accepting an all-empty dictionary.
#[must_use]
pub fn build<I, S>(phrases: I) -> Trie
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut trie = Trie::new();
    let mut skipped = 0usize;

    for phrase in phrases {
        let phrase = phrase.as_ref().trim();
        if phrase.is_empty() {
            skipped += 1;
            continue;
        }
        trie.insert(&segment(phrase));
    }

    debug!(
        phrases = trie.phrase_count(),
        nodes = trie.node_count(),
        skipped,
        "Built dictionary trie"
    );
    trie
}

/// Build a trie from phrases, requiring at least one non-empty phrase.
///
/// # Errors
///
/// Returns [`Error::EmptyDictionary`] if every phrase is empty after trimming.
pub fn build_strict<I, S>(phrases: I) -> Result<Trie>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let trie = build(phrases);
    if trie.is_empty() {
        return Err(Error::EmptyDictionary);
    }
    Ok(trie)
}

/// Where dictionary phrases come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DictionarySource {
    /// A UTF-8 text file with one phrase per line.
    File(PathBuf),
    /// Phrases supplied directly.
    Inline(Vec<String>),
}

impl DictionarySource {
    /// Source backed by a file.
    #[must_use]
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self::File(path.as_ref().to_path_buf())
    }

    /// Source backed by in-memory phrases.
    #[must_use]
    pub fn inline<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Inline(phrases.into_iter().map(Into::into).collect())
    }

    /// Read the raw content, one phrase per line.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DictionaryOpen`] if the file cannot be read and
    /// [`Error::InvalidEncoding`] if it is not valid UTF-8.
    pub fn read_content(&self) -> Result<String> {
        match self {
            Self::File(path) => {
                let bytes = std::fs::read(path).map_err(|source| Error::DictionaryOpen {
                    path: path.clone(),
                    source,
                })?;
                let text = String::from_utf8(bytes).map_err(|e| e.utf8_error())?;
                Ok(text)
            }
            Self::Inline(phrases) => Ok(phrases.join("\n")),
        }
    }

    /// The raw phrases, untrimmed, in source order.
    ///
    /// # Errors
    ///
    /// Same as [`read_content`](Self::read_content).
    pub fn phrases(&self) -> Result<Vec<String>> {
        match self {
            Self::File(_) => Ok(self.read_content()?.lines().map(String::from).collect()),
            Self::Inline(phrases) => Ok(phrases.clone()),
        }
    }

    /// BLAKE3 hex digest identifying the source content.
    ///
    /// File sources hash their bytes. Inline sources hash each phrase with a
    /// length prefix under a separate BLAKE3 key, so `["a\nb"]` and
    /// `["a", "b"]` get different digests.
    ///
    /// # Errors
    ///
    /// Same as [`read_content`](Self::read_content).
    pub fn content_hash(&self) -> Result<String> {
        match self {
            Self::File(_) => Ok(content_hash(&self.read_content()?)),
            Self::Inline(phrases) => Ok(inline_hash(phrases)),
        }
    }
}

/// BLAKE3 hex digest of dictionary content.
#[must_use]
pub fn content_hash(content: &str) -> String {
    blake3::hash(content.as_bytes()).to_hex().to_string()
}

fn inline_hash(phrases: &[String]) -> String {
    let mut hasher = blake3::Hasher::new_derive_key("wordsieve 2024 inline dictionary");
    for phrase in phrases {
        let len = u64::try_from(phrase.len()).unwrap_or(u64::MAX);
        hasher.update(&len.to_le_bytes());
        hasher.update(phrase.as_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

/// Load a trie from `source`, consulting `cache` first when one is given.
///
/// On a miss the trie is built (strictly when `strict` is set) and stored.
/// Cache failures are logged and otherwise ignored; the trie is always
/// built from the source when the cache cannot supply it.
///
/// # Errors
///
/// Returns an error if the source cannot be read or decoded, or if `strict`
/// is set and the dictionary is empty.
pub fn load_trie(
    source: &DictionarySource,
    cache: Option<&dyn TrieCache>,
    strict: bool,
) -> Result<Trie> {
    let content;
    let (hash, phrases): (String, Vec<&str>) = match source {
        DictionarySource::File(_) => {
            content = source.read_content()?;
            (content_hash(&content), content.lines().collect())
        }
        DictionarySource::Inline(phrases) => (
            inline_hash(phrases),
            phrases.iter().map(String::as_str).collect(),
        ),
    };
    let key = CacheKey::for_content_hash(&hash);

    if let Some(cache) = cache {
        match cache.fetch(&key) {
            Ok(Some(trie)) if strict && trie.is_empty() => return Err(Error::EmptyDictionary),
            Ok(Some(trie)) => {
                info!(%key, phrases = trie.phrase_count(), "Loaded dictionary from cache");
                return Ok(trie);
            }
            Ok(None) => {}
            Err(e) => warn!(%key, error = %e, "Trie cache lookup failed, rebuilding"),
        }
    }

    let trie = if strict {
        build_strict(phrases)?
    } else {
        build(phrases)
    };
    info!(phrases = trie.phrase_count(), "Built dictionary");

    if let Some(cache) = cache {
        if let Err(e) = cache.store(&key, &trie) {
            warn!(%key, error = %e, "Failed to store trie in cache");
        }
    }

    Ok(trie)
}
