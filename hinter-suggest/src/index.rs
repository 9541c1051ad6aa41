//! A prefix index over a prebuilt snapshot of suggestions.

use crate::{FilterSet, Normalizer, Suggestion, SuggestionLookup};
use radix_trie::{Trie, TrieCommon};
use serde::{Deserialize, Serialize};
use std::{
    cmp::Reverse,
    collections::HashSet,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    sync::Arc,
};
use thiserror::Error;

/// Errors that may occur while loading an index.
#[derive(Debug, Error)]
#[allow(missing_docs, clippy::missing_docs_in_private_items)]
pub enum IndexError {
    #[error("Could not read the index snapshot at {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("The index snapshot is not in the expected format")]
    Format(#[source] serde_json::Error),
}

/// The on-disk form of an index, as produced by the index builder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexSnapshot {
    /// The build version of this snapshot.
    pub version: u64,

    /// Every suggestion in the snapshot.
    pub suggestions: Vec<SnapshotEntry>,
}

/// A suggestion in a snapshot, with the extra keywords it can be found by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    /// The suggestion itself. Its text is always one of its keys.
    #[serde(flatten)]
    pub suggestion: Suggestion,

    /// Other terms that should find this suggestion.
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// A suggestion as stored in the trie.
#[derive(Debug)]
struct IndexedSuggestion {
    /// The suggestion to hand out.
    suggestion: Suggestion,

    /// The suggestion's text, normalized the same way as search terms.
    normalized_text: String,
}

/// Finds suggestions whose normalized text or keywords start with a term.
///
/// The index never changes after it is built, so one instance can be shared
/// by every request.
pub struct SuggestIndex {
    /// The build version of the snapshot this index was made from.
    version: u64,

    /// Map from normalized keys to the suggestions they lead to.
    trie: Trie<String, Vec<Arc<IndexedSuggestion>>>,
}

impl SuggestIndex {
    /// Build an index from a snapshot. Keys are normalized with `normalizer`,
    /// which must match the normalizer used for search terms.
    pub fn from_snapshot(snapshot: IndexSnapshot, normalizer: &Normalizer) -> Self {
        let mut trie: Trie<String, Vec<Arc<IndexedSuggestion>>> = Trie::new();

        for entry in snapshot.suggestions {
            let normalized_text = normalizer.normalize(&entry.suggestion.text);
            let keys: HashSet<String> = entry
                .keywords
                .iter()
                .map(|keyword| normalizer.normalize(keyword))
                .chain(std::iter::once(normalized_text.clone()))
                .filter(|key| !key.is_empty())
                .collect();

            if keys.is_empty() {
                tracing::warn!(
                    r#type = "index.load.no-keys",
                    suggestion_id = entry.suggestion.id,
                    "Suggestion has no usable keys"
                );
                continue;
            }

            let indexed = Arc::new(IndexedSuggestion {
                suggestion: entry.suggestion,
                normalized_text,
            });
            for key in keys {
                match trie.get_mut(&key) {
                    Some(existing) => existing.push(Arc::clone(&indexed)),
                    None => {
                        trie.insert(key, vec![Arc::clone(&indexed)]);
                    }
                }
            }
        }

        tracing::info!(
            r#type = "index.load.done",
            version = snapshot.version,
            key_count = trie.len(),
            "Built suggestion index"
        );

        Self {
            version: snapshot.version,
            trie,
        }
    }

    /// Load a JSON snapshot from `path` and build an index from it.
    ///
    /// # Errors
    /// If the file cannot be read, or does not hold a valid snapshot.
    pub fn from_path(path: &Path, normalizer: &Normalizer) -> Result<Self, IndexError> {
        tracing::info!(r#type = "index.load.start", path = %path.display(), "Loading suggestion index");

        let file = File::open(path).map_err(|source| IndexError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let snapshot: IndexSnapshot =
            serde_json::from_reader(BufReader::new(file)).map_err(IndexError::Format)?;

        Ok(Self::from_snapshot(snapshot, normalizer))
    }

    /// The number of distinct keys in the index.
    pub fn key_count(&self) -> usize {
        self.trie.len()
    }
}

impl SuggestionLookup for SuggestIndex {
    fn version(&self) -> u64 {
        self.version
    }

    /// Every suggestion with a key starting with `normalized_part` that passes
    /// the class filters, each once.
    ///
    /// Suggestions whose text is exactly the term come first, then the rest by
    /// weight, heaviest first. Ties keep key order.
    fn lookup(
        &self,
        part: &str,
        normalized_part: &str,
        include: &FilterSet,
        exclude: &FilterSet,
    ) -> Vec<Suggestion> {
        if normalized_part.is_empty() {
            return Vec::new();
        }

        let prefix = normalized_part.to_string();
        let subtrie = match self.trie.get_raw_descendant(&prefix) {
            Some(subtrie) => subtrie,
            None => return Vec::new(),
        };

        let mut seen = HashSet::new();
        let mut found: Vec<&IndexedSuggestion> = subtrie
            .iter()
            // A raw descendant may hold keys that only share part of the prefix.
            .filter(|(key, _)| key.starts_with(normalized_part))
            .flat_map(|(_, suggestions)| suggestions.iter().map(Arc::as_ref))
            .filter(|indexed| {
                let class = indexed.suggestion.class.as_str();
                (include.is_empty() || include.contains(class)) && !exclude.contains(class)
            })
            .filter(|indexed| seen.insert(indexed.suggestion.id))
            .collect();

        let typed = part.trim().to_lowercase();
        found.sort_by_cached_key(|indexed| {
            let exact = indexed.normalized_text == normalized_part
                || indexed.suggestion.text.to_lowercase() == typed;
            (Reverse(exact), Reverse(indexed.suggestion.weight))
        });

        tracing::trace!(
            r#type = "index.lookup",
            candidate_count = found.len(),
            "Looked up suggestions"
        );

        found
            .into_iter()
            .map(|indexed| indexed.suggestion.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{IndexError, IndexSnapshot, SnapshotEntry, SuggestIndex};
    use crate::{FilterSet, Normalizer, SanitizePolicy, Suggestion, SuggestionLookup};
    use fake::{Fake, Faker};
    use pretty_assertions::assert_eq;
    use std::io::Write;

    fn entry(id: u64, text: &str, class: &str, weight: u64, keywords: &[&str]) -> SnapshotEntry {
        SnapshotEntry {
            suggestion: Suggestion {
                id,
                text: text.to_string(),
                class: class.to_string(),
                weight,
            },
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    fn cities() -> SuggestIndex {
        let snapshot = IndexSnapshot {
            version: 12,
            suggestions: vec![
                entry(1, "New York", "city", 50, &["NYC", "big apple"]),
                entry(2, "Newark", "city", 80, &[]),
                entry(3, "New Street", "street", 90, &[]),
                entry(4, "New", "word", 1, &[]),
                entry(5, "Boston", "city", 70, &["new england"]),
            ],
        };
        SuggestIndex::from_snapshot(snapshot, &Normalizer::default())
    }

    fn ids(suggestions: &[Suggestion]) -> Vec<u64> {
        suggestions.iter().map(|s| s.id).collect()
    }

    fn none() -> FilterSet {
        FilterSet::default()
    }

    #[test]
    fn prefix_lookup_orders_exact_then_weight() {
        let index = cities();
        assert_eq!(index.version(), 12);

        let found = index.lookup("New", "new", &none(), &none());
        assert_eq!(ids(&found), vec![4, 3, 2, 5, 1]);
    }

    #[test]
    fn keywords_find_suggestions_once() {
        let index = cities();
        let found = index.lookup("big", "big", &none(), &none());
        assert_eq!(ids(&found), vec![1]);

        // Only one key starts with "new y".
        let found = index.lookup("new y", "new y", &none(), &none());
        assert_eq!(ids(&found), vec![1]);
    }

    #[test]
    fn class_filters() {
        let index = cities();
        let cities_only: FilterSet = ["city"].into_iter().collect();
        let found = index.lookup("new", "new", &cities_only, &none());
        assert_eq!(ids(&found), vec![2, 5, 1]);

        let no_cities: FilterSet = ["city"].into_iter().collect();
        let found = index.lookup("new", "new", &none(), &no_cities);
        assert_eq!(ids(&found), vec![4, 3]);

        let both: FilterSet = ["city", "street"].into_iter().collect();
        let found = index.lookup("new", "new", &both, &cities_only);
        assert_eq!(ids(&found), vec![3]);
    }

    #[test]
    fn empty_and_unknown_terms_find_nothing() {
        let index = cities();
        assert!(index.lookup("", "", &none(), &none()).is_empty());
        assert!(index.lookup("zzz", "zzz", &none(), &none()).is_empty());
    }

    #[test]
    fn keys_use_the_given_normalizer() {
        let snapshot = IndexSnapshot {
            version: 1,
            // Cyrillic "Рок" and Latin "Poker"
            suggestions: vec![
                entry(1, "\u{420}\u{43e}\u{43a}", "music", 1, &[]),
                entry(2, "Poker", "game", 2, &[]),
            ],
        };
        let folding = Normalizer::new(SanitizePolicy::strict(), true);
        let index = SuggestIndex::from_snapshot(snapshot, &folding);

        let term = folding.prepare("po");
        let found = index.lookup(&term.part, &term.normalized, &none(), &none());
        assert_eq!(ids(&found), vec![2, 1]);
    }

    #[test]
    fn entries_without_keys_are_skipped() {
        let snapshot = IndexSnapshot {
            version: 1,
            suggestions: vec![
                entry(1, "<b></b>", "x", 1, &["?!"]),
                Faker.fake::<Suggestion>().into(),
            ],
        };
        let index = SuggestIndex::from_snapshot(snapshot, &Normalizer::default());
        assert!(index.key_count() >= 1);
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"version": 3, "suggestions": [
                {{"id": 1, "text": "Apple", "class": "fruit", "weight": 5, "keywords": ["pomme"]}},
                {{"id": 2, "text": "Apricot", "class": "fruit", "weight": 9}}
            ]}}"#
        )
        .unwrap();

        let index = SuggestIndex::from_path(file.path(), &Normalizer::default()).unwrap();
        assert_eq!(index.version(), 3);
        assert_eq!(ids(&index.lookup("ap", "ap", &none(), &none())), vec![2, 1]);
        assert_eq!(ids(&index.lookup("po", "po", &none(), &none())), vec![1]);
    }

    #[test]
    fn load_errors() {
        let missing =
            SuggestIndex::from_path("/does/not/exist.json".as_ref(), &Normalizer::default());
        assert!(matches!(missing, Err(IndexError::Io { .. })));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[1, 2, 3]").unwrap();
        let malformed = SuggestIndex::from_path(file.path(), &Normalizer::default());
        assert!(matches!(malformed, Err(IndexError::Format(_))));
    }

    impl From<Suggestion> for SnapshotEntry {
        fn from(suggestion: Suggestion) -> Self {
            Self {
                suggestion,
                keywords: vec![],
            }
        }
    }
}
