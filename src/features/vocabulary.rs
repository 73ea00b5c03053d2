//! Term vocabularies.
//!
//! A [`Vocabulary`] maps each term to the column it occupies in a feature
//! matrix. Indices are positions, so they are always `0..len` with no gaps.
//! Vocabularies are never edited in place: [`Vocabulary::without_terms`] and
//! [`Vocabulary::with_terms`] return new snapshots, and holders of the old
//! one keep seeing it unchanged.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// An ordered set of terms. A term's index is its position.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    terms: IndexSet<String>,
}

impl Vocabulary {
    /// An empty vocabulary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether the vocabulary has no terms.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Column index of `term`.
    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.terms.get_index_of(term)
    }

    /// Term at column `index`.
    pub fn term(&self, index: usize) -> Option<&str> {
        self.terms.get_index(index).map(String::as_str)
    }

    /// Whether `term` is in the vocabulary.
    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains(term)
    }

    /// Terms in index order.
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.terms.iter().map(String::as_str)
    }

    /// A copy without the given terms, re-indexed contiguously. The relative
    /// order of the remaining terms is kept. Unknown terms are ignored.
    pub fn without_terms<S: AsRef<str>>(&self, terms: &[S]) -> Self {
        let removed: IndexSet<&str> = terms.iter().map(AsRef::as_ref).collect();
        self.terms
            .iter()
            .filter(|term| !removed.contains(term.as_str()))
            .cloned()
            .collect()
    }

    /// A copy with the given terms appended after the existing ones.
    /// Terms already present keep their index.
    pub fn with_terms<S: AsRef<str>>(&self, terms: &[S]) -> Self {
        let mut extended = self.terms.clone();
        extended.extend(terms.iter().map(|t| t.as_ref().to_string()));
        Vocabulary { terms: extended }
    }
}

impl FromIterator<String> for Vocabulary {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Vocabulary {
            terms: iter.into_iter().collect(),
        }
    }
}

impl<'a> FromIterator<&'a str> for Vocabulary {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter().map(str::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_are_positions() {
        let vocabulary: Vocabulary = ["apoptosis", "germline", "rnai"].into_iter().collect();
        assert_eq!(vocabulary.len(), 3);
        assert_eq!(vocabulary.index_of("germline"), Some(1));
        assert_eq!(vocabulary.term(2), Some("rnai"));
        assert_eq!(vocabulary.index_of("mouse"), None);
    }

    #[test]
    fn test_without_terms_reindexes() {
        let vocabulary: Vocabulary = ["a1", "b2", "c3", "d4"].into_iter().collect();
        let smaller = vocabulary.without_terms(&["b2", "absent"]);

        assert_eq!(smaller.len(), 3);
        assert_eq!(smaller.index_of("a1"), Some(0));
        assert_eq!(smaller.index_of("c3"), Some(1));
        assert_eq!(smaller.index_of("d4"), Some(2));
        // the original snapshot is untouched
        assert_eq!(vocabulary.index_of("b2"), Some(1));
    }

    #[test]
    fn test_with_terms_appends() {
        let vocabulary: Vocabulary = ["a1", "b2"].into_iter().collect();
        let larger = vocabulary.with_terms(&["c3", "a1", "d4"]);

        assert_eq!(larger.len(), 4);
        assert_eq!(larger.index_of("a1"), Some(0));
        assert_eq!(larger.index_of("c3"), Some(2));
        assert_eq!(larger.index_of("d4"), Some(3));
    }
}
