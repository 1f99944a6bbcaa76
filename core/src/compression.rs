//! Lossy dictionary-compression stages.
//!
//! Every stage borrows its input and returns a new index, so earlier stages
//! stay valid on their own. Output postings are always ascending and
//! duplicate-free; stages that merge keys union the postings of every key
//! that collapses into the same new key.

use rust_stemmers::{Algorithm, Stemmer};
use std::collections::BTreeMap;

use crate::index::InvertedIndex;
use crate::stopwords::StopwordList;
use crate::Postings;

/// Rebuild an index under a key mapping, unioning postings of colliding keys.
fn merge_keys<F>(index: &InvertedIndex, mut rekey: F) -> InvertedIndex
where
    F: FnMut(&str) -> String,
{
    let mut merged: BTreeMap<String, Postings> = BTreeMap::new();
    for (term, postings) in index.iter() {
        merged.entry(rekey(term)).or_default().extend_from_slice(postings);
    }
    for postings in merged.values_mut() {
        postings.sort_unstable();
        postings.dedup();
    }
    InvertedIndex::from_sorted(merged)
}

/// A term made only of digit characters.
pub fn is_number(term: &str) -> bool {
    !term.is_empty() && term.chars().all(char::is_numeric)
}

/// Drop every purely numeric key along with its postings.
pub fn remove_numbers(index: &InvertedIndex) -> InvertedIndex {
    index.retain_terms(|term| !is_number(term))
}

/// Lower-case every key, merging keys that fold together.
pub fn case_fold(index: &InvertedIndex) -> InvertedIndex {
    merge_keys(index, str::to_lowercase)
}

/// Drop every key found in `stopwords` along with its postings.
pub fn remove_stopwords(index: &InvertedIndex, stopwords: &StopwordList) -> InvertedIndex {
    index.retain_terms(|term| !stopwords.contains(term))
}

/// English (Porter family) stemmer used for index keys and queries alike.
pub fn english_stemmer() -> Stemmer {
    Stemmer::create(Algorithm::English)
}

/// Replace every key by its stem, merging keys that share one.
pub fn stem(index: &InvertedIndex) -> InvertedIndex {
    let stemmer = english_stemmer();
    stem_with(index, &stemmer)
}

pub fn stem_with(index: &InvertedIndex, stemmer: &Stemmer) -> InvertedIndex {
    merge_keys(index, |term| stemmer.stem(term).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(entries: &[(&str, &[u32])]) -> InvertedIndex {
        entries.iter().map(|(t, p)| (t.to_string(), p.to_vec())).collect()
    }

    #[test]
    fn numbers_are_dropped_not_merged() {
        let idx = index(&[("017", &[1]), ("1987", &[2, 3]), ("b52", &[4]), ("oil", &[1])]);
        let out = remove_numbers(&idx);
        assert_eq!(out.terms().collect::<Vec<_>>(), vec!["b52", "oil"]);
    }

    #[test]
    fn case_fold_unions_postings() {
        let idx = index(&[
            ("Abolition", &[209, 318]),
            ("abolition", &[274, 893]),
            ("ABOLITION", &[318]),
        ]);
        let out = case_fold(&idx);
        assert_eq!(out.len(), 1);
        assert_eq!(out.get("abolition"), Some(&[209, 274, 318, 893][..]));
    }

    #[test]
    fn input_is_left_untouched() {
        let idx = index(&[("Oil", &[1]), ("oil", &[2])]);
        let before = idx.clone();
        let _ = case_fold(&idx);
        let _ = stem(&idx);
        assert_eq!(idx, before);
    }

    #[test]
    fn stems_merge() {
        let idx = index(&[("correcting", &[5, 7]), ("corrected", &[7, 9])]);
        let out = stem(&idx);
        assert_eq!(out.get("correct"), Some(&[5, 7, 9][..]));
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn stopwords_drop_exact_matches_only() {
        let idx = index(&[("the", &[1, 2]), ("theory", &[2]), ("said", &[1])]);
        let list = StopwordList::new(vec!["the".into(), "said".into()]);
        let out = remove_stopwords(&idx, &list);
        assert_eq!(out.terms().collect::<Vec<_>>(), vec!["theory"]);
    }
}
