use std::collections::HashSet;

use crate::index::InvertedIndex;

/// Ordered stopword terms, most frequent first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StopwordList {
    words: Vec<String>,
    lookup: HashSet<String>,
}

impl StopwordList {
    pub fn new(words: Vec<String>) -> Self {
        let lookup = words.iter().cloned().collect();
        Self { words, lookup }
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn contains(&self, term: &str) -> bool {
        self.lookup.contains(term)
    }

    /// The first `k` words. Shorter prefixes of one list are always nested.
    pub fn truncated(&self, k: usize) -> StopwordList {
        StopwordList::new(self.words.iter().take(k).cloned().collect())
    }

    /// Newline-delimited, one term per line.
    pub fn to_lines(&self) -> String {
        let mut out = String::new();
        for word in &self.words {
            out.push_str(word);
            out.push('\n');
        }
        out
    }

    pub fn from_lines(text: &str) -> StopwordList {
        StopwordList::new(
            text.lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }
}

/// Rank every term by postings-list length, descending, and keep the top `k`.
///
/// Ties keep the index's own key order (the sort is stable). Expects an index
/// that has already been number-stripped and case-folded.
pub fn select_stopwords(index: &InvertedIndex, k: usize) -> StopwordList {
    let mut ranked: Vec<(&str, usize)> = index.iter().map(|(term, p)| (term, p.len())).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    StopwordList::new(ranked.into_iter().take(k).map(|(term, _)| term.to_string()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> InvertedIndex {
        vec![
            ("bank".to_string(), vec![1, 2]),
            ("said".to_string(), vec![1, 2, 3, 4]),
            ("the".to_string(), vec![1, 2, 3, 4, 5]),
            ("and".to_string(), vec![3, 4]),
            ("oil".to_string(), vec![5]),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn ranks_by_postings_length() {
        let list = select_stopwords(&index(), 3);
        assert_eq!(list.words(), &["the", "said", "and"]);
    }

    #[test]
    fn ties_keep_key_order() {
        let list = select_stopwords(&index(), 4);
        // "and" and "bank" both have two postings; "and" sorts first
        assert_eq!(list.words()[2..], ["and", "bank"]);
    }

    #[test]
    fn k_larger_than_vocabulary() {
        assert_eq!(select_stopwords(&index(), 100).len(), 5);
        assert!(select_stopwords(&InvertedIndex::new(), 30).is_empty());
    }

    #[test]
    fn truncation_is_a_prefix() {
        let list = select_stopwords(&index(), 5);
        let short = list.truncated(2);
        assert!(short.words().iter().all(|w| list.contains(w)));
        assert_eq!(short.words(), &list.words()[..2]);
    }

    #[test]
    fn lines_round_trip() {
        let list = select_stopwords(&index(), 5);
        assert_eq!(StopwordList::from_lines(&list.to_lines()), list);
    }
}
