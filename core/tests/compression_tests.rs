use lossy_core::compression::{case_fold, remove_numbers, remove_stopwords, stem};
use lossy_core::{select_stopwords, InvertedIndex};
use std::collections::BTreeSet;

fn index(entries: &[(&str, &[u32])]) -> InvertedIndex {
    entries.iter().map(|(t, p)| (t.to_string(), p.to_vec())).collect()
}

fn corpus_index() -> InvertedIndex {
    index(&[
        ("017", &[1, 4]),
        ("Abolition", &[209, 318]),
        ("abolition", &[274, 893]),
        ("And", &[1]),
        ("and", &[2, 3, 4, 5, 6]),
        ("Corrected", &[7, 9]),
        ("correcting", &[5, 7]),
        ("oil", &[1, 2, 3]),
        ("Oils", &[3, 4]),
        ("said", &[1, 2, 3, 4, 5]),
        ("the", &[1, 2, 3, 4, 5, 6]),
        ("zweig", &[20518]),
    ])
}

fn docs_of(index: &InvertedIndex) -> BTreeSet<u32> {
    index.iter().flat_map(|(_, p)| p.iter().copied()).collect()
}

#[test]
fn case_folding_scenario() {
    let folded = case_fold(&index(&[("Abolition", &[209, 318]), ("abolition", &[274, 893])]));
    assert_eq!(folded.get("abolition"), Some(&[209, 274, 318, 893][..]));
}

#[test]
fn stemming_scenario() {
    let stemmed = stem(&index(&[("correcting", &[5, 7]), ("corrected", &[7, 9])]));
    assert_eq!(stemmed.get("correct"), Some(&[5, 7, 9][..]));
}

#[test]
fn merging_stages_lose_no_posting() {
    let base = remove_numbers(&corpus_index());
    let folded = case_fold(&base);
    for (key, postings) in folded.iter() {
        let expected: BTreeSet<u32> = base
            .iter()
            .filter(|(k, _)| k.to_lowercase() == key)
            .flat_map(|(_, p)| p.iter().copied())
            .collect();
        assert_eq!(postings.iter().copied().collect::<BTreeSet<_>>(), expected, "key {key}");
    }
    let stemmed = stem(&folded);
    assert_eq!(docs_of(&stemmed), docs_of(&folded));
    assert_eq!(stemmed.get("oil"), Some(&[1, 2, 3, 4][..]));
}

#[test]
fn every_stage_keeps_postings_well_formed() {
    let base = corpus_index();
    let no_numbers = remove_numbers(&base);
    let folded = case_fold(&no_numbers);
    let stopwords = select_stopwords(&folded, 2);
    let removed = remove_stopwords(&folded, &stopwords);
    let stemmed = stem(&removed);
    for idx in [&no_numbers, &folded, &removed, &stemmed] {
        assert!(idx.is_well_formed());
    }
}

#[test]
fn case_folding_is_idempotent() {
    let once = case_fold(&corpus_index());
    assert_eq!(case_fold(&once), once);
}

#[test]
fn number_removal_discards_numeric_keys() {
    let out = remove_numbers(&corpus_index());
    assert!(!out.contains_term("017"));
    assert_eq!(out.len(), corpus_index().len() - 1);
}

#[test]
fn larger_stopword_list_yields_key_subset() {
    let folded = case_fold(&remove_numbers(&corpus_index()));
    let list = select_stopwords(&folded, 3);
    let small = remove_stopwords(&folded, &list.truncated(1));
    let large = remove_stopwords(&folded, &list.truncated(3));
    assert!(large.terms().all(|t| small.contains_term(t)));
    assert!(large.len() < small.len());
    assert!(!large.contains_term("the"));
    assert!(!large.contains_term("and"));
}
