use lossy_core::tokenizer::{clean, Tokenizer};
use lossy_core::{CasePolicy, TokenizerConfig};

#[test]
fn it_expands_acronyms_and_strips_digits() {
    let toks = Tokenizer::default().tokenize("The U.S. exported 1,500 tonnes in 1987.");
    assert!(toks.contains("US"));
    assert!(toks.contains("tonnes"));
    assert!(!toks.iter().any(|t| t.chars().any(|c| c.is_ascii_digit())));
}

#[test]
fn it_deduplicates_within_a_document() {
    let toks = Tokenizer::default().tokenize("oil oil oil prices");
    assert_eq!(toks.len(), 2);
}

#[test]
fn it_preserves_acronyms_when_asked() {
    let config = TokenizerConfig { case_policy: CasePolicy::PreserveAcronyms, ..Default::default() };
    let toks = Tokenizer::new(config).tokenize("OPEC Ministers Met in Vienna");
    let words: Vec<&str> = toks.iter().map(String::as_str).collect();
    assert_eq!(words, vec!["OPEC", "in", "met", "ministers", "vienna"]);
}

#[test]
fn it_keeps_raw_case_by_default() {
    let toks = Tokenizer::default().tokenize("Abolition abolition");
    assert!(toks.contains("Abolition"));
    assert!(toks.contains("abolition"));
}

#[test]
fn it_keeps_numbers_when_digits_are_not_stripped() {
    let config = TokenizerConfig { strip_digits: false, ..Default::default() };
    let toks = Tokenizer::new(config).tokenize("profit rose 017 pct");
    assert!(toks.contains("017"));
}

#[test]
fn it_treats_line_breaks_as_boundaries() {
    let cleaned = clean("crude\nprices", true);
    let toks = Tokenizer::default().tokenize(&cleaned);
    assert!(toks.contains("crude"));
    assert!(toks.contains("prices"));
}

#[test]
fn it_strips_special_characters() {
    let toks = Tokenizer::default().tokenize("<BANK> (rates) {up} $5 @ 7% \"quoted\"...end");
    let words: Vec<&str> = toks.iter().map(String::as_str).collect();
    assert_eq!(words, vec!["BANK", "end", "quoted", "rates", "up"]);
}

#[test]
fn it_splits_hyphenated_compounds() {
    let toks = Tokenizer::default().tokenize("a once-in-a-lifetime deal");
    let words: Vec<&str> = toks.iter().map(String::as_str).collect();
    assert_eq!(words, vec!["a", "deal", "in", "lifetime", "once"]);
}
