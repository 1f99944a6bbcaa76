use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;
use unicode_normalization::UnicodeNormalization;

use crate::config::{CasePolicy, TokenizerConfig};

lazy_static! {
    static ref CONTROL: Regex =
        Regex::new(r"[\x00-\x08\x0B\x0C\x0E-\x1F\x7F]").expect("valid regex");
    static ref LINE_BREAK: Regex = Regex::new(r"\r?\n").expect("valid regex");
    static ref REPEATED_HYPHENS: Regex = Regex::new(r"-{2,}").expect("valid regex");
    static ref REPEATED_PERIODS: Regex = Regex::new(r"\.{2,}").expect("valid regex");
    static ref PUNCTUATION: Regex = Regex::new(r"[^\p{L}\p{N}\s'\x{2019}]+").expect("valid regex");
    static ref DIGITS: Regex = Regex::new(r"\d").expect("valid regex");
    static ref WORD: Regex = Regex::new(r"[\p{L}\p{N}]+").expect("valid regex");
}

fn is_apostrophe(c: char) -> bool {
    c == '\'' || c == '\u{2019}'
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Rewrites every `mark` character depending on whether letters sit on both sides of it.
fn resolve_flanked(text: &str, mark: fn(char) -> bool, flanked: &str, unflanked: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    for (i, &c) in chars.iter().enumerate() {
        if !mark(c) {
            out.push(c);
            continue;
        }
        let before = i > 0 && chars[i - 1].is_alphabetic();
        let after = chars.get(i + 1).is_some_and(|n| n.is_alphabetic());
        out.push_str(if before && after { flanked } else { unflanked });
    }
    out
}

/// "U.S." -> "US": a single letter not preceded by a word character loses its trailing period.
fn collapse_acronyms(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let starts_word = i == 0 || !is_word_char(chars[i - 1]);
        if c.is_ascii_alphabetic() && starts_word && chars.get(i + 1) == Some(&'.') {
            out.push(c);
            i += 2;
            continue;
        }
        out.push(c);
        i += 1;
    }
    out
}

/// Normalize one document's body text so that whitespace separates every token.
///
/// Steps run in a fixed order since each consumes the previous one's output.
pub fn clean(text: &str, strip_digits: bool) -> String {
    let text: String = text.nfkc().collect();
    let text = CONTROL.replace_all(&text, "");
    let text = LINE_BREAK.replace_all(&text, " \n ");
    let text = REPEATED_HYPHENS.replace_all(&text, " ");
    let text = resolve_flanked(&text, |c| c == '-', "-", " ");
    let text = REPEATED_PERIODS.replace_all(&text, " ");
    let text = collapse_acronyms(&text);
    let text = PUNCTUATION.replace_all(&text, " ").into_owned();
    let text = if strip_digits { DIGITS.replace_all(&text, "").into_owned() } else { text };
    // contractions first ("it's" -> "its"), then every leftover apostrophe becomes a boundary
    resolve_flanked(&text, is_apostrophe, "", " ")
}

fn is_all_upper(token: &str) -> bool {
    token.chars().any(char::is_uppercase) && !token.chars().any(char::is_lowercase)
}

#[derive(Debug, Clone, Default)]
pub struct Tokenizer {
    config: TokenizerConfig,
}

impl Tokenizer {
    pub fn new(config: TokenizerConfig) -> Self {
        Self { config }
    }

    /// Distinct terms of one document body. Empty text yields an empty set.
    pub fn tokenize(&self, text: &str) -> BTreeSet<String> {
        let cleaned = clean(text, self.config.strip_digits);
        WORD.find_iter(&cleaned)
            .map(|m| self.apply_case(m.as_str()))
            .collect()
    }

    fn apply_case(&self, token: &str) -> String {
        match self.config.case_policy {
            CasePolicy::Raw => token.to_string(),
            CasePolicy::PreserveAcronyms if is_all_upper(token) => token.to_string(),
            CasePolicy::PreserveAcronyms => token.to_lowercase(),
        }
    }
}
