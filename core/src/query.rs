//! Term lookup against a single stage's index.
//!
//! The engine matches what it is given; preparing a raw query so that it is
//! normalized the same way as the target index is the caller's job
//! (see [`QueryNormalizer`]).

use rust_stemmers::Stemmer;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use crate::compression::english_stemmer;
use crate::error::{IndexError, QueryRejection, Result};
use crate::index::InvertedIndex;
use crate::persist::ArtifactStore;
use crate::pipeline::Stage;
use crate::{DocId, Postings};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchMode {
    /// The postings of the identical key.
    #[default]
    Exact,
    /// Union of the postings of every key containing the query.
    Substring,
}

impl FromStr for MatchMode {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "exact" => Ok(MatchMode::Exact),
            "substring" => Ok(MatchMode::Substring),
            other => Err(IndexError::parse(format!("unknown match mode `{other}`"))),
        }
    }
}

/// Query term -> result postings, in term order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryBatch {
    results: BTreeMap<String, Postings>,
}

impl QueryBatch {
    pub fn insert(&mut self, term: impl Into<String>, postings: Postings) {
        self.results.insert(term.into(), postings);
    }

    pub fn get(&self, term: &str) -> Option<&[DocId]> {
        self.results.get(term).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[DocId])> {
        self.results.iter().map(|(t, p)| (t.as_str(), p.as_slice()))
    }
}

pub struct QueryEngine {
    index: InvertedIndex,
}

impl QueryEngine {
    pub fn new(index: InvertedIndex) -> Self {
        Self { index }
    }

    /// Load a stage's index from the store. A missing or malformed artifact is fatal.
    pub fn open(store: &ArtifactStore, stage: Stage) -> Result<Self> {
        Ok(Self::new(store.load_index(stage)?))
    }

    pub fn index(&self) -> &InvertedIndex {
        &self.index
    }

    /// `None` when the key is absent, as opposed to present with an empty list.
    pub fn lookup(&self, term: &str) -> Option<&[DocId]> {
        self.index.get(term)
    }

    pub fn exact(&self, term: &str) -> Postings {
        self.lookup(term).map(<[DocId]>::to_vec).unwrap_or_default()
    }

    /// Every key containing `term` contributes its postings. Short queries can
    /// match many unrelated keys; that is how this mode behaves.
    pub fn substring(&self, term: &str) -> Postings {
        let merged: BTreeSet<DocId> = self
            .index
            .iter()
            .filter(|(key, _)| key.contains(term))
            .flat_map(|(_, postings)| postings.iter().copied())
            .collect();
        merged.into_iter().collect()
    }

    pub fn search(&self, term: &str, mode: MatchMode) -> Postings {
        match mode {
            MatchMode::Exact => self.exact(term),
            MatchMode::Substring => self.substring(term),
        }
    }

    /// Evaluate each term after `normalizer` prepares it; results stay keyed by the term as given.
    pub fn run_batch<I, S>(
        &self,
        terms: I,
        mode: MatchMode,
        normalizer: &QueryNormalizer,
    ) -> QueryBatch
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut batch = QueryBatch::default();
        for term in terms {
            let term = term.as_ref();
            let prepared = normalizer.prepare(term);
            let postings = self.search(&prepared, mode);
            tracing::debug!(term, prepared = %prepared, hits = postings.len(), "query evaluated");
            batch.insert(term, postings);
        }
        batch
    }
}

/// Check a user-typed query: one purely alphabetic token. Returns it trimmed.
pub fn validate_query(raw: &str) -> std::result::Result<String, QueryRejection> {
    let query = raw.trim();
    if query.is_empty() {
        return Err(QueryRejection::Empty);
    }
    if query.chars().all(char::is_numeric) {
        return Err(QueryRejection::Numeric);
    }
    if query.chars().any(char::is_whitespace) {
        return Err(QueryRejection::MultiToken);
    }
    if !query.chars().all(char::is_alphabetic) {
        return Err(QueryRejection::SpecialCharacters);
    }
    Ok(query.to_string())
}

/// Brings a raw query term into the normal form of a target index.
pub struct QueryNormalizer {
    fold_case: bool,
    stemmer: Option<Stemmer>,
}

impl QueryNormalizer {
    pub fn new(fold_case: bool, stem: bool) -> Self {
        Self { fold_case, stemmer: stem.then(english_stemmer) }
    }

    /// Leaves terms untouched.
    pub fn identity() -> Self {
        Self::new(false, false)
    }

    /// Matches how `stage` normalized its keys.
    pub fn for_stage(stage: Stage) -> Self {
        Self::new(stage.is_case_folded(), stage.is_stemmed())
    }

    pub fn prepare(&self, term: &str) -> String {
        let term = if self.fold_case { term.to_lowercase() } else { term.to_string() };
        match &self.stemmer {
            Some(stemmer) => stemmer.stem(&term).into_owned(),
            None => term,
        }
    }
}
