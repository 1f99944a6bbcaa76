use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::corpus::Document;
use crate::error::{IndexError, Result};
use crate::tokenizer::Tokenizer;
use crate::{DocId, Postings};

/// Term -> postings mapping. Keys iterate (and persist) in lexicographic order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvertedIndex {
    terms: BTreeMap<String, Postings>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Callers guarantee every list is already ascending and duplicate-free.
    pub(crate) fn from_sorted(terms: BTreeMap<String, Postings>) -> Self {
        Self { terms }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn get(&self, term: &str) -> Option<&[DocId]> {
        self.terms.get(term).map(Vec::as_slice)
    }

    pub fn contains_term(&self, term: &str) -> bool {
        self.terms.contains_key(term)
    }

    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.terms.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[DocId])> {
        self.terms.iter().map(|(t, p)| (t.as_str(), p.as_slice()))
    }

    /// Sum of all postings list lengths.
    pub fn postings_count(&self) -> usize {
        self.terms.values().map(Vec::len).sum()
    }

    /// Distinct documents referenced by any postings list.
    pub fn document_count(&self) -> usize {
        self.terms.values().flatten().collect::<HashSet<_>>().len()
    }

    /// New index keeping only the entries whose term passes `keep`.
    pub fn retain_terms<F>(&self, mut keep: F) -> InvertedIndex
    where
        F: FnMut(&str) -> bool,
    {
        let terms = self
            .terms
            .iter()
            .filter(|(t, _)| keep(t))
            .map(|(t, p)| (t.clone(), p.clone()))
            .collect();
        Self { terms }
    }

    /// True when every postings list is strictly ascending.
    pub fn is_well_formed(&self) -> bool {
        self.terms.values().all(|p| p.windows(2).all(|w| w[0] < w[1]))
    }
}

impl FromIterator<(String, Postings)> for InvertedIndex {
    /// Duplicate keys are unioned; every list is sorted and deduplicated.
    fn from_iter<I: IntoIterator<Item = (String, Postings)>>(iter: I) -> Self {
        let mut terms: BTreeMap<String, Postings> = BTreeMap::new();
        for (term, postings) in iter {
            terms.entry(term).or_default().extend(postings);
        }
        for postings in terms.values_mut() {
            postings.sort_unstable();
            postings.dedup();
        }
        Self { terms }
    }
}

impl<'a> IntoIterator for &'a InvertedIndex {
    type Item = (&'a String, &'a Postings);
    type IntoIter = std::collections::btree_map::Iter<'a, String, Postings>;

    fn into_iter(self) -> Self::IntoIter {
        self.terms.iter()
    }
}

/// Group (term, document) pairs into a term -> ascending postings mapping.
///
/// The pairs are sorted before grouping, so the result does not depend on input order.
pub fn build_index<I>(pairs: I) -> InvertedIndex
where
    I: IntoIterator<Item = (String, DocId)>,
{
    let mut pairs: Vec<(String, DocId)> = pairs.into_iter().collect();
    pairs.sort_unstable();
    pairs.dedup();

    let mut terms: BTreeMap<String, Postings> = BTreeMap::new();
    for (term, doc_id) in pairs {
        terms.entry(term).or_default().push(doc_id);
    }
    InvertedIndex::from_sorted(terms)
}

/// Parse the corpus identifier of a document into its DocId.
pub fn parse_doc_id(doc: &Document) -> Result<DocId> {
    let raw = doc
        .id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| IndexError::parse("document has no identifier"))?;
    raw.parse::<DocId>().map_err(|e| {
        IndexError::parse(format!("document identifier `{raw}` is not an integer: {e}"))
    })
}

/// Accumulates (term, document) pairs one document at a time.
#[derive(Debug, Default)]
pub struct IndexBuilder {
    tokenizer: Tokenizer,
    pairs: Vec<(String, DocId)>,
    seen: BTreeSet<DocId>,
}

impl IndexBuilder {
    pub fn new(tokenizer: Tokenizer) -> Self {
        Self { tokenizer, pairs: Vec::new(), seen: BTreeSet::new() }
    }

    /// Tokenize one document and record its pairs. Returns the parsed DocId.
    pub fn add_document(&mut self, doc: &Document) -> Result<DocId> {
        let doc_id = parse_doc_id(doc)?;
        if !self.seen.insert(doc_id) {
            return Err(IndexError::parse(format!("duplicate document identifier {doc_id}")));
        }
        let terms = self.tokenizer.tokenize(&doc.body);
        tracing::debug!(doc_id, terms = terms.len(), "tokenized document");
        self.pairs.extend(terms.into_iter().map(|t| (t, doc_id)));
        Ok(doc_id)
    }

    pub fn add_documents<'a, I>(&mut self, docs: I) -> Result<usize>
    where
        I: IntoIterator<Item = &'a Document>,
    {
        let mut n = 0;
        for doc in docs {
            self.add_document(doc)?;
            n += 1;
        }
        Ok(n)
    }

    pub fn num_docs(&self) -> usize {
        self.seen.len()
    }

    pub fn build(self) -> InvertedIndex {
        tracing::info!(docs = self.seen.len(), pairs = self.pairs.len(), "building index");
        build_index(self.pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_pairs_into_sorted_postings() {
        let index = build_index(vec![
            ("oil".to_string(), 9),
            ("wheat".to_string(), 2),
            ("oil".to_string(), 3),
            ("oil".to_string(), 9),
        ]);
        assert_eq!(index.get("oil"), Some(&[3, 9][..]));
        assert_eq!(index.get("wheat"), Some(&[2][..]));
        assert_eq!(index.terms().collect::<Vec<_>>(), vec!["oil", "wheat"]);
    }

    #[test]
    fn from_iter_unions_duplicate_keys() {
        let pairs = vec![("a".to_string(), vec![5, 1]), ("a".to_string(), vec![1, 3])];
        let index: InvertedIndex = pairs.into_iter().collect();
        assert_eq!(index.get("a"), Some(&[1, 3, 5][..]));
        assert!(index.is_well_formed());
    }

    #[test]
    fn missing_identifier_is_parse_error() {
        let doc = Document { id: None, body: "text".into(), ..Default::default() };
        assert!(matches!(parse_doc_id(&doc), Err(IndexError::Parse(_))));
        let doc = Document::new("twelve", "text");
        assert!(matches!(parse_doc_id(&doc), Err(IndexError::Parse(_))));
        assert_eq!(parse_doc_id(&Document::new(" 42 ", "")).unwrap(), 42);
    }

    #[test]
    fn builder_rejects_duplicate_ids() {
        let mut builder = IndexBuilder::default();
        builder.add_document(&Document::new("1", "grain exports")).unwrap();
        assert!(builder.add_document(&Document::new("1", "again")).is_err());
    }

    #[test]
    fn empty_documents_add_no_terms() {
        let mut builder = IndexBuilder::default();
        builder.add_document(&Document::new("7", "")).unwrap();
        assert_eq!(builder.num_docs(), 1);
        assert!(builder.build().is_empty());
    }
}
