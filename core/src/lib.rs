//! Inverted index construction over a small news corpus, plus the lossy
//! dictionary-compression stages (number removal, case folding, stopword
//! removal, stemming) and a term lookup engine over any stage's output.

pub mod compression;
pub mod config;
pub mod corpus;
pub mod error;
pub mod index;
pub mod persist;
pub mod pipeline;
pub mod query;
pub mod report;
pub mod stopwords;
pub mod tokenizer;

pub type DocId = u32;

/// Ascending, duplicate-free list of documents containing a term.
pub type Postings = Vec<DocId>;

pub use config::{ArtifactFormat, CasePolicy, PipelineConfig, TokenizerConfig};
pub use corpus::Document;
pub use error::{IndexError, QueryRejection, Result};
pub use index::{build_index, IndexBuilder, InvertedIndex};
pub use persist::{ArtifactStore, Manifest};
pub use pipeline::{CompressionPipeline, PipelineOutput, Stage};
pub use query::{validate_query, MatchMode, QueryBatch, QueryEngine, QueryNormalizer};
pub use stopwords::{select_stopwords, StopwordList};
