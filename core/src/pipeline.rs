use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::compression::{case_fold, remove_numbers, remove_stopwords, stem};
use crate::config::PipelineConfig;
use crate::error::{IndexError, Result};
use crate::index::InvertedIndex;
use crate::persist::{ArtifactStore, Manifest};
use crate::report::StageSize;
use crate::stopwords::{select_stopwords, StopwordList};

/// A persisted index produced by one pipeline step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Naive,
    NoNumbers,
    CaseFolded,
    Stopwords(usize),
    Stemmed,
}

impl Stage {
    pub fn file_stem(&self) -> String {
        match self {
            Stage::Naive => "1_naive_index".to_string(),
            Stage::NoNumbers => "2_no_numbers_index".to_string(),
            Stage::CaseFolded => "3_case_folded_index".to_string(),
            Stage::Stopwords(k) => format!("4_stopwords_{k}_index"),
            Stage::Stemmed => "5_stemmed_index".to_string(),
        }
    }

    pub fn label(&self) -> String {
        match self {
            Stage::Naive => "Unfiltered".to_string(),
            Stage::NoNumbers => "No numbers".to_string(),
            Stage::CaseFolded => "Case folding".to_string(),
            Stage::Stopwords(k) => format!("{k} stopw's"),
            Stage::Stemmed => "Stemming".to_string(),
        }
    }

    /// Whether keys of this stage are lower-cased.
    pub fn is_case_folded(&self) -> bool {
        !matches!(self, Stage::Naive | Stage::NoNumbers)
    }

    pub fn is_stemmed(&self) -> bool {
        matches!(self, Stage::Stemmed)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Naive => write!(f, "naive"),
            Stage::NoNumbers => write!(f, "no-numbers"),
            Stage::CaseFolded => write!(f, "case-folded"),
            Stage::Stopwords(k) => write!(f, "stopwords-{k}"),
            Stage::Stemmed => write!(f, "stemmed"),
        }
    }
}

impl FromStr for Stage {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "naive" => Ok(Stage::Naive),
            "no-numbers" => Ok(Stage::NoNumbers),
            "case-folded" => Ok(Stage::CaseFolded),
            "stemmed" => Ok(Stage::Stemmed),
            other => other
                .strip_prefix("stopwords-")
                .and_then(|k| k.parse().ok())
                .map(Stage::Stopwords)
                .ok_or_else(|| IndexError::parse(format!("unknown stage `{other}`"))),
        }
    }
}

/// Every index the pipeline produced, kept in memory after being persisted.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub naive: InvertedIndex,
    pub no_numbers: InvertedIndex,
    pub case_folded: InvertedIndex,
    pub stopwords: StopwordList,
    pub stopword_removed: BTreeMap<usize, InvertedIndex>,
    pub stem_threshold: usize,
    pub stemmed: InvertedIndex,
}

impl PipelineOutput {
    pub fn get(&self, stage: Stage) -> Option<&InvertedIndex> {
        match stage {
            Stage::Naive => Some(&self.naive),
            Stage::NoNumbers => Some(&self.no_numbers),
            Stage::CaseFolded => Some(&self.case_folded),
            Stage::Stopwords(k) => self.stopword_removed.get(&k),
            Stage::Stemmed => Some(&self.stemmed),
        }
    }

    /// Sizes of every stage in run order, each with the stage it was derived from.
    pub fn sizes(&self) -> Vec<StageSize> {
        let mut sizes = vec![
            StageSize::of(Stage::Naive, None, &self.naive),
            StageSize::of(Stage::NoNumbers, Some(Stage::Naive), &self.no_numbers),
            StageSize::of(Stage::CaseFolded, Some(Stage::NoNumbers), &self.case_folded),
        ];
        for (k, index) in &self.stopword_removed {
            sizes.push(StageSize::of(Stage::Stopwords(*k), Some(Stage::CaseFolded), index));
        }
        let stem_parent = Stage::Stopwords(self.stem_threshold);
        sizes.push(StageSize::of(Stage::Stemmed, Some(stem_parent), &self.stemmed));
        sizes
    }
}

/// Runs the canonical stage sequence, persisting each output before the next stage starts.
///
/// naive -> no numbers -> case folded -> {stopword list} -> stopwords(k) for each
/// threshold (parallel branches off the case-folded index) -> stemmed (off the
/// `stem_threshold` branch).
pub struct CompressionPipeline<'a> {
    config: &'a PipelineConfig,
    store: &'a ArtifactStore,
}

impl<'a> CompressionPipeline<'a> {
    pub fn new(config: &'a PipelineConfig, store: &'a ArtifactStore) -> Self {
        Self { config, store }
    }

    fn persist(&self, stage: Stage, index: &InvertedIndex) -> Result<()> {
        let path = self.store.save_index(stage, index)?;
        tracing::info!(
            stage = %stage,
            terms = index.len(),
            postings = index.postings_count(),
            path = %path.display(),
            "stage persisted"
        );
        Ok(())
    }

    /// Run every stage after the naive index. The naive index itself is expected
    /// to be persisted already by whoever built it.
    pub fn run(&self, naive: InvertedIndex) -> Result<PipelineOutput> {
        self.config.validate()?;

        let no_numbers = remove_numbers(&naive);
        self.persist(Stage::NoNumbers, &no_numbers)?;

        let case_folded = case_fold(&no_numbers);
        self.persist(Stage::CaseFolded, &case_folded)?;

        // derived from this exact case-folded index, before any stopword removal
        let stopwords = select_stopwords(&case_folded, self.config.max_threshold());
        self.store.save_stopwords(&stopwords)?;
        tracing::info!(count = stopwords.len(), "stopword list derived");

        let mut stopword_removed = BTreeMap::new();
        for k in self.config.thresholds() {
            let index = remove_stopwords(&case_folded, &stopwords.truncated(k));
            self.persist(Stage::Stopwords(k), &index)?;
            stopword_removed.insert(k, index);
        }

        let stem_threshold = self.config.stem_threshold;
        let stem_input = stopword_removed.get(&stem_threshold).ok_or_else(|| {
            IndexError::parse(format!("no stopword branch for threshold {stem_threshold}"))
        })?;
        let stemmed = stem(stem_input);
        self.persist(Stage::Stemmed, &stemmed)?;

        let output = PipelineOutput {
            stem_threshold: self.config.stem_threshold,
            naive,
            no_numbers,
            case_folded,
            stopwords,
            stopword_removed,
            stemmed,
        };
        let manifest = Manifest::new(output.naive.document_count(), output.sizes());
        self.store.save_manifest(&manifest)?;
        Ok(output)
    }

    /// Load the persisted naive index and run the remaining stages on it.
    pub fn run_from_store(&self) -> Result<PipelineOutput> {
        let naive = self.store.load_index(Stage::Naive)?;
        self.run(naive)
    }
}
