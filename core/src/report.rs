use serde::{Deserialize, Serialize};

use crate::index::InvertedIndex;
use crate::pipeline::Stage;

/// Dictionary and postings size of one stage's index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSize {
    pub stage: Stage,
    /// The stage this one was derived from.
    pub parent: Option<Stage>,
    pub terms: usize,
    pub postings: usize,
}

impl StageSize {
    pub fn of(stage: Stage, parent: Option<Stage>, index: &InvertedIndex) -> Self {
        Self { stage, parent, terms: index.len(), postings: index.postings_count() }
    }
}

/// Percentage change from `old` to `new`, rounded to two decimals. Zero when `old` is zero.
pub fn percent_change(new: usize, old: usize) -> f64 {
    if old == 0 {
        return 0.0;
    }
    let pct = (new as f64 - old as f64) / old as f64 * 100.0;
    (pct * 100.0).round() / 100.0
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SizeRow {
    pub size: StageSize,
    pub terms_change: f64,
    pub terms_cumulative: f64,
    pub postings_change: f64,
    pub postings_cumulative: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SizeReport {
    pub rows: Vec<SizeRow>,
}

impl SizeReport {
    /// Changes are relative to each stage's parent and, cumulatively, to the first stage.
    pub fn from_stages(stages: &[StageSize]) -> Self {
        let Some(first) = stages.first() else {
            return Self::default();
        };
        let rows = stages
            .iter()
            .map(|size| {
                let parent = size
                    .parent
                    .and_then(|p| stages.iter().find(|s| s.stage == p))
                    .unwrap_or(size);
                SizeRow {
                    size: *size,
                    terms_change: percent_change(size.terms, parent.terms),
                    terms_cumulative: percent_change(size.terms, first.terms),
                    postings_change: percent_change(size.postings, parent.postings),
                    postings_cumulative: percent_change(size.postings, first.postings),
                }
            })
            .collect();
        Self { rows }
    }
}
