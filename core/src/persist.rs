use serde::{Deserialize, Serialize};
use std::fs::{self, create_dir_all};
use std::path::{Path, PathBuf};

use crate::config::ArtifactFormat;
use crate::error::{IndexError, Result};
use crate::index::InvertedIndex;
use crate::pipeline::Stage;
use crate::query::QueryBatch;
use crate::report::StageSize;
use crate::stopwords::StopwordList;

pub const MANIFEST_VERSION: u32 = 1;

/// Summary of the last pipeline run, written next to the stage artifacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub version: u32,
    pub created_at: String,
    /// Documents that contributed at least one term.
    pub num_docs: usize,
    pub stages: Vec<StageSize>,
}

impl Manifest {
    pub fn new(num_docs: usize, stages: Vec<StageSize>) -> Self {
        let created_at = time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_default();
        Self { version: MANIFEST_VERSION, created_at, num_docs, stages }
    }
}

/// Directory holding every persisted artifact of a run.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
    format: ArtifactFormat,
}

impl ArtifactStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf(), format: ArtifactFormat::default() }
    }

    pub fn with_format(mut self, format: ArtifactFormat) -> Self {
        self.format = format;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn index_path(&self, stage: Stage) -> PathBuf {
        self.root.join(format!("{}.{}", stage.file_stem(), self.format.extension()))
    }

    pub fn stopwords_path(&self) -> PathBuf {
        self.root.join("stopwords.txt")
    }

    pub fn queries_path(&self, batch: &str) -> PathBuf {
        self.root.join(format!("queries_{batch}.json"))
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join("manifest.json")
    }

    pub fn save_index(&self, stage: Stage, index: &InvertedIndex) -> Result<PathBuf> {
        let bytes = match self.format {
            ArtifactFormat::Json => serde_json::to_vec(index)?,
            ArtifactFormat::Bincode => bincode::serialize(index)?,
        };
        let path = self.index_path(stage);
        write_artifact(&path, &bytes)?;
        Ok(path)
    }

    pub fn load_index(&self, stage: Stage) -> Result<InvertedIndex> {
        let path = self.index_path(stage);
        let bytes = read_artifact(&path)?;
        let index: InvertedIndex = match self.format {
            ArtifactFormat::Json => {
                serde_json::from_slice(&bytes).map_err(|e| malformed(&path, e))?
            }
            ArtifactFormat::Bincode => {
                bincode::deserialize(&bytes).map_err(|e| malformed(&path, e))?
            }
        };
        tracing::debug!(stage = %stage, path = %path.display(), "index loaded");
        Ok(index)
    }

    pub fn save_stopwords(&self, list: &StopwordList) -> Result<PathBuf> {
        let path = self.stopwords_path();
        write_artifact(&path, list.to_lines().as_bytes())?;
        Ok(path)
    }

    pub fn load_stopwords(&self) -> Result<StopwordList> {
        let path = self.stopwords_path();
        let bytes = read_artifact(&path)?;
        let text = String::from_utf8(bytes).map_err(|e| malformed(&path, e))?;
        Ok(StopwordList::from_lines(&text))
    }

    pub fn save_query_batch(&self, name: &str, batch: &QueryBatch) -> Result<PathBuf> {
        let path = self.queries_path(name);
        write_artifact(&path, serde_json::to_string_pretty(batch)?.as_bytes())?;
        Ok(path)
    }

    pub fn load_query_batch(&self, name: &str) -> Result<QueryBatch> {
        let path = self.queries_path(name);
        let bytes = read_artifact(&path)?;
        serde_json::from_slice(&bytes).map_err(|e| malformed(&path, e))
    }

    pub fn save_manifest(&self, manifest: &Manifest) -> Result<()> {
        write_artifact(&self.manifest_path(), serde_json::to_string_pretty(manifest)?.as_bytes())
    }

    pub fn load_manifest(&self) -> Result<Manifest> {
        let path = self.manifest_path();
        let bytes = read_artifact(&path)?;
        serde_json::from_slice(&bytes).map_err(|e| malformed(&path, e))
    }
}

fn malformed(path: &Path, err: impl std::fmt::Display) -> IndexError {
    IndexError::parse(format!("{}: {err}", path.display()))
}

fn read_artifact(path: &Path) -> Result<Vec<u8>> {
    if !path.exists() {
        return Err(IndexError::missing(path));
    }
    Ok(fs::read(path)?)
}

/// Write through a sibling temp file so a failed write never leaves a truncated artifact.
fn write_artifact(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(dir) = path.parent() {
        create_dir_all(dir)?;
    }
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
