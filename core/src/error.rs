use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, IndexError>;

#[derive(Debug, Error)]
pub enum IndexError {
    /// A persisted index, stopword list or manifest is not where the store expects it.
    #[error("required artifact not found: {}", path.display())]
    MissingArtifact { path: PathBuf },

    /// Unusable document identifier, malformed artifact or bad configuration value.
    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid query: {0}")]
    InvalidQuery(#[from] QueryRejection),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("bincode error: {0}")]
    Bincode(#[from] bincode::Error),
}

impl IndexError {
    pub fn parse<S: Into<String>>(msg: S) -> Self {
        IndexError::Parse(msg.into())
    }

    pub fn missing<P: Into<PathBuf>>(path: P) -> Self {
        IndexError::MissingArtifact { path: path.into() }
    }

    /// User-input rejections are recoverable; everything else aborts the operation.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, IndexError::InvalidQuery(_))
    }
}

/// Why a user-typed query was refused before reaching the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueryRejection {
    #[error("the query is empty")]
    Empty,
    #[error("the query must be non-numeric, numbers are not kept in the index")]
    Numeric,
    #[error("only single-term queries are allowed")]
    MultiToken,
    #[error("no special characters allowed")]
    SpecialCharacters,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_query_rejections_are_recoverable() {
        assert!(IndexError::from(QueryRejection::Numeric).is_recoverable());
        assert!(!IndexError::missing("out/1_naive_index.json").is_recoverable());
        assert!(!IndexError::parse("bad id").is_recoverable());
    }

    #[test]
    fn missing_artifact_names_the_path() {
        let err = IndexError::missing("out/stopwords.txt");
        assert!(err.to_string().contains("out/stopwords.txt"));
    }
}
