use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{IndexError, Result};

/// How the tokenizer treats letter case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CasePolicy {
    /// Keep tokens as written; a later case-folding stage lower-cases them.
    #[default]
    Raw,
    /// Lower-case everything except fully upper-case tokens (acronyms).
    PreserveAcronyms,
}

impl FromStr for CasePolicy {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "raw" => Ok(CasePolicy::Raw),
            "preserve-acronyms" => Ok(CasePolicy::PreserveAcronyms),
            other => Err(IndexError::parse(format!("unknown case policy `{other}`"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    pub case_policy: CasePolicy,
    pub strip_digits: bool,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self { case_policy: CasePolicy::Raw, strip_digits: true }
    }
}

/// On-disk encoding of persisted indexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArtifactFormat {
    #[default]
    Json,
    Bincode,
}

impl ArtifactFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ArtifactFormat::Json => "json",
            ArtifactFormat::Bincode => "bin",
        }
    }
}

impl FromStr for ArtifactFormat {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "json" => Ok(ArtifactFormat::Json),
            "bincode" | "bin" => Ok(ArtifactFormat::Bincode),
            other => Err(IndexError::parse(format!("unknown artifact format `{other}`"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub tokenizer: TokenizerConfig,
    /// Each threshold yields one stopword-removed index, all derived from the case-folded index.
    pub stopword_thresholds: Vec<usize>,
    /// Which stopword-removed branch the stemming stage consumes.
    pub stem_threshold: usize,
    pub format: ArtifactFormat,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            tokenizer: TokenizerConfig::default(),
            stopword_thresholds: vec![30, 150],
            stem_threshold: 150,
            format: ArtifactFormat::Json,
        }
    }
}

impl PipelineConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(IndexError::missing(path));
        }
        let buf = fs::read_to_string(path)?;
        let config: PipelineConfig = serde_json::from_str(&buf)
            .map_err(|e| IndexError::parse(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.stopword_thresholds.is_empty() {
            return Err(IndexError::parse("stopword_thresholds must not be empty"));
        }
        if self.stopword_thresholds.contains(&0) {
            return Err(IndexError::parse("stopword_thresholds must be non-zero"));
        }
        if !self.stopword_thresholds.contains(&self.stem_threshold) {
            return Err(IndexError::parse(format!(
                "stem_threshold {} is not one of stopword_thresholds {:?}",
                self.stem_threshold, self.stopword_thresholds
            )));
        }
        Ok(())
    }

    /// Largest threshold; the stopword list is derived once at this length.
    pub fn max_threshold(&self) -> usize {
        self.stopword_thresholds.iter().copied().max().unwrap_or(0)
    }

    /// Thresholds ascending, duplicates removed.
    pub fn thresholds(&self) -> Vec<usize> {
        let mut t = self.stopword_thresholds.clone();
        t.sort_unstable();
        t.dedup();
        t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_threshold(), 150);
    }

    #[test]
    fn stem_threshold_must_name_a_branch() {
        let config = PipelineConfig { stem_threshold: 40, ..Default::default() };
        assert!(matches!(config.validate(), Err(IndexError::Parse(_))));
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let raw = r#"{"format":"bincode","tokenizer":{"case_policy":"preserve-acronyms"}}"#;
        let config: PipelineConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.format, ArtifactFormat::Bincode);
        assert_eq!(config.tokenizer.case_policy, CasePolicy::PreserveAcronyms);
        assert!(config.tokenizer.strip_digits);
        assert_eq!(config.stopword_thresholds, vec![30, 150]);
    }

    #[test]
    fn parses_cli_spellings() {
        let policy: CasePolicy = "preserve-acronyms".parse().unwrap();
        assert_eq!(policy, CasePolicy::PreserveAcronyms);
        assert_eq!("bin".parse::<ArtifactFormat>().unwrap(), ArtifactFormat::Bincode);
        assert!("yaml".parse::<ArtifactFormat>().is_err());
    }
}
