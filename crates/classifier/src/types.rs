use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use corpus::{Conference, Label};
use embedding::EmbedError;
use index::IndexError;
use rationale::RationaleError;

/// Metadata stored alongside each reference vector in the index.
#[derive(Debug, Clone)]
pub struct PaperMeta {
    pub source_id: String,
    pub label: Label,
    pub conference: Option<Conference>,
}

/// Conference column of a classification record.
///
/// Serializes to the conference name for publishable papers, `"na"` for
/// papers judged non-publishable, and `"error"` for papers whose
/// processing failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Conference(Conference),
    NotApplicable,
    Error,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Conference(c) => c.as_str(),
            Verdict::NotApplicable => "na",
            Verdict::Error => "error",
        }
    }
}

impl Serialize for Verdict {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Verdict {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        match raw.as_str() {
            "na" => Ok(Verdict::NotApplicable),
            "error" => Ok(Verdict::Error),
            name => name
                .parse::<Conference>()
                .map(Verdict::Conference)
                .map_err(|_| D::Error::custom(format!("unknown verdict '{name}'"))),
        }
    }
}

/// Similarity-derived confidence values. Both fields are absent for error
/// records; only `publishability` is present for non-publishable verdicts.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ConfidenceScores {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publishability: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conference: Option<f64>,
}

/// One classified candidate paper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub paper_id: String,
    /// 1 for publishable, 0 otherwise, matching the submission format.
    pub publishable: u8,
    pub conference: Verdict,
    pub rationale: String,
    pub confidence_scores: ConfidenceScores,
}

impl ClassificationResult {
    pub fn is_publishable(&self) -> bool {
        self.publishable == 1
    }
}

/// Tunables for the classification pass.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifyConfig {
    /// Neighbors retrieved per candidate.
    pub top_k: usize,
    /// Mean publishable-neighbor similarity must strictly exceed this.
    pub publishable_threshold: f64,
}

impl Default for ClassifyConfig {
    fn default() -> Self {
        Self {
            top_k: 5,
            publishable_threshold: 0.7,
        }
    }
}

impl ClassifyConfig {
    pub fn validate(&self) -> Result<(), ClassifyError> {
        if self.top_k == 0 {
            return Err(ClassifyError::InvalidConfig("top_k must be non-zero".into()));
        }
        if !(0.0..=1.0).contains(&self.publishable_threshold) {
            return Err(ClassifyError::InvalidConfig(format!(
                "publishable_threshold {} outside [0, 1]",
                self.publishable_threshold
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("invalid classifier configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Embed(#[from] EmbedError),

    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Rationale(#[from] RationaleError),
}
