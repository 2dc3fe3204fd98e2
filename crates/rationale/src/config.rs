use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the extractive QA rationale model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RationaleConfig {
    /// `"onnx"` runs the QA model, `"stub"` produces deterministic spans
    /// without model files.
    pub mode: String,
    pub model_name: String,
    pub model_path: Option<PathBuf>,
    pub model_url: Option<String>,
    pub tokenizer_path: Option<PathBuf>,
    pub tokenizer_url: Option<String>,
    /// Combined question+context token budget.
    pub max_sequence_length: usize,
}

impl Default for RationaleConfig {
    fn default() -> Self {
        Self {
            mode: "onnx".to_string(),
            model_name: "roberta-base-squad2".to_string(),
            model_path: None,
            model_url: None,
            tokenizer_path: None,
            tokenizer_url: None,
            max_sequence_length: 386,
        }
    }
}
