use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Runtime configuration for the document embedder.
///
/// # Example
/// ```no_run
/// use embedding::{embed, EmbedConfig};
///
/// let cfg = EmbedConfig {
///     model_path: "./models/scibert/model.onnx".into(),
///     tokenizer_path: Some("./models/scibert/tokenizer.json".into()),
///     ..Default::default()
/// };
///
/// let _ = embed("doc-1", "Attention is all you need.", &cfg);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmbedConfig {
    /// Inference mode selector: `"onnx"` (local model) or `"stub"`
    /// (deterministic hash-seeded vectors, no assets required).
    pub mode: String,
    /// Friendly label surfaced on every [`Embedding`](crate::Embedding).
    pub model_name: String,
    /// Local path to the ONNX encoder (also the download target when
    /// [`model_url`](Self::model_url) is set).
    pub model_path: PathBuf,
    /// Optional HTTPS URL fetched when the model file is missing.
    pub model_url: Option<String>,
    /// Path to `tokenizer.json`. When absent and
    /// [`tokenizer_url`](Self::tokenizer_url) is set, the filename is
    /// inferred from the URL and placed next to the model file.
    pub tokenizer_path: Option<PathBuf>,
    /// Optional HTTPS URL for the tokenizer.
    pub tokenizer_url: Option<String>,
    /// Token budget per document; longer inputs keep their prefix.
    pub max_sequence_length: usize,
    /// Output dimensionality. Must match the encoder's hidden size in ONNX
    /// mode; also the width of stub and sentinel vectors.
    pub dimension: usize,
    /// L2-normalize output vectors (recommended for cosine similarity).
    pub normalize: bool,
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            mode: "onnx".into(),
            model_name: "scibert-scivocab-uncased".into(),
            model_path: PathBuf::from("./models/scibert/model.onnx"),
            model_url: None,
            tokenizer_path: Some(PathBuf::from("./models/scibert/tokenizer.json")),
            tokenizer_url: None,
            max_sequence_length: 512,
            dimension: 768,
            normalize: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_values() {
        let cfg = EmbedConfig::default();
        assert_eq!(cfg.mode, "onnx");
        assert_eq!(cfg.model_name, "scibert-scivocab-uncased");
        assert_eq!(cfg.max_sequence_length, 512);
        assert_eq!(cfg.dimension, 768);
        assert!(cfg.normalize);
        assert!(cfg.model_url.is_none());
    }

    #[test]
    fn config_serde_roundtrip() {
        let cfg = EmbedConfig {
            mode: "stub".into(),
            dimension: 384,
            normalize: false,
            ..Default::default()
        };
        let json = serde_json::to_string(&cfg).unwrap();
        let back: EmbedConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg, back);
    }

    #[test]
    fn config_partial_yaml_style_fills_defaults() {
        let cfg: EmbedConfig = serde_json::from_str(r#"{"mode": "stub"}"#).unwrap();
        assert_eq!(cfg.mode, "stub");
        assert_eq!(cfg.max_sequence_length, 512);
    }
}
