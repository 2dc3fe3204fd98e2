//! YAML configuration for the PaperLens pipeline.
//!
//! One file configures every stage; each section maps onto the owning
//! crate's config type and may be omitted to take its defaults.
//!
//! ## Example
//!
//! ```yaml
//! version: "1.0"
//! name: "paperlens run"
//!
//! embedding:
//!   mode: "onnx"
//!   model_name: "scibert-scivocab-uncased"
//!   model_path: "models/scibert.onnx"
//!   tokenizer_path: "models/scibert-tokenizer.json"
//!   max_sequence_length: 512
//!   dimension: 768
//!
//! rationale:
//!   mode: "onnx"
//!   model_path: "models/roberta-squad2.onnx"
//!   tokenizer_path: "models/roberta-tokenizer.json"
//!
//! index:
//!   m: 16
//!   ef_construction: 200
//!
//! classifier:
//!   top_k: 5
//!   publishable_threshold: 0.7
//!
//! eval:
//!   folds: 5
//!   seed: 42
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use classifier::{ClassifyConfig, Engine};
use embedding::EmbedConfig;
use index::IndexConfig;
use rationale::RationaleConfig;

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Evaluation section of the configuration file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalYamlConfig {
    pub folds: usize,
    pub seed: u64,
}

impl Default for EvalYamlConfig {
    fn default() -> Self {
        Self {
            folds: 5,
            seed: eval::DEFAULT_SEED,
        }
    }
}

/// Top-level configuration covering every pipeline stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct PaperlensConfig {
    /// Configuration format version.
    pub version: Option<String>,

    /// Optional configuration name/description.
    pub name: Option<String>,

    pub embedding: EmbedConfig,
    pub rationale: RationaleConfig,
    pub index: IndexConfig,
    pub classifier: ClassifyConfig,
    pub eval: EvalYamlConfig,
}

impl PaperlensConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: PaperlensConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigLoadError> {
        if let Some(version) = &self.version {
            match version.as_str() {
                "1.0" | "1" => {}
                v => return Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
            }
        }
        if self.embedding.dimension == 0 {
            return Err(ConfigLoadError::Validation(
                "embedding.dimension must be >= 1".to_string(),
            ));
        }
        self.classifier
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))?;
        if self.eval.folds < 2 {
            return Err(ConfigLoadError::Validation(
                "eval.folds must be >= 2".to_string(),
            ));
        }
        Ok(())
    }

    /// Assemble the classification engine from this configuration.
    pub fn engine(&self) -> Engine {
        Engine::new(
            self.embedding.clone(),
            self.rationale.clone(),
            self.index,
            self.classifier,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn load_valid_yaml() {
        let yaml = r#"
version: "1.0"
name: "test run"
embedding:
  mode: "stub"
  dimension: 128
classifier:
  top_k: 3
"#;
        let config = PaperlensConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.name, Some("test run".to_string()));
        assert_eq!(config.embedding.mode, "stub");
        assert_eq!(config.embedding.dimension, 128);
        assert_eq!(config.classifier.top_k, 3);
        // Omitted sections take their defaults.
        assert_eq!(config.classifier.publishable_threshold, 0.7);
        assert_eq!(config.eval.folds, 5);
        assert_eq!(config.rationale.max_sequence_length, 386);
    }

    #[test]
    fn load_from_file() {
        let yaml = "version: \"1.0\"\nembedding:\n  mode: \"stub\"\n";
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(yaml.as_bytes()).unwrap();

        let config = PaperlensConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.embedding.mode, "stub");
    }

    #[test]
    fn empty_yaml_is_all_defaults() {
        let config = PaperlensConfig::from_yaml("{}").unwrap();
        assert_eq!(config.embedding.model_name, "scibert-scivocab-uncased");
        assert_eq!(config.classifier.top_k, 5);
    }

    #[test]
    fn unsupported_version_rejected() {
        let result = PaperlensConfig::from_yaml("version: \"2.0\"\n");
        assert!(matches!(
            result,
            Err(ConfigLoadError::UnsupportedVersion(_))
        ));
    }

    #[test]
    fn invalid_threshold_rejected() {
        let yaml = "classifier:\n  publishable_threshold: 1.5\n";
        let result = PaperlensConfig::from_yaml(yaml);
        assert!(matches!(result, Err(ConfigLoadError::Validation(_))));
    }

    #[test]
    fn single_fold_rejected() {
        let yaml = "eval:\n  folds: 1\n";
        assert!(PaperlensConfig::from_yaml(yaml).is_err());
    }
}
