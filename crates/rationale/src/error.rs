use thiserror::Error;

#[derive(Debug, Error)]
pub enum RationaleError {
    #[error("qa model not found: {0}")]
    ModelNotFound(String),

    #[error("qa tokenizer not found: {0}")]
    TokenizerMissing(String),

    #[error("invalid rationale configuration: {0}")]
    InvalidConfig(String),

    #[error("asset download failed: {0}")]
    Download(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("qa inference failed: {0}")]
    Inference(String),
}
