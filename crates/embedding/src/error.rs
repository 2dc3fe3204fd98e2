use std::io;
use thiserror::Error;

/// Errors surfaced by the embedder.
#[derive(Debug, Error)]
pub enum EmbedError {
    /// The ONNX model could not be located locally and no fallback URL was provided.
    #[error("model file not found: {0}")]
    ModelNotFound(String),
    /// The tokenizer JSON is missing and there was no remote URL to fetch it from.
    #[error("tokenizer missing: {0}")]
    TokenizerMissing(String),
    /// Configuration is inconsistent (e.g., zero dimension).
    #[error("invalid embedding config: {0}")]
    InvalidConfig(String),
    /// Unable to download remote assets.
    #[error("download failed: {0}")]
    Download(String),
    /// Low-level IO failures while touching the filesystem.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    /// ONNX Runtime or tokenizer errors.
    #[error("inference failure: {0}")]
    Inference(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_carry_detail() {
        let err = EmbedError::ModelNotFound("/models/x.onnx".into());
        assert!(err.to_string().contains("model file not found"));
        assert!(err.to_string().contains("/models/x.onnx"));

        let err = EmbedError::Inference("session failed".into());
        assert!(err.to_string().contains("inference failure"));
    }

    #[test]
    fn error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let err: EmbedError = io_err.into();
        assert!(err.to_string().contains("io error"));
    }
}
