//! Document embedding for PaperLens.
//!
//! Encodes paper text into fixed-dimension dense vectors with an ONNX
//! transformer encoder (SciBERT by default) and attention-masked mean
//! pooling. When the model assets are unavailable, or when `mode` is set
//! to `"stub"`, a deterministic hash-based encoder stands in so the rest
//! of the pipeline stays testable offline.

mod assets;
mod cache;
mod config;
mod error;
mod normalize;
mod onnx;
mod stub;
mod types;

pub use config::EmbedConfig;
pub use error::EmbedError;
pub use types::Embedding;

use crate::normalize::l2_normalize_in_place;
use crate::stub::make_stub_embedding;

/// Embed a single document. Empty or whitespace-only text yields the
/// all-zero vector of the configured dimension.
pub fn embed(doc_id: &str, text: &str, cfg: &EmbedConfig) -> Result<Embedding, EmbedError> {
    let mut out = embed_batch(&[(doc_id, text)], cfg)?;
    out.pop()
        .ok_or_else(|| EmbedError::Inference("batch of one produced no embedding".into()))
}

/// Embed a batch of `(doc_id, text)` pairs in input order. All returned
/// vectors share `cfg.dimension` regardless of mode or input length.
pub fn embed_batch<D, T>(docs: &[(D, T)], cfg: &EmbedConfig) -> Result<Vec<Embedding>, EmbedError>
where
    D: AsRef<str>,
    T: AsRef<str>,
{
    validate(cfg)?;
    if docs.is_empty() {
        return Ok(Vec::new());
    }

    if cfg.mode == "stub" {
        return Ok(docs
            .iter()
            .map(|(id, text)| make_stub_embedding(id.as_ref(), text.as_ref(), cfg))
            .collect());
    }

    let handle = match assets::resolve_assets(cfg).and_then(|a| cache::get_or_load_model_handle(&a))
    {
        Ok(handle) => handle,
        Err(err) if assets::should_fallback_to_stub(&err) => {
            tracing::warn!(error = %err, "model assets unavailable, using stub embeddings");
            return Ok(docs
                .iter()
                .map(|(id, text)| make_stub_embedding(id.as_ref(), text.as_ref(), cfg))
                .collect());
        }
        Err(err) => return Err(err),
    };

    // Zero-vector sentinels for blank documents are produced locally; only
    // real text goes through the session.
    let mut results: Vec<Option<Embedding>> = Vec::with_capacity(docs.len());
    let mut pending: Vec<(usize, &str)> = Vec::new();
    for (slot, (id, text)) in docs.iter().enumerate() {
        if text.as_ref().trim().is_empty() {
            results.push(Some(Embedding {
                doc_id: id.as_ref().to_string(),
                vector: vec![0f32; cfg.dimension],
                model_name: cfg.model_name.clone(),
                dim: cfg.dimension,
                normalized: cfg.normalize,
            }));
        } else {
            results.push(None);
            pending.push((slot, text.as_ref()));
        }
    }

    if !pending.is_empty() {
        let texts: Vec<&str> = pending.iter().map(|(_, t)| *t).collect();
        let vectors = onnx::run_onnx_embeddings(&handle, &texts, cfg.max_sequence_length)?;
        if vectors.len() != pending.len() {
            return Err(EmbedError::Inference(format!(
                "model returned {} vectors for {} documents",
                vectors.len(),
                pending.len()
            )));
        }
        for ((slot, _), mut vector) in pending.into_iter().zip(vectors) {
            if vector.len() != cfg.dimension {
                return Err(EmbedError::Inference(format!(
                    "model produced dimension {}, expected {}",
                    vector.len(),
                    cfg.dimension
                )));
            }
            if cfg.normalize {
                l2_normalize_in_place(&mut vector);
            }
            results[slot] = Some(Embedding {
                doc_id: docs[slot].0.as_ref().to_string(),
                vector,
                model_name: cfg.model_name.clone(),
                dim: cfg.dimension,
                normalized: cfg.normalize,
            });
        }
    }

    results
        .into_iter()
        .map(|r| r.ok_or_else(|| EmbedError::Inference("missing embedding slot".into())))
        .collect()
}

fn validate(cfg: &EmbedConfig) -> Result<(), EmbedError> {
    if cfg.dimension == 0 {
        return Err(EmbedError::InvalidConfig("dimension must be non-zero".into()));
    }
    if cfg.max_sequence_length == 0 {
        return Err(EmbedError::InvalidConfig(
            "max_sequence_length must be non-zero".into(),
        ));
    }
    match cfg.mode.as_str() {
        "onnx" | "stub" => Ok(()),
        other => Err(EmbedError::InvalidConfig(format!(
            "unknown embedding mode '{other}'"
        ))),
    }
}
