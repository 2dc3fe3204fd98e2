use fxhash::hash64;

use crate::normalize::l2_normalize_in_place;
use crate::{EmbedConfig, Embedding};

/// Deterministic stub used when `mode` is `"stub"` or the model assets are
/// unavailable. Generates sinusoid values derived from a hash of the input
/// text so repeated calls agree without any model files.
pub(crate) fn make_stub_embedding(doc_id: &str, text: &str, cfg: &EmbedConfig) -> Embedding {
    let dim = cfg.dimension;
    let mut v = vec![0f32; dim];
    if !text.trim().is_empty() {
        let h = hash64(text.as_bytes());
        for (idx, value) in v.iter_mut().enumerate() {
            *value = (((h >> (idx % 32)) as f32) * 0.0001 + idx as f32 * 0.01).sin();
        }
        if cfg.normalize {
            l2_normalize_in_place(&mut v);
        }
    }
    // Empty text stays the all-zero sentinel even when normalize is set.
    Embedding {
        doc_id: doc_id.to_string(),
        vector: v,
        model_name: cfg.model_name.clone(),
        dim,
        normalized: cfg.normalize,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(dim: usize) -> EmbedConfig {
        EmbedConfig {
            mode: "stub".into(),
            dimension: dim,
            ..Default::default()
        }
    }

    #[test]
    fn stub_is_deterministic_per_text() {
        let c = cfg(64);
        let e1 = make_stub_embedding("a", "same text", &c);
        let e2 = make_stub_embedding("b", "same text", &c);
        assert_eq!(e1.vector, e2.vector);
    }

    #[test]
    fn stub_differs_across_texts() {
        let c = cfg(64);
        let e1 = make_stub_embedding("a", "first text", &c);
        let e2 = make_stub_embedding("a", "second text", &c);
        assert_ne!(e1.vector, e2.vector);
    }

    #[test]
    fn stub_uses_configured_dimension() {
        for dim in [16, 384, 768] {
            let e = make_stub_embedding("d", "text", &cfg(dim));
            assert_eq!(e.vector.len(), dim);
            assert_eq!(e.dim, dim);
        }
    }

    #[test]
    fn stub_empty_text_is_zero_sentinel() {
        let e = make_stub_embedding("d", "   ", &cfg(32));
        assert!(e.vector.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn stub_normalizes_when_asked() {
        let mut c = cfg(128);
        c.normalize = true;
        let e = make_stub_embedding("d", "some text", &c);
        let norm: f32 = e.vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }
}
