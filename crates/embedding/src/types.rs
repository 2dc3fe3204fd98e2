use serde::{Deserialize, Serialize};

/// Embedding output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Embedding {
    /// Identifier of the embedded document.
    pub doc_id: String,
    /// Final embedding values (model output, stub, or zero sentinel).
    pub vector: Vec<f32>,
    /// Name of the model used to produce the vector.
    pub model_name: String,
    /// Dimension of `vector`.
    pub dim: usize,
    /// Whether [`vector`](Self::vector) was L2-normalized.
    pub normalized: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedding_serde_roundtrip() {
        let e = Embedding {
            doc_id: "doc-1".into(),
            vector: vec![0.1, 0.2, 0.3],
            model_name: "scibert".into(),
            dim: 3,
            normalized: true,
        };
        let json = serde_json::to_string(&e).unwrap();
        // Plain JSON arrays of numbers, no wrapper types.
        assert!(json.contains("[0.1,0.2,0.3]"));
        let back: Embedding = serde_json::from_str(&json).unwrap();
        assert_eq!(e, back);
    }
}
