//! Paper classification for PaperLens.
//!
//! Ties the pipeline together: embed the labeled reference set, index it,
//! retrieve each candidate's nearest references, aggregate similarity into
//! a publishability verdict and conference pick, and attach a QA-generated
//! rationale to publishable papers.

mod aggregate;
mod engine;
mod types;

pub use aggregate::{aggregate, SimilarityBreakdown};
pub use engine::Engine;
pub use types::{
    ClassificationResult, ClassifyConfig, ClassifyError, ConfidenceScores, PaperMeta, Verdict,
};
