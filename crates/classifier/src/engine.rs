use corpus::Paper;
use embedding::{embed, embed_batch, EmbedConfig};
use index::{IndexConfig, IndexEntry, VectorIndex};
use rationale::RationaleConfig;
use tracing::{debug, error, info};

use crate::aggregate::aggregate;
use crate::types::{
    ClassificationResult, ClassifyConfig, ClassifyError, ConfidenceScores, PaperMeta, Verdict,
};

/// The end-to-end classification engine.
///
/// Owns the configuration for every stage; the reference set is passed per
/// call so evaluation folds can swap it without rebuilding the engine.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    pub embed: EmbedConfig,
    pub rationale: RationaleConfig,
    pub index: IndexConfig,
    pub classify: ClassifyConfig,
}

impl Engine {
    pub fn new(
        embed: EmbedConfig,
        rationale: RationaleConfig,
        index: IndexConfig,
        classify: ClassifyConfig,
    ) -> Self {
        Self {
            embed,
            rationale,
            index,
            classify,
        }
    }

    /// Classify `candidates` against the labeled `reference` set.
    ///
    /// Always returns exactly one record per candidate, in input order.
    /// Failures confined to one paper become an `error` record carrying
    /// the failure message as its rationale; failures while preparing the
    /// reference index abort the whole call.
    pub fn classify_papers(
        &self,
        reference: &[Paper],
        candidates: &[Paper],
    ) -> Result<Vec<ClassificationResult>, ClassifyError> {
        self.classify.validate()?;

        let index = self.build_reference_index(reference)?;
        info!(
            reference = index.len(),
            candidates = candidates.len(),
            "classifying papers"
        );

        let mut results = Vec::with_capacity(candidates.len());
        for paper in candidates {
            match self.classify_one(&index, paper) {
                Ok(result) => results.push(result),
                Err(err) => {
                    error!(paper = %paper.id, error = %err, "classification failed");
                    results.push(ClassificationResult {
                        paper_id: paper.id.clone(),
                        publishable: 0,
                        conference: Verdict::Error,
                        rationale: err.to_string(),
                        confidence_scores: ConfidenceScores::default(),
                    });
                }
            }
        }
        Ok(results)
    }

    fn build_reference_index(
        &self,
        reference: &[Paper],
    ) -> Result<VectorIndex<PaperMeta>, ClassifyError> {
        let docs: Vec<(&str, &str)> = reference
            .iter()
            .map(|p| (p.id.as_str(), p.content.as_str()))
            .collect();
        let embeddings = embed_batch(&docs, &self.embed)?;

        let mut entries = Vec::with_capacity(reference.len());
        for (paper, embedding) in reference.iter().zip(embeddings) {
            let Some(label) = paper.label else {
                debug!(paper = %paper.id, "skipping unlabeled reference paper");
                continue;
            };
            entries.push(IndexEntry {
                vector: embedding.vector,
                metadata: PaperMeta {
                    source_id: paper.id.clone(),
                    label,
                    conference: paper.conference,
                },
            });
        }

        let mut index = VectorIndex::new(self.embed.dimension, self.index);
        index.upsert_batch(entries)?;
        index.build();
        Ok(index)
    }

    fn classify_one(
        &self,
        index: &VectorIndex<PaperMeta>,
        paper: &Paper,
    ) -> Result<ClassificationResult, ClassifyError> {
        let embedding = embed(&paper.id, &paper.content, &self.embed)?;
        let neighbors = index.query(&embedding.vector, self.classify.top_k)?;
        let breakdown = aggregate(&neighbors, self.classify.publishable_threshold);

        if breakdown.publishable {
            let rationale =
                rationale::generate(&paper.content, breakdown.best_conference, &self.rationale)?;
            Ok(ClassificationResult {
                paper_id: paper.id.clone(),
                publishable: 1,
                conference: Verdict::Conference(breakdown.best_conference),
                rationale,
                confidence_scores: ConfidenceScores {
                    publishability: Some(breakdown.avg_publishable),
                    conference: Some(breakdown.best_score),
                },
            })
        } else {
            Ok(ClassificationResult {
                paper_id: paper.id.clone(),
                publishable: 0,
                conference: Verdict::NotApplicable,
                rationale: "na".to_string(),
                confidence_scores: ConfidenceScores {
                    publishability: Some(breakdown.avg_publishable),
                    conference: None,
                },
            })
        }
    }
}
