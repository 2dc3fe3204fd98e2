//! K-fold evaluation of the classification engine over the labeled
//! reference set.
//!
//! Each fold holds out part of the reference papers, classifies them
//! against an index built from the remainder, and scores the predictions
//! with standard binary metrics plus conference accuracy over the true
//! positives.

use classifier::{ClassificationResult, ClassifyError, Engine, Verdict};
use corpus::{Label, Paper};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Shuffle seed for fold assignment; fixed so runs are reproducible.
pub const DEFAULT_SEED: u64 = 42;

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("invalid evaluation setup: {0}")]
    InvalidSetup(String),

    #[error(transparent)]
    Classify(#[from] ClassifyError),
}

/// Raw confusion counts for one fold.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfusionDetail {
    pub true_positives: usize,
    pub false_positives: usize,
    pub true_negatives: usize,
    pub false_negatives: usize,
    pub total_papers: usize,
}

/// Scores for one validation fold. Ratios with an empty denominator are 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoldMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    /// Fraction of actually-publishable papers whose predicted conference
    /// matched, among those also predicted publishable.
    pub conference_accuracy: f64,
    pub metrics_detail: ConfusionDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AverageMetrics {
    pub accuracy: f64,
    pub f1_score: f64,
    pub conference_accuracy: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossValidation {
    pub fold_metrics: Vec<FoldMetrics>,
    pub average_metrics: AverageMetrics,
}

/// Assign `n` items to `k` folds: a seeded shuffle followed by contiguous
/// slices. The first `n % k` folds get one extra item.
pub fn k_fold_indices(n: usize, k: usize, seed: u64) -> Result<Vec<Vec<usize>>, EvalError> {
    if k == 0 {
        return Err(EvalError::InvalidSetup("fold count must be non-zero".into()));
    }
    if k > n {
        return Err(EvalError::InvalidSetup(format!(
            "cannot split {n} papers into {k} folds"
        )));
    }

    let mut order: Vec<usize> = (0..n).collect();
    let mut rng = fastrand::Rng::with_seed(seed);
    rng.shuffle(&mut order);

    let base = n / k;
    let extra = n % k;
    let mut folds = Vec::with_capacity(k);
    let mut start = 0;
    for fold in 0..k {
        let size = base + usize::from(fold < extra);
        folds.push(order[start..start + size].to_vec());
        start += size;
    }
    Ok(folds)
}

/// Score one fold's predictions against the held-out papers' labels.
pub fn compute_fold_metrics(
    validation: &[Paper],
    results: &[ClassificationResult],
) -> FoldMetrics {
    let mut detail = ConfusionDetail {
        total_papers: validation.len(),
        ..Default::default()
    };
    let mut conference_correct = 0usize;
    let mut total_publishable = 0usize;

    for (paper, result) in validation.iter().zip(results) {
        let actual = paper.label == Some(Label::Publishable);
        let predicted = result.is_publishable();

        match (predicted, actual) {
            (true, true) => {
                detail.true_positives += 1;
                if let (Some(conf), Verdict::Conference(got)) = (paper.conference, result.conference)
                {
                    if conf == got {
                        conference_correct += 1;
                    }
                }
            }
            (true, false) => detail.false_positives += 1,
            (false, false) => detail.true_negatives += 1,
            (false, true) => detail.false_negatives += 1,
        }
        if actual {
            total_publishable += 1;
        }
    }

    let accuracy = ratio(
        detail.true_positives + detail.true_negatives,
        validation.len(),
    );
    let precision = ratio(
        detail.true_positives,
        detail.true_positives + detail.false_positives,
    );
    let recall = ratio(
        detail.true_positives,
        detail.true_positives + detail.false_negatives,
    );
    let f1_score = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };
    let conference_accuracy = ratio(conference_correct, total_publishable);

    FoldMetrics {
        accuracy,
        precision,
        recall,
        f1_score,
        conference_accuracy,
        metrics_detail: detail,
    }
}

/// Run `k`-fold cross-validation of `engine` over the reference set.
/// Folds run strictly one after another; each builds its own index from
/// the training split.
pub fn cross_validate(
    engine: &Engine,
    reference: &[Paper],
    k: usize,
    seed: u64,
) -> Result<CrossValidation, EvalError> {
    let folds = k_fold_indices(reference.len(), k, seed)?;
    let mut fold_metrics = Vec::with_capacity(k);

    for (fold_no, val_idx) in folds.iter().enumerate() {
        let in_fold: Vec<bool> = {
            let mut flags = vec![false; reference.len()];
            for &i in val_idx {
                flags[i] = true;
            }
            flags
        };
        let train: Vec<Paper> = reference
            .iter()
            .enumerate()
            .filter(|(i, _)| !in_fold[*i])
            .map(|(_, p)| p.clone())
            .collect();
        let validation: Vec<Paper> = val_idx.iter().map(|&i| reference[i].clone()).collect();

        let results = engine.classify_papers(&train, &validation)?;
        let metrics = compute_fold_metrics(&validation, &results);
        info!(
            fold = fold_no + 1,
            accuracy = metrics.accuracy,
            f1 = metrics.f1_score,
            "fold evaluated"
        );
        fold_metrics.push(metrics);
    }

    let n = fold_metrics.len() as f64;
    let average_metrics = AverageMetrics {
        accuracy: fold_metrics.iter().map(|m| m.accuracy).sum::<f64>() / n,
        f1_score: fold_metrics.iter().map(|m| m.f1_score).sum::<f64>() / n,
        conference_accuracy: fold_metrics
            .iter()
            .map(|m| m.conference_accuracy)
            .sum::<f64>()
            / n,
    };

    Ok(CrossValidation {
        fold_metrics,
        average_metrics,
    })
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use classifier::{ClassifyConfig, ConfidenceScores};
    use corpus::Conference;
    use embedding::EmbedConfig;
    use index::IndexConfig;
    use rationale::RationaleConfig;

    #[test]
    fn fold_sizes_cover_everything_once() {
        let folds = k_fold_indices(23, 5, DEFAULT_SEED).unwrap();
        assert_eq!(folds.len(), 5);
        let sizes: Vec<usize> = folds.iter().map(|f| f.len()).collect();
        assert_eq!(sizes, vec![5, 5, 5, 4, 4]);

        let mut seen: Vec<usize> = folds.into_iter().flatten().collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..23).collect::<Vec<_>>());
    }

    #[test]
    fn folds_are_reproducible_per_seed() {
        let a = k_fold_indices(50, 5, DEFAULT_SEED).unwrap();
        let b = k_fold_indices(50, 5, DEFAULT_SEED).unwrap();
        assert_eq!(a, b);
        let c = k_fold_indices(50, 5, 7).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn zero_or_oversized_fold_counts_are_rejected() {
        assert!(k_fold_indices(10, 0, DEFAULT_SEED).is_err());
        assert!(k_fold_indices(3, 5, DEFAULT_SEED).is_err());
    }

    fn record(id: &str, publishable: u8, conference: Verdict) -> ClassificationResult {
        ClassificationResult {
            paper_id: id.to_string(),
            publishable,
            conference,
            rationale: "na".to_string(),
            confidence_scores: ConfidenceScores::default(),
        }
    }

    #[test]
    fn perfect_predictions_score_one() {
        let validation = vec![
            Paper::reference("p1", "text", Label::Publishable, Some(Conference::Kdd)),
            Paper::reference("p2", "text", Label::NonPublishable, None),
        ];
        let results = vec![
            record("p1", 1, Verdict::Conference(Conference::Kdd)),
            record("p2", 0, Verdict::NotApplicable),
        ];
        let m = compute_fold_metrics(&validation, &results);
        assert_eq!(m.accuracy, 1.0);
        assert_eq!(m.precision, 1.0);
        assert_eq!(m.recall, 1.0);
        assert_eq!(m.f1_score, 1.0);
        assert_eq!(m.conference_accuracy, 1.0);
        assert_eq!(m.metrics_detail.true_positives, 1);
        assert_eq!(m.metrics_detail.true_negatives, 1);
    }

    #[test]
    fn wrong_conference_counts_as_true_positive_but_not_conference_accurate() {
        let validation = vec![Paper::reference(
            "p1",
            "text",
            Label::Publishable,
            Some(Conference::Kdd),
        )];
        let results = vec![record("p1", 1, Verdict::Conference(Conference::Cvpr))];
        let m = compute_fold_metrics(&validation, &results);
        assert_eq!(m.accuracy, 1.0);
        assert_eq!(m.conference_accuracy, 0.0);
    }

    #[test]
    fn all_negative_predictions_zero_out_ratios() {
        let validation = vec![Paper::reference(
            "p1",
            "text",
            Label::Publishable,
            Some(Conference::Kdd),
        )];
        let results = vec![record("p1", 0, Verdict::NotApplicable)];
        let m = compute_fold_metrics(&validation, &results);
        assert_eq!(m.accuracy, 0.0);
        assert_eq!(m.precision, 0.0);
        assert_eq!(m.recall, 0.0);
        assert_eq!(m.f1_score, 0.0);
        assert_eq!(m.metrics_detail.false_negatives, 1);
    }

    fn stub_engine() -> Engine {
        Engine::new(
            EmbedConfig {
                mode: "stub".into(),
                dimension: 32,
                ..Default::default()
            },
            RationaleConfig {
                mode: "stub".into(),
                ..Default::default()
            },
            IndexConfig::default(),
            ClassifyConfig::default(),
        )
    }

    #[test]
    fn cross_validation_produces_k_folds_with_bounded_metrics() {
        let mut reference = Vec::new();
        for i in 0..40 {
            let conf = Conference::ALL[i % 5];
            reference.push(Paper::reference(
                format!("pub-{i}"),
                format!("Paper {i} about {conf} topics. More text. Even more text."),
                Label::Publishable,
                Some(conf),
            ));
        }
        for i in 0..10 {
            reference.push(Paper::reference(
                format!("non-{i}"),
                format!("Unstructured notes {i} with nothing of substance."),
                Label::NonPublishable,
                None,
            ));
        }

        let cv = cross_validate(&stub_engine(), &reference, 5, DEFAULT_SEED).unwrap();
        assert_eq!(cv.fold_metrics.len(), 5);
        let total: usize = cv
            .fold_metrics
            .iter()
            .map(|m| m.metrics_detail.total_papers)
            .sum();
        assert_eq!(total, reference.len());
        for m in &cv.fold_metrics {
            for value in [m.accuracy, m.precision, m.recall, m.f1_score, m.conference_accuracy] {
                assert!((0.0..=1.0).contains(&value));
            }
        }
        assert!((0.0..=1.0).contains(&cv.average_metrics.accuracy));
    }
}
