use corpus::{Conference, Label};
use index::Neighbor;
use tracing::warn;

use crate::types::PaperMeta;

/// Similarity evidence aggregated over a candidate's retrieved neighbors.
#[derive(Debug, Clone)]
pub struct SimilarityBreakdown {
    /// Mean similarity against publishable neighbors, 0 when there are none.
    pub avg_publishable: f64,
    /// Mean similarity per conference over publishable neighbors carrying
    /// that conference, in [`Conference::ALL`] order.
    pub conference_means: [(Conference, f64); 5],
    /// Whether the publishable mean strictly exceeded the threshold.
    pub publishable: bool,
    pub best_conference: Conference,
    pub best_score: f64,
}

/// Reduce retrieved neighbors to a verdict.
///
/// Only neighbors labeled publishable contribute evidence; non-publishable
/// neighbors occupy retrieval slots but add nothing. A score exactly at the
/// threshold is not publishable. Conference ties resolve to the earliest
/// entry of [`Conference::ALL`].
pub fn aggregate(neighbors: &[Neighbor<PaperMeta>], threshold: f64) -> SimilarityBreakdown {
    let mut publishable_scores: Vec<f64> = Vec::new();
    let mut per_conference: [(Conference, Vec<f64>); 5] =
        Conference::ALL.map(|c| (c, Vec::new()));

    for neighbor in neighbors {
        if neighbor.metadata.label != Label::Publishable {
            continue;
        }
        let score = neighbor.score as f64;
        publishable_scores.push(score);
        if let Some(conf) = neighbor.metadata.conference {
            for (c, scores) in per_conference.iter_mut() {
                if *c == conf {
                    scores.push(score);
                }
            }
        }
    }

    let avg_publishable = mean(&publishable_scores);
    let publishable = avg_publishable > threshold;

    let conference_means = per_conference.map(|(c, scores)| (c, mean(&scores)));
    // Strict > keeps the earliest conference on ties.
    let mut best_conference = Conference::Tmlr;
    let mut best_score = 0.0;
    for (conference, score) in conference_means {
        if score > best_score {
            best_conference = conference;
            best_score = score;
        }
    }

    if publishable && best_score == 0.0 {
        warn!(
            conference = best_conference.as_str(),
            "publishable verdict with no per-conference evidence, defaulting"
        );
    }

    SimilarityBreakdown {
        avg_publishable,
        conference_means,
        publishable,
        best_conference,
        best_score,
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
