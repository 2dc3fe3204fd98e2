//! JSON report writers: the submission file (`results.json`) and the
//! diagnostics file (`metrics.json`).

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::{Deserialize, Serialize};

use classifier::{ClassificationResult, ConfidenceScores, Verdict};
use eval::CrossValidation;

use crate::perf::PerformanceSummary;

/// One row of `results.json`. Confidence scores are deliberately absent;
/// they go to `metrics.json` instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub paper_id: String,
    pub publishable: u8,
    pub conference: Verdict,
    pub rationale: String,
}

impl From<&ClassificationResult> for SubmissionRecord {
    fn from(result: &ClassificationResult) -> Self {
        Self {
            paper_id: result.paper_id.clone(),
            publishable: result.publishable,
            conference: result.conference,
            rationale: result.rationale.clone(),
        }
    }
}

/// Per-paper entry of the metrics report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaperMetrics {
    pub paper_id: String,
    pub confidence_scores: ConfidenceScores,
}

impl From<&ClassificationResult> for PaperMetrics {
    fn from(result: &ClassificationResult) -> Self {
        Self {
            paper_id: result.paper_id.clone(),
            confidence_scores: result.confidence_scores.clone(),
        }
    }
}

/// The full `metrics.json` document.
#[derive(Debug, Serialize, Deserialize)]
pub struct MetricsReport {
    pub paper_metrics: Vec<PaperMetrics>,
    pub cross_validation: Option<CrossValidation>,
    pub performance: PerformanceSummary,
}

pub fn write_results(
    path: &Path,
    results: &[ClassificationResult],
) -> Result<(), std::io::Error> {
    let records: Vec<SubmissionRecord> = results.iter().map(SubmissionRecord::from).collect();
    let file = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(file, &records)?;
    Ok(())
}

pub fn write_metrics(path: &Path, report: &MetricsReport) -> Result<(), std::io::Error> {
    let file = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(file, report)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use corpus::Conference;

    fn result(id: &str) -> ClassificationResult {
        ClassificationResult {
            paper_id: id.to_string(),
            publishable: 1,
            conference: Verdict::Conference(Conference::Emnlp),
            rationale: "This paper is relevant to EMNLP because it models language".to_string(),
            confidence_scores: ConfidenceScores {
                publishability: Some(0.82),
                conference: Some(0.79),
            },
        }
    }

    #[test]
    fn submission_record_drops_confidence_scores() {
        let json = serde_json::to_value(SubmissionRecord::from(&result("P001"))).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 4);
        assert!(obj.get("confidence_scores").is_none());
        assert_eq!(obj["publishable"], 1);
        assert_eq!(obj["conference"], "EMNLP");
    }

    #[test]
    fn results_file_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        write_results(&path, &[result("P001"), result("P002")]).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let parsed: Vec<SubmissionRecord> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].paper_id, "P001");
        assert_eq!(parsed[1].conference, Verdict::Conference(Conference::Emnlp));
    }

    #[test]
    fn metrics_report_carries_confidences() {
        let report = MetricsReport {
            paper_metrics: vec![PaperMetrics::from(&result("P001"))],
            cross_validation: None,
            performance: crate::perf::PerformanceLog::default()
                .summary(crate::perf::VectorStoreStats::default()),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(
            json["paper_metrics"][0]["confidence_scores"]["publishability"],
            0.82
        );
        assert!(json["performance"]["vector_store_stats"]["indexed_documents"].is_u64());
    }
}
