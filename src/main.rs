use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use corpus::{load_dataset, Dataset, TextExtractor};
use paperlens::config::PaperlensConfig;
use paperlens::output::{write_metrics, write_results, MetricsReport, PaperMetrics};
use paperlens::perf::{track_performance, PerformanceLog, VectorStoreStats};

/// Screen research papers for publishability and recommend a conference.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Dataset root containing `Reference/` and `Papers/` directories
    dataset: PathBuf,

    /// Path to a YAML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory to write results.json and metrics.json into
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Override the number of cross-validation folds
    #[arg(long)]
    folds: Option<usize>,

    /// Skip cross-validation and only classify the candidate papers
    #[arg(long)]
    skip_cross_validation: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => PaperlensConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PaperlensConfig::default(),
    };
    if let Some(folds) = cli.folds {
        config.eval.folds = folds;
    }

    let extractor = make_extractor();
    let mut perf = PerformanceLog::default();

    let (dataset, sample) = track_performance("load_dataset", || {
        load_dataset(&cli.dataset, extractor.as_ref())
    });
    perf.record(sample);
    let Dataset {
        reference,
        candidates,
    } = dataset.with_context(|| format!("loading dataset {}", cli.dataset.display()))?;
    info!(
        reference = reference.len(),
        candidates = candidates.len(),
        "dataset loaded"
    );

    let engine = config.engine();

    let cross_validation = if cli.skip_cross_validation {
        None
    } else {
        let (cv, sample) = track_performance("cross_validate", || {
            eval::cross_validate(&engine, &reference, config.eval.folds, config.eval.seed)
        });
        perf.record(sample);
        Some(cv.context("cross-validation failed")?)
    };

    let (results, sample) = track_performance("classify_papers", || {
        engine.classify_papers(&reference, &candidates)
    });
    perf.record(sample);
    let results = results.context("classification failed")?;

    let summary = perf.summary(VectorStoreStats {
        indexed_documents: reference.len(),
        embedding_dimensions: config.embedding.dimension,
    });

    std::fs::create_dir_all(&cli.output)?;
    let results_path = cli.output.join("results.json");
    let metrics_path = cli.output.join("metrics.json");
    write_results(&results_path, &results)
        .with_context(|| format!("writing {}", results_path.display()))?;
    let report = MetricsReport {
        paper_metrics: results.iter().map(PaperMetrics::from).collect(),
        cross_validation: cross_validation.clone(),
        performance: summary.clone(),
    };
    write_metrics(&metrics_path, &report)
        .with_context(|| format!("writing {}", metrics_path.display()))?;

    info!("classification complete");
    info!(
        "total processing time: {:.2} seconds",
        summary.total_processing_time
    );
    if let Some(cv) = &cross_validation {
        info!("average cv accuracy: {:.3}", cv.average_metrics.accuracy);
        info!("average cv f1 score: {:.3}", cv.average_metrics.f1_score);
        info!(
            "average conference accuracy: {:.3}",
            cv.average_metrics.conference_accuracy
        );
    }
    info!(
        "total documents indexed: {}",
        summary.vector_store_stats.indexed_documents
    );

    Ok(())
}

#[cfg(feature = "pdf")]
fn make_extractor() -> Box<dyn TextExtractor> {
    Box::new(corpus::MupdfExtractor::new())
}

#[cfg(not(feature = "pdf"))]
fn make_extractor() -> Box<dyn TextExtractor> {
    Box::new(corpus::PlainTextExtractor)
}
