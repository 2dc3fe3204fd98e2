//! PaperLens corpus handling.
//!
//! This crate owns the document model and the dataset layout. A dataset is a
//! directory tree of the form:
//!
//! ```text
//! <base>/
//!   Reference/
//!     Publishable/<Conference>/*.pdf   (ground-truth publishable, tagged)
//!     Non-Publishable/*.pdf            (ground-truth non-publishable)
//!   Papers/*.pdf                       (candidates to classify)
//! ```
//!
//! Text extraction is pluggable through [`TextExtractor`] so the rest of the
//! pipeline never touches PDF internals. A per-file extraction failure is
//! logged and yields empty content; it never aborts a dataset load.

mod extract;
#[cfg(feature = "pdf")]
mod pdf;

pub use extract::{ExtractError, PlainTextExtractor, TextExtractor};
#[cfg(feature = "pdf")]
pub use pdf::MupdfExtractor;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, warn};

/// Ground-truth publishability label carried by reference papers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Label {
    Publishable,
    NonPublishable,
}

/// The fixed set of target conferences.
///
/// The declaration order is load-bearing: score ties are broken by the first
/// entry in [`Conference::ALL`], so TMLR wins against an equal-scoring CVPR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Conference {
    Tmlr,
    Cvpr,
    Emnlp,
    Neurips,
    Kdd,
}

impl Conference {
    /// All conferences in tie-break order.
    pub const ALL: [Conference; 5] = [
        Conference::Tmlr,
        Conference::Cvpr,
        Conference::Emnlp,
        Conference::Neurips,
        Conference::Kdd,
    ];

    /// Canonical display name, matching the dataset directory names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Conference::Tmlr => "TMLR",
            Conference::Cvpr => "CVPR",
            Conference::Emnlp => "EMNLP",
            Conference::Neurips => "NeurIPS",
            Conference::Kdd => "KDD",
        }
    }
}

impl fmt::Display for Conference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Conference {
    type Err = CorpusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Conference::ALL
            .iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| CorpusError::UnknownConference(s.to_string()))
    }
}

impl Serialize for Conference {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Conference {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A loaded paper. Immutable after load.
///
/// Reference papers carry their ground-truth `label` (and `conference` when
/// publishable); candidates carry neither.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paper {
    /// Identifier derived from the source file stem (e.g. `P042`).
    pub id: String,
    /// Extracted plain text. Empty when extraction failed.
    pub content: String,
    /// Whether this paper belongs to the labeled reference set.
    pub is_reference: bool,
    pub label: Option<Label>,
    pub conference: Option<Conference>,
}

impl Paper {
    /// Build a labeled reference paper.
    pub fn reference(
        id: impl Into<String>,
        content: impl Into<String>,
        label: Label,
        conference: Option<Conference>,
    ) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            is_reference: true,
            label: Some(label),
            conference,
        }
    }

    /// Build an unlabeled candidate paper.
    pub fn candidate(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            is_reference: false,
            label: None,
            conference: None,
        }
    }
}

/// Result of a dataset load: labeled references plus unlabeled candidates.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub reference: Vec<Paper>,
    pub candidates: Vec<Paper>,
}

/// Errors raised while loading a dataset.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("dataset directory missing: {0}")]
    MissingDirectory(PathBuf),
    #[error("unknown conference name: {0}")]
    UnknownConference(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Load the full dataset tree under `base`.
///
/// Files are matched against the extractor's supported extension and visited
/// in sorted order so repeated loads see papers in the same order. A file
/// whose extraction fails is kept with empty content.
pub fn load_dataset(base: &Path, extractor: &dyn TextExtractor) -> Result<Dataset, CorpusError> {
    let reference_root = base.join("Reference");
    if !reference_root.is_dir() {
        return Err(CorpusError::MissingDirectory(reference_root));
    }

    let mut reference = Vec::new();

    let publishable_root = reference_root.join("Publishable");
    for conf in Conference::ALL {
        let conf_dir = publishable_root.join(conf.as_str());
        if !conf_dir.is_dir() {
            warn!(conference = %conf, dir = %conf_dir.display(), "conference directory missing, skipping");
            continue;
        }
        for path in sorted_files(&conf_dir, extractor.supported_extension())? {
            let content = extract_or_empty(extractor, &path);
            reference.push(Paper::reference(
                file_stem(&path),
                content,
                Label::Publishable,
                Some(conf),
            ));
        }
    }

    let non_publishable_dir = reference_root.join("Non-Publishable");
    if non_publishable_dir.is_dir() {
        for path in sorted_files(&non_publishable_dir, extractor.supported_extension())? {
            let content = extract_or_empty(extractor, &path);
            reference.push(Paper::reference(
                file_stem(&path),
                content,
                Label::NonPublishable,
                None,
            ));
        }
    }

    let mut candidates = Vec::new();
    let papers_dir = base.join("Papers");
    if papers_dir.is_dir() {
        for path in sorted_files(&papers_dir, extractor.supported_extension())? {
            let content = extract_or_empty(extractor, &path);
            candidates.push(Paper::candidate(file_stem(&path), content));
        }
    }

    debug!(
        reference = reference.len(),
        candidates = candidates.len(),
        "dataset loaded"
    );
    Ok(Dataset {
        reference,
        candidates,
    })
}

/// Extract text, trading a per-file failure for empty content.
fn extract_or_empty(extractor: &dyn TextExtractor, path: &Path) -> String {
    match extractor.extract_text(path) {
        Ok(text) => text,
        Err(err) => {
            error!(path = %path.display(), error = %err, "text extraction failed");
            String::new()
        }
    }
}

fn sorted_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, CorpusError> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case(extension))
                    .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    fn write_file(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut f = File::create(path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
    }

    fn sample_tree(base: &Path) {
        write_file(
            &base.join("Reference/Publishable/CVPR/R001.txt"),
            "A vision paper. It studies recognition. It reports results.",
        );
        write_file(
            &base.join("Reference/Publishable/KDD/R002.txt"),
            "A mining paper. It studies graphs. It reports results.",
        );
        write_file(
            &base.join("Reference/Non-Publishable/R003.txt"),
            "An unfinished draft.",
        );
        write_file(&base.join("Papers/P001.txt"), "A candidate paper.");
    }

    #[test]
    fn conference_order_and_names() {
        let names: Vec<&str> = Conference::ALL.iter().map(|c| c.as_str()).collect();
        assert_eq!(names, vec!["TMLR", "CVPR", "EMNLP", "NeurIPS", "KDD"]);
    }

    #[test]
    fn conference_parses_directory_names() {
        assert_eq!("NeurIPS".parse::<Conference>().unwrap(), Conference::Neurips);
        assert_eq!("tmlr".parse::<Conference>().unwrap(), Conference::Tmlr);
        assert!("ICML".parse::<Conference>().is_err());
    }

    #[test]
    fn conference_serializes_as_display_name() {
        let json = serde_json::to_string(&Conference::Neurips).unwrap();
        assert_eq!(json, "\"NeurIPS\"");
        let back: Conference = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Conference::Neurips);
    }

    #[test]
    fn load_dataset_walks_all_sections() {
        let dir = tempfile::tempdir().unwrap();
        sample_tree(dir.path());

        let ds = load_dataset(dir.path(), &PlainTextExtractor).unwrap();

        assert_eq!(ds.reference.len(), 3);
        assert_eq!(ds.candidates.len(), 1);

        let cvpr = ds.reference.iter().find(|p| p.id == "R001").unwrap();
        assert!(cvpr.is_reference);
        assert_eq!(cvpr.label, Some(Label::Publishable));
        assert_eq!(cvpr.conference, Some(Conference::Cvpr));

        let nonpub = ds.reference.iter().find(|p| p.id == "R003").unwrap();
        assert_eq!(nonpub.label, Some(Label::NonPublishable));
        assert_eq!(nonpub.conference, None);

        let cand = &ds.candidates[0];
        assert!(!cand.is_reference);
        assert_eq!(cand.label, None);
    }

    #[test]
    fn load_dataset_requires_reference_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_dataset(dir.path(), &PlainTextExtractor).unwrap_err();
        assert!(matches!(err, CorpusError::MissingDirectory(_)));
    }

    #[test]
    fn load_dataset_skips_missing_conference_dirs() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            &dir.path().join("Reference/Publishable/EMNLP/R010.txt"),
            "An NLP paper.",
        );

        let ds = load_dataset(dir.path(), &PlainTextExtractor).unwrap();
        assert_eq!(ds.reference.len(), 1);
        assert_eq!(ds.reference[0].conference, Some(Conference::Emnlp));
    }

    #[test]
    fn load_dataset_is_deterministically_ordered() {
        let dir = tempfile::tempdir().unwrap();
        write_file(&dir.path().join("Reference/Publishable/TMLR/B.txt"), "b");
        write_file(&dir.path().join("Reference/Publishable/TMLR/A.txt"), "a");
        write_file(&dir.path().join("Papers/Z.txt"), "z");

        let ds = load_dataset(dir.path(), &PlainTextExtractor).unwrap();
        let ids: Vec<&str> = ds.reference.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B"]);
    }

    #[test]
    fn extraction_failure_yields_empty_content() {
        struct Failing;
        impl TextExtractor for Failing {
            fn extract_text(&self, _path: &Path) -> Result<String, ExtractError> {
                Err(ExtractError::Extraction("boom".into()))
            }
            fn supported_extension(&self) -> &str {
                "txt"
            }
        }

        let dir = tempfile::tempdir().unwrap();
        sample_tree(dir.path());

        let ds = load_dataset(dir.path(), &Failing).unwrap();
        assert_eq!(ds.reference.len(), 3);
        assert!(ds.reference.iter().all(|p| p.content.is_empty()));
    }

    #[test]
    fn paper_constructors() {
        let r = Paper::reference("R1", "text", Label::Publishable, Some(Conference::Kdd));
        assert!(r.is_reference);
        assert_eq!(r.conference, Some(Conference::Kdd));

        let c = Paper::candidate("P1", "text");
        assert!(!c.is_reference);
        assert!(c.label.is_none() && c.conference.is_none());
    }
}
