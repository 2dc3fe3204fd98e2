//! PaperLens: screens research papers for publishability and recommends a
//! target conference.
//!
//! The pipeline embeds a labeled reference corpus with a scientific-text
//! encoder, indexes the vectors for nearest-neighbor retrieval, scores
//! each candidate paper by the similarity of its closest publishable
//! references, picks the best-matching conference, and generates an
//! extractive-QA rationale for the pick. A k-fold evaluation harness
//! scores the whole pipeline over the reference set.
//!
//! The per-stage crates are re-exported here; this crate adds the YAML
//! configuration layer, performance accounting, the JSON report writers,
//! and the `paperlens` binary.

pub mod config;
pub mod output;
pub mod perf;

pub use classifier;
pub use corpus;
pub use embedding;
pub use eval;
pub use index;
pub use rationale;

pub use config::{ConfigLoadError, PaperlensConfig};
