//! Rationale generation for PaperLens.
//!
//! Given a paper's text and the conference it was matched to, poses three
//! templated questions to an extractive QA model (RoBERTa fine-tuned on
//! SQuAD2 by default) over a context built from the paper's opening and a
//! fixed description of the conference. Surviving answers are deduplicated
//! and joined into a one-sentence explanation.

mod config;
mod context;
mod error;
mod model;
mod onnx;
mod stub;

pub use config::RationaleConfig;
pub use error::RationaleError;

use corpus::Conference;

/// Answers shorter than this are considered degenerate spans and dropped.
const MIN_ANSWER_CHARS: usize = 10;
/// Positional character overlap above which two answers count as duplicates.
const DEDUP_THRESHOLD: f64 = 0.7;
/// At most this many answers are stitched into the rationale.
const MAX_JOINED_ANSWERS: usize = 2;

/// Produce a rationale for why `content` fits `conference`.
///
/// Falls back to a title-based sentence when no answer survives the length
/// filter, so the result is never empty.
pub fn generate(
    content: &str,
    conference: Conference,
    cfg: &RationaleConfig,
) -> Result<String, RationaleError> {
    validate(cfg)?;

    let sketch = context::sketch_paper(content);
    let ctx = context::build_context(&sketch, conference);
    let questions = context::questions(conference);

    let answers = collect_answers(&questions, &ctx, cfg)?;
    Ok(assemble(answers, conference, &sketch.title))
}

/// Filter, deduplicate, and stitch raw answers into the final sentence.
/// Falls back to a title-based sentence when nothing survives.
fn assemble(answers: Vec<String>, conference: Conference, title: &str) -> String {
    let kept: Vec<String> = answers
        .into_iter()
        .map(|a| a.trim().to_string())
        .filter(|a| a.chars().count() > MIN_ANSWER_CHARS)
        .collect();

    if kept.is_empty() {
        return format!(
            "This paper appears relevant to {conference} based on its focus on {title}"
        );
    }

    let mut unique: Vec<String> = Vec::new();
    for answer in kept {
        if !unique.iter().any(|kept| similar_strings(&answer, kept)) {
            unique.push(answer);
        }
    }
    unique.truncate(MAX_JOINED_ANSWERS);

    format!(
        "This paper is relevant to {conference} because {}",
        unique.join(". ")
    )
}

fn collect_answers(
    questions: &[String; 3],
    ctx: &str,
    cfg: &RationaleConfig,
) -> Result<Vec<String>, RationaleError> {
    if cfg.mode == "stub" {
        return Ok(questions
            .iter()
            .map(|q| stub::stub_answer(q, ctx))
            .collect());
    }

    let handle = match model::get_or_load_qa_model(cfg) {
        Ok(handle) => handle,
        Err(err) if model::should_fallback_to_stub(&err) => {
            tracing::warn!(error = %err, "qa model unavailable, using stub answers");
            return Ok(questions
                .iter()
                .map(|q| stub::stub_answer(q, ctx))
                .collect());
        }
        Err(err) => return Err(err),
    };

    let mut answers = Vec::with_capacity(questions.len());
    for question in questions {
        answers.push(onnx::answer_question(
            &handle,
            question,
            ctx,
            cfg.max_sequence_length,
        )?);
    }
    Ok(answers)
}

/// Position-wise character overlap test used for answer deduplication.
/// Strings shorter than the minimum answer length never match. All counts
/// are characters, not bytes, so multi-byte text scores the same ratio.
fn similar_strings(a: &str, b: &str) -> bool {
    let a_chars = a.chars().count();
    let b_chars = b.chars().count();
    if a_chars < MIN_ANSWER_CHARS || b_chars < MIN_ANSWER_CHARS {
        return false;
    }
    let a_lower = a.to_lowercase();
    let b_lower = b.to_lowercase();
    let common = a_lower
        .chars()
        .zip(b_lower.chars())
        .filter(|(x, y)| x == y)
        .count();
    common as f64 / a_chars.max(b_chars) as f64 > DEDUP_THRESHOLD
}

fn validate(cfg: &RationaleConfig) -> Result<(), RationaleError> {
    if cfg.max_sequence_length == 0 {
        return Err(RationaleError::InvalidConfig(
            "max_sequence_length must be non-zero".into(),
        ));
    }
    match cfg.mode.as_str() {
        "onnx" | "stub" => Ok(()),
        other => Err(RationaleError::InvalidConfig(format!(
            "unknown rationale mode '{other}'"
        ))),
    }
}
