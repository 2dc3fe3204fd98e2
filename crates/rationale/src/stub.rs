use fxhash::hash64;

/// Deterministic stand-in for the QA model: picks a span of the context
/// seeded by the question hash, so the same question over the same context
/// always yields the same answer.
pub(crate) fn stub_answer(question: &str, context: &str) -> String {
    let words: Vec<&str> = context.split_whitespace().collect();
    if words.is_empty() {
        return String::new();
    }

    let h = hash64(question.as_bytes());
    let span_len = 6 + (h % 7) as usize;
    let max_start = words.len().saturating_sub(span_len);
    let start = if max_start == 0 {
        0
    } else {
        ((h >> 8) as usize) % max_start
    };
    let end = (start + span_len).min(words.len());
    words[start..end].join(" ")
}
