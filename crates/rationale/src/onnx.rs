use onnxruntime::ndarray::{Array, Array2};

use crate::model::QaModel;
use crate::RationaleError;

/// Answer one question against a context with the extractive QA session.
///
/// Start and end positions are taken as independent argmaxes over the two
/// logit heads. When the end lands before the start the span is empty,
/// which the caller drops via the minimum answer length.
pub(crate) fn answer_question(
    handle: &QaModel,
    question: &str,
    context: &str,
    max_sequence_length: usize,
) -> Result<String, RationaleError> {
    let encoding = handle
        .tokenizer
        .encode((question, context), true)
        .map_err(|e| RationaleError::Inference(e.to_string()))?;

    let mut ids: Vec<u32> = encoding.get_ids().to_vec();
    let mut mask: Vec<u32> = encoding.get_attention_mask().to_vec();
    if ids.len() > max_sequence_length {
        ids.truncate(max_sequence_length);
        mask.truncate(max_sequence_length);
    }
    // Pad out to the full window, matching the model's fixed input shape.
    let pad = max_sequence_length - ids.len();
    let input_ids: Vec<i64> = ids
        .iter()
        .map(|&x| x as i64)
        .chain(std::iter::repeat(0).take(pad))
        .collect();
    let attn_mask: Vec<i64> = mask
        .iter()
        .map(|&x| x as i64)
        .chain(std::iter::repeat(0).take(pad))
        .collect();

    let (start_logits, end_logits) = run_qa_session(handle, input_ids, attn_mask)?;
    let start = argmax(&start_logits);
    let end = argmax(&end_logits);
    if end < start || start >= ids.len() {
        return Ok(String::new());
    }

    let span_end = (end + 1).min(ids.len());
    handle
        .tokenizer
        .decode(&ids[start..span_end], true)
        .map_err(|e| RationaleError::Inference(e.to_string()))
}

fn run_qa_session(
    handle: &QaModel,
    input_ids: Vec<i64>,
    attn_mask: Vec<i64>,
) -> Result<(Vec<f32>, Vec<f32>), RationaleError> {
    let seq_len = input_ids.len();
    let input_ids: Array2<i64> = Array::from_shape_vec((1, seq_len), input_ids)
        .map_err(|e| RationaleError::Inference(e.to_string()))?;
    let attn_mask: Array2<i64> = Array::from_shape_vec((1, seq_len), attn_mask)
        .map_err(|e| RationaleError::Inference(e.to_string()))?;

    let mut guard = handle.session.borrow_mut();
    let session_ref = &mut *guard;
    let mut runtime_inputs = Vec::with_capacity(session_ref.inputs.len());
    let mut input_ids_tensor = Some(input_ids);
    let mut attn_mask_tensor = Some(attn_mask);

    for input in &session_ref.inputs {
        match input.name.as_str() {
            "input_ids" => {
                let tensor = input_ids_tensor.take().ok_or_else(|| {
                    RationaleError::InvalidConfig(
                        "model requested `input_ids` multiple times".into(),
                    )
                })?;
                runtime_inputs.push(tensor.into_dyn());
            }
            "attention_mask" => {
                let tensor = attn_mask_tensor.take().ok_or_else(|| {
                    RationaleError::InvalidConfig(
                        "model requested `attention_mask` multiple times".into(),
                    )
                })?;
                runtime_inputs.push(tensor.into_dyn());
            }
            "token_type_ids" => {
                let tensor = Array::from_elem((1, seq_len), 0_i64);
                runtime_inputs.push(tensor.into_dyn());
            }
            other => {
                return Err(RationaleError::Inference(format!(
                    "unsupported model input '{other}'"
                )))
            }
        }
    }

    let outputs = session_ref
        .run::<i64, f32, _>(runtime_inputs)
        .map_err(|e| RationaleError::Inference(e.to_string()))?;
    let mut iter = outputs.into_iter();
    let start_logits: Vec<f32> = iter
        .next()
        .ok_or_else(|| RationaleError::Inference("model returned no start logits".into()))?
        .iter()
        .copied()
        .collect();
    let end_logits: Vec<f32> = iter
        .next()
        .ok_or_else(|| RationaleError::Inference("model returned no end logits".into()))?
        .iter()
        .copied()
        .collect();
    Ok((start_logits, end_logits))
}

fn argmax(logits: &[f32]) -> usize {
    let mut best = 0usize;
    let mut best_val = f32::NEG_INFINITY;
    for (idx, &val) in logits.iter().enumerate() {
        if val > best_val {
            best_val = val;
            best = idx;
        }
    }
    best
}
