use onnxruntime::ndarray::{Array, Array2};
use onnxruntime::session::Session;
use std::cell::RefCell;
use tokenizers::Tokenizer;

use crate::cache::EncoderHandle;
use crate::EmbedError;

/// Embed a batch of texts with the cached encoder session. Sequences longer
/// than `max_sequence_length` are truncated to their prefix. Token-level
/// model outputs are mean-pooled over positions with attention mask 1.
pub(crate) fn run_onnx_embeddings<T>(
    handle: &EncoderHandle,
    texts: &[T],
    max_sequence_length: usize,
) -> Result<Vec<Vec<f32>>, EmbedError>
where
    T: AsRef<str>,
{
    if texts.is_empty() {
        return Ok(Vec::new());
    }

    let (encoded, max_len) = encode_documents(&handle.tokenizer, texts, max_sequence_length)?;
    let masks: Vec<Vec<i64>> = encoded.iter().map(|d| d.mask.clone()).collect();
    let (input_ids, attn_mask) = build_padded_arrays(encoded, max_len)?;
    let raw = execute_session(&handle.session, input_ids, attn_mask)?;

    let seq_len = max_len.max(1);
    raw.into_iter()
        .zip(masks)
        .map(|(flat, mask)| pool_output(flat, &mask, seq_len))
        .collect()
}

/// Collapses one document's raw model output to a single vector. A
/// `(seq_len, hidden)` block gets masked mean pooling; anything else is
/// assumed to already be a pooled sentence vector and passes through.
fn pool_output(flat: Vec<f32>, mask: &[i64], seq_len: usize) -> Result<Vec<f32>, EmbedError> {
    if flat.is_empty() {
        return Ok(flat);
    }
    if flat.len() % seq_len != 0 || flat.len() == seq_len {
        // Pooled output (hidden,) or logits of unexpected shape. When
        // seq_len happens to divide hidden, a pooled vector is pooled a
        // second time below and comes out with the wrong width; the
        // dimension check in embed_batch then rejects it as an error.
        return Ok(flat);
    }

    let hidden = flat.len() / seq_len;
    let mut pooled = vec![0f32; hidden];
    let mut count = 0usize;
    for (pos, token) in flat.chunks(hidden).enumerate() {
        let attended = mask.get(pos).copied().unwrap_or(0) == 1;
        if !attended {
            continue;
        }
        for (acc, &val) in pooled.iter_mut().zip(token) {
            *acc += val;
        }
        count += 1;
    }
    if count == 0 {
        return Err(EmbedError::Inference(
            "attention mask covered no tokens".into(),
        ));
    }
    let n = count as f32;
    for val in &mut pooled {
        *val /= n;
    }
    Ok(pooled)
}

struct EncodedDoc {
    ids: Vec<i64>,
    mask: Vec<i64>,
}

fn encode_documents<T>(
    tokenizer: &Tokenizer,
    texts: &[T],
    max_sequence_length: usize,
) -> Result<(Vec<EncodedDoc>, usize), EmbedError>
where
    T: AsRef<str>,
{
    let mut encoded = Vec::with_capacity(texts.len());
    let mut max_len = 0usize;

    for text in texts {
        let encoding = tokenizer
            .encode(text.as_ref(), true)
            .map_err(|e| EmbedError::Inference(e.to_string()))?;
        let mut ids: Vec<i64> = encoding.get_ids().iter().map(|&x| x as i64).collect();
        let mut mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&x| x as i64)
            .collect();
        if ids.len() > max_sequence_length {
            ids.truncate(max_sequence_length);
            mask.truncate(max_sequence_length);
        }
        max_len = max_len.max(ids.len());
        encoded.push(EncodedDoc { ids, mask });
    }

    Ok((encoded, max_len))
}

fn build_padded_arrays(
    encoded: Vec<EncodedDoc>,
    max_len: usize,
) -> Result<(Array2<i64>, Array2<i64>), EmbedError> {
    let seq_len = max_len.max(1);
    let batch = encoded.len();
    let mut id_storage = Vec::with_capacity(batch * seq_len);
    let mut mask_storage = Vec::with_capacity(batch * seq_len);

    for EncodedDoc { ids, mask } in encoded {
        if ids.len() != mask.len() {
            return Err(EmbedError::Inference(
                "tokenizer produced mismatched id/mask lengths".into(),
            ));
        }
        let pad = seq_len.saturating_sub(ids.len());
        id_storage.extend(ids);
        mask_storage.extend(mask);
        if pad > 0 {
            id_storage.extend(std::iter::repeat(0).take(pad));
            mask_storage.extend(std::iter::repeat(0).take(pad));
        }
    }

    let input_ids = Array::from_shape_vec((batch, seq_len), id_storage)
        .map_err(|e| EmbedError::Inference(e.to_string()))?;
    let attn_mask = Array::from_shape_vec((batch, seq_len), mask_storage)
        .map_err(|e| EmbedError::Inference(e.to_string()))?;
    Ok((input_ids, attn_mask))
}

/// Feeds the padded batch through the session and splits the first output
/// tensor back into one flat block per document.
fn execute_session(
    session: &RefCell<Session<'static>>,
    input_ids: Array2<i64>,
    attn_mask: Array2<i64>,
) -> Result<Vec<Vec<f32>>, EmbedError> {
    let (batch, seq_len) = input_ids.dim();
    let mut guard = session.borrow_mut();
    let session_ref = &mut *guard;
    let mut runtime_inputs = Vec::with_capacity(session_ref.inputs.len());
    let mut input_ids_tensor = Some(input_ids);
    let mut attn_mask_tensor = Some(attn_mask);

    for input in &session_ref.inputs {
        match input.name.as_str() {
            "input_ids" => {
                let tensor = input_ids_tensor.take().ok_or_else(|| {
                    EmbedError::InvalidConfig("model requested `input_ids` multiple times".into())
                })?;
                runtime_inputs.push(tensor.into_dyn());
            }
            "attention_mask" => {
                let tensor = attn_mask_tensor.take().ok_or_else(|| {
                    EmbedError::InvalidConfig(
                        "model requested `attention_mask` multiple times".into(),
                    )
                })?;
                runtime_inputs.push(tensor.into_dyn());
            }
            "token_type_ids" => {
                let tensor = Array::from_elem((batch, seq_len), 0_i64);
                runtime_inputs.push(tensor.into_dyn());
            }
            other => {
                return Err(EmbedError::Inference(format!(
                    "unsupported model input '{other}'"
                )))
            }
        }
    }

    if runtime_inputs.is_empty() {
        return Err(EmbedError::Inference(
            "model did not declare any inputs".into(),
        ));
    }

    let outputs = session_ref
        .run::<i64, f32, _>(runtime_inputs)
        .map_err(|e| EmbedError::Inference(e.to_string()))?;
    let output_tensor = outputs
        .into_iter()
        .next()
        .ok_or_else(|| EmbedError::Inference("model returned no outputs".into()))?;

    let flat: Vec<f32> = output_tensor.iter().copied().collect();
    if batch == 0 {
        return Ok(Vec::new());
    }
    if flat.is_empty() {
        return Ok(vec![Vec::new(); batch]);
    }
    if flat.len() % batch != 0 {
        return Err(EmbedError::Inference(format!(
            "model output shape {}/{} is not divisible",
            flat.len(),
            batch
        )));
    }

    let chunk = flat.len() / batch;
    Ok(flat.chunks(chunk).map(|slice| slice.to_vec()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_output_masked_mean() {
        // seq_len 3, hidden 2, last position padded out
        let flat = vec![1.0, 2.0, 3.0, 4.0, 100.0, 100.0];
        let mask = vec![1, 1, 0];
        let pooled = pool_output(flat, &mask, 3).unwrap();
        assert_eq!(pooled, vec![2.0, 3.0]);
    }

    #[test]
    fn pool_output_passes_through_pooled_vectors() {
        // length equal to seq_len: treated as already pooled
        let flat = vec![0.5, 0.6, 0.7];
        let pooled = pool_output(flat.clone(), &[1, 1, 1], 3).unwrap();
        assert_eq!(pooled, flat);
    }

    #[test]
    fn pool_output_rejects_all_masked() {
        let flat = vec![1.0; 6];
        let err = pool_output(flat, &[0, 0, 0], 3).unwrap_err();
        assert!(matches!(err, EmbedError::Inference(_)));
    }
}
