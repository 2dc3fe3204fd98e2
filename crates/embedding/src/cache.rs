use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

use once_cell::sync::OnceCell;
use onnxruntime::{environment::Environment, session::Session};
use tokenizers::Tokenizer;

use crate::assets::ModelAssets;
use crate::EmbedError;

// One ONNX environment per process; sessions are not Send, so each worker
// thread keeps its own loaded encoders keyed by (model, tokenizer) paths.
static ORT_ENV: OnceCell<Environment> = OnceCell::new();

thread_local! {
    static ENCODERS: RefCell<HashMap<(PathBuf, PathBuf), Rc<EncoderHandle>>> =
        RefCell::new(HashMap::new());
}

/// A loaded encoder: tokenizer plus its ONNX session.
pub(crate) struct EncoderHandle {
    pub(crate) tokenizer: Tokenizer,
    pub(crate) session: RefCell<Session<'static>>,
}

pub(crate) fn get_or_load_model_handle(
    assets: &ModelAssets,
) -> Result<Rc<EncoderHandle>, EmbedError> {
    let key = (assets.model_path.clone(), assets.tokenizer_path.clone());
    ENCODERS.with(|cell| {
        if let Some(handle) = cell.borrow().get(&key) {
            return Ok(handle.clone());
        }
        let handle = Rc::new(load_encoder(assets)?);
        cell.borrow_mut().insert(key, handle.clone());
        Ok(handle)
    })
}

fn load_encoder(assets: &ModelAssets) -> Result<EncoderHandle, EmbedError> {
    let tokenizer = Tokenizer::from_file(&assets.tokenizer_path)
        .map_err(|e| EmbedError::Inference(e.to_string()))?;

    let env = ORT_ENV.get_or_try_init(|| {
        Environment::builder()
            .with_name("paperlens-embedding")
            .build()
            .map_err(|e| EmbedError::Inference(e.to_string()))
    })?;
    let session = env
        .new_session_builder()
        .map_err(|e| EmbedError::Inference(e.to_string()))?
        .with_model_from_file(assets.model_path.clone())
        .map_err(|e| EmbedError::Inference(e.to_string()))?;

    Ok(EncoderHandle {
        tokenizer,
        session: RefCell::new(session),
    })
}
