use once_cell::sync::OnceCell;
use onnxruntime::{environment::Environment, session::Session};
use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tokenizers::Tokenizer;

use crate::{RationaleConfig, RationaleError};

static ORT_ENV: OnceCell<Environment> = OnceCell::new();

thread_local! {
    static QA_CACHE: RefCell<Option<(PathBuf, Rc<QaModel>)>> = const { RefCell::new(None) };
}

/// Loaded QA model plus its tokenizer. One model is cached per thread,
/// keyed by model path, since runs only ever use a single QA model.
#[derive(Debug)]
pub(crate) struct QaModel {
    pub(crate) tokenizer: Tokenizer,
    pub(crate) session: RefCell<Session<'static>>,
}

impl QaModel {
    fn load(model_path: &Path, tokenizer_path: &Path) -> Result<Self, RationaleError> {
        let tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| RationaleError::Inference(e.to_string()))?;

        let env = ORT_ENV.get_or_try_init(|| {
            Environment::builder()
                .with_name("paperlens-rationale")
                .build()
                .map_err(|e| RationaleError::Inference(e.to_string()))
        })?;
        let session = env
            .new_session_builder()
            .map_err(|e| RationaleError::Inference(e.to_string()))?
            .with_model_from_file(model_path.to_path_buf())
            .map_err(|e| RationaleError::Inference(e.to_string()))?;

        Ok(Self {
            tokenizer,
            session: RefCell::new(session),
        })
    }
}

pub(crate) fn get_or_load_qa_model(cfg: &RationaleConfig) -> Result<Rc<QaModel>, RationaleError> {
    let model_path = locate(cfg.model_path.as_deref(), cfg.model_url.as_deref(), || {
        RationaleError::ModelNotFound(cfg.model_name.clone())
    })?;
    let tokenizer_path = locate(
        cfg.tokenizer_path.as_deref(),
        cfg.tokenizer_url.as_deref(),
        || RationaleError::TokenizerMissing(cfg.model_name.clone()),
    )?;

    QA_CACHE.with(|cell| {
        let mut slot = cell.borrow_mut();
        if let Some((cached_path, handle)) = slot.as_ref() {
            if *cached_path == model_path {
                return Ok(handle.clone());
            }
        }
        let handle = Rc::new(QaModel::load(&model_path, &tokenizer_path)?);
        *slot = Some((model_path, handle.clone()));
        Ok(handle)
    })
}

/// Resolves a configured asset path, downloading it when absent and a URL
/// is available.
fn locate(
    path: Option<&Path>,
    url: Option<&str>,
    missing: impl Fn() -> RationaleError,
) -> Result<PathBuf, RationaleError> {
    let path = path.ok_or_else(&missing)?.to_path_buf();
    if path.exists() {
        return Ok(path);
    }
    let url = url.ok_or_else(&missing)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    tracing::info!(url, path = %path.display(), "downloading qa model asset");
    let response = ureq::get(url)
        .call()
        .map_err(|e| RationaleError::Download(format!("{url}: {e}")))?;
    let tmp = path.with_extension("part");
    {
        let mut reader = response.into_reader();
        let mut file = fs::File::create(&tmp)?;
        io::copy(&mut reader, &mut file)
            .map_err(|e| RationaleError::Download(format!("{url}: {e}")))?;
    }
    fs::rename(&tmp, &path)?;
    Ok(path)
}

/// Missing assets degrade to the stub span extractor.
pub(crate) fn should_fallback_to_stub(err: &RationaleError) -> bool {
    matches!(
        err,
        RationaleError::ModelNotFound(_)
            | RationaleError::TokenizerMissing(_)
            | RationaleError::Download(_)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconfigured_paths_report_missing_assets() {
        let cfg = RationaleConfig::default();
        let err = get_or_load_qa_model(&cfg).unwrap_err();
        assert!(matches!(err, RationaleError::ModelNotFound(_)));
        assert!(should_fallback_to_stub(&err));
    }

    #[test]
    fn inference_errors_do_not_fall_back() {
        assert!(!should_fallback_to_stub(&RationaleError::Inference(
            "bad".into()
        )));
    }
}
