use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::{EmbedConfig, EmbedError};

/// Resolved on-disk locations of the ONNX model and its tokenizer file.
#[derive(Debug, Clone)]
pub(crate) struct ModelAssets {
    pub model_path: PathBuf,
    pub tokenizer_path: PathBuf,
}

/// Locates the model and tokenizer, downloading either when a URL is
/// configured and the file is not already present.
pub(crate) fn resolve_assets(cfg: &EmbedConfig) -> Result<ModelAssets, EmbedError> {
    let model_path = cfg.model_path.clone();
    if !model_path.exists() {
        match &cfg.model_url {
            Some(url) => ensure_local_file(&model_path, url)?,
            None => return Err(EmbedError::ModelNotFound(model_path.display().to_string())),
        }
    }

    let tokenizer_path = match (&cfg.tokenizer_path, &cfg.tokenizer_url) {
        (Some(path), _) => path.clone(),
        (None, Some(url)) => {
            // No explicit path: name the file after the URL, next to the model.
            let name = url
                .rsplit('/')
                .next()
                .filter(|s| !s.is_empty())
                .unwrap_or("tokenizer.json");
            model_path.parent().unwrap_or(Path::new(".")).join(name)
        }
        (None, None) => return Err(EmbedError::TokenizerMissing(cfg.model_name.clone())),
    };
    if !tokenizer_path.exists() {
        match &cfg.tokenizer_url {
            Some(url) => ensure_local_file(&tokenizer_path, url)?,
            None => {
                return Err(EmbedError::TokenizerMissing(
                    tokenizer_path.display().to_string(),
                ))
            }
        }
    }

    Ok(ModelAssets {
        model_path,
        tokenizer_path,
    })
}

/// Downloads `url` to `path`, creating parent directories. Writes to a
/// temporary sibling first so a failed transfer never leaves a truncated
/// file behind.
pub(crate) fn ensure_local_file(path: &Path, url: &str) -> Result<(), EmbedError> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    tracing::info!(url, path = %path.display(), "downloading model asset");
    let response = ureq::get(url)
        .call()
        .map_err(|e| EmbedError::Download(format!("{url}: {e}")))?;

    let tmp = path.with_extension("part");
    {
        let mut reader = response.into_reader();
        let mut file = fs::File::create(&tmp)?;
        io::copy(&mut reader, &mut file)
            .map_err(|e| EmbedError::Download(format!("{url}: {e}")))?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Missing assets degrade to the stub encoder rather than failing the run;
/// anything else is a real error.
pub(crate) fn should_fallback_to_stub(err: &EmbedError) -> bool {
    matches!(
        err,
        EmbedError::ModelNotFound(_) | EmbedError::TokenizerMissing(_) | EmbedError::Download(_)
    )
}
