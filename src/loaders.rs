use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use candle_core::{DType, Device};
use candle_nn::VarBuilder;
use serde::Deserialize;
use tokenizers::{Tokenizer, TruncationParams};

use crate::error::{PipelineError, Result};
use crate::pipelines::cache::ModelOptions;

/// Longest input (in tokens) passed to the encoders.
pub const MAX_SEQUENCE_LENGTH: usize = 512;

/// Where a model's files live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    /// A directory on disk holding `config.json`, weights, and optionally `tokenizer.json`.
    Local(PathBuf),
    /// A Hugging Face hub repository id, e.g. `answerdotai/ModernBERT-base`.
    Hub(String),
}

impl ModelSource {
    /// A model directory on disk.
    pub fn local(path: impl Into<PathBuf>) -> Self {
        ModelSource::Local(path.into())
    }

    /// A Hugging Face hub repository.
    pub fn hub(repo: impl Into<String>) -> Self {
        ModelSource::Hub(repo.into())
    }

    /// Resolves `filename` to a path, downloading it for hub sources.
    pub fn file(&self, filename: &str) -> Result<PathBuf> {
        match self {
            ModelSource::Local(dir) => {
                let path = dir.join(filename);
                if path.is_file() {
                    Ok(path)
                } else {
                    Err(PipelineError::ModelLoad(format!(
                        "'{}' not found in '{}'",
                        filename,
                        dir.display()
                    )))
                }
            }
            ModelSource::Hub(repo) => HfLoader::new(repo, filename).load(),
        }
    }

    /// Weights file, preferring safetensors over a PyTorch checkpoint.
    pub fn weights(&self) -> Result<PathBuf> {
        self.file("model.safetensors")
            .or_else(|_| self.file("pytorch_model.bin"))
    }

    /// Raw `config.json` contents.
    pub fn config_json(&self) -> Result<String> {
        let path = self.file("config.json")?;
        std::fs::read_to_string(&path).map_err(|e| {
            PipelineError::ModelLoad(format!("Failed to read '{}': {}", path.display(), e))
        })
    }
}

impl fmt::Display for ModelSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelSource::Local(dir) => write!(f, "{}", dir.display()),
            ModelSource::Hub(repo) => write!(f, "{repo}"),
        }
    }
}

impl ModelOptions for ModelSource {
    fn cache_key(&self) -> String {
        match self {
            ModelSource::Local(dir) => format!("local:{}", dir.display()),
            ModelSource::Hub(repo) => format!("hub:{repo}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HfLoader {
    pub repo: String,
    pub filename: String,
}

impl HfLoader {
    pub fn new(repo: &str, filename: &str) -> Self {
        Self {
            repo: repo.into(),
            filename: filename.into(),
        }
    }

    pub fn load(&self) -> Result<PathBuf> {
        let hf_api = hf_hub::api::sync::ApiBuilder::new()
            .with_progress(false)
            .build()
            .map_err(|e| {
                PipelineError::Download(format!("Failed to initialize HuggingFace API: {e}"))
            })?;
        let hf_api = hf_api.model(self.repo.clone());

        let max_retries = 3;
        let mut attempts = 0u32;

        for attempt in 0..max_retries {
            match hf_api.get(self.filename.as_str()) {
                Ok(path) => return Ok(path),
                Err(e) => {
                    let error_msg = e.to_string();
                    attempts = attempt + 1;
                    if error_msg.contains("Lock acquisition failed") && attempt < max_retries - 1 {
                        let wait_time = Duration::from_millis(100 * (1 << attempt));
                        std::thread::sleep(wait_time);
                        continue;
                    }
                    return Err(PipelineError::Download(format!(
                        "Failed to download '{}' from '{}': {}",
                        self.filename, self.repo, error_msg
                    )));
                }
            }
        }

        Err(PipelineError::Download(format!(
            "Download timed out for '{}' from '{}' after {} attempt(s)",
            self.filename, self.repo, attempts
        )))
    }
}

#[derive(Clone)]
pub struct TokenizerLoader {
    pub source: ModelSource,
    pub fallback: Option<ModelSource>,
}

impl TokenizerLoader {
    pub fn new(source: ModelSource, fallback: Option<ModelSource>) -> Self {
        Self { source, fallback }
    }

    /// Loads `tokenizer.json` from the source, or from the fallback when the source has none.
    pub fn load(&self) -> Result<Tokenizer> {
        let tokenizer_file_path = match (self.source.file("tokenizer.json"), &self.fallback) {
            (Ok(path), _) => path,
            (Err(e), Some(fallback)) => {
                tracing::debug!(
                    source = %self.source,
                    fallback = %fallback,
                    error = %e,
                    "no tokenizer.json in model source, using fallback"
                );
                fallback.file("tokenizer.json")?
            }
            (Err(e), None) => return Err(e),
        };

        load_tokenizer_file(&tokenizer_file_path)
    }
}

fn load_tokenizer_file(path: &Path) -> Result<Tokenizer> {
    let path_str = path.display().to_string();
    let mut tokenizer = Tokenizer::from_file(path).map_err(|e| {
        PipelineError::Tokenization(format!(
            "Failed to load tokenizer from '{}': {}",
            path_str, e
        ))
    })?;

    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length: MAX_SEQUENCE_LENGTH,
            ..Default::default()
        }))
        .map_err(|e| {
            PipelineError::Tokenization(format!(
                "Failed to configure truncation for '{}': {}",
                path_str, e
            ))
        })?;
    tokenizer.with_padding(None);

    Ok(tokenizer)
}

/// Memory-maps safetensors, or reads a PyTorch checkpoint.
pub fn load_var_builder(weights_path: &Path, device: &Device) -> Result<VarBuilder<'static>> {
    let vb = if weights_path.extension().is_some_and(|e| e == "safetensors") {
        unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, device) }
    } else {
        VarBuilder::from_pth(weights_path, DType::F32, device)
    };

    vb.map_err(|e| {
        PipelineError::ModelLoad(format!(
            "Failed to read weights '{}': {}",
            weights_path.display(),
            e
        ))
    })
}

#[derive(Deserialize)]
struct ClassifierConfigJson {
    #[serde(default)]
    id2label: HashMap<String, String>,
}

/// Reads `id2label` from a classifier `config.json` into a label list indexed by class id.
pub fn labels_from_config(config_json: &str) -> Result<Vec<String>> {
    let class_cfg: ClassifierConfigJson = serde_json::from_str(config_json)?;
    ordered_labels(&class_cfg.id2label)
}

fn ordered_labels(id2label: &HashMap<String, String>) -> Result<Vec<String>> {
    if id2label.is_empty() {
        return Err(PipelineError::ModelLoad(
            "Model config has no id2label table".into(),
        ));
    }

    let mut by_id = Vec::with_capacity(id2label.len());
    for (id, label) in id2label {
        let id: usize = id.parse().map_err(|_| {
            PipelineError::ModelLoad(format!("Label id '{id}' in id2label is not an integer"))
        })?;
        by_id.push((id, label.clone()));
    }
    by_id.sort_by_key(|(id, _)| *id);

    if let Some((pos, (id, _))) = by_id.iter().enumerate().find(|(pos, (id, _))| pos != id) {
        return Err(PipelineError::ModelLoad(format!(
            "id2label is not contiguous: expected id {pos}, found {id}"
        )));
    }

    Ok(by_id.into_iter().map(|(_, label)| label).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_follow_class_ids() {
        let json = r#"{"id2label": {"2": "joy", "0": "fear", "3": "sadness", "1": "anger"}}"#;
        assert_eq!(
            labels_from_config(json).unwrap(),
            vec!["fear", "anger", "joy", "sadness"]
        );
    }

    #[test]
    fn missing_id2label_is_a_load_error() {
        let err = labels_from_config(r#"{"hidden_size": 768}"#).unwrap_err();
        assert!(matches!(err, PipelineError::ModelLoad(_)));
    }

    #[test]
    fn gaps_in_label_ids_are_rejected() {
        let json = r#"{"id2label": {"0": "fear", "2": "joy"}}"#;
        let err = labels_from_config(json).unwrap_err();
        assert!(err.to_string().contains("not contiguous"));
    }

    #[test]
    fn non_numeric_ids_are_rejected() {
        let json = r#"{"id2label": {"zero": "fear"}}"#;
        assert!(labels_from_config(json).is_err());
    }

    #[test]
    fn local_source_reports_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let source = ModelSource::local(dir.path());
        let err = source.weights().unwrap_err();
        assert!(matches!(err, PipelineError::ModelLoad(_)));
        assert!(err.to_string().contains("pytorch_model.bin"));
    }

    #[test]
    fn local_source_resolves_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.json"), "{}").unwrap();
        let source = ModelSource::local(dir.path());
        assert_eq!(source.config_json().unwrap(), "{}");
    }

    #[test]
    fn cache_keys_distinguish_sources() {
        let local = ModelSource::local("models/emotion");
        let hub = ModelSource::hub("models/emotion");
        assert_ne!(local.cache_key(), hub.cache_key());
        assert_eq!(hub.to_string(), "models/emotion");
    }
}
