pub mod analyze;
pub mod batch;
pub mod display;
pub mod interactive;

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use clap::{Args, ValueEnum};
use colored::*;

use emotion_pipelines::emotion::{
    select_classifier, ClassifierSource, DeviceRequest, ModelSource, ModelTier,
    SelectedClassifier, SelectionConfig, DEFAULT_BASE_MODEL, DEFAULT_BERT_TOKENIZER_REPO,
    DEFAULT_EMOTION_LABELS, DEFAULT_FALLBACK_REPO, DEFAULT_LOCAL_MODEL_DIR,
};

/// Message shown when there is nothing to analyze.
pub const EMPTY_INPUT_MESSAGE: &str = "Please enter some text first!";

/// Model selection flags shared by every subcommand.
#[derive(Args, Debug, Clone, PartialEq)]
pub struct ModelArgs {
    /// Directory holding a fine-tuned ModernBERT classifier
    #[arg(long, env = "EMOTION_MODEL_DIR", default_value = DEFAULT_LOCAL_MODEL_DIR, global = true)]
    pub model_dir: PathBuf,

    /// Base ModernBERT (hub repo or local directory) used for tokenizer and fresh head
    #[arg(long, default_value = DEFAULT_BASE_MODEL, global = true)]
    pub base_model: String,

    /// Pretrained emotion classifier used when the primary model fails to load
    #[arg(long, default_value = DEFAULT_FALLBACK_REPO, global = true)]
    pub fallback_model: String,

    /// Device to run on: cpu, cuda, cuda:N, auto
    #[arg(long, env = "EMOTION_DEVICE", default_value = "cpu", global = true)]
    pub device: DeviceRequest,
}

impl ModelArgs {
    pub fn selection_config(&self) -> SelectionConfig {
        SelectionConfig {
            local_model_dir: self.model_dir.clone(),
            base_model: model_source(&self.base_model),
            labels: DEFAULT_EMOTION_LABELS.iter().map(|l| l.to_string()).collect(),
            fallback_model: ClassifierSource::new(model_source(&self.fallback_model))
                .with_tokenizer_fallback(ModelSource::hub(DEFAULT_BERT_TOKENIZER_REPO)),
            device: self.device,
        }
    }
}

/// A local directory if one exists at `location`, otherwise a hub repo id.
pub fn model_source(location: &str) -> ModelSource {
    if Path::new(location).is_dir() {
        ModelSource::local(location)
    } else {
        ModelSource::hub(location)
    }
}

/// Output format for single-text analysis.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyzeFormat {
    Text,
    Json,
    Jsonl,
}

/// Output format for batch analysis.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchFormat {
    Text,
    Json,
}

/// Runs model selection and reports the chosen model on stderr.
pub fn load_classifier(args: &ModelArgs) -> Result<SelectedClassifier> {
    eprintln!("{}", "Loading emotion model...".dimmed());

    let classifier = select_classifier(&args.selection_config())
        .map_err(|e| anyhow!("Failed to load classifier: {}", e))?;

    eprintln!(
        "{}",
        format!("Model: {}  ({})", classifier.name(), classifier.tier()).dimmed()
    );
    if classifier.tier() == ModelTier::FreshHead {
        eprintln!(
            "{}",
            "Warning: classification head is untrained; scores are not meaningful until fine-tuned."
                .yellow()
        );
    }

    Ok(classifier)
}
