use std::path::PathBuf;

use super::builder::EmotionPipelineBuilder;
use super::model::EmotionModel;
use super::pipeline::EmotionPipeline;
use crate::error::Result;
use crate::loaders::ModelSource;
use crate::models::modernbert::DEFAULT_EMOTION_LABELS;
use crate::models::{ClassifierSource, EmotionBertModel, FreshHeadOptions};
use crate::pipelines::utils::DeviceRequest;
use crate::scoring::{Classifier, Prediction, TopK};

/// Directory checked for a locally fine-tuned model.
pub const DEFAULT_LOCAL_MODEL_DIR: &str = "my_finetuned_model";

/// Base encoder used for the local model's tokenizer and for a fresh head.
pub const DEFAULT_BASE_MODEL: &str = "answerdotai/ModernBERT-base";

/// Inputs to [`select_classifier`].
#[derive(Debug, Clone)]
pub struct SelectionConfig {
    /// Fine-tuned ModernBERT directory; used when it exists.
    pub local_model_dir: PathBuf,
    /// Base ModernBERT checkpoint.
    pub base_model: ModelSource,
    /// Label schema of a fresh head.
    pub labels: Vec<String>,
    /// Last-resort pretrained emotion classifier.
    pub fallback_model: ClassifierSource,
    /// Device for whichever model is loaded.
    pub device: DeviceRequest,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            local_model_dir: PathBuf::from(DEFAULT_LOCAL_MODEL_DIR),
            base_model: ModelSource::hub(DEFAULT_BASE_MODEL),
            labels: DEFAULT_EMOTION_LABELS.iter().map(|l| l.to_string()).collect(),
            fallback_model: EmotionBertModel::default_source(),
            device: DeviceRequest::Cpu,
        }
    }
}

/// Which step of model selection produced the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelTier {
    /// The locally fine-tuned model.
    FineTuned,
    /// Base encoder with a new, untrained head.
    FreshHead,
    /// The pretrained third-party emotion model.
    Fallback,
}

impl std::fmt::Display for ModelTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ModelTier::FineTuned => "fine-tuned",
            ModelTier::FreshHead => "fresh-head",
            ModelTier::Fallback => "fallback",
        };
        write!(f, "{name}")
    }
}

/// A ready classifier plus where it came from.
pub struct SelectedClassifier {
    tier: ModelTier,
    name: String,
    labels: Vec<String>,
    classifier: Box<dyn Classifier + Send + Sync>,
}

impl SelectedClassifier {
    /// Wraps any classifier; used by [`select_classifier`] and by callers with their own model.
    pub fn new<C>(tier: ModelTier, name: impl Into<String>, labels: Vec<String>, classifier: C) -> Self
    where
        C: Classifier + Send + Sync + 'static,
    {
        Self {
            tier,
            name: name.into(),
            labels,
            classifier: Box::new(classifier),
        }
    }

    fn from_pipeline<M>(tier: ModelTier, pipeline: EmotionPipeline<M>) -> Self
    where
        M: EmotionModel + Send + Sync + 'static,
    {
        let name = pipeline.name().to_string();
        let labels = pipeline.labels().to_vec();
        Self::new(tier, name, labels, pipeline)
    }

    /// Selection step that produced this classifier.
    pub fn tier(&self) -> ModelTier {
        self.tier
    }

    /// Model location, for display.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Labels the model can assign.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }
}

impl Classifier for SelectedClassifier {
    fn classify(&self, text: &str, top_k: TopK) -> Result<Vec<Prediction>> {
        self.classifier.classify(text, top_k)
    }
}

/// Loads the best available emotion classifier.
///
/// 1. A fine-tuned ModernBERT in `local_model_dir`, when that directory exists.
/// 2. Otherwise, `base_model` with a fresh head over `labels`.
/// 3. If step 1 or 2 fails to load, `fallback_model`.
///
/// Only loading failures (download, tokenizer, config/weights) trigger the fallback;
/// device errors are returned so a misconfigured GPU is not silently replaced.
pub fn select_classifier(config: &SelectionConfig) -> Result<SelectedClassifier> {
    let local_exists = config.local_model_dir.is_dir();

    select_tier(
        local_exists,
        || {
            let source = ClassifierSource::new(ModelSource::local(&config.local_model_dir))
                .with_tokenizer_fallback(config.base_model.clone());
            EmotionPipelineBuilder::modernbert(source)
                .device(config.device)
                .build()
                .map(|p| SelectedClassifier::from_pipeline(ModelTier::FineTuned, p))
        },
        || {
            let options =
                FreshHeadOptions::new(config.base_model.clone()).with_labels(config.labels.clone());
            EmotionPipelineBuilder::fresh_head(options)
                .device(config.device)
                .build()
                .map(|p| SelectedClassifier::from_pipeline(ModelTier::FreshHead, p))
        },
        || {
            EmotionPipelineBuilder::bert(config.fallback_model.clone())
                .device(config.device)
                .build()
                .map(|p| SelectedClassifier::from_pipeline(ModelTier::Fallback, p))
        },
    )
}

fn select_tier<T, L, H, F>(local_exists: bool, load_local: L, load_fresh: H, load_fallback: F) -> Result<T>
where
    L: FnOnce() -> Result<T>,
    H: FnOnce() -> Result<T>,
    F: FnOnce() -> Result<T>,
{
    let primary = if local_exists {
        tracing::info!("loading locally fine-tuned model");
        load_local()
    } else {
        tracing::info!("no local model found, building a fresh classification head");
        load_fresh()
    };

    match primary {
        Ok(classifier) => Ok(classifier),
        Err(e) if e.is_load_failure() => {
            tracing::warn!(error = %e, "primary model failed to load, using fallback model");
            load_fallback()
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;

    #[test]
    fn local_model_wins_when_present() {
        let tier = select_tier(
            true,
            || Ok(ModelTier::FineTuned),
            || panic!("fresh head should not load"),
            || panic!("fallback should not load"),
        )
        .unwrap();
        assert_eq!(tier, ModelTier::FineTuned);
    }

    #[test]
    fn fresh_head_without_local_model() {
        let tier = select_tier(
            false,
            || panic!("local model should not load"),
            || Ok(ModelTier::FreshHead),
            || panic!("fallback should not load"),
        )
        .unwrap();
        assert_eq!(tier, ModelTier::FreshHead);
    }

    #[test]
    fn load_failure_falls_back() {
        let tier = select_tier(
            true,
            || Err(PipelineError::ModelLoad("corrupt weights".into())),
            || panic!("fresh head should not load"),
            || Ok(ModelTier::Fallback),
        )
        .unwrap();
        assert_eq!(tier, ModelTier::Fallback);
    }

    #[test]
    fn device_errors_are_not_masked() {
        let result = select_tier(
            false,
            || panic!("local model should not load"),
            || Err::<ModelTier, _>(PipelineError::Device("no GPU".into())),
            || panic!("fallback should not load"),
        );
        assert!(matches!(result, Err(PipelineError::Device(_))));
    }

    #[test]
    fn fallback_failure_is_returned() {
        let result = select_tier(
            false,
            || panic!("local model should not load"),
            || Err::<ModelTier, _>(PipelineError::Download("offline".into())),
            || Err(PipelineError::Download("still offline".into())),
        );
        assert_eq!(result.unwrap_err().to_string(), "still offline");
    }

    #[test]
    fn selected_classifier_forwards_calls() {
        let selected = SelectedClassifier::new(
            ModelTier::Fallback,
            "stub",
            vec!["joy".into()],
            crate::scoring::FnClassifier::new(|_: &str, _| Ok(vec![Prediction::new("joy", 1.0)])),
        );
        assert_eq!(selected.tier(), ModelTier::Fallback);
        assert_eq!(selected.name(), "stub");
        assert_eq!(selected.classify("x", TopK::All).unwrap()[0].label, "joy");
    }

    #[test]
    fn defaults_match_the_four_emotion_schema() {
        let config = SelectionConfig::default();
        assert_eq!(config.local_model_dir, PathBuf::from("my_finetuned_model"));
        assert_eq!(config.labels, ["fear", "anger", "joy", "sadness"]);
        assert_eq!(config.device, DeviceRequest::Cpu);
    }
}
