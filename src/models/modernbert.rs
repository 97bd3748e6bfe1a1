use std::collections::HashMap;

use candle_core::{DType, Device, IndexOp};
use candle_nn::{Linear, Module, VarBuilder, VarMap};
use candle_transformers::models::modernbert::{
    ClassifierConfig, ClassifierPooling, Config, ModernBert,
    ModernBertForSequenceClassification as CandleModernBertForSequenceClassification,
};
use tokenizers::Tokenizer;

use super::{encode, encoding_tensors, label_probabilities, ClassifierSource};
use crate::error::{PipelineError, Result};
use crate::loaders::{labels_from_config, load_var_builder, ModelSource};
use crate::pipelines::emotion::model::EmotionModel;
use crate::scoring::Prediction;

/// Label schema used when a classification head is created from scratch.
pub const DEFAULT_EMOTION_LABELS: [&str; 4] = ["fear", "anger", "joy", "sadness"];

// ============ Fine-tuned classifier ============

/// A ModernBERT checkpoint with a trained sequence-classification head.
#[derive(Clone)]
pub struct EmotionModernBertModel {
    model: CandleModernBertForSequenceClassification,
    device: Device,
    labels: Vec<String>,
}

impl EmotionModernBertModel {
    /// Loads config, label table, and weights from `source`.
    pub fn new(source: ClassifierSource, device: Device) -> Result<Self> {
        let config_str = source.model.config_json()?;
        let mut config: Config = serde_json::from_str(&config_str)?;
        let labels = labels_from_config(&config_str)?;
        patch_config_labels(&mut config, &labels);

        let vb = load_var_builder(&source.model.weights()?, &device)?;
        let model = CandleModernBertForSequenceClassification::load(vb, &config).map_err(|e| {
            PipelineError::ModelLoad(format!(
                "Failed to build ModernBERT classifier from '{}': {}",
                source.model, e
            ))
        })?;

        tracing::info!(model = %source.model, labels = ?labels, "loaded ModernBERT emotion classifier");

        Ok(Self {
            model,
            device,
            labels,
        })
    }
}

impl EmotionModel for EmotionModernBertModel {
    type Options = ClassifierSource;

    fn new(options: Self::Options, device: Device) -> Result<Self> {
        EmotionModernBertModel::new(options, device)
    }

    fn predict_scores(&self, tokenizer: &Tokenizer, text: &str) -> Result<Vec<Prediction>> {
        let encoding = encode(tokenizer, text)?;
        let (input_ids, attention_mask) = encoding_tensors(&encoding, &self.device)?;

        let logits = self.model.forward(&input_ids, &attention_mask)?;
        label_probabilities(&logits, &self.labels)
    }

    fn get_tokenizer(options: Self::Options) -> Result<Tokenizer> {
        options.tokenizer()
    }

    fn labels(&self) -> &[String] {
        &self.labels
    }

    fn device(&self) -> &Device {
        &self.device
    }
}

// Candle reads the head size from `classifier_config`, which HF configs don't always carry.
fn patch_config_labels(config: &mut Config, labels: &[String]) {
    let current = config
        .classifier_config
        .as_ref()
        .map(|c| c.id2label.len())
        .unwrap_or(0);

    if current != labels.len() {
        let id2label: HashMap<String, String> = labels
            .iter()
            .enumerate()
            .map(|(i, label)| (i.to_string(), label.clone()))
            .collect();
        let label2id: HashMap<String, String> = id2label
            .iter()
            .map(|(k, v)| (v.clone(), k.clone()))
            .collect();

        config.classifier_config = Some(ClassifierConfig {
            id2label,
            label2id,
            classifier_pooling: ClassifierPooling::default(),
        });
    }
}

// ============ Fresh head over a base encoder ============

/// Options for [`FreshHeadModernBertModel`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreshHeadOptions {
    /// Base (not fine-tuned) ModernBERT checkpoint.
    pub base: ModelSource,
    /// Labels of the new head, in class-id order.
    pub labels: Vec<String>,
}

impl FreshHeadOptions {
    /// A head with the default `fear, anger, joy, sadness` schema.
    pub fn new(base: ModelSource) -> Self {
        Self {
            base,
            labels: DEFAULT_EMOTION_LABELS.iter().map(|l| l.to_string()).collect(),
        }
    }

    /// Replaces the label schema.
    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }
}

impl std::fmt::Display for FreshHeadOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (untrained {}-label head)", self.base, self.labels.len())
    }
}

impl crate::pipelines::cache::ModelOptions for FreshHeadOptions {
    fn cache_key(&self) -> String {
        format!(
            "{}+head[{}]",
            crate::pipelines::cache::ModelOptions::cache_key(&self.base),
            self.labels.join(",")
        )
    }
}

/// A base ModernBERT encoder with a newly initialized linear head over the CLS token.
///
/// The head is untrained, so scores carry no signal until the model is fine-tuned.
pub struct FreshHeadModernBertModel {
    encoder: ModernBert,
    head: Linear,
    device: Device,
    labels: Vec<String>,
}

impl FreshHeadModernBertModel {
    /// Loads the base encoder and initializes a head for `options.labels`.
    pub fn new(options: FreshHeadOptions, device: Device) -> Result<Self> {
        if options.labels.is_empty() {
            return Err(PipelineError::ModelLoad(
                "A classification head needs at least one label".into(),
            ));
        }

        let config: Config = serde_json::from_str(&options.base.config_json()?)?;
        let vb = load_var_builder(&options.base.weights()?, &device)?;
        let encoder = ModernBert::load(vb, &config).map_err(|e| {
            PipelineError::ModelLoad(format!(
                "Failed to build ModernBERT encoder from '{}': {}",
                options.base, e
            ))
        })?;

        let varmap = VarMap::new();
        let head_vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let head = candle_nn::linear(
            config.hidden_size,
            options.labels.len(),
            head_vb.pp("classifier"),
        )?;

        tracing::warn!(
            base = %options.base,
            labels = ?options.labels,
            "initialized an untrained classification head; predictions are not meaningful until fine-tuned"
        );

        Ok(Self {
            encoder,
            head,
            device,
            labels: options.labels,
        })
    }
}

impl EmotionModel for FreshHeadModernBertModel {
    type Options = FreshHeadOptions;

    fn new(options: Self::Options, device: Device) -> Result<Self> {
        FreshHeadModernBertModel::new(options, device)
    }

    fn predict_scores(&self, tokenizer: &Tokenizer, text: &str) -> Result<Vec<Prediction>> {
        let encoding = encode(tokenizer, text)?;
        let (input_ids, attention_mask) = encoding_tensors(&encoding, &self.device)?;

        let hidden = self.encoder.forward(&input_ids, &attention_mask)?;
        let cls = hidden.i((.., 0))?;
        let logits = self.head.forward(&cls)?;
        label_probabilities(&logits, &self.labels)
    }

    fn get_tokenizer(options: Self::Options) -> Result<Tokenizer> {
        ClassifierSource::new(options.base).tokenizer()
    }

    fn labels(&self) -> &[String] {
        &self.labels
    }

    fn device(&self) -> &Device {
        &self.device
    }
}
