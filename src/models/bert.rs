use candle_core::{Device, IndexOp};
use candle_nn::{Linear, Module};
use candle_transformers::models::bert::{BertModel, Config};
use serde::Deserialize;
use tokenizers::Tokenizer;

use super::{encode, encoding_tensors, label_probabilities, ClassifierSource};
use crate::error::{PipelineError, Result};
use crate::loaders::{labels_from_config, load_var_builder, ModelSource};
use crate::pipelines::emotion::model::EmotionModel;
use crate::scoring::Prediction;

/// Pretrained emotion classifier used when no ModernBERT model can be loaded.
pub const DEFAULT_FALLBACK_REPO: &str = "bhadresh-savani/bert-base-uncased-emotion";

/// Tokenizer repo for BERT checkpoints that ship only `vocab.txt`.
pub const DEFAULT_BERT_TOKENIZER_REPO: &str = "bert-base-uncased";

#[derive(Deserialize)]
struct BertDims {
    hidden_size: usize,
}

/// BERT encoder, pooler, and classification head (`BertForSequenceClassification` layout).
pub struct EmotionBertModel {
    bert: BertModel,
    pooler: Linear,
    classifier: Linear,
    device: Device,
    labels: Vec<String>,
}

impl EmotionBertModel {
    /// Loads config, label table, and weights from `source`.
    pub fn new(source: ClassifierSource, device: Device) -> Result<Self> {
        let config_str = source.model.config_json()?;
        let config: Config = serde_json::from_str(&config_str)?;
        let dims: BertDims = serde_json::from_str(&config_str)?;
        let labels = labels_from_config(&config_str)?;

        let vb = load_var_builder(&source.model.weights()?, &device)?;
        let load_err = |e: candle_core::Error| {
            PipelineError::ModelLoad(format!(
                "Failed to build BERT classifier from '{}': {}",
                source.model, e
            ))
        };

        let bert = BertModel::load(vb.pp("bert"), &config).map_err(load_err)?;
        let pooler = candle_nn::linear(
            dims.hidden_size,
            dims.hidden_size,
            vb.pp("bert.pooler.dense"),
        )
        .map_err(load_err)?;
        let classifier = candle_nn::linear(dims.hidden_size, labels.len(), vb.pp("classifier"))
            .map_err(load_err)?;

        tracing::info!(model = %source.model, labels = ?labels, "loaded BERT emotion classifier");

        Ok(Self {
            bert,
            pooler,
            classifier,
            device,
            labels,
        })
    }

    /// Source for the default fallback model, with the matching tokenizer.
    pub fn default_source() -> ClassifierSource {
        ClassifierSource::new(ModelSource::hub(DEFAULT_FALLBACK_REPO))
            .with_tokenizer_fallback(ModelSource::hub(DEFAULT_BERT_TOKENIZER_REPO))
    }
}

impl EmotionModel for EmotionBertModel {
    type Options = ClassifierSource;

    fn new(options: Self::Options, device: Device) -> Result<Self> {
        EmotionBertModel::new(options, device)
    }

    fn predict_scores(&self, tokenizer: &Tokenizer, text: &str) -> Result<Vec<Prediction>> {
        let encoding = encode(tokenizer, text)?;
        let (input_ids, attention_mask) = encoding_tensors(&encoding, &self.device)?;
        let token_type_ids = input_ids.zeros_like()?;

        let hidden = self
            .bert
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;
        let pooled = self.pooler.forward(&hidden.i((.., 0))?)?.tanh()?;
        let logits = self.classifier.forward(&pooled)?;
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_source_borrows_a_tokenizer() {
        let source = EmotionBertModel::default_source();
        assert_eq!(source.model, ModelSource::hub(DEFAULT_FALLBACK_REPO));
        assert_eq!(
            source.tokenizer_fallback,
            Some(ModelSource::hub(DEFAULT_BERT_TOKENIZER_REPO))
        );
    }

    #[test]
    fn missing_local_model_is_a_load_failure() {
        let dir = tempfile::tempdir().unwrap();
        let source = ClassifierSource::new(ModelSource::local(dir.path()));
        let err = EmotionBertModel::new(source, Device::Cpu).err().unwrap();
        assert!(err.is_load_failure());
    }
}
