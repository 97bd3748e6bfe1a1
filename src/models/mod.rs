// ============ Model implementations ============

pub(crate) mod bert;
pub(crate) mod modernbert;

pub use bert::EmotionBertModel;
pub use modernbert::{EmotionModernBertModel, FreshHeadModernBertModel, FreshHeadOptions};

use candle_core::{Device, Tensor, D};
use candle_nn::ops::softmax;
use tokenizers::{Encoding, Tokenizer};

use crate::error::{PipelineError, Result};
use crate::scoring::Prediction;

/// Files a classifier is loaded from, plus where to find a tokenizer if they lack one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifierSource {
    /// Config and weights location.
    pub model: crate::loaders::ModelSource,
    /// Used when `model` has no `tokenizer.json`.
    pub tokenizer_fallback: Option<crate::loaders::ModelSource>,
}

impl ClassifierSource {
    /// A source that ships its own tokenizer.
    pub fn new(model: crate::loaders::ModelSource) -> Self {
        Self {
            model,
            tokenizer_fallback: None,
        }
    }

    /// Take the tokenizer from `fallback` when the model has none.
    pub fn with_tokenizer_fallback(mut self, fallback: crate::loaders::ModelSource) -> Self {
        self.tokenizer_fallback = Some(fallback);
        self
    }

    pub(crate) fn tokenizer(&self) -> Result<Tokenizer> {
        crate::loaders::TokenizerLoader::new(self.model.clone(), self.tokenizer_fallback.clone())
            .load()
    }
}

impl std::fmt::Display for ClassifierSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.model)
    }
}

impl crate::pipelines::cache::ModelOptions for ClassifierSource {
    fn cache_key(&self) -> String {
        crate::pipelines::cache::ModelOptions::cache_key(&self.model)
    }
}

pub(crate) fn encode(tokenizer: &Tokenizer, text: &str) -> Result<Encoding> {
    tokenizer.encode(text, true).map_err(|e| {
        PipelineError::Tokenization(format!(
            "Tokenization failed on '{}': {}",
            &text.chars().take(50).collect::<String>(),
            e
        ))
    })
}

/// `(input_ids, attention_mask)` with a batch dimension of one.
pub(crate) fn encoding_tensors(encoding: &Encoding, device: &Device) -> Result<(Tensor, Tensor)> {
    let input_ids = Tensor::new(encoding.get_ids(), device)?.unsqueeze(0)?;
    let attention_mask = Tensor::new(encoding.get_attention_mask(), device)?.unsqueeze(0)?;
    Ok((input_ids, attention_mask))
}

/// Softmax over `[1, num_labels]` logits, paired with labels in class-id order.
pub(crate) fn label_probabilities(logits: &Tensor, labels: &[String]) -> Result<Vec<Prediction>> {
    let probs = softmax(logits, D::Minus1)?.squeeze(0)?.to_vec1::<f32>()?;
    if probs.len() != labels.len() {
        return Err(PipelineError::Unexpected(format!(
            "Model produced {} scores for {} labels",
            probs.len(),
            labels.len()
        )));
    }

    Ok(labels
        .iter()
        .zip(probs)
        .map(|(label, score)| Prediction::new(label.clone(), score))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probabilities_follow_label_order() {
        let logits = Tensor::new(&[[0.0f32, 0.0, 2.0]], &Device::Cpu).unwrap();
        let labels = vec!["fear".to_string(), "anger".into(), "joy".into()];
        let preds = label_probabilities(&logits, &labels).unwrap();

        assert_eq!(preds.len(), 3);
        assert_eq!(preds[2].label, "joy");
        assert!(preds[2].score > preds[0].score);
        assert!((preds[0].score - preds[1].score).abs() < 1e-6);
        let total: f32 = preds.iter().map(|p| p.score).sum();
        assert!((total - 1.0).abs() < 1e-5);
    }

    #[test]
    fn mismatched_label_count_is_an_error() {
        let logits = Tensor::new(&[[0.5f32, 0.5]], &Device::Cpu).unwrap();
        let labels = vec!["joy".to_string()];
        assert!(label_probabilities(&logits, &labels).is_err());
    }
}
