use std::fmt::Display;
use std::sync::Arc;

use super::model::EmotionModel;
use super::pipeline::EmotionPipeline;
use crate::error::Result;
use crate::models::{ClassifierSource, FreshHeadOptions};
use crate::pipelines::cache::ModelOptions;
use crate::pipelines::utils::{BasePipelineBuilder, DeviceRequest, StandardPipelineBuilder};

crate::pipelines::utils::impl_device_methods!(delegated: EmotionPipelineBuilder<M: EmotionModel>);

/// Builder for creating [`EmotionPipeline`] instances.
///
/// Use [`Self::modernbert`], [`Self::fresh_head`], or [`Self::bert`] as the entry point.
///
/// # Examples
///
/// ```rust,no_run
/// # use emotion_pipelines::emotion::{EmotionPipelineBuilder, EmotionBertModel};
/// # fn main() -> emotion_pipelines::error::Result<()> {
/// let pipeline = EmotionPipelineBuilder::bert(EmotionBertModel::default_source())
///     .auto_device()
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct EmotionPipelineBuilder<M: EmotionModel>(StandardPipelineBuilder<M::Options>);

impl<M: EmotionModel> EmotionPipelineBuilder<M> {
    pub(crate) fn new(options: M::Options) -> Self {
        Self(StandardPipelineBuilder::new(options))
    }

    /// Builds the pipeline with configured settings.
    ///
    /// # Errors
    ///
    /// Returns an error if model loading or device initialization fails.
    pub fn build(self) -> Result<EmotionPipeline<M>>
    where
        M: Send + Sync + 'static,
        M::Options: ModelOptions + Display,
    {
        BasePipelineBuilder::build(self)
    }
}

impl<M: EmotionModel> BasePipelineBuilder<M> for EmotionPipelineBuilder<M>
where
    M: Send + Sync + 'static,
    M::Options: ModelOptions + Display,
{
    type Pipeline = EmotionPipeline<M>;
    type Options = M::Options;

    fn options(&self) -> &Self::Options {
        &self.0.options
    }

    fn device_request(&self) -> &DeviceRequest {
        &self.0.device_request
    }

    fn create_model(options: Self::Options, device: candle_core::Device) -> Result<M> {
        M::new(options, device)
    }

    fn get_tokenizer(options: Self::Options) -> Result<tokenizers::Tokenizer> {
        M::get_tokenizer(options)
    }

    fn construct_pipeline(
        model: Arc<M>,
        tokenizer: tokenizers::Tokenizer,
        options: &Self::Options,
    ) -> Result<Self::Pipeline> {
        Ok(EmotionPipeline {
            model,
            tokenizer,
            name: options.to_string(),
        })
    }
}

impl EmotionPipelineBuilder<super::EmotionModernBert> {
    /// Creates a builder for a fine-tuned ModernBERT emotion classifier.
    pub fn modernbert(source: ClassifierSource) -> Self {
        Self::new(source)
    }
}

impl EmotionPipelineBuilder<super::FreshHeadModernBert> {
    /// Creates a builder for a base ModernBERT encoder with a new, untrained head.
    pub fn fresh_head(options: FreshHeadOptions) -> Self {
        Self::new(options)
    }
}

impl EmotionPipelineBuilder<super::EmotionBert> {
    /// Creates a builder for a BERT emotion classifier.
    pub fn bert(source: ClassifierSource) -> Self {
        Self::new(source)
    }
}
