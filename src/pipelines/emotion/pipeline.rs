use std::sync::Arc;

use super::model::EmotionModel;
use crate::error::Result;
use crate::pipelines::stats::PipelineStats;
use crate::scoring::{
    score_batch, score_one, select_top_k, BatchOutput, Classifier, Prediction, ResultSet, TopK,
};
use tokenizers::Tokenizer;

/// Single-text output from [`EmotionPipeline::run`].
#[derive(Debug)]
pub struct Output {
    /// Every label, highest score first.
    pub results: ResultSet,
    /// Execution statistics.
    pub stats: PipelineStats,
}

/// Classifies text into emotion labels with a loaded model.
///
/// Construct with [`EmotionPipelineBuilder`](super::EmotionPipelineBuilder). Pipelines built
/// from the same model source share weights.
///
/// # Examples
///
/// ```rust,no_run
/// # use emotion_pipelines::emotion::{EmotionPipelineBuilder, ClassifierSource, ModelSource};
/// # fn main() -> emotion_pipelines::error::Result<()> {
/// let source = ClassifierSource::new(ModelSource::local("my_finetuned_model"));
/// let pipeline = EmotionPipelineBuilder::modernbert(source).build()?;
///
/// let output = pipeline.run("I can't stop smiling today!")?;
/// if let Some(top) = output.results.primary() {
///     println!("{}: {:.2}", top.label, top.score);
/// }
/// # Ok(())
/// # }
/// ```
pub struct EmotionPipeline<M: EmotionModel> {
    pub(crate) model: Arc<M>,
    pub(crate) tokenizer: Tokenizer,
    pub(crate) name: String,
}

impl<M: EmotionModel> EmotionPipeline<M> {
    /// Scores every label for `text` (normalized first), highest score first.
    pub fn run(&self, text: &str) -> Result<Output> {
        let stats_builder = PipelineStats::start();
        let results = score_one(self, text)?;
        Ok(Output {
            results,
            stats: stats_builder.finish(1),
        })
    }

    /// Labels each row with its top emotion and tallies the labels.
    ///
    /// Stops at the first row that fails.
    pub fn run_batch<S: AsRef<str>>(&self, rows: &[S]) -> Result<BatchOutput> {
        score_batch(self, rows)
    }

    /// Labels this model can assign, in class-id order.
    pub fn labels(&self) -> &[String] {
        self.model.labels()
    }

    /// Where the model was loaded from.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the device (CPU/GPU) the model is running on.
    pub fn device(&self) -> &candle_core::Device {
        self.model.device()
    }
}

impl<M: EmotionModel> Classifier for EmotionPipeline<M> {
    fn classify(&self, text: &str, top_k: TopK) -> Result<Vec<Prediction>> {
        let _span = tracing::debug_span!("classify", model = %self.name, ?top_k).entered();
        let predictions = self.model.predict_scores(&self.tokenizer, text)?;
        Ok(select_top_k(predictions, top_k))
    }
}
