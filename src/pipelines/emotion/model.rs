use crate::error::Result;
use crate::scoring::Prediction;
use tokenizers::Tokenizer;

/// A loaded emotion classifier. Implemented by the bundled model types.
pub trait EmotionModel {
    /// What the model is loaded from.
    type Options: std::fmt::Debug + Clone;

    /// Loads the model onto `device`.
    fn new(options: Self::Options, device: candle_core::Device) -> Result<Self>
    where
        Self: Sized;

    /// One prediction per label, in class-id order.
    fn predict_scores(&self, tokenizer: &Tokenizer, text: &str) -> Result<Vec<Prediction>>;

    /// Loads the tokenizer matching `options`.
    fn get_tokenizer(options: Self::Options) -> Result<Tokenizer>;

    /// Labels in class-id order.
    fn labels(&self) -> &[String];

    /// Device the weights live on.
    fn device(&self) -> &candle_core::Device;
}
