//! Emotion classification pipeline.
//!
//! Score free-form text against a set of emotion labels (by default `fear`, `anger`,
//! `joy`, `sadness`). Text is normalized first: emoji are dropped, punctuation becomes
//! whitespace, and runs of whitespace collapse.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use emotion_pipelines::emotion::{select_classifier, SelectionConfig};
//! use emotion_pipelines::scoring::score_one;
//!
//! # fn main() -> emotion_pipelines::error::Result<()> {
//! let classifier = select_classifier(&SelectionConfig::default())?;
//! println!("using {} ({})", classifier.name(), classifier.tier());
//!
//! let results = score_one(&classifier, "I can't believe they cancelled the show!!")?;
//! for p in &results {
//!     println!("{}: {:.1}%", p.label, p.score * 100.0);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Batch Inference
//!
//! ```rust,no_run
//! # use emotion_pipelines::emotion::{EmotionPipelineBuilder, EmotionBertModel};
//! # fn main() -> emotion_pipelines::error::Result<()> {
//! let pipeline = EmotionPipelineBuilder::bert(EmotionBertModel::default_source()).build()?;
//!
//! let output = pipeline.run_batch(&["What a lovely morning", "I miss you so much"])?;
//! for (label, count) in output.summary.by_frequency() {
//!     println!("{label}: {count}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Supported Models
//!
//! | Model | Builder Method |
//! |-------|----------------|
//! | Fine-tuned ModernBERT | [`EmotionPipelineBuilder::modernbert`] |
//! | ModernBERT with an untrained head | [`EmotionPipelineBuilder::fresh_head`] |
//! | BERT sequence classifier | [`EmotionPipelineBuilder::bert`] |

// ============ Internal API ============

pub(crate) mod builder;
pub(crate) mod model;
pub(crate) mod pipeline;
pub(crate) mod selection;

// ============ Public API ============

pub use crate::loaders::{ModelSource, MAX_SEQUENCE_LENGTH};
pub use crate::models::bert::{DEFAULT_BERT_TOKENIZER_REPO, DEFAULT_FALLBACK_REPO};
pub use crate::models::modernbert::DEFAULT_EMOTION_LABELS;
pub use crate::models::{ClassifierSource, EmotionBertModel, FreshHeadOptions};
pub use crate::pipelines::stats::PipelineStats;
pub use crate::pipelines::utils::DeviceRequest;
pub use builder::EmotionPipelineBuilder;
pub use model::EmotionModel;
pub use pipeline::{EmotionPipeline, Output};
pub use selection::{
    select_classifier, ModelTier, SelectedClassifier, SelectionConfig, DEFAULT_BASE_MODEL,
    DEFAULT_LOCAL_MODEL_DIR,
};

/// Only for generic annotations. Use [`EmotionPipelineBuilder::modernbert`].
pub type EmotionModernBert = crate::models::EmotionModernBertModel;

/// Only for generic annotations. Use [`EmotionPipelineBuilder::fresh_head`].
pub type FreshHeadModernBert = crate::models::FreshHeadModernBertModel;

/// Only for generic annotations. Use [`EmotionPipelineBuilder::bert`].
pub type EmotionBert = crate::models::EmotionBertModel;
