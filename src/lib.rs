//! Emotion classification for free-form text in Rust.
//!
//! Powered by [Candle](https://github.com/huggingface/candle). Loads a fine-tuned
//! ModernBERT classifier when one is available and falls back to a pretrained BERT
//! emotion model otherwise. Text is normalized before it reaches the model, single
//! texts get a full ranked label distribution, and batches (including CSV files) are
//! reduced to top-1 labels with a frequency summary.
//!
//! See [`emotion`] for the model pipelines and [`scoring`] for the model-agnostic scorer.

#![deny(missing_docs)]

// ============ Internal API ============

pub(crate) mod loaders;
pub(crate) mod models;
pub(crate) mod pipelines;

// ============ Public API ============

pub mod error;
pub mod history;
pub mod preprocess;
pub mod scoring;
pub mod tabular;

pub use pipelines::emotion;
