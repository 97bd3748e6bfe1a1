//! Error types for this crate.
//!
//! All fallible operations return [`Result<T>`] which uses [`PipelineError`] as the error type.

use thiserror::Error;

/// A [`Result`](std::result::Result) alias using [`PipelineError`] as the error type.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// The unified error type for all crate errors.
///
/// # Example
///
/// ```rust
/// use emotion_pipelines::error::PipelineError;
///
/// fn describe(e: &PipelineError) -> &'static str {
///     match e {
///         PipelineError::Download(_) => "network issue, retry may help",
///         PipelineError::Device(_) => "GPU unavailable, fall back to CPU",
///         PipelineError::Classification(_) => "the model failed on this input",
///         PipelineError::MissingColumn { .. } => "pick a column with --column",
///         _ => "other",
///     }
/// }
///
/// let err = PipelineError::Classification("boom".into());
/// assert_eq!(describe(&err), "the model failed on this input");
/// ```
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PipelineError {
    /// Network or download failure. Retry may help.
    #[error("{0}")]
    Download(String),

    /// Tokenizer loading or encoding failure.
    #[error("{0}")]
    Tokenization(String),

    /// Model config, weights, or label table could not be loaded.
    #[error("{0}")]
    ModelLoad(String),

    /// Device initialization failure. Fall back to CPU.
    #[error("{0}")]
    Device(String),

    /// A single classifier call failed.
    #[error("{0}")]
    Classification(String),

    /// No usable text column in a tabular input.
    #[error("CSV must contain one of these columns: {}", candidates.join(", "))]
    MissingColumn {
        /// Column names that were searched for.
        candidates: Vec<String>,
    },

    /// CSV read or write failure.
    #[error("{0}")]
    Csv(String),

    /// Internal error. Report if seen.
    #[error("{0}")]
    Unexpected(String),
}

impl PipelineError {
    /// True for failures that happen while fetching or reading a model.
    ///
    /// Model selection only falls back to the next tier on these.
    pub fn is_load_failure(&self) -> bool {
        matches!(
            self,
            PipelineError::Download(_)
                | PipelineError::Tokenization(_)
                | PipelineError::ModelLoad(_)
        )
    }
}

impl From<hf_hub::api::sync::ApiError> for PipelineError {
    fn from(value: hf_hub::api::sync::ApiError) -> Self {
        PipelineError::Download(format!("HuggingFace API error: {}", value))
    }
}

impl From<candle_core::Error> for PipelineError {
    fn from(value: candle_core::Error) -> Self {
        PipelineError::Unexpected(value.to_string())
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(value: std::io::Error) -> Self {
        PipelineError::Unexpected(value.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(value: serde_json::Error) -> Self {
        PipelineError::ModelLoad(format!("Invalid model config: {}", value))
    }
}

impl From<csv::Error> for PipelineError {
    fn from(value: csv::Error) -> Self {
        PipelineError::Csv(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_column_lists_candidates() {
        let err = PipelineError::MissingColumn {
            candidates: vec!["text".into(), "content".into()],
        };
        assert_eq!(
            err.to_string(),
            "CSV must contain one of these columns: text, content"
        );
    }

    #[test]
    fn only_loading_errors_are_load_failures() {
        assert!(PipelineError::Download("x".into()).is_load_failure());
        assert!(PipelineError::ModelLoad("x".into()).is_load_failure());
        assert!(PipelineError::Tokenization("x".into()).is_load_failure());
        assert!(!PipelineError::Device("x".into()).is_load_failure());
        assert!(!PipelineError::Classification("x".into()).is_load_failure());
    }
}
