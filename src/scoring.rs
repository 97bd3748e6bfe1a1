//! Ranking and aggregating emotion predictions.
//!
//! The scorer only needs *some* [`Classifier`]: a loaded model pipeline, a
//! [`SelectedClassifier`](crate::emotion::SelectedClassifier), or a closure wrapped in
//! [`FnClassifier`].
//!
//! ```rust
//! use emotion_pipelines::scoring::{score_one, FnClassifier, Prediction, TopK};
//!
//! # fn main() -> emotion_pipelines::error::Result<()> {
//! let classifier = FnClassifier::new(|_text: &str, _top_k: TopK| {
//!     Ok(vec![Prediction::new("anger", 0.1), Prediction::new("joy", 0.9)])
//! });
//!
//! let results = score_one(&classifier, "I am so happy!!! 😀")?;
//! assert_eq!(results.primary().map(|p| p.label.as_str()), Some("joy"));
//! # Ok(())
//! # }
//! ```

use std::cmp::Ordering;
use std::sync::Arc;

use serde::Serialize;

use crate::error::{PipelineError, Result};
use crate::pipelines::stats::PipelineStats;
use crate::preprocess::normalize;

// ============ Classifier boundary ============

/// How many predictions a classifier call should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopK {
    /// One prediction per label the model knows, in the model's label order.
    All,
    /// Only the highest-confidence prediction.
    One,
}

/// An emotion label with its confidence score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    /// The predicted emotion (e.g. "joy", "fear").
    pub label: String,
    /// Confidence score (0.0 to 1.0).
    pub score: f32,
}

impl Prediction {
    /// Creates a prediction.
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Anything that maps cleaned text to label/score pairs.
///
/// Implementations must honour [`TopK`]: [`TopK::All`] yields every label,
/// [`TopK::One`] yields a single-element vector. Errors are returned as-is to the
/// caller of [`score_one`] / [`score_batch`].
pub trait Classifier {
    /// Classifies `text`, which has already been normalized.
    fn classify(&self, text: &str, top_k: TopK) -> Result<Vec<Prediction>>;
}

impl<C: Classifier + ?Sized> Classifier for Box<C> {
    fn classify(&self, text: &str, top_k: TopK) -> Result<Vec<Prediction>> {
        (**self).classify(text, top_k)
    }
}

impl<C: Classifier + ?Sized> Classifier for Arc<C> {
    fn classify(&self, text: &str, top_k: TopK) -> Result<Vec<Prediction>> {
        (**self).classify(text, top_k)
    }
}

/// Adapts a closure into a [`Classifier`].
pub struct FnClassifier<F>(F);

impl<F> FnClassifier<F>
where
    F: Fn(&str, TopK) -> Result<Vec<Prediction>>,
{
    /// Wraps `f`.
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> Classifier for FnClassifier<F>
where
    F: Fn(&str, TopK) -> Result<Vec<Prediction>>,
{
    fn classify(&self, text: &str, top_k: TopK) -> Result<Vec<Prediction>> {
        (self.0)(text, top_k)
    }
}

/// Reduces a full label distribution to the [`TopK`] the caller asked for.
///
/// On ties the earliest prediction wins.
pub fn select_top_k(predictions: Vec<Prediction>, top_k: TopK) -> Vec<Prediction> {
    match top_k {
        TopK::All => predictions,
        TopK::One => {
            let mut best: Option<Prediction> = None;
            for p in predictions {
                if best.as_ref().map_or(true, |b| p.score > b.score) {
                    best = Some(p);
                }
            }
            best.into_iter().collect()
        }
    }
}

// ============ Single text ============

/// Predictions for one text, ordered by score descending.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResultSet(Vec<Prediction>);

impl ResultSet {
    /// Sorts `predictions` by score descending. Ties keep their original order.
    pub fn from_unsorted(mut predictions: Vec<Prediction>) -> Self {
        predictions.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        Self(predictions)
    }

    /// The primary emotion (highest score), if the classifier returned anything.
    pub fn primary(&self) -> Option<&Prediction> {
        self.0.first()
    }

    /// All predictions, highest score first.
    pub fn predictions(&self) -> &[Prediction] {
        &self.0
    }

    /// Number of predictions.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the classifier returned no predictions.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates predictions, highest score first.
    pub fn iter(&self) -> std::slice::Iter<'_, Prediction> {
        self.0.iter()
    }

    /// Consumes the set, returning the sorted predictions.
    pub fn into_vec(self) -> Vec<Prediction> {
        self.0
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a Prediction;
    type IntoIter = std::slice::Iter<'a, Prediction>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Normalizes `text`, requests every label score, and ranks them.
///
/// Classifier failures are returned unchanged.
pub fn score_one<C: Classifier + ?Sized>(classifier: &C, text: &str) -> Result<ResultSet> {
    let cleaned = normalize(text);
    tracing::debug!(chars = cleaned.len(), "scoring single text");
    let predictions = classifier.classify(&cleaned, TopK::All)?;
    Ok(ResultSet::from_unsorted(predictions))
}

// ============ Batch ============

/// Per-label counts of top-1 predictions across a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchSummary {
    // first-seen order
    counts: Vec<(String, usize)>,
}

impl BatchSummary {
    /// Creates an empty summary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one more occurrence of `label`.
    pub fn record(&mut self, label: &str) {
        match self.counts.iter_mut().find(|(l, _)| l == label) {
            Some((_, count)) => *count += 1,
            None => self.counts.push((label.to_string(), 1)),
        }
    }

    /// Occurrences of `label` (0 when never seen).
    pub fn get(&self, label: &str) -> usize {
        self.counts
            .iter()
            .find(|(l, _)| l == label)
            .map_or(0, |(_, c)| *c)
    }

    /// Sum of all counts; equals the number of rows scored.
    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, c)| c).sum()
    }

    /// Share of rows assigned to `label`, in `[0.0, 1.0]`.
    pub fn fraction(&self, label: &str) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.get(label) as f64 / total as f64,
        }
    }

    /// Number of distinct labels seen.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// True when no rows were counted.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// `(label, count)` pairs, most frequent first; ties keep first-seen order.
    pub fn by_frequency(&self) -> Vec<(&str, usize)> {
        let mut entries: Vec<(&str, usize)> =
            self.counts.iter().map(|(l, c)| (l.as_str(), *c)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries
    }
}

/// An input row paired with the label assigned to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledRow {
    /// Original, un-normalized text.
    pub text: String,
    /// Top-1 emotion label.
    pub label: String,
}

/// Output of [`score_batch`].
#[derive(Debug)]
pub struct BatchOutput {
    /// One entry per input row, in input order.
    pub rows: Vec<LabeledRow>,
    /// Label frequencies over `rows`.
    pub summary: BatchSummary,
    /// Execution statistics.
    pub stats: PipelineStats,
}

/// Labels every row with its top-1 emotion and tallies the labels.
///
/// Rows are processed sequentially. The first failing row aborts the batch and its
/// error is returned; no default label is substituted.
pub fn score_batch<C, S>(classifier: &C, rows: &[S]) -> Result<BatchOutput>
where
    C: Classifier + ?Sized,
    S: AsRef<str>,
{
    let stats_builder = PipelineStats::start();
    let mut labeled = Vec::with_capacity(rows.len());
    let mut summary = BatchSummary::new();

    for (index, row) in rows.iter().enumerate() {
        let text = row.as_ref();
        let cleaned = normalize(text);
        let top = classifier
            .classify(&cleaned, TopK::One)?
            .into_iter()
            .next()
            .ok_or_else(|| {
                PipelineError::Unexpected(format!("No prediction returned for row {index}"))
            })?;

        summary.record(&top.label);
        labeled.push(LabeledRow {
            text: text.to_string(),
            label: top.label,
        });
    }

    let stats = stats_builder.finish(labeled.len());
    tracing::debug!(
        rows = labeled.len(),
        labels = summary.len(),
        elapsed_ms = stats.total_time.as_millis() as u64,
        "batch scored"
    );

    Ok(BatchOutput {
        rows: labeled,
        summary,
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_one_picks_first_maximum() {
        let preds = vec![
            Prediction::new("fear", 0.2),
            Prediction::new("joy", 0.4),
            Prediction::new("anger", 0.4),
        ];
        let top = select_top_k(preds, TopK::One);
        assert_eq!(top, vec![Prediction::new("joy", 0.4)]);
    }

    #[test]
    fn top_one_of_nothing_is_empty() {
        assert!(select_top_k(vec![], TopK::One).is_empty());
    }

    #[test]
    fn all_keeps_model_order() {
        let preds = vec![Prediction::new("a", 0.1), Prediction::new("b", 0.9)];
        assert_eq!(select_top_k(preds.clone(), TopK::All), preds);
    }

    #[test]
    fn summary_orders_by_count_then_first_seen() {
        let mut summary = BatchSummary::new();
        for label in ["sadness", "joy", "fear", "joy", "fear"] {
            summary.record(label);
        }
        assert_eq!(
            summary.by_frequency(),
            vec![("joy", 2), ("fear", 2), ("sadness", 1)]
        );
        assert_eq!(summary.total(), 5);
        assert_eq!(summary.get("anger"), 0);
        assert!((summary.fraction("joy") - 0.4).abs() < 1e-9);
    }

    #[test]
    fn signed_zero_scores_keep_their_order() {
        let results = ResultSet::from_unsorted(vec![
            Prediction::new("a", -0.0),
            Prediction::new("b", 0.0),
        ]);
        let labels: Vec<_> = results.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, ["a", "b"]);
    }

    #[test]
    fn empty_summary_fraction_is_zero() {
        assert_eq!(BatchSummary::new().fraction("joy"), 0.0);
    }

    #[test]
    fn boxed_classifier_forwards() {
        let boxed: Box<dyn Classifier> = Box::new(FnClassifier::new(|_: &str, _| {
            Ok(vec![Prediction::new("joy", 1.0)])
        }));
        let results = score_one(&boxed, "hi").unwrap();
        assert_eq!(results.len(), 1);
    }
}
