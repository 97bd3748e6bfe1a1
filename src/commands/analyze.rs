//! Single-text analysis.

use std::io::{self, Read};

use anyhow::{anyhow, Result};

use emotion_pipelines::scoring::{score_one, Classifier, ResultSet};

use super::display;
use super::{load_classifier, AnalyzeFormat, ModelArgs, EMPTY_INPUT_MESSAGE};

pub fn run(text: Option<&str>, format: AnalyzeFormat, model: &ModelArgs) -> Result<()> {
    let text = resolve_input(text)?;
    let classifier = load_classifier(model)?;
    print!("{}", analyze(&classifier, &text, format)?);
    Ok(())
}

/// The argument, or all of stdin when absent. Blank input is rejected.
fn resolve_input(text: Option<&str>) -> Result<String> {
    let text = match text {
        Some(text) => text.to_string(),
        None => {
            let mut buffer = String::new();
            io::stdin().lock().read_to_string(&mut buffer)?;
            buffer
        }
    };

    if text.trim().is_empty() {
        return Err(anyhow!(EMPTY_INPUT_MESSAGE));
    }
    Ok(text)
}

pub fn analyze<C: Classifier + ?Sized>(
    classifier: &C,
    text: &str,
    format: AnalyzeFormat,
) -> Result<String> {
    let results = score_one(classifier, text)?;
    format_analysis(text, &results, format)
}

fn format_analysis(text: &str, results: &ResultSet, format: AnalyzeFormat) -> Result<String> {
    match format {
        AnalyzeFormat::Json => {
            let output = serde_json::json!({
                "text": text,
                "primary": results.primary(),
                "predictions": results,
            });
            Ok(format!("{}\n", serde_json::to_string_pretty(&output)?))
        }
        AnalyzeFormat::Jsonl => {
            let primary = results
                .primary()
                .ok_or_else(|| anyhow!("Classifier returned no predictions"))?;
            let output = serde_json::json!({
                "text": text,
                "label": primary.label,
                "score": primary.score,
            });
            Ok(format!("{}\n", serde_json::to_string(&output)?))
        }
        AnalyzeFormat::Text => Ok(display::format_results(results)),
    }
}
