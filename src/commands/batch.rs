//! CSV batch analysis.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use colored::*;

use emotion_pipelines::scoring::{score_batch, BatchOutput, Classifier};
use emotion_pipelines::tabular::{read_text_column, write_labeled, TextColumn};

use super::display;
use super::{load_classifier, BatchFormat, ModelArgs};

pub fn run(
    file: &Path,
    column: Option<&str>,
    output: Option<&Path>,
    preview: usize,
    format: BatchFormat,
    model: &ModelArgs,
) -> Result<()> {
    let reader = File::open(file).with_context(|| format!("Failed to open '{}'", file.display()))?;
    let texts = read_text_column(reader, column)?;
    if texts.is_empty() {
        anyhow::bail!("No non-blank rows in column '{}'", texts.name);
    }

    let classifier = load_classifier(model)?;
    eprintln!("{}", format!("Classifying {} texts...", texts.len()).dimmed());

    let batch = label_column(&classifier, &texts)?;

    if let Some(path) = output {
        let out = File::create(path)
            .with_context(|| format!("Failed to create '{}'", path.display()))?;
        write_labeled(BufWriter::new(out), &texts, &batch.rows)?;
        eprintln!("{}", format!("Wrote labeled CSV to {}", path.display()).dimmed());
    }

    print!("{}", format_batch(&texts, &batch, preview, format)?);
    Ok(())
}

pub fn label_column<C: Classifier + ?Sized>(classifier: &C, texts: &TextColumn) -> Result<BatchOutput> {
    let batch = score_batch(classifier, &texts.texts)?;
    tracing::info!(
        rows = batch.rows.len(),
        per_item_ms = batch.stats.per_item().as_millis() as u64,
        "batch complete"
    );
    Ok(batch)
}

/// `LABEL: count items (pct%)` lines, most frequent first.
pub fn distribution_lines(batch: &BatchOutput) -> Vec<String> {
    batch
        .summary
        .by_frequency()
        .into_iter()
        .map(|(label, count)| {
            format!(
                "{}: {} items ({})",
                label.to_uppercase(),
                count,
                display::percent(batch.summary.fraction(label)).trim_start()
            )
        })
        .collect()
}

fn format_batch(
    texts: &TextColumn,
    batch: &BatchOutput,
    preview: usize,
    format: BatchFormat,
) -> Result<String> {
    match format {
        BatchFormat::Json => {
            let distribution: Vec<_> = batch
                .summary
                .by_frequency()
                .into_iter()
                .map(|(label, count)| {
                    serde_json::json!({
                        "label": label,
                        "count": count,
                        "fraction": batch.summary.fraction(label),
                    })
                })
                .collect();
            let output = serde_json::json!({
                "column": texts.name,
                "records": batch.rows.len(),
                "distribution": distribution,
                "rows": batch.rows,
            });
            Ok(format!("{}\n", serde_json::to_string_pretty(&output)?))
        }
        BatchFormat::Text => {
            let mut output = String::new();
            output.push_str(&format!(
                "\n  {} {} {}\n\n",
                "Batch analysis complete:".dimmed(),
                format!("{} RECORDS", batch.rows.len()).bold(),
                format!("(column '{}')", texts.name).dimmed()
            ));

            output.push_str(&format!("  {}\n", "Emotion distribution".bold()));
            let fractions = batch.summary.by_frequency();
            for (line, (label, _)) in distribution_lines(batch).iter().zip(fractions) {
                let fraction = batch.summary.fraction(label) as f32;
                output.push_str(&format!(
                    "  {}  {}\n",
                    display::score_bar(fraction, 20),
                    line
                ));
            }

            if preview > 0 {
                output.push_str(&format!(
                    "\n  {}\n  {}\n",
                    format!("Preview (top {preview})").bold(),
                    display::separator(60)
                ));
                for row in batch.rows.iter().take(preview) {
                    output.push_str(&format!(
                        "  {:<10} {}\n",
                        row.label,
                        display::snippet(&row.text, 48).dimmed()
                    ));
                }
            }

            Ok(output)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emotion_pipelines::scoring::{FnClassifier, Prediction, TopK};

    fn keyword_classifier() -> impl Classifier {
        FnClassifier::new(|text: &str, _: TopK| {
            let label = if text.contains("terrible") {
                "sadness"
            } else {
                "joy"
            };
            Ok(vec![Prediction::new(label, 0.9)])
        })
    }

    fn column() -> TextColumn {
        let csv = "id,text\n1,great day\n2,terrible news\n3,ok fine\n";
        read_text_column(csv.as_bytes(), None).unwrap()
    }

    #[test]
    fn distribution_is_ordered_by_count() {
        let batch = label_column(&keyword_classifier(), &column()).unwrap();
        assert_eq!(
            distribution_lines(&batch),
            vec!["JOY: 2 items (66.7%)", "SADNESS: 1 items (33.3%)"]
        );
    }

    #[test]
    fn text_output_honours_preview() {
        colored::control::set_override(false);
        let texts = column();
        let batch = label_column(&keyword_classifier(), &texts).unwrap();
        let out = format_batch(&texts, &batch, 1, BatchFormat::Text).unwrap();
        assert!(out.contains("3 RECORDS"));
        assert!(out.contains("Preview (top 1)"));
        assert!(out.contains("great day"));
        assert!(!out.contains("ok fine"));
    }

    #[test]
    fn json_output_counts_records() {
        let texts = column();
        let batch = label_column(&keyword_classifier(), &texts).unwrap();
        let out = format_batch(&texts, &batch, 10, BatchFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["records"], 3);
        assert_eq!(value["distribution"][0]["label"], "joy");
        assert_eq!(value["rows"][1]["label"], "sadness");
    }
}
