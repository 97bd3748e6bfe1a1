use colored::*;

use emotion_pipelines::scoring::ResultSet;

/// Characters of input shown in a history entry.
pub const HISTORY_SNIPPET_CHARS: usize = 40;

/// Render a progress bar with color based on score
/// score: 0.0 - 1.0
pub fn score_bar(score: f32, width: usize) -> ColoredString {
    let filled = ((score * width as f32).round() as usize).min(width);
    let empty = width - filled;

    let bar = format!("{}{}", "█".repeat(filled), "░".repeat(empty));

    colorize_by_score(&bar, score)
}

/// Colorize text based on score threshold
pub fn colorize_by_score(text: &str, score: f32) -> ColoredString {
    if score >= 0.8 {
        text.green()
    } else if score >= 0.5 {
        text.yellow()
    } else if score >= 0.3 {
        text.truecolor(255, 165, 0) // orange
    } else {
        text.red()
    }
}

/// Score as a percentage with one decimal, right-aligned.
pub fn percent(score: f64) -> String {
    format!("{:>5.1}%", score * 100.0)
}

pub fn score_pct(score: f32) -> ColoredString {
    colorize_by_score(&percent(score as f64), score)
}

/// First [`HISTORY_SNIPPET_CHARS`] characters followed by `...`.
pub fn history_snippet(text: &str) -> String {
    let head: String = text.chars().take(HISTORY_SNIPPET_CHARS).collect();
    format!("{head}...")
}

/// Single-line preview of a text, cut on a char boundary.
pub fn snippet(text: &str, max_chars: usize) -> String {
    let clean = text.replace(['\n', '\r'], " ");
    if clean.chars().count() > max_chars {
        let head: String = clean.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{head}…")
    } else {
        clean
    }
}

/// Horizontal separator
pub fn separator(width: usize) -> ColoredString {
    "─".repeat(width).dimmed()
}

/// Primary emotion, then every label with a bar and percentage.
pub fn format_results(results: &ResultSet) -> String {
    let mut output = String::new();

    let Some(top) = results.primary() else {
        output.push_str(&format!("  {}\n", "No prediction returned".red()));
        return output;
    };

    output.push_str(&format!(
        "\n  {}  {}\n\n",
        "Primary emotion".dimmed(),
        top.label.to_uppercase().bold()
    ));

    for (rank, p) in results.iter().enumerate() {
        let label = format!("{:>10}", p.label.to_uppercase());
        let label = if rank == 0 {
            label.white().bold()
        } else {
            label.dimmed()
        };
        output.push_str(&format!(
            "  {}  {}  {}\n",
            label,
            score_bar(p.score, 20),
            score_pct(p.score)
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use emotion_pipelines::scoring::Prediction;

    #[test]
    fn percentages_have_one_decimal() {
        assert_eq!(percent(0.9), " 90.0%");
        assert_eq!(percent(0.12345), " 12.3%");
        assert_eq!(percent(1.0), "100.0%");
    }

    #[test]
    fn bar_width_is_constant() {
        colored::control::set_override(false);
        for score in [0.0, 0.33, 0.5, 1.0, 1.7] {
            assert_eq!(score_bar(score, 20).to_string().chars().count(), 20);
        }
    }

    #[test]
    fn history_snippet_truncates_by_chars() {
        let long = "é".repeat(50);
        assert_eq!(history_snippet(&long), format!("{}...", "é".repeat(40)));
        assert_eq!(history_snippet("short"), "short...");
    }

    #[test]
    fn snippet_flattens_newlines() {
        assert_eq!(snippet("a\nb", 10), "a b");
        assert_eq!(snippet("abcdefghij", 5), "abcd…");
    }

    #[test]
    fn results_show_every_label() {
        colored::control::set_override(false);
        let results = ResultSet::from_unsorted(vec![
            Prediction::new("joy", 0.7),
            Prediction::new("fear", 0.3),
        ]);
        let text = format_results(&results);
        assert!(text.contains("Primary emotion  JOY"));
        assert!(text.contains(" 70.0%"));
        assert!(text.contains("FEAR"));
        assert!(text.contains(" 30.0%"));
    }
}
