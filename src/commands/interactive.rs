//! Line-by-line analysis with a short history.

use std::io::{self, BufRead, Write};

use anyhow::Result;
use colored::*;

use emotion_pipelines::history::History;
use emotion_pipelines::scoring::{score_one, Classifier};

use super::display;
use super::{load_classifier, ModelArgs, EMPTY_INPUT_MESSAGE};

const HELP: &str = "Type text to analyze. Commands: :history, :clear, :help, :quit";

pub fn run(model: &ModelArgs) -> Result<()> {
    let classifier = load_classifier(model)?;
    let stdin = io::stdin();
    let stdout = io::stdout();
    Session::new(&classifier).run(stdin.lock(), stdout.lock())
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// One interactive session; owns its history.
pub struct Session<'a, C: ?Sized> {
    classifier: &'a C,
    history: History,
}

impl<'a, C: Classifier + ?Sized> Session<'a, C> {
    pub fn new(classifier: &'a C) -> Self {
        Self {
            classifier,
            history: History::default(),
        }
    }

    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut out: W) -> Result<()> {
        writeln!(out, "{}", HELP.dimmed())?;
        write!(out, "> ")?;
        out.flush()?;

        for line in input.lines() {
            if self.handle_line(&line?, &mut out)? == Flow::Quit {
                return Ok(());
            }
            write!(out, "> ")?;
            out.flush()?;
        }

        writeln!(out)?;
        Ok(())
    }

    fn handle_line<W: Write>(&mut self, line: &str, out: &mut W) -> Result<Flow> {
        match line.trim() {
            ":quit" | ":q" | ":exit" => return Ok(Flow::Quit),
            ":help" => writeln!(out, "{}", HELP.dimmed())?,
            ":history" => self.print_history(out)?,
            ":clear" => {
                self.history.clear();
                writeln!(out, "{}", "History cleared".dimmed())?;
            }
            "" => writeln!(out, "{}", EMPTY_INPUT_MESSAGE.yellow())?,
            _ => match score_one(self.classifier, line) {
                Ok(results) => {
                    write!(out, "{}", display::format_results(&results))?;
                    if let Some(top) = results.primary() {
                        self.history.record(line, top.label.clone());
                    }
                }
                // Reported per line; the session continues.
                Err(e) => writeln!(out, "{} {}", "Analysis failed:".red(), e)?,
            },
        }
        Ok(Flow::Continue)
    }

    fn print_history<W: Write>(&self, out: &mut W) -> Result<()> {
        if self.history.is_empty() {
            writeln!(out, "{}", "No recent analysis".dimmed())?;
            return Ok(());
        }

        writeln!(out, "{}", "Recent history".bold())?;
        for entry in self.history.iter() {
            writeln!(
                out,
                "  \"{}\"  {}",
                display::history_snippet(&entry.text),
                entry.label.to_uppercase().bold()
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emotion_pipelines::error::PipelineError;
    use emotion_pipelines::scoring::{FnClassifier, Prediction, TopK};

    fn echo_classifier() -> impl Classifier {
        FnClassifier::new(|text: &str, _: TopK| {
            if text.is_empty() {
                return Err(PipelineError::Classification("nothing left after cleanup".into()));
            }
            let label = text.split(' ').next().unwrap_or_default().to_lowercase();
            Ok(vec![Prediction::new(label, 1.0)])
        })
    }

    fn run_session(input: &str) -> String {
        colored::control::set_override(false);
        let classifier = echo_classifier();
        let mut out = Vec::new();
        Session::new(&classifier).run(input.as_bytes(), &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn history_keeps_five_most_recent() {
        let out = run_session("one\ntwo\nthree\nfour\nfive\nsix\n:history\n:quit\n");
        let history = out.split("Recent history").nth(1).unwrap();
        let lines: Vec<_> = history.lines().filter(|l| l.contains("...")).collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].contains("\"six...\"  SIX"));
        assert!(!history.contains("ONE"));
    }

    #[test]
    fn blank_lines_are_rejected() {
        let out = run_session("   \n:history\n");
        assert!(out.contains(EMPTY_INPUT_MESSAGE));
        assert!(out.contains("No recent analysis"));
    }

    #[test]
    fn classifier_errors_do_not_end_the_session() {
        let out = run_session("😀😀\nhappy\n:history\n");
        assert!(out.contains("Analysis failed: nothing left after cleanup"));
        assert!(out.contains("\"happy...\"  HAPPY"));
    }

    #[test]
    fn quit_stops_reading() {
        let out = run_session(":quit\nlate\n");
        assert!(!out.contains("LATE"));
    }
}
