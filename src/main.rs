mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{AnalyzeFormat, BatchFormat, ModelArgs};

#[derive(Parser, Debug)]
#[command(name = "emotion")]
#[command(about = "Detect emotions in text with transformer classifiers", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(flatten)]
    model: ModelArgs,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Commands {
    /// Rank every emotion label for one text
    Analyze {
        /// Text to analyze (stdin if not provided)
        text: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = AnalyzeFormat::Text)]
        format: AnalyzeFormat,
    },

    /// Label every row of a CSV file and summarize the labels
    Batch {
        /// CSV file with a header row
        file: PathBuf,

        /// Text column (default: first of text, content, Tweet, sentence)
        #[arg(short, long)]
        column: Option<String>,

        /// Write the input rows plus a predicted_emotion column here
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Number of labeled rows to preview
        #[arg(long, default_value_t = 10)]
        preview: usize,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = BatchFormat::Text)]
        format: BatchFormat,
    },

    /// Analyze lines from stdin, with :history and :quit
    Interactive,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Analyze { text, format } => {
            commands::analyze::run(text.as_deref(), format, &cli.model)
        }
        Commands::Batch {
            file,
            column,
            output,
            preview,
            format,
        } => commands::batch::run(
            &file,
            column.as_deref(),
            output.as_deref(),
            preview,
            format,
            &cli.model,
        ),
        Commands::Interactive => commands::interactive::run(&cli.model),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emotion_pipelines::emotion::DeviceRequest;

    #[test]
    fn parses_batch_flags() {
        let cli = Cli::try_parse_from([
            "emotion", "batch", "tweets.csv", "--column", "body", "--preview", "3", "-f", "json",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Commands::Batch {
                file: PathBuf::from("tweets.csv"),
                column: Some("body".into()),
                output: None,
                preview: 3,
                format: BatchFormat::Json,
            }
        );
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::try_parse_from(["emotion", "analyze", "hi", "-vv", "--device", "cuda:1"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.model.device, DeviceRequest::Cuda(1));
    }

    #[test]
    fn unknown_device_is_rejected() {
        assert!(Cli::try_parse_from(["emotion", "--device", "tpu", "interactive"]).is_err());
    }

    #[test]
    fn analyze_text_is_optional() {
        let cli = Cli::try_parse_from(["emotion", "analyze", "--format", "jsonl"]).unwrap();
        assert_eq!(
            cli.command,
            Commands::Analyze {
                text: None,
                format: AnalyzeFormat::Jsonl
            }
        );
    }
}
