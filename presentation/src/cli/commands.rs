//! CLI command definitions

use clap::{Parser, ValueEnum};
use ensemble_domain::{FormatClass, SelectionMode};
use std::path::PathBuf;

/// Output format for ensemble results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Only the selected answer
    Answer,
    /// Every round's candidates, clusters and the decision
    Full,
    /// JSON output
    Json,
}

impl From<ensemble_domain::OutputFormat> for OutputFormat {
    fn from(format: ensemble_domain::OutputFormat) -> Self {
        match format {
            ensemble_domain::OutputFormat::Answer => OutputFormat::Answer,
            ensemble_domain::OutputFormat::Full => OutputFormat::Full,
            ensemble_domain::OutputFormat::Json => OutputFormat::Json,
        }
    }
}

/// CLI arguments for ensemble-quorum
#[derive(Parser, Debug)]
#[command(name = "ensemble-quorum")]
#[command(author, version, about = "Ensemble consensus - ask a model many times, trust only agreement")]
#[command(long_about = r#"
Ensemble Quorum asks a local model the same question many times under varied
strategies and temperatures, then accepts an answer only when enough of the
candidates agree.

The process:
1. Research (optional): gather background facts once
2. Round 0: generate the initial batch of candidates
3. Evaluate: cluster equivalent answers and apply the reliability gates
4. Extra rounds: add candidates until consensus or the round budget runs out

Configuration files are loaded from (in priority order):
1. --config <path>       Explicit config file
2. ./ensemble.toml       Project-level config
3. ~/.config/ensemble-quorum/config.toml   Global config

Example:
  ensemble-quorum "What is 17 * 23?"
  ensemble-quorum --precision 5 "What is the square root of 2?"
  ensemble-quorum --format integer --min 0 --output full "How many primes are below 100?"
"#)]
pub struct Cli {
    /// The question to answer (read from stdin when omitted)
    pub question: Option<String>,

    /// Model to query
    #[arg(short, long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Candidates generated in round 0
    #[arg(long, value_name = "N")]
    pub initial_runs: Option<usize>,

    /// Maximum extra rounds after round 0
    #[arg(long, value_name = "N")]
    pub max_rounds: Option<usize>,

    /// Candidates generated in each extra round
    #[arg(long, value_name = "N")]
    pub extra_per_round: Option<usize>,

    /// Maximum concurrent generation calls
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,

    /// Strategy draw mechanism: uniform or indexed
    #[arg(long, value_name = "MODE")]
    pub selection: Option<SelectionMode>,

    /// Seed for reproducible strategy and temperature draws
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Required decimal digits after the separator
    #[arg(long, value_name = "DIGITS")]
    pub precision: Option<usize>,

    /// Let exact forms (integers, fractions, pi) satisfy --precision
    #[arg(long)]
    pub allow_exact: bool,

    /// Required answer format: integer, decimal or fraction
    #[arg(long, value_name = "CLASS")]
    pub format: Option<FormatClass>,

    /// Inclusive lower bound on numeric answers
    #[arg(long, value_name = "VALUE", allow_negative_numbers = true)]
    pub min: Option<f64>,

    /// Inclusive upper bound on numeric answers
    #[arg(long, value_name = "VALUE", allow_negative_numbers = true)]
    pub max: Option<f64>,

    /// Gather background facts before round 0
    #[arg(long)]
    pub research: bool,

    /// Output format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Write a JSONL transcript of the run
    #[arg(long, value_name = "PATH")]
    pub transcript: Option<PathBuf>,

    /// Do not pull or stop the model through the ollama CLI
    #[arg(long)]
    pub no_manage_model: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "ensemble-quorum",
            "--precision",
            "5",
            "--selection",
            "indexed",
            "--format",
            "integer",
            "--min",
            "-3",
            "-vv",
            "-o",
            "full",
            "What is 2 + 2?",
        ])
        .unwrap();

        assert_eq!(cli.question.as_deref(), Some("What is 2 + 2?"));
        assert_eq!(cli.precision, Some(5));
        assert_eq!(cli.selection, Some(SelectionMode::Indexed));
        assert_eq!(cli.format, Some(FormatClass::Integer));
        assert_eq!(cli.min, Some(-3.0));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.output, Some(OutputFormat::Full));
    }

    #[test]
    fn test_question_is_optional() {
        let cli = Cli::try_parse_from(["ensemble-quorum", "--show-config"]).unwrap();
        assert!(cli.question.is_none());
        assert!(cli.show_config);
        assert!(cli.output.is_none());
    }

    #[test]
    fn test_rejects_unknown_selection() {
        assert!(Cli::try_parse_from(["ensemble-quorum", "--selection", "roulette", "q"]).is_err());
    }
}
