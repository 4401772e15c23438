//! CLI entrypoint for Ensemble Quorum
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use ensemble_application::{RunEnsembleError, RunEnsembleInput, RunEnsembleUseCase};
use ensemble_domain::Question;
use ensemble_domain::config::validation::has_errors;
use ensemble_domain::{ConfigIssue, Severity};
use ensemble_infrastructure::{
    ConfigLoader, FileConfig, JsonlRunLogger, OllamaClient, OllamaGenerationBackend,
    OllamaModelManager, OllamaResearchProvider,
};
use ensemble_presentation::{Cli, ConsoleFormatter, OutputFormat, ProgressReporter};
use std::io::{BufRead, Write};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Exit status when the run ends without a trusted answer
const EXIT_NO_CONSENSUS: u8 = 2;
/// Exit status for any other fatal run error
const EXIT_FAILURE: u8 = 1;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources();
        return Ok(ExitCode::SUCCESS);
    }

    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };
    apply_cli_overrides(&cli, &mut config);

    let _log_guard = init_logging(cli.verbose, config.logging.log_file.as_deref())?;
    info!("Starting Ensemble Quorum");

    let issues = config.validate();
    report_issues(&issues);
    if has_errors(&issues) {
        bail!("Invalid configuration ({} error(s))", count_errors(&issues));
    }

    if !config.output.color {
        colored::control::set_override(false);
    }

    let question = match &cli.question {
        Some(q) => q.clone(),
        None => read_question()?,
    };
    let question = Question::try_from(question)?;

    let (params, _) = config.ensemble.to_params();
    let (strategies, _) = config.ensemble.parse_strategies();
    let (requirements, _) = config.requirements.to_requirement_set();
    let output_format: OutputFormat = cli
        .output
        .unwrap_or_else(|| config.output.format.unwrap_or_default().into());

    // === Dependency Injection ===
    let client = Arc::new(OllamaClient::new(&config.backend.base_url)?);
    let model = config.backend.model.clone();

    let manager = config.backend.manage_model.then(OllamaModelManager::new);
    if let Some(manager) = &manager {
        manager
            .ensure_model(&model)
            .await
            .with_context(|| format!("Could not prepare model '{}'", model))?;
    }

    let backend = Arc::new(OllamaGenerationBackend::new(Arc::clone(&client), &model));
    let mut use_case = RunEnsembleUseCase::new(backend, strategies, params);

    if config.research.enabled {
        let research_model = config
            .research
            .model
            .clone()
            .unwrap_or_else(|| model.clone());
        use_case = use_case.with_context_provider(Arc::new(OllamaResearchProvider::new(
            Arc::clone(&client),
            research_model,
            Duration::from_secs(config.research.timeout_secs),
        )));
    }

    if let Some(path) = &config.logging.transcript {
        match JsonlRunLogger::new(path) {
            Some(logger) => {
                info!("Writing run transcript to {}", logger.path().display());
                use_case = use_case.with_logger(Arc::new(logger));
            }
            None => warn!("Transcript disabled: cannot write {}", path.display()),
        }
    }

    let show_progress = !cli.quiet && output_format != OutputFormat::Json;

    if show_progress && output_format == OutputFormat::Full {
        println!();
        println!("+============================================================+");
        println!("|              Ensemble Quorum - Consensus Run               |");
        println!("+============================================================+");
        println!();
        println!("Question: {}", question);
        println!("Model: {}", model);
        if !requirements.is_empty() {
            println!("Requirements: {}", requirements);
        }
        println!();
    }

    let input = RunEnsembleInput::new(question).with_requirements(requirements);
    let result = if show_progress {
        let progress = ProgressReporter::new();
        use_case.execute_with_progress(input, &progress).await
    } else {
        use_case.execute(input).await
    };

    if let Some(manager) = &manager {
        manager.stop(&model).await;
    }

    match result {
        Ok(outcome) => {
            let output = match output_format {
                OutputFormat::Full => ConsoleFormatter::format(&outcome),
                OutputFormat::Answer => ConsoleFormatter::format_answer_only(&outcome),
                OutputFormat::Json => ConsoleFormatter::format_json(&outcome),
            };
            println!("{}", output);
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!("Run failed: {}", e);
            match output_format {
                OutputFormat::Json => println!("{}", ConsoleFormatter::format_failure_json(&e)),
                _ => eprintln!("{}", ConsoleFormatter::format_failure(&e)),
            }
            Ok(ExitCode::from(failure_exit_code(&e)))
        }
    }
}

/// Only an exhausted round budget gets its own status.
fn failure_exit_code(error: &RunEnsembleError) -> u8 {
    if error.is_no_consensus() {
        EXIT_NO_CONSENSUS
    } else {
        EXIT_FAILURE
    }
}

/// Command-line flags take precedence over every configuration source.
fn apply_cli_overrides(cli: &Cli, config: &mut FileConfig) {
    if let Some(model) = &cli.model {
        config.backend.model = model.clone();
    }
    if cli.no_manage_model {
        config.backend.manage_model = false;
    }

    let ensemble = &mut config.ensemble;
    if let Some(n) = cli.initial_runs {
        ensemble.initial_runs = n;
    }
    if let Some(n) = cli.max_rounds {
        ensemble.max_rounds = n;
    }
    if let Some(n) = cli.extra_per_round {
        ensemble.extra_per_round = n;
    }
    if let Some(n) = cli.workers {
        ensemble.max_workers = n;
    }
    if let Some(mode) = cli.selection {
        ensemble.selection = mode.as_str().to_string();
    }
    if cli.seed.is_some() {
        ensemble.seed = cli.seed;
    }

    let requirements = &mut config.requirements;
    if cli.precision.is_some() {
        requirements.precision = cli.precision;
    }
    if cli.allow_exact {
        requirements.allow_exact = true;
    }
    if let Some(class) = cli.format {
        requirements.format = Some(class.as_str().to_string());
    }
    if cli.min.is_some() {
        requirements.min = cli.min;
    }
    if cli.max.is_some() {
        requirements.max = cli.max;
    }

    if cli.research {
        config.research.enabled = true;
    }
    if let Some(path) = &cli.transcript {
        config.logging.transcript = Some(path.clone());
    }
}

/// Install the stderr subscriber, plus a non-blocking file writer when configured.
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::new(level));

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| anyhow!("Invalid log file path: {}", path.display()))?;
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Could not create log directory {}", dir.display()))?;

            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(EnvFilter::new(level));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(guard)
}

fn report_issues(issues: &[ConfigIssue]) {
    for issue in issues {
        match issue.severity {
            Severity::Error => error!("{}", issue.message),
            Severity::Warning => warn!("{}", issue.message),
        }
    }
}

fn count_errors(issues: &[ConfigIssue]) -> usize {
    issues
        .iter()
        .filter(|i| i.severity == Severity::Error)
        .count()
}

/// Prompt for the question on stdin.
fn read_question() -> Result<String> {
    print!("> ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    let line = line.trim().to_string();
    if line.is_empty() {
        bail!("Question is required.");
    }
    Ok(line)
}
