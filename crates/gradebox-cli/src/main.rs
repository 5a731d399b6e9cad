//! Gradebox CLI
//!
//! A command-line tool for grading a submission against a JSON test suite.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gradebox::{
    Config, EXAMPLE_CONFIG, EvaluationOptions, Evaluator, Language, SecurityMode, code_feedback,
    load_test_suite, quality, score_category,
};
use tracing::{Level, debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gradebox")]
#[command(about = "A tool for grading code submissions against test suites")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new configuration file
    Init {
        /// Output path (default: gradebox.toml)
        #[arg(short, long, default_value = "gradebox.toml")]
        output: PathBuf,

        /// Overwrite existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Evaluate a submission and print its report
    Evaluate {
        /// Source file to evaluate
        #[arg(value_name = "FILE")]
        source: PathBuf,

        /// Language (python, javascript, java)
        #[arg(short, long)]
        language: Language,

        /// JSON test suite (without one, the program is run once)
        #[arg(short, long)]
        tests: Option<PathBuf>,

        /// Default per-case timeout in milliseconds
        #[arg(long, value_parser = clap::value_parser!(u64).range(50..=30_000))]
        timeout_ms: Option<u64>,

        /// Memory limit in MiB
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        memory_limit_mb: Option<u64>,

        /// Per-stream output limit in KiB
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        max_output_kb: Option<u64>,

        /// Skip the static quality checks
        #[arg(long)]
        no_quality_checks: bool,

        /// What to do with unsafe or dynamic code (warn, block)
        #[arg(long)]
        security_mode: Option<SecurityMode>,

        /// Print a text summary instead of the JSON report
        #[arg(long)]
        feedback: bool,
    },

    /// Run the static quality checks only
    Check {
        /// Source file to check
        #[arg(value_name = "FILE")]
        source: PathBuf,

        /// Language (python, javascript, java)
        #[arg(short, long)]
        language: Language,
    },

    /// List configured languages
    Languages,

    /// Show effective configuration
    ShowConfig,
}

/// Overrides from the command line, applied on top of the config defaults
struct OptionOverrides {
    timeout_ms: Option<u64>,
    memory_limit_mb: Option<u64>,
    max_output_kb: Option<u64>,
    no_quality_checks: bool,
    security_mode: Option<SecurityMode>,
}

impl OptionOverrides {
    fn apply(self, mut options: EvaluationOptions) -> EvaluationOptions {
        if let Some(timeout_ms) = self.timeout_ms {
            options = options.with_timeout_ms(timeout_ms);
        }
        if let Some(mb) = self.memory_limit_mb {
            options = options.with_memory_limit_mb(mb);
        }
        if let Some(kb) = self.max_output_kb {
            options = options.with_max_output_kb(kb);
        }
        if self.no_quality_checks {
            options = options.with_quality_checks(false);
        }
        if let Some(mode) = self.security_mode {
            options = options.with_security_mode(mode);
        }
        options
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    // logs go to stderr so the report on stdout stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = if let Some(ref path) = cli.config {
        info!(?path, "loading configuration");
        Config::from_file(path).context("failed to load configuration")?
    } else {
        debug!("using default configuration");
        Config::default()
    };

    match cli.command {
        Commands::Init { output, force } => init_config(&output, force).await,
        Commands::Evaluate {
            source,
            language,
            tests,
            timeout_ms,
            memory_limit_mb,
            max_output_kb,
            no_quality_checks,
            security_mode,
            feedback,
        } => {
            let overrides = OptionOverrides {
                timeout_ms,
                memory_limit_mb,
                max_output_kb,
                no_quality_checks,
                security_mode,
            };
            run_evaluate(
                config,
                &source,
                language,
                tests.as_deref(),
                overrides,
                feedback,
            )
            .await
        }
        Commands::Check { source, language } => run_check(&source, language).await,
        Commands::Languages => {
            list_languages(&config);
            Ok(())
        }
        Commands::ShowConfig => {
            show_config(&config);
            Ok(())
        }
    }
}

async fn run_evaluate(
    config: Config,
    source: &Path,
    language: Language,
    tests: Option<&Path>,
    overrides: OptionOverrides,
    feedback: bool,
) -> Result<()> {
    let code = tokio::fs::read_to_string(source)
        .await
        .context("failed to read source file")?;

    let cases = match tests {
        Some(path) => load_test_suite(path).context("failed to load test suite")?,
        None => Vec::new(),
    };

    let options = overrides.apply(config.defaults.clone());
    let evaluator = Evaluator::new(config);
    let request = evaluator
        .request(&code, language)
        .with_test_cases(&cases)
        .with_options(options);

    info!(%language, cases = cases.len(), "evaluating submission");
    let report = evaluator.evaluate(&request).await;

    if feedback {
        let score = report.score_percent();
        println!("{}", code_feedback(&report));
        println!("\nScore: {score}% ({})", score_category(score));
    } else {
        let json = serde_json::to_string_pretty(&report).context("failed to serialize report")?;
        println!("{json}");
    }

    if report.failed > 0 || !report.errors.is_empty() {
        std::process::exit(1);
    }
    Ok(())
}

async fn run_check(source: &Path, language: Language) -> Result<()> {
    let code = tokio::fs::read_to_string(source)
        .await
        .context("failed to read source file")?;

    let warnings = quality::check(&code, language);
    if warnings.is_empty() {
        println!("No quality warnings");
        return Ok(());
    }

    for warning in &warnings {
        println!("{warning}");
    }
    if quality::is_blocking(&warnings) {
        std::process::exit(1);
    }
    Ok(())
}

fn list_languages(config: &Config) {
    println!("Available languages:\n");

    for language in Language::ALL {
        match config.toolchain(language) {
            Ok(toolchain) => {
                let kind = if toolchain.is_compiled() {
                    "compiled"
                } else {
                    "interpreted"
                };
                println!("  {:<12} {} ({})", language.id(), toolchain.name, kind);
            }
            Err(_) => println!("  {:<12} (not configured)", language.id()),
        }
    }
}

fn show_config(config: &Config) {
    let defaults = &config.defaults;
    println!("Evaluation defaults:");
    println!("  Timeout: {} ms", defaults.timeout_ms);
    println!("  Memory limit: {} MiB", defaults.memory_limit_mb);
    println!("  Max output: {} KiB", defaults.max_output_kb);
    println!("  Quality checks: {}", defaults.enable_quality_checks);
    println!("  Security mode: {:?}", defaults.security_mode);
    println!();
    match config.scratch_dir {
        Some(ref dir) => println!("Scratch directory: {}", dir.display()),
        None => println!("Scratch directory: {}", std::env::temp_dir().display()),
    }
    println!();
    println!("Toolchains configured: {}", config.toolchains.len());
}

async fn init_config(output: &Path, force: bool) -> Result<()> {
    if output.exists() && !force {
        anyhow::bail!(
            "Configuration file already exists at '{}'. Use --force to overwrite.",
            output.display()
        );
    }

    tokio::fs::write(output, EXAMPLE_CONFIG)
        .await
        .context("failed to write configuration file")?;

    println!("Created configuration file at '{}'", output.display());
    Ok(())
}
