//! Codexec CLI
//!
//! A command-line tool for running code snippets in a scratch directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use codexec::{Config, EXAMPLE_CONFIG, ExecutionOutcome, ExecutionRequest, Limits, Runner};
use tracing::{Level, debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "codexec")]
#[command(about = "Compile and run short programs with a time limit")]
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
        /// Output path (default: codexec.toml)
        #[arg(short, long, default_value = "codexec.toml")]
        output: PathBuf,

        /// Overwrite existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Run a program (compile if needed, then execute)
    Run {
        /// Source file to run
        #[arg(value_name = "FILE")]
        source: PathBuf,

        /// Language ID (python, c, cpp)
        #[arg(short, long, default_value = "python")]
        language: String,

        /// Run time limit in seconds
        #[arg(short, long)]
        timeout: Option<f64>,

        /// Compile time limit in seconds
        #[arg(long)]
        compile_timeout: Option<f64>,

        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// List available languages
    Languages,

    /// Show effective configuration
    ShowConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if let Commands::Init { output, force } = &cli.command {
        return init_config(output, *force).await;
    }

    if let Some(path) = &cli.config {
        info!(?path, "loading configuration");
    } else {
        debug!("using default configuration with environment overrides");
    }
    let config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;

    match cli.command {
        Commands::Init { .. } => Ok(()),
        Commands::Run {
            source,
            language,
            timeout,
            compile_timeout,
            json,
        } => {
            let mut limits = Limits::unset();
            limits.timeout = timeout;
            limits.compile_timeout = compile_timeout;
            run_execute(config, &source, language, &limits, json).await
        }
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

async fn run_execute(
    config: Config,
    source: &Path,
    language: String,
    limits: &Limits,
    json: bool,
) -> Result<()> {
    let source_code = tokio::fs::read_to_string(source)
        .await
        .context("failed to read source file")?;

    info!(%language, "running program");

    let runner = Runner::new(config);
    let request = ExecutionRequest::new(language, source_code);
    let outcome = runner.execute_with_limits(&request, Some(limits)).await;

    print!("{}", render_outcome(&outcome, json)?);

    info!(error_kind = %outcome.error_kind, "execution result");

    if outcome.is_success() {
        Ok(())
    } else {
        std::process::exit(1);
    }
}

/// Text printed for an outcome, always ending in a newline
fn render_outcome(outcome: &ExecutionOutcome, json: bool) -> Result<String> {
    let mut rendered = if json {
        serde_json::to_string_pretty(outcome).context("failed to serialize outcome")?
    } else {
        outcome.response_text()
    };
    if !rendered.ends_with('\n') {
        rendered.push('\n');
    }
    Ok(rendered)
}

fn list_languages(config: &Config) {
    println!("Available languages:\n");

    for (language, toolchain) in config.languages.iter() {
        let kind = if toolchain.is_compiled() {
            "compiled"
        } else {
            "interpreted"
        };
        println!(
            "  {:<10} {} ({}, .{})",
            language.id(),
            language.name(),
            kind,
            toolchain.extension
        );
    }
}

fn show_config(config: &Config) {
    let limits = &config.default_limits;
    println!("Default limits:");
    println!("  Timeout: {:.1}s", limits.run_duration().as_secs_f64());
    println!(
        "  Compile timeout: {:.1}s",
        limits.compile_duration().as_secs_f64()
    );
    println!("  Max output: {} bytes", limits.max_output_bytes());
    println!();
    println!("Temp dir: {}", config.temp_dir().display());
    match config.max_concurrent {
        Some(count) => println!("Max concurrent: {count}"),
        None => println!("Max concurrent: unbounded"),
    }
    println!();
    println!("Toolchains:");
    for (language, toolchain) in config.languages.iter() {
        if let Some(compile) = &toolchain.compile {
            println!("  {:<10} compile: {}", language.id(), compile.join(" "));
        }
        println!("  {:<10} run:     {}", language.id(), toolchain.run.join(" "));
    }
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
