// ABOUTME: jarvis-chef - command-line entry point for the meal-creation workflow
// ABOUTME: Reads a meal context as JSON, prints the recipe or the composed brief, maps errors to exit codes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Jarvis Contributors
//!
//! Usage:
//! ```bash
//! # Create a recipe from a context file
//! jarvis-chef cook --context dinner.json
//!
//! # Read the context from stdin, skip the review stage
//! echo '{"timeOfDay":"dinner","eaters":["Marie"],"complexity":"easy","duration":"short"}' \
//!   | jarvis-chef --variant direct cook --context -
//!
//! # Show the brief the chef would receive, without calling any model
//! jarvis-chef compose --context dinner.json
//!
//! # Check the configured provider is reachable
//! jarvis-chef health
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use jarvis_core::config::{PipelineConfig, PipelineVariant};
use jarvis_core::errors::{AppError, AppResult, ErrorCode, ErrorResponse};
use jarvis_core::llm::{ChatProvider, LlmProvider};
use jarvis_core::logging::LoggingConfig;
use jarvis_core::meal::{Household, MealContextInput};
use jarvis_core::workflow::{compose_brief, MealCreationWorkflow};
use serde::Serialize;
use tokio::io::AsyncReadExt;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "jarvis-chef",
    about = "Jarvis meal-creation pipeline",
    long_about = "Turns a meal context (JSON) into a validated recipe using chef, sous chef and formatter models."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Workflow variant override (defaults to JARVIS_PIPELINE_VARIANT)
    #[arg(long, global = true, value_enum)]
    variant: Option<VariantArg>,

    /// Household YAML file override (defaults to JARVIS_HOUSEHOLD_FILE)
    #[arg(long, global = true)]
    household: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum VariantArg {
    /// Draft, review, correct at most once, format
    Reviewed,
    /// Draft and format; eaters restricted to the household
    Direct,
}

impl From<VariantArg> for PipelineVariant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::Reviewed => Self::Reviewed,
            VariantArg::Direct => Self::Direct,
        }
    }
}

#[non_exhaustive]
#[derive(Subcommand)]
enum Command {
    /// Create a recipe and print it as JSON
    Cook {
        /// Meal context JSON file, or "-" for stdin
        #[arg(long)]
        context: String,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,

        /// Print run metadata (run id, variant, revised) around the recipe
        #[arg(long)]
        report: bool,
    },

    /// Print the composed chef brief without calling any model
    Compose {
        /// Meal context JSON file, or "-" for stdin
        #[arg(long)]
        context: String,
    },

    /// Check that the configured provider answers
    Health,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries the command output
    let mut logging = LoggingConfig::from_env();
    if cli.verbose {
        logging = logging.with_level("debug");
    }
    if let Err(e) = logging.init() {
        eprintln!("Failed to initialize logging: {e}");
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let code = error.category().exit_code();
            let response = ErrorResponse::from(error);
            match serde_json::to_string_pretty(&response) {
                Ok(json) => println!("{json}"),
                Err(e) => eprintln!("Failed to serialize error response: {e}"),
            }
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    let mut config = PipelineConfig::from_env()?;
    if let Some(variant) = cli.variant {
        config.variant = variant.into();
    }
    if let Some(household) = cli.household {
        config.household_file = Some(household);
    }

    match cli.command {
        Command::Cook {
            context,
            pretty,
            report,
        } => {
            let input = read_context(&context).await?;
            let workflow = MealCreationWorkflow::from_config(&config).await?;
            if report {
                let run = workflow.run_with_report(&input).await?;
                print_json(&run, pretty)?;
            } else {
                let recipe = workflow.run(&input).await?;
                print_json(&recipe, pretty)?;
            }
        }
        Command::Compose { context } => {
            let input = read_context(&context).await?;
            let household = Household::from_config(&config).await?;
            println!("{}", compose_brief(&household, config.variant, &input)?);
        }
        Command::Health => {
            let provider = ChatProvider::for_type(config.provider)?;
            let healthy = provider.health_check().await?;
            info!(provider = provider.name(), healthy, "Health check finished");
            if !healthy {
                return Err(AppError::new(
                    ErrorCode::ExternalServiceUnavailable,
                    format!("{} did not pass its health check", provider.display_name()),
                ));
            }
            println!("{} is reachable", provider.display_name());
        }
    }

    Ok(())
}

/// Read and parse a meal context from a file or stdin
async fn read_context(source: &str) -> AppResult<MealContextInput> {
    let raw = if source == "-" {
        let mut buffer = String::new();
        tokio::io::stdin()
            .read_to_string(&mut buffer)
            .await
            .map_err(|e| AppError::invalid_input(format!("Cannot read stdin: {e}")).with_source(e))?;
        buffer
    } else {
        let path = Path::new(source);
        tokio::fs::read_to_string(path).await.map_err(|e| {
            AppError::invalid_input(format!("Cannot read {}: {e}", path.display())).with_source(e)
        })?
    };

    serde_json::from_str(&raw).map_err(|e| {
        AppError::invalid_input(format!("Meal context is not valid JSON: {e}")).with_source(e)
    })
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> AppResult<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| {
        AppError::new(
            ErrorCode::SerializationError,
            format!("Cannot serialize output: {e}"),
        )
    })?;
    println!("{json}");
    Ok(())
}
