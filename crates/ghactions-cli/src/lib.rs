//! # ghactions CLI
//!
//! Command-line tools for looking at the event a workflow step was started
//! with, without registering any handler.
//!
//! This module provides CLI commands for:
//! - Inspecting and validating the current event payload
//! - Listing the event types the dispatcher supports
//! - Printing the runner context

use std::io::Write;

use clap::{Parser, Subcommand};
use ghactions::action::is_supported;
use ghactions::event::{self, EventSummary};
use ghactions::{ActionContext, ActionError, SUPPORTED_EVENTS};
use serde_json::Value;
use tracing::{debug, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// ============================================================================
// CLI Structure
// ============================================================================

/// ghactions CLI - inspect GitHub Actions events
#[derive(Parser)]
#[command(name = "ghactions")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Inspect the GitHub Actions event of the current workflow step")]
pub struct Cli {
    /// Logging level, used when RUST_LOG is not set
    #[arg(short, long, env = "GHACTIONS_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// Enable JSON logging
    #[arg(long)]
    pub json_logs: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Read, validate and summarize the current event
    Inspect {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// List the supported event types
    Events,

    /// Show the runner context
    Context {
        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum, serde::Serialize, serde::Deserialize)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON output
    Json,
}

// ============================================================================
// CLI Error Types
// ============================================================================

/// CLI-specific errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Action(#[from] ActionError),

    #[error("Logging setup failed: {message}")]
    Logging { message: String },

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),

    #[error("Failed to serialize output: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CliError {
    /// Process exit code for this error.
    ///
    /// 1 configuration, 2 I/O, 3 parse, 4 unsupported event, 5 anything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Action(e) => match e {
                ActionError::MissingVariable { .. }
                | ActionError::Configuration(_)
                | ActionError::InvalidRepository { .. }
                | ActionError::Client(_)
                | ActionError::NoRuntime(_) => 1,
                ActionError::Io { .. } => 2,
                ActionError::Parse { .. } => 3,
                ActionError::UnsupportedEventType { .. } => 4,
                _ => 5,
            },
            Self::Logging { .. } => 1,
            Self::Output(_) => 2,
            Self::Serialization(_) => 5,
        }
    }
}

// ============================================================================
// Entry Point
// ============================================================================

/// Parse arguments, set up logging and run the selected command.
pub async fn run_cli() -> Result<(), CliError> {
    let cli = Cli::parse();

    initialize_logging(&cli)?;

    let context = ActionContext::from_env()?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    execute(cli.command, &context, &mut out).await
}

/// Run `command` against `context`, writing results to `out`.
pub async fn execute(
    command: Commands,
    context: &ActionContext,
    out: &mut impl Write,
) -> Result<(), CliError> {
    match command {
        Commands::Inspect { format } => execute_inspect_command(context, format, out).await,
        Commands::Events => execute_events_command(out),
        Commands::Context { format } => execute_context_command(context, format, out),
    }
}

/// Initialize logging based on CLI arguments
///
/// Logs go to stderr; stdout carries command output only.
fn initialize_logging(cli: &Cli) -> Result<(), CliError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .map_err(|e| CliError::Logging {
            message: e.to_string(),
        })?;

    let registry = tracing_subscriber::registry().with(filter);
    let result = if cli.json_logs {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };

    result.map_err(|e| CliError::Logging {
        message: e.to_string(),
    })
}

// ============================================================================
// Command Implementations
// ============================================================================

/// Execute inspect command
async fn execute_inspect_command(
    context: &ActionContext,
    format: OutputFormat,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let event_name = context.event_name()?;
    let event_path = context.event_path()?;

    info!(event_name = %event_name, event_path = %event_path.display(), "Inspecting event");

    let payload = event::read_payload(event_path).await?;

    if !is_supported(event_name) {
        return Err(ActionError::UnsupportedEventType {
            event_name: event_name.to_string(),
        }
        .into());
    }

    let webhook = event::parse(event_name, &payload)?;
    debug!(kind = ?webhook.kind, "Payload matches event type");

    let summary = EventSummary::from_payload(event_name, &payload)?;
    match format {
        OutputFormat::Text => writeln!(out, "{}", summary)?,
        OutputFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(&summary)?)?,
    }

    Ok(())
}

/// Execute events command
fn execute_events_command(out: &mut impl Write) -> Result<(), CliError> {
    let mut names = SUPPORTED_EVENTS.to_vec();
    names.sort_unstable();

    for name in names {
        writeln!(out, "{}", name)?;
    }

    Ok(())
}

/// Execute context command
fn execute_context_command(
    context: &ActionContext,
    format: OutputFormat,
    out: &mut impl Write,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            writeln!(out, "{}", serde_json::to_string_pretty(context)?)?;
        }
        OutputFormat::Text => {
            if let Value::Object(fields) = serde_json::to_value(context)? {
                for (key, value) in fields {
                    if let Value::String(value) = value {
                        writeln!(out, "{}={}", key, value)?;
                    }
                }
            }
            if context.token().is_some() {
                writeln!(out, "token=<redacted>")?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
