//! superexpat-cli - one-shot access to the SuperExpat backend
//!
//! This tool provides commands for:
//! - Asking a single question and printing the rendered answer
//! - Checking that the backend is reachable
//!
//! Uses XDG Base Directory specification for file locations:
//! - Config: $XDG_CONFIG_HOME/superexpat/config.toml (~/.config/superexpat/config.toml)
//! - Logs: $XDG_STATE_HOME/superexpat/superexpat.log (with --verbose)

use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use superexpat_core::render::plain_lines;
use superexpat_core::{ChatSession, Config, HttpChatBackend};

/// Upper bound on the status check so an unreachable backend fails fast.
const STATUS_TIMEOUT_SECS: u64 = 5;

#[derive(Parser)]
#[command(name = "superexpat-cli")]
#[command(about = "Ask the SuperExpat backend about events and jobs")]
#[command(version)]
struct Args {
    /// Backend base URL (overrides SUPEREXPAT_API_URL and the config file)
    #[arg(long, value_name = "URL", global = true)]
    api_url: Option<String>,

    /// Write logs to the state directory
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ask one question and print the answer
    Ask {
        /// Print the raw backend response as JSON
        #[arg(long)]
        json: bool,

        /// The question, e.g. "events in London"
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
    },

    /// Show backend status and metrics
    Status,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let mut config = Config::load().context("failed to load configuration")?;
    if let Some(url) = &args.api_url {
        config.override_base_url(url);
    }

    // Initialize logging if verbose
    let _log_guard = if args.verbose {
        let guard = superexpat_core::logging::init(&config.logging)
            .context("failed to initialize logging")?;
        eprintln!(
            "Logging to {}",
            superexpat_core::logging::log_file_path().display()
        );
        Some(guard)
    } else {
        None
    };

    match args.command {
        Command::Ask { json, query } => cmd_ask(&config, &query.join(" "), json),
        Command::Status => cmd_status(&config),
    }
}

fn cmd_ask(config: &Config, query: &str, json: bool) -> Result<ExitCode> {
    let backend =
        HttpChatBackend::new(&config.backend).context("failed to create backend client")?;
    let mut session = ChatSession::new();

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .context("invalid spinner template")?,
    );
    spinner.set_message("Searching with AI...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let accepted = session.submit(&backend, query);
    spinner.finish_and_clear();

    if !accepted {
        anyhow::bail!("query must not be empty");
    }

    let reply = session
        .last()
        .context("chat session produced no reply")?;

    if reply.error {
        eprintln!("{}", reply.content.as_deref().unwrap_or_default());
        return Ok(ExitCode::FAILURE);
    }

    if json {
        if let Some(data) = &reply.data {
            println!(
                "{}",
                serde_json::to_string_pretty(data).context("failed to serialize response")?
            );
        }
    } else {
        for message in session.messages() {
            for line in plain_lines(message) {
                println!("{line}");
            }
            println!();
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn cmd_status(config: &Config) -> Result<ExitCode> {
    let mut backend_config = config.backend.clone();
    backend_config.timeout_secs = Some(
        backend_config
            .timeout_secs
            .map_or(STATUS_TIMEOUT_SECS, |secs| secs.min(STATUS_TIMEOUT_SECS)),
    );
    let backend =
        HttpChatBackend::new(&backend_config).context("failed to create backend client")?;

    println!("SuperExpat Backend");
    println!("==================");
    println!();
    println!("URL:           {}", backend.base_url());

    let status = match backend.status() {
        Ok(status) => status,
        Err(e) => {
            println!("Status:        unreachable ({e})");
            return Ok(ExitCode::FAILURE);
        }
    };

    println!(
        "Service:       {}",
        status.service.as_deref().unwrap_or("<unknown>")
    );
    println!("Status:        {}", status.status);

    match backend.metrics() {
        Ok(metrics) => {
            println!(
                "Health:        {}",
                metrics.status.as_deref().unwrap_or("<unknown>")
            );
            match metrics.avg_response_ms {
                Some(ms) => println!("Avg response:  {ms:.0} ms"),
                None => println!("Avg response:  <unknown>"),
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Metrics endpoint failed");
            println!("Metrics:       <unavailable>");
        }
    }

    Ok(ExitCode::SUCCESS)
}
