//! dm-courier
//!
//! One-shot jobs that read a Slack DM, ask Gemini for text, and post back.
//! Meant to be triggered by cron or a CI schedule; each run is a fresh
//! process with no carried-over state.
//!
//! # Architecture Overview
//!
//! ```text
//!   CLI (clap) ──▶ config ──▶ jobs::run ──┬──▶ chat (Slack Web API)
//!                (file+env)               │
//!                                         └──▶ resilience::Invoker
//!                                                 │ retry + key fallback
//!                                                 ▼
//!                                              generation (Gemini)
//! ```
//!
//! Exit status is 0 when the job finished, 1 when anything failed. A failure
//! is reported as a single line on stderr.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::Instrument;
use uuid::Uuid;

use dm_courier::config::{load_config, ConfigError, LogFormat, ObservabilityConfig};
use dm_courier::jobs::{self, Job, JobContext, JobError, JobReport};
use dm_courier::observability::logging::init_logging;
use dm_courier::CourierConfig;

#[derive(Parser)]
#[command(name = "dm-courier")]
#[command(about = "Generate text with Gemini and post it to a Slack DM", long_about = None)]
struct Cli {
    /// Optional TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log output format (overrides the config file)
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Post an AI-history note that builds on the previous post
    History,
    /// Expand on the newest message in the DM
    Continue,
    /// Reply in-thread to the user's recent messages
    Reply {
        /// How far back to look, in seconds
        #[arg(long)]
        window_secs: Option<u64>,
    },
    /// Post a timestamped test notice
    Announce,
    /// Summarize the recent conversation into the DM
    Summarize {
        /// How far back to look, in seconds
        #[arg(long)]
        window_secs: Option<u64>,
    },
}

impl Command {
    fn job(&self) -> Job {
        match self {
            Command::History => Job::History,
            Command::Continue => Job::Continue,
            Command::Reply { .. } => Job::Reply,
            Command::Announce => Job::Announce,
            Command::Summarize { .. } => Job::Summarize,
        }
    }

    fn apply(&self, config: &mut CourierConfig) {
        match self {
            Command::Reply {
                window_secs: Some(secs),
            } => config.reply.window_secs = *secs,
            Command::Summarize {
                window_secs: Some(secs),
            } => config.summarize.window_secs = *secs,
            _ => {}
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let job = cli.command.job();

    let loaded = load_config(cli.config.as_deref());

    let mut observability = loaded
        .as_ref()
        .map(|c| c.observability.clone())
        .unwrap_or_else(|_| ObservabilityConfig::default());
    if let Some(format) = cli.log_format {
        observability.log_format = format;
    }
    if let Err(e) = init_logging(&observability) {
        eprintln!("warning: logging already initialised: {}", e);
    }

    let span = tracing::info_span!("run", id = %Uuid::new_v4(), job = %job);
    let result = execute(&cli.command, loaded).instrument(span).await;

    match result {
        Ok(report) => {
            println!("✅ {}", report.summary());
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(job = %job, error = %e, "Job failed");
            eprintln!("❌ {} failed: {}", job, e);
            ExitCode::FAILURE
        }
    }
}

async fn execute(
    command: &Command,
    loaded: Result<CourierConfig, ConfigError>,
) -> Result<JobReport, JobError> {
    let job = command.job();
    let mut config = loaded?;
    command.apply(&mut config);

    tracing::info!(
        model = %config.gemini.model,
        max_attempts = config.retries.max_attempts,
        delay_ms = config.retries.delay_ms,
        "Configuration loaded"
    );

    let mut ctx = JobContext::from_config(config, job)?;
    jobs::run(job, &mut ctx).await
}
