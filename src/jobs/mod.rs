//! Jobs subsystem: one linear pipeline per invocation.
//!
//! # Data Flow
//! ```text
//! history:   open DM → latest message → prompt → generate* → trim → post
//! continue:  open DM → latest message (or seed) → prompt → generate* → post
//! reply:     find DM → messages since now−window → threaded reply per human message
//! announce:  post fixed notice to the user
//! summarize: find DM → messages since now−window → joined prompt → generate* → post
//!
//! * generate = Invoker retry loop + primary→secondary credential fallback
//! ```
//!
//! # Design Decisions
//! - The first error aborts the job; nothing is persisted between runs
//! - Empty generations become placeholders, never errors
//! - The `CredentialSet` lives in the `Generator`, so a switch holds for the
//!   rest of the run

pub mod announce;
pub mod continuation;
pub mod history;
pub mod reply;
pub mod summarize;
pub mod text;

use std::fmt;

use thiserror::Error;

use crate::chat::{ChatError, SlackClient};
use crate::config::{resolve_secrets, ConfigError, CourierConfig, Requirements};
use crate::generation::{GeminiClient, GenerationError};
use crate::resilience::{CredentialSet, Invoker, RetryError, RetryPolicy};

/// The pipelines this binary can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    /// Generate and post an AI-history note building on the last post.
    History,
    /// Generate a continuation of the last message and post it.
    Continue,
    /// Reply in-thread to recent messages from the user.
    Reply,
    /// Post a fixed, timestamped notice.
    Announce,
    /// Summarize the recent conversation and post the summary.
    Summarize,
}

impl Job {
    pub fn name(&self) -> &'static str {
        match self {
            Job::History => "history",
            Job::Continue => "continue",
            Job::Reply => "reply",
            Job::Announce => "announce",
            Job::Summarize => "summarize",
        }
    }

    pub fn requirements(&self) -> Requirements {
        Requirements {
            generation: matches!(self, Job::History | Job::Continue | Job::Summarize),
        }
    }
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors that abort a job.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("chat API: {0}")]
    Chat(#[from] ChatError),

    #[error("generation failed, {0}")]
    Generation(#[from] RetryError<GenerationError>),

    #[error("generation client: {0}")]
    GenerationClient(#[from] GenerationError),

    #[error("job {0} needs the generation API but no credentials were configured")]
    GeneratorUnavailable(Job),
}

/// What a finished job did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReport {
    pub job: Job,
    pub channel: String,
    /// Text of every message posted, in posting order.
    pub posted: Vec<String>,
}

impl JobReport {
    pub fn summary(&self) -> String {
        format!(
            "{}: posted {} message(s) to {}",
            self.job,
            self.posted.len(),
            self.channel
        )
    }
}

/// Generation client, credentials and retry policy for one run.
#[derive(Debug)]
pub struct Generator {
    client: GeminiClient,
    credentials: CredentialSet,
    invoker: Invoker,
}

impl Generator {
    pub fn new(client: GeminiClient, credentials: CredentialSet, policy: RetryPolicy) -> Self {
        Self {
            client,
            credentials,
            invoker: Invoker::new(policy).with_label("generate"),
        }
    }

    pub fn credentials(&self) -> &CredentialSet {
        &self.credentials
    }

    /// Generate text for `prompt` under the retry policy, falling back to
    /// the secondary credential if the primary is rejected.
    ///
    /// The text may be empty.
    pub async fn generate(&mut self, prompt: &str) -> Result<String, RetryError<GenerationError>> {
        let client = &self.client;
        self.invoker
            .invoke_with_fallback(&mut self.credentials, |credential| async move {
                client.generate(&credential, prompt).await
            })
            .await
    }
}

/// Everything a job needs for one run.
#[derive(Debug)]
pub struct JobContext {
    pub config: CourierConfig,
    pub user_id: String,
    pub slack: SlackClient,
    pub generator: Option<Generator>,
}

impl JobContext {
    /// Validate `config` for `job` and build the API clients.
    pub fn from_config(config: CourierConfig, job: Job) -> Result<Self, JobError> {
        let secrets = resolve_secrets(&config, job.requirements()).map_err(ConfigError::from)?;

        let slack = SlackClient::new(&config.slack, &config.timeouts, &secrets.slack_token)?;
        let generator = match secrets.generation {
            Some(credentials) => {
                let client = GeminiClient::new(&config.gemini, &config.timeouts)?;
                Some(Generator::new(client, credentials, config.retries.policy()))
            }
            None => None,
        };

        Ok(Self::new(config, secrets.user_id, slack, generator))
    }

    pub fn new(
        config: CourierConfig,
        user_id: String,
        slack: SlackClient,
        generator: Option<Generator>,
    ) -> Self {
        Self {
            config,
            user_id,
            slack,
            generator,
        }
    }

    fn generator(&mut self, job: Job) -> Result<&mut Generator, JobError> {
        self.generator
            .as_mut()
            .ok_or(JobError::GeneratorUnavailable(job))
    }
}

/// Run `job` to completion.
pub async fn run(job: Job, ctx: &mut JobContext) -> Result<JobReport, JobError> {
    tracing::info!(job = %job, "Job starting");
    let report = match job {
        Job::History => history::run(ctx).await?,
        Job::Continue => continuation::run(ctx).await?,
        Job::Reply => reply::run(ctx).await?,
        Job::Announce => announce::run(ctx).await?,
        Job::Summarize => summarize::run(ctx).await?,
    };
    tracing::info!(job = %job, posted = report.posted.len(), "Job finished");
    Ok(report)
}
