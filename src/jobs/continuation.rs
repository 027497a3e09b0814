//! Continue the conversation: expand on the newest message in the DM.

use crate::jobs::text::{or_placeholder, render};
use crate::jobs::{Job, JobContext, JobError, JobReport};
use crate::observability::metrics;

pub async fn run(ctx: &mut JobContext) -> Result<JobReport, JobError> {
    let channel = ctx.slack.open_dm(&ctx.user_id).await?;
    let last = match ctx
        .slack
        .latest_text(&channel)
        .await?
        .filter(|t| !t.trim().is_empty())
    {
        Some(last) => last,
        None => {
            tracing::info!(channel = %channel, "No previous message, starting from the seed prompt");
            ctx.config.text.continue_seed.clone()
        }
    };

    let prompt = render(&ctx.config.text.continue_prompt, &[("message", last.as_str())]);
    let generated = ctx.generator(Job::Continue)?.generate(&prompt).await?;

    let text = &ctx.config.text;
    let body = or_placeholder(generated.trim().to_string(), &text.continue_placeholder);
    let message = render(&text.continue_template, &[("text", body.as_str())]);

    ctx.slack.post_message(&channel, &message, None).await?;
    metrics::record_message_posted(Job::Continue.name());

    Ok(JobReport {
        job: Job::Continue,
        channel,
        posted: vec![message],
    })
}
