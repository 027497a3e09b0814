//! Fixed, timestamped notice sent straight to the user.

use chrono::Local;

use crate::jobs::text::{format_timestamp, render};
use crate::jobs::{Job, JobContext, JobError, JobReport};
use crate::observability::metrics;

pub async fn run(ctx: &mut JobContext) -> Result<JobReport, JobError> {
    let now = format_timestamp(&Local::now());
    let message = render(&ctx.config.text.announce_template, &[("now", now.as_str())]);

    // chat.postMessage accepts a user id as the channel and delivers to the DM.
    ctx.slack.post_message(&ctx.user_id, &message, None).await?;
    metrics::record_message_posted(Job::Announce.name());

    Ok(JobReport {
        job: Job::Announce,
        channel: ctx.user_id.clone(),
        posted: vec![message],
    })
}
