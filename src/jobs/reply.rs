//! Threaded auto-reply to the user's recent messages.

use std::time::Duration;

use chrono::Utc;

use crate::chat::{HistoryQuery, Message};
use crate::jobs::text::render;
use crate::jobs::{Job, JobContext, JobError, JobReport};
use crate::observability::metrics;

pub async fn run(ctx: &mut JobContext) -> Result<JobReport, JobError> {
    let channel = ctx.slack.find_dm(&ctx.user_id).await?;

    let window = Duration::from_secs(ctx.config.reply.window_secs);
    let oldest = window_start(Utc::now().timestamp_millis(), window);
    let messages = ctx
        .slack
        .history(&channel, &HistoryQuery::since(oldest))
        .await?;

    let mut posted = Vec::new();
    for message in messages.iter().filter(|m| needs_reply(m)) {
        let reply = render(&ctx.config.text.reply_template, &[("text", message.text.as_str())]);
        ctx.slack
            .post_message(&channel, &reply, Some(&message.ts))
            .await?;
        metrics::record_message_posted(Job::Reply.name());
        posted.push(reply);
    }

    tracing::info!(
        channel = %channel,
        seen = messages.len(),
        replied = posted.len(),
        "Replies sent"
    );

    Ok(JobReport {
        job: Job::Reply,
        channel,
        posted,
    })
}

/// Human messages with a timestamp to thread under.
fn needs_reply(message: &Message) -> bool {
    !message.is_from_bot() && !message.ts.is_empty()
}

/// Unix seconds `window` before `now_millis`.
pub(crate) fn window_start(now_millis: i64, window: Duration) -> f64 {
    now_millis as f64 / 1000.0 - window.as_secs_f64()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bots_are_skipped() {
        let human = Message {
            ts: "1700000000.000100".into(),
            text: "hi".into(),
            user: Some("U1".into()),
            bot_id: None,
        };
        let bot = Message {
            bot_id: Some("B1".into()),
            ..human.clone()
        };
        assert!(needs_reply(&human));
        assert!(!needs_reply(&bot));
        assert!(!needs_reply(&Message::default()));
    }

    #[test]
    fn test_window_start() {
        let oldest = window_start(1_700_000_300_500, Duration::from_secs(300));
        assert!((oldest - 1_700_000_000.5).abs() < 1e-6);
    }
}
