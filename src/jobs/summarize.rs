//! Summarize the DM: everything said in the recent window, condensed by the
//! generation API and posted back to the same channel.

use std::time::Duration;

use chrono::Utc;

use crate::chat::{HistoryQuery, Message};
use crate::config::TextConfig;
use crate::jobs::reply::window_start;
use crate::jobs::text::{or_placeholder, render};
use crate::jobs::{Job, JobContext, JobError, JobReport};
use crate::observability::metrics;

pub async fn run(ctx: &mut JobContext) -> Result<JobReport, JobError> {
    let channel = ctx.slack.find_dm(&ctx.user_id).await?;

    let window = Duration::from_secs(ctx.config.summarize.window_secs);
    let oldest = window_start(Utc::now().timestamp_millis(), window);
    let messages = ctx
        .slack
        .history(&channel, &HistoryQuery::since(oldest))
        .await?;

    let summary = match build_prompt(&ctx.config.text, &messages) {
        None => {
            tracing::info!(channel = %channel, "No messages in the window, nothing to summarize");
            ctx.config.text.summarize_empty.clone()
        }
        Some(prompt) => {
            let generated = ctx.generator(Job::Summarize)?.generate(&prompt).await?;
            or_placeholder(generated, &ctx.config.text.summarize_placeholder)
        }
    };

    let message = render(
        &ctx.config.text.summarize_template,
        &[("text", summary.as_str())],
    );
    ctx.slack.post_message(&channel, &message, None).await?;
    metrics::record_message_posted(Job::Summarize.name());

    tracing::info!(channel = %channel, summarized = messages.len(), "Summary posted");

    Ok(JobReport {
        job: Job::Summarize,
        channel,
        posted: vec![message],
    })
}

/// The summary prompt over every message text, one per line. `None` when
/// there is nothing to summarize.
pub fn build_prompt(text: &TextConfig, messages: &[Message]) -> Option<String> {
    if messages.is_empty() {
        return None;
    }
    let joined = messages
        .iter()
        .map(|m| m.text.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    Some(render(&text.summarize_prompt, &[("messages", joined.as_str())]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(text: &str) -> Message {
        Message {
            ts: "1700000000.000100".into(),
            text: text.into(),
            ..Message::default()
        }
    }

    #[test]
    fn test_no_messages_no_prompt() {
        assert_eq!(build_prompt(&TextConfig::default(), &[]), None);
    }

    #[test]
    fn test_prompt_joins_texts_in_order() {
        let prompt = build_prompt(
            &TextConfig::default(),
            &[message("おはよう"), message(""), message("会議は15時")],
        )
        .unwrap();
        assert_eq!(
            prompt,
            "以下のメッセージを要約してください:\n\nおはよう\n\n会議は15時"
        );
    }
}
