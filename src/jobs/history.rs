//! AI-history post: extend the previous post with a freshly generated one.

use chrono::Local;

use crate::config::TextConfig;
use crate::jobs::text::{excerpt, format_timestamp, or_placeholder, render, truncate_chars};
use crate::jobs::{Job, JobContext, JobError, JobReport};
use crate::observability::metrics;

pub async fn run(ctx: &mut JobContext) -> Result<JobReport, JobError> {
    let channel = ctx.slack.open_dm(&ctx.user_id).await?;
    let last = ctx
        .slack
        .latest_text(&channel)
        .await?
        .filter(|t| !t.trim().is_empty());

    let prompt = build_prompt(&ctx.config.text, last.as_deref());
    let generated = ctx.generator(Job::History)?.generate(&prompt).await?;

    let text = &ctx.config.text;
    let body = truncate_chars(
        &or_placeholder(generated, &text.history_placeholder),
        text.max_chars,
    );
    let now = format_timestamp(&Local::now());
    let message = render(&text.history_template, &[("now", now.as_str()), ("text", body.as_str())]);

    ctx.slack.post_message(&channel, &message, None).await?;
    metrics::record_message_posted(Job::History.name());

    Ok(JobReport {
        job: Job::History,
        channel,
        posted: vec![message],
    })
}

/// Topic prompt for an empty channel, otherwise an "extend this" prompt
/// quoting the start of the previous post.
pub fn build_prompt(text: &TextConfig, last: Option<&str>) -> String {
    match last {
        None => text.history_topic_prompt.clone(),
        Some(last) => render(
            &text.history_extend_prompt,
            &[("excerpt", excerpt(last, text.excerpt_chars))],
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_prompt_without_history() {
        let text = TextConfig::default();
        assert_eq!(build_prompt(&text, None), text.history_topic_prompt);
    }

    #[test]
    fn test_extend_prompt_quotes_excerpt() {
        let text = TextConfig {
            history_extend_prompt: "extend <{excerpt}>".into(),
            excerpt_chars: 5,
            ..TextConfig::default()
        };
        assert_eq!(build_prompt(&text, Some("abcdefghij")), "extend <abcde>");
    }
}
