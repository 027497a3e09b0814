//! Prompt and message text helpers.
//!
//! Lengths count characters (Unicode scalar values), never bytes, so a cut
//! never lands inside a multi-byte character.

use chrono::{DateTime, TimeZone};

const ELLIPSIS: &str = "...";

/// Cut `text` to `max` characters, appending `...` when anything was cut.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}{}", &text[..cut], ELLIPSIS),
        None => text.to_string(),
    }
}

/// The first `max` characters of `text`, without a marker.
pub fn excerpt(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((cut, _)) => &text[..cut],
        None => text,
    }
}

/// `text`, or `placeholder` when the generation came back blank (empty or
/// whitespace-only). Whitespace-only output is treated like no output, so it
/// is never posted as-is.
pub fn or_placeholder(text: String, placeholder: &str) -> String {
    if text.trim().is_empty() {
        tracing::warn!("Generation returned no text, using placeholder");
        placeholder.to_string()
    } else {
        text
    }
}

/// Replace each `{name}` marker in `template`.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    vars.iter().fold(template.to_string(), |acc, (name, value)| {
        acc.replace(&format!("{{{}}}", name), value)
    })
}

/// `YYYY-MM-DD HH:MM:SS` in the timestamp's own zone.
pub fn format_timestamp<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_truncate_short_text_untouched() {
        assert_eq!(truncate_chars("short", 140), "short");
        assert_eq!(truncate_chars("exact", 5), "exact");
    }

    #[test]
    fn test_truncate_appends_ellipsis() {
        assert_eq!(truncate_chars("abcdef", 3), "abc...");
    }

    #[test]
    fn test_truncate_counts_characters_not_bytes() {
        let text = "人工知能の歴史は一九五六年のダートマス会議に始まる";
        let cut = truncate_chars(text, 4);
        assert_eq!(cut, "人工知能...");
        assert_eq!(excerpt(text, 2), "人工");
    }

    #[test]
    fn test_placeholder_for_blank_text() {
        assert_eq!(or_placeholder(String::new(), "none"), "none");
        assert_eq!(or_placeholder("  \n".into(), "none"), "none");
        assert_eq!(or_placeholder("text".into(), "none"), "text");
    }

    #[test]
    fn test_render_replaces_every_marker() {
        let out = render("{a} and {b}, again {a}", &[("a", "x"), ("b", "y")]);
        assert_eq!(out, "x and y, again x");
        assert_eq!(render("no markers", &[("a", "x")]), "no markers");
    }

    #[test]
    fn test_timestamp_format() {
        let at = Utc.with_ymd_and_hms(2025, 2, 3, 4, 5, 6).unwrap();
        assert_eq!(format_timestamp(&at), "2025-02-03 04:05:06");
    }
}
