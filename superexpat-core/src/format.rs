//! Formatting helpers shared across UIs.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};

/// Format a backend start date as `Thu, Nov 20, 2025`.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 and naive `YYYY-MM-DDTHH:MM:SS`; anything
/// else is returned unchanged.
pub fn format_start_date(raw: &str) -> String {
    let raw = raw.trim();
    parse_start_date(raw)
        .map(|date| date.format("%a, %b %-d, %Y").to_string())
        .unwrap_or_else(|| raw.to_string())
}

fn parse_start_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|ts| ts.date())
}

/// Format a message timestamp in local time (e.g., "02:15 PM").
pub fn format_message_time(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%I:%M %p").to_string()
}

/// Sentence shown when the backend sends no summary.
pub fn results_headline(total: u64) -> String {
    format!("I found {} {} for you", total, pluralize(total, "result"))
}

/// `word` with an `s` unless `count` is exactly one.
pub fn pluralize(count: u64, word: &str) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}

/// Truncate to `max_chars` characters, appending "..." when cut.
pub fn truncate_chars(input: &str, max_chars: usize) -> String {
    if input.chars().count() <= max_chars {
        return input.to_string();
    }
    let cut: String = input.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{cut}...")
}
