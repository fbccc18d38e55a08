use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

/// Twitter's legacy `created_at` format, e.g. "Wed Aug 27 13:08:45 +0000 2008".
const TWITTER_DATE_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// One normalized timeline entry. Fully derived from its raw record at
/// construction time and never mutated afterward; filters and statistics
/// only read it.
#[derive(Debug, Clone, PartialEq)]
pub struct Tweet {
    pub id: String,
    pub text: String,
    pub created_at: Option<DateTime<Utc>>,
    pub length: usize,
    pub favourite_count: u32,
    pub retweet_count: u32,
    pub hashtags: BTreeSet<String>,
    pub mentions: BTreeSet<String>,
}

impl Tweet {
    /// Normalize one raw record from the timeline service. `ordinal` is the
    /// record's position in the response and becomes the id when the provider
    /// supplies none. A malformed record (missing text, wrong field types)
    /// yields safe defaults rather than failing the whole batch.
    pub fn from_raw(raw: &serde_json::Value, ordinal: usize) -> Self {
        let text = match raw.get("text").and_then(|v| v.as_str()) {
            Some(t) => t.to_string(),
            None => {
                tracing::warn!(ordinal, "record has no text field, using defaults");
                String::new()
            }
        };

        let id = raw
            .get("id_str")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .or_else(|| raw.get("id").and_then(|v| v.as_u64()).map(|n| n.to_string()))
            .unwrap_or_else(|| ordinal.to_string());

        let created_at = raw
            .get("created_at")
            .and_then(|v| v.as_str())
            .and_then(parse_timestamp);

        let hashtags = extract_tokens(&text, '#');
        let mentions = extract_tokens(&text, '@');

        Self {
            id,
            length: text.chars().count(),
            created_at,
            favourite_count: count_field(raw, &["favourite_count", "favorite_count", "favourites"]),
            retweet_count: count_field(raw, &["retweet_count", "retweets"]),
            hashtags,
            mentions,
            text,
        }
    }
}

/// Read the first present numeric counter among the provider's field spellings.
fn count_field(raw: &serde_json::Value, names: &[&str]) -> u32 {
    names
        .iter()
        .find_map(|name| raw.get(*name).and_then(|v| v.as_u64()))
        .map(|n| n.min(u64::from(u32::MAX)) as u32)
        .unwrap_or(0)
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(s, TWITTER_DATE_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(s))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

/// Collect tokens introduced by `marker` (`#` or `@`). A token body is a run
/// of alphanumerics or underscores; empty bodies are skipped. Stored
/// lowercased so membership filters can ignore case.
fn extract_tokens(text: &str, marker: char) -> BTreeSet<String> {
    let mut tokens = BTreeSet::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if c != marker {
            continue;
        }
        let mut body = String::new();
        while let Some(&next) = chars.peek() {
            if next.is_alphanumeric() || next == '_' {
                body.push(next);
                chars.next();
            } else {
                break;
            }
        }
        if !body.is_empty() {
            tokens.insert(body.to_lowercase());
        }
    }

    tokens
}
