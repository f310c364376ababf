use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use rss::{Channel, Item};

use super::types::{Enclosure, ParsedFeed, ParsedItem};

pub const SNIPPET_MAX_CHARS: usize = 200;

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

pub fn parse_channel(xml: &[u8]) -> Result<Channel, rss::Error> {
    Channel::read_from(xml)
}

/// Normalize a channel; `now` stands in for missing publication dates.
pub fn to_parsed_feed(channel: &Channel, now: DateTime<Utc>) -> ParsedFeed {
    ParsedFeed {
        title: non_empty(channel.title()).unwrap_or("Unknown Feed").to_string(),
        description: channel.description().to_string(),
        items: channel.items().iter().map(|item| to_parsed_item(item, now)).collect(),
    }
}

fn to_parsed_item(item: &Item, now: DateTime<Utc>) -> ParsedItem {
    let description = item.description().unwrap_or("");
    let dc_creator = item
        .dublin_core_ext()
        .and_then(|dc| dc.creators().first())
        .map(String::as_str);
    let author = dc_creator.and_then(non_empty).or_else(|| item.author().and_then(non_empty)).unwrap_or("");
    let content = item.content().and_then(non_empty).or_else(|| non_empty(description)).unwrap_or("");
    let snippet_src = if description.trim().is_empty() { content } else { description };

    ParsedItem {
        title: item.title().and_then(non_empty).unwrap_or("Untitled").to_string(),
        link: item.link().unwrap_or("").trim().to_string(),
        pub_date: extract_published_at(item).unwrap_or(now),
        author: author.to_string(),
        content: content.to_string(),
        snippet: extract_snippet(snippet_src, SNIPPET_MAX_CHARS),
        enclosure: item.enclosure().map(|e| Enclosure { url: e.url().to_string(), mime_type: e.mime_type().to_string() }),
    }
}

pub fn extract_published_at(item: &Item) -> Option<DateTime<Utc>> {
    if let Some(pub_date) = item.pub_date() {
        if let Ok(dt) = DateTime::parse_from_rfc2822(pub_date.trim()) { return Some(dt.with_timezone(&Utc)); }
    }
    // Dublin Core date (RFC3339)
    if let Some(dc) = item.dublin_core_ext() {
        if let Some(first) = dc.dates().first() {
            if let Ok(dt) = DateTime::parse_from_rfc3339(first.trim()) { return Some(dt.with_timezone(&Utc)); }
        }
    }
    None
}

/// Strip tags and cap at `max_chars`, appending "..." when cut.
pub fn extract_snippet(text: &str, max_chars: usize) -> String {
    if text.is_empty() { return String::new(); }
    let clean = TAG_RE.replace_all(text, "");
    if clean.chars().count() <= max_chars {
        return clean.into_owned();
    }
    let head: String = clean.chars().take(max_chars).collect();
    format!("{}...", head.trim())
}

fn non_empty(s: &str) -> Option<&str> {
    if s.trim().is_empty() { None } else { Some(s) }
}
