use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::feed::Feed;

/// A channel normalized with placeholders for missing fields.
#[derive(Debug, Clone)]
pub struct ParsedFeed {
    pub title: String,
    pub description: String,
    pub items: Vec<ParsedItem>,
}

#[derive(Debug, Clone)]
pub struct ParsedItem {
    pub title: String,
    pub link: String,
    pub pub_date: DateTime<Utc>,
    pub author: String,
    pub content: String,
    pub snippet: String,
    pub enclosure: Option<Enclosure>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enclosure {
    pub url: String,
    pub mime_type: String,
}

impl ParsedItem {
    /// Enclosure URL when it points at an image.
    pub fn image_url(&self) -> Option<&str> {
        self.enclosure
            .as_ref()
            .filter(|e| e.mime_type.starts_with("image/"))
            .map(|e| e.url.as_str())
    }

    pub fn keyword_text(&self) -> String {
        format!("{} {}", self.title, self.snippet)
    }
}

/// What a single feed refresh produced.
#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    pub feed: Feed,
    pub new_articles_count: usize,
}

/// Per-feed line of a refresh-all run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedRefreshReport {
    pub feed_id: String,
    pub feed_title: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_articles: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FeedRefreshReport {
    pub fn ok(feed: &Feed, new_articles: usize) -> Self {
        FeedRefreshReport { feed_id: feed.id.clone(), feed_title: feed.title.clone(), success: true, new_articles: Some(new_articles), error: None }
    }

    pub fn failed(feed: &Feed, error: String) -> Self {
        FeedRefreshReport { feed_id: feed.id.clone(), feed_title: feed.title.clone(), success: false, new_articles: None, error: Some(error) }
    }
}

#[derive(Serialize)]
pub struct FeedSample { pub feed_id: String, pub title: String, pub url: String }

#[derive(Serialize)]
pub struct RefreshPlan { pub feeds: usize, pub sample_feeds: Vec<FeedSample> }

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshApply { pub total_new_articles: usize, pub results: Vec<FeedRefreshReport> }

#[cfg(test)]
mod tests {
    use super::*;

    fn item_with(enclosure: Option<Enclosure>) -> ParsedItem {
        ParsedItem {
            title: "t".into(),
            link: "https://example.test/a".into(),
            pub_date: Utc::now(),
            author: String::new(),
            content: String::new(),
            snippet: "s".into(),
            enclosure,
        }
    }

    #[test]
    fn image_url_only_for_image_enclosures() {
        let img = item_with(Some(Enclosure { url: "https://cdn.test/x.png".into(), mime_type: "image/png".into() }));
        assert_eq!(img.image_url(), Some("https://cdn.test/x.png"));
        let audio = item_with(Some(Enclosure { url: "https://cdn.test/x.mp3".into(), mime_type: "audio/mpeg".into() }));
        assert_eq!(audio.image_url(), None);
        assert_eq!(item_with(None).image_url(), None);
    }

    #[test]
    fn report_omits_unused_branch() {
        let feed = Feed::fixture("f1", "Tech News");
        let ok = serde_json::to_value(FeedRefreshReport::ok(&feed, 3)).unwrap();
        assert_eq!(ok, serde_json::json!({"feedId": "f1", "feedTitle": "Tech News", "success": true, "newArticles": 3}));
        let failed = serde_json::to_value(FeedRefreshReport::failed(&feed, "boom".into())).unwrap();
        assert_eq!(failed, serde_json::json!({"feedId": "f1", "feedTitle": "Tech News", "success": false, "error": "boom"}));
    }
}
