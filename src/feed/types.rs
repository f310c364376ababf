use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;

/// A tracked RSS source.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Feed {
    pub id: String,
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub category: String,
    pub is_active: bool,
    pub last_fetched: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewFeed<'a> {
    pub title: &'a str,
    pub url: &'a str,
    pub description: &'a str,
    pub category: &'a str,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FeedCountRow {
    #[sqlx(flatten)]
    pub feed: Feed,
    pub article_count: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ArticleSummary {
    pub id: i64,
    #[serde(skip)]
    pub feed_id: String,
    pub title: String,
    pub summary: Option<String>,
    pub url: String,
    pub author: Option<String>,
    pub published_at: DateTime<Utc>,
    pub image_url: Option<String>,
    /// Stored keywords, most frequent first.
    pub keywords: Vec<String>,
}

/// Feed listing row: the feed, its article count and newest articles.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedOverview {
    #[serde(flatten)]
    pub feed: Feed,
    pub article_count: i64,
    pub recent_articles: Vec<ArticleSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordCount {
    pub word: String,
    pub frequency: i32,
}

/// An article as served by the article listing, with its feed and top keywords.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ArticleDetail {
    pub id: i64,
    pub title: String,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub url: String,
    pub author: Option<String>,
    pub published_at: DateTime<Utc>,
    pub image_url: Option<String>,
    pub feed_title: String,
    pub feed_category: String,
    pub keywords: Json<Vec<KeywordCount>>,
}

pub const DEFAULT_ARTICLE_LIMIT: i64 = 20;
pub const MAX_ARTICLE_LIMIT: i64 = 100;

/// Which articles to list. Blank ids/categories mean no filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleFilter {
    pub feed_id: Option<String>,
    pub category: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

impl ArticleFilter {
    pub fn new(feed_id: Option<String>, category: Option<String>, limit: Option<i64>, offset: Option<i64>) -> Self {
        let blank_to_none = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        ArticleFilter {
            feed_id: blank_to_none(feed_id),
            category: blank_to_none(category),
            limit: limit.unwrap_or(DEFAULT_ARTICLE_LIMIT).clamp(1, MAX_ARTICLE_LIMIT),
            offset: offset.unwrap_or(0).max(0),
        }
    }
}

impl Default for ArticleFilter {
    fn default() -> Self { ArticleFilter::new(None, None, None, None) }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
    pub has_more: bool,
}

impl Pagination {
    pub fn new(total: i64, filter: &ArticleFilter) -> Self {
        Pagination { total, limit: filter.limit, offset: filter.offset, has_more: filter.offset + filter.limit < total }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ArticlePage {
    pub articles: Vec<ArticleDetail>,
    pub pagination: Pagination,
}

#[derive(Serialize)]
pub struct FeedAddPlan {
    pub action: &'static str,
    pub url: String,
    pub title: Option<String>,
    pub category: Option<String>,
}

#[derive(Serialize)]
pub struct FeedRemovePlan {
    pub action: &'static str,
    pub feed: Feed,
}

#[derive(Serialize)]
pub struct FeedRemoveResult {
    pub deleted: bool,
    pub feed_id: String,
}

#[derive(Serialize)]
pub struct FeedList {
    pub feeds: Vec<FeedOverview>,
}

#[cfg(test)]
impl Feed {
    pub(crate) fn fixture(id: &str, title: &str) -> Self {
        Feed {
            id: id.to_string(),
            title: title.to_string(),
            url: format!("https://example.test/{id}/rss"),
            description: None,
            category: "general".to_string(),
            is_active: true,
            last_fetched: None,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overview_flattens_feed_fields_in_camel_case() {
        let feed = Feed::fixture("f1", "Tech News");
        let ov = FeedOverview { feed, article_count: 7, recent_articles: vec![] };
        let v = serde_json::to_value(&ov).unwrap();
        assert_eq!(v["id"], "f1");
        assert_eq!(v["title"], "Tech News");
        assert_eq!(v["articleCount"], 7);
        assert!(v["lastFetched"].is_null());
        assert!(v["recentArticles"].as_array().unwrap().is_empty());
        assert!(v.get("feed").is_none());
    }

    #[test]
    fn article_summary_hides_feed_id() {
        let a = ArticleSummary {
            id: 3,
            feed_id: "f1".into(),
            title: "Hello".into(),
            summary: Some("short".into()),
            url: "https://example.test/a".into(),
            author: None,
            published_at: Utc::now(),
            image_url: None,
            keywords: vec!["rust".into(), "tokio".into()],
        };
        let v = serde_json::to_value(&a).unwrap();
        assert!(v.get("feedId").is_none());
        assert_eq!(v["imageUrl"], serde_json::Value::Null);
        assert!(v["publishedAt"].as_str().is_some());
        assert_eq!(v["keywords"], serde_json::json!(["rust", "tokio"]));
    }

    #[test]
    fn article_filter_defaults_and_clamps() {
        let f = ArticleFilter::default();
        assert_eq!((f.limit, f.offset), (20, 0));
        assert!(f.feed_id.is_none() && f.category.is_none());

        let f = ArticleFilter::new(Some("  ".into()), Some("tech".into()), Some(500), Some(-3));
        assert_eq!(f.feed_id, None);
        assert_eq!(f.category.as_deref(), Some("tech"));
        assert_eq!((f.limit, f.offset), (MAX_ARTICLE_LIMIT, 0));
        assert_eq!(ArticleFilter::new(None, None, Some(0), None).limit, 1);
    }

    #[test]
    fn pagination_reports_more_pages() {
        let f = ArticleFilter::new(None, None, Some(10), Some(10));
        assert!(Pagination::new(21, &f).has_more);
        assert!(!Pagination::new(20, &f).has_more);
        let v = serde_json::to_value(Pagination::new(5, &f)).unwrap();
        assert_eq!(v, serde_json::json!({"total": 5, "limit": 10, "offset": 10, "hasMore": false}));
    }

    #[test]
    fn article_detail_serializes_keywords_inline() {
        let a = ArticleDetail {
            id: 9,
            title: "Hello".into(),
            summary: None,
            content: Some("<p>body</p>".into()),
            url: "https://example.test/a".into(),
            author: None,
            published_at: Utc::now(),
            image_url: None,
            feed_title: "Tech News".into(),
            feed_category: "technology".into(),
            keywords: Json(vec![KeywordCount { word: "rust".into(), frequency: 3 }]),
        };
        let v = serde_json::to_value(&a).unwrap();
        assert_eq!(v["feedTitle"], "Tech News");
        assert_eq!(v["feedCategory"], "technology");
        assert_eq!(v["keywords"], serde_json::json!([{"word": "rust", "frequency": 3}]));
    }
}
