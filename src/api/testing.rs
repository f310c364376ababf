use std::sync::Arc;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use chrono::Utc;
use sqlx::types::Json;

use crate::feed::types::{ArticleDetail, ArticleFilter, ArticlePage, FeedOverview, KeywordCount, Pagination};
use crate::feed::{Feed, FeedCatalog};
use crate::refresh::{FeedRefreshReport, FeedRefresher, RefreshError, RefreshOutcome};

use super::AppState;

pub type RefreshFn = fn(&str) -> Result<RefreshOutcome, RefreshError>;

/// Refresher whose single-feed result comes from a plain function.
pub struct StubRefresher {
    pub refresh: RefreshFn,
}

#[async_trait]
impl FeedRefresher for StubRefresher {
    async fn refresh_feed(&self, feed_id: &str) -> Result<RefreshOutcome, RefreshError> {
        (self.refresh)(feed_id)
    }

    async fn refresh_all_feeds(&self) -> Result<Vec<FeedRefreshReport>, RefreshError> {
        Ok(vec![
            FeedRefreshReport::ok(&Feed::fixture("a", "Alpha"), 2),
            FeedRefreshReport::failed(&Feed::fixture("b", "Bravo"), "Failed to fetch RSS feed: timeout".into()),
            FeedRefreshReport::ok(&Feed::fixture("c", "Charlie"), 0),
        ])
    }

    async fn add_feed(&self, url: &str, title: Option<&str>, category: Option<&str>) -> Result<Feed, RefreshError> {
        if url.contains("broken") {
            return Err(RefreshError::Fetch("invalid xml".into()));
        }
        let mut feed = Feed::fixture("new", title.unwrap_or("Parsed Title"));
        feed.url = url.to_string();
        feed.category = category.unwrap_or("general").to_string();
        feed.description = Some("From the channel".to_string());
        Ok(feed)
    }
}

pub struct StubCatalog;

impl StubCatalog {
    pub const KNOWN: &'static str = "known";
    pub const BROKEN: &'static str = "broken";
    pub const ARTICLE_TOTAL: i64 = 25;
}

#[async_trait]
impl FeedCatalog for StubCatalog {
    async fn list_feeds(&self, _active: Option<bool>) -> Result<Vec<FeedOverview>> {
        Ok(vec![FeedOverview { feed: Feed::fixture(Self::KNOWN, "Known"), article_count: 12, recent_articles: vec![] }])
    }

    async fn delete_feed(&self, feed_id: &str) -> Result<bool> {
        match feed_id {
            Self::BROKEN => Err(anyhow!("connection reset")),
            id => Ok(id == Self::KNOWN),
        }
    }

    /// One article per page, describing the filter it was asked with.
    async fn list_articles(&self, filter: &ArticleFilter) -> Result<ArticlePage> {
        if filter.category.as_deref() == Some(Self::BROKEN) {
            return Err(anyhow!("relation does not exist"));
        }
        let feed = filter.feed_id.as_deref().unwrap_or(Self::KNOWN);
        let article = ArticleDetail {
            id: filter.offset + 1,
            title: format!("{feed} #{}", filter.offset),
            summary: None,
            content: None,
            url: format!("https://example.test/{feed}/{}", filter.offset),
            author: None,
            published_at: Utc::now(),
            image_url: None,
            feed_title: "Known".to_string(),
            feed_category: filter.category.clone().unwrap_or_else(|| "general".to_string()),
            keywords: Json(vec![KeywordCount { word: "rust".into(), frequency: 4 }]),
        };
        Ok(ArticlePage { articles: vec![article], pagination: Pagination::new(Self::ARTICLE_TOTAL, filter) })
    }
}

pub fn state_with(refresh: RefreshFn) -> AppState {
    AppState::new(Arc::new(StubRefresher { refresh }), Arc::new(StubCatalog))
}
