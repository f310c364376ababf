use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use sqlx::PgPool;

use super::db;
use super::types::{ArticleFilter, ArticlePage, ArticleSummary, FeedOverview, Pagination};

/// Newest articles shown per feed in listings.
pub const RECENT_PER_FEED: i64 = 5;

/// Read/delete side of feed management, behind the HTTP listing and delete routes.
#[async_trait]
pub trait FeedCatalog: Send + Sync {
    async fn list_feeds(&self, active: Option<bool>) -> Result<Vec<FeedOverview>>;
    /// `false` when no feed had that id.
    async fn delete_feed(&self, feed_id: &str) -> Result<bool>;
    async fn list_articles(&self, filter: &ArticleFilter) -> Result<ArticlePage>;
}

pub struct PgFeedCatalog {
    pool: PgPool,
}

impl PgFeedCatalog {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

#[async_trait]
impl FeedCatalog for PgFeedCatalog {
    async fn list_feeds(&self, active: Option<bool>) -> Result<Vec<FeedOverview>> {
        let rows = db::list_feeds(&self.pool, active).await?;
        let ids: Vec<String> = rows.iter().map(|r| r.feed.id.clone()).collect();
        let recent = db::recent_articles(&self.pool, &ids, RECENT_PER_FEED).await?;
        let mut by_feed = group_by_feed(recent);

        let out = rows
            .into_iter()
            .map(|r| {
                let recent_articles = by_feed.remove(&r.feed.id).unwrap_or_default();
                FeedOverview { feed: r.feed, article_count: r.article_count, recent_articles }
            })
            .collect();
        Ok(out)
    }

    async fn delete_feed(&self, feed_id: &str) -> Result<bool> {
        Ok(db::delete_feed(&self.pool, feed_id).await?)
    }

    async fn list_articles(&self, filter: &ArticleFilter) -> Result<ArticlePage> {
        let articles = db::list_articles(&self.pool, filter).await?;
        let total = db::count_articles(&self.pool, filter).await?;
        Ok(ArticlePage { articles, pagination: Pagination::new(total, filter) })
    }
}

fn group_by_feed(articles: Vec<ArticleSummary>) -> HashMap<String, Vec<ArticleSummary>> {
    let mut map: HashMap<String, Vec<ArticleSummary>> = HashMap::new();
    for a in articles {
        map.entry(a.feed_id.clone()).or_default().push(a);
    }
    map
}
