use async_trait::async_trait;
use sqlx::PgPool;

use crate::feed::db as feed_db;
use crate::feed::types::NewFeed;
use crate::feed::Feed;

use super::types::ParsedItem;
use super::write;

/// Persistence used by the refresher.
#[async_trait]
pub trait RefreshStore: Send + Sync {
    async fn get_feed(&self, feed_id: &str) -> sqlx::Result<Option<Feed>>;
    async fn active_feeds(&self) -> sqlx::Result<Vec<Feed>>;
    /// Returns the stored feed and whether it was newly inserted.
    async fn upsert_feed(&self, new: &NewFeed<'_>) -> sqlx::Result<(Feed, bool)>;
    async fn touch_last_fetched(&self, feed_id: &str) -> sqlx::Result<()>;
    /// `None` when an article with the same URL is already stored.
    async fn insert_article(&self, feed_id: &str, item: &ParsedItem) -> sqlx::Result<Option<i64>>;
    async fn insert_keywords(&self, article_id: i64, keywords: &[(String, usize)]) -> sqlx::Result<u64>;
}

pub struct PgRefreshStore {
    pool: PgPool,
}

impl PgRefreshStore {
    pub fn new(pool: PgPool) -> Self { Self { pool } }
}

#[async_trait]
impl RefreshStore for PgRefreshStore {
    async fn get_feed(&self, feed_id: &str) -> sqlx::Result<Option<Feed>> {
        feed_db::get_feed(&self.pool, feed_id).await
    }

    async fn active_feeds(&self) -> sqlx::Result<Vec<Feed>> {
        feed_db::active_feeds(&self.pool).await
    }

    async fn upsert_feed(&self, new: &NewFeed<'_>) -> sqlx::Result<(Feed, bool)> {
        feed_db::upsert_feed(&self.pool, new).await
    }

    async fn touch_last_fetched(&self, feed_id: &str) -> sqlx::Result<()> {
        feed_db::touch_last_fetched(&self.pool, feed_id).await
    }

    async fn insert_article(&self, feed_id: &str, item: &ParsedItem) -> sqlx::Result<Option<i64>> {
        write::insert_article(&self.pool, feed_id, item).await
    }

    async fn insert_keywords(&self, article_id: i64, keywords: &[(String, usize)]) -> sqlx::Result<u64> {
        write::insert_keywords(&self.pool, article_id, keywords).await
    }
}
