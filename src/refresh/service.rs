use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use sqlx::PgPool;
use tracing::Instrument;

use crate::config::RefreshConfig;
use crate::feed::types::NewFeed;
use crate::feed::Feed;
use crate::telemetry::{self};
use crate::telemetry::ops::refresh::Phase as RefreshPhase;

use super::error::RefreshError;
use super::store::{PgRefreshStore, RefreshStore};
use super::types::{FeedRefreshReport, ParsedFeed, ParsedItem, RefreshOutcome};
use super::{fetch, keywords, parse, FeedRefresher};

const DEFAULT_CATEGORY: &str = "general";

/// Default refresher: fetches RSS over HTTP and stores unseen articles.
pub struct RssService {
    store: Arc<dyn RefreshStore>,
    client: Client,
    config: RefreshConfig,
}

impl RssService {
    pub fn new(pool: PgPool, config: RefreshConfig) -> anyhow::Result<Self> {
        Self::with_store(Arc::new(PgRefreshStore::new(pool)), config)
    }

    pub fn with_store(store: Arc<dyn RefreshStore>, config: RefreshConfig) -> anyhow::Result<Self> {
        let client = fetch::build_client(&config)?;
        Ok(Self { store, client, config })
    }

    pub async fn fetch_feed(&self, url: &str) -> Result<ParsedFeed, RefreshError> {
        let log = telemetry::refresh();
        let xml = fetch::fetch_rss(&self.client, url)
            .instrument(log.span_kv(&RefreshPhase::FetchRss, [("url", url.to_string())]))
            .await
            .map_err(|e| RefreshError::Fetch(e.to_string()))?;
        let channel = {
            let _s = log.span(&RefreshPhase::ParseRss).entered();
            parse::parse_channel(&xml).map_err(|e| RefreshError::Fetch(e.to_string()))?
        };
        Ok(parse::to_parsed_feed(&channel, Utc::now()))
    }

    /// Store items not seen before; returns how many were new. A failing item does not stop the rest.
    async fn process_articles(&self, feed_id: &str, items: &[ParsedItem]) -> usize {
        let log = telemetry::refresh();
        let mut new_articles = 0usize;
        for item in items {
            if item.link.is_empty() {
                log.info_kv("↩️ skip", [("reason", "no-link".to_string()), ("title", item.title.clone())]);
                continue;
            }
            match self.store_article(feed_id, item).await {
                Ok(true) => {
                    new_articles += 1;
                    log.info_kv("➕ insert", [("url", item.link.clone()), ("title", item.title.clone())]);
                }
                Ok(false) => {}
                Err(e) => log.error_kv("Error processing article", [("url", item.link.clone()), ("error", e.to_string())]),
            }
        }
        new_articles
    }

    async fn store_article(&self, feed_id: &str, item: &ParsedItem) -> sqlx::Result<bool> {
        let Some(article_id) = self.store.insert_article(feed_id, item).await? else { return Ok(false) };
        let kw = keywords::extract_keywords(&item.keyword_text());
        if let Err(e) = self.store.insert_keywords(article_id, &kw).await {
            telemetry::refresh().warn_kv("keywords not stored", [("article_id", article_id.to_string()), ("error", e.to_string())]);
        }
        Ok(true)
    }

    async fn refresh_one(&self, feed_id: &str) -> Result<RefreshOutcome, RefreshError> {
        let log = telemetry::refresh();
        let feed = self.store.get_feed(feed_id)
            .instrument(log.span(&RefreshPhase::Lookup))
            .await?
            .ok_or(RefreshError::NotFound)?;

        let parsed = self.fetch_feed(&feed.url).await?;
        let new_articles_count = self
            .process_articles(&feed.id, &parsed.items)
            .instrument(log.span_kv(&RefreshPhase::WriteArticles, [("items", parsed.items.len().to_string())]))
            .await;

        self.store.touch_last_fetched(&feed.id)
            .instrument(log.span(&RefreshPhase::Touch))
            .await?;

        log.feed_summary(&feed.id, new_articles_count);
        Ok(RefreshOutcome { feed, new_articles_count })
    }
}

#[async_trait]
impl FeedRefresher for RssService {
    async fn refresh_feed(&self, feed_id: &str) -> Result<RefreshOutcome, RefreshError> {
        let log = telemetry::refresh();
        let span = log.root_span_kv([("feed_id", feed_id.to_string())]);
        let result = self.refresh_one(feed_id).instrument(span).await;
        if let Err(e) = &result {
            log.warn_kv("refresh failed", [("feed_id", feed_id.to_string()), ("error", e.to_string())]);
        }
        result
    }

    async fn refresh_all_feeds(&self) -> Result<Vec<FeedRefreshReport>, RefreshError> {
        let log = telemetry::refresh();
        let feeds = self.store.active_feeds().await?;
        let mut reports = Vec::with_capacity(feeds.len());

        for (i, feed) in feeds.iter().enumerate() {
            // spread requests out so upstream servers are not hammered
            if i > 0 && !self.config.refresh_delay.is_zero() {
                tokio::time::sleep(self.config.refresh_delay).await;
            }
            let report = match self.refresh_feed(&feed.id).await {
                Ok(outcome) => FeedRefreshReport::ok(feed, outcome.new_articles_count),
                Err(e) => FeedRefreshReport::failed(feed, e.message().unwrap_or_else(|| "Unknown error".to_string())),
            };
            reports.push(report);
        }

        let ok = reports.iter().filter(|r| r.success).count();
        let new_articles = reports.iter().filter_map(|r| r.new_articles).sum();
        log.totals(ok, reports.len(), new_articles);
        Ok(reports)
    }

    async fn add_feed(&self, url: &str, title: Option<&str>, category: Option<&str>) -> Result<Feed, RefreshError> {
        let log = telemetry::refresh();
        // fetching first doubles as validation
        let parsed = self.fetch_feed(url).await?;
        let new = NewFeed {
            title: title.filter(|t| !t.trim().is_empty()).unwrap_or(&parsed.title),
            url,
            description: &parsed.description,
            category: category.filter(|c| !c.trim().is_empty()).unwrap_or(DEFAULT_CATEGORY),
        };
        let (feed, inserted) = self.store.upsert_feed(&new).await?;
        let new_articles = self
            .process_articles(&feed.id, &parsed.items)
            .instrument(log.span_kv(&RefreshPhase::WriteArticles, [("items", parsed.items.len().to_string())]))
            .await;
        log.info_kv(
            if inserted { "➕ Feed added" } else { "♻️ Feed updated" },
            [("feed_id", feed.id.clone()), ("new_articles", new_articles.to_string())],
        );
        Ok(feed)
    }
}
