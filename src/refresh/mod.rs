use anyhow::{bail, Result};
use async_trait::async_trait;
use clap::Args;
use sqlx::PgPool;

use crate::config::RefreshConfig;
use crate::feed::{db as feed_db, Feed};
use crate::telemetry::{self};
use crate::telemetry::ops::refresh::Phase as RefreshPhase;

mod error;
mod fetch;
pub mod keywords;
mod parse;
mod service;
mod store;
pub mod types;
mod write;

pub use error::RefreshError;
pub use service::RssService;
pub use types::{FeedRefreshReport, RefreshOutcome};

/// The refresh capability: re-fetch feeds and work out which items are new.
#[async_trait]
pub trait FeedRefresher: Send + Sync {
    async fn refresh_feed(&self, feed_id: &str) -> Result<RefreshOutcome, RefreshError>;

    /// Every active feed, one after another. Per-feed failures land in the reports.
    async fn refresh_all_feeds(&self) -> Result<Vec<FeedRefreshReport>, RefreshError>;

    /// Fetch `url` to validate it, store the feed, then ingest its current items.
    async fn add_feed(&self, url: &str, title: Option<&str>, category: Option<&str>) -> Result<Feed, RefreshError>;
}

/// reader refresh [--feed ID] (plan-only without --apply)
#[derive(Args)]
pub struct RefreshCmd {
    /// Refresh only this feed (default: all active feeds)
    #[arg(long)] pub feed: Option<String>,
    #[arg(long, default_value_t = false)] pub apply: bool,
    #[arg(long, default_value_t = 10)] pub plan_limit: usize,
}

pub async fn run(pool: &PgPool, args: RefreshCmd) -> Result<()> {
    let log = telemetry::refresh();
    let _g = log.root_span_kv([
        ("apply", args.apply.to_string()),
        ("feed", format!("{:?}", args.feed)),
        ("plan_limit", args.plan_limit.to_string()),
    ]).entered();

    let targets: Vec<Feed> = match args.feed.as_deref() {
        Some(id) => match feed_db::get_feed(pool, id).await? {
            Some(f) => vec![f],
            None => bail!("Feed not found: {}", id),
        },
        None => feed_db::active_feeds(pool).await?,
    };

    if !args.apply {
        let _s = log.span(&RefreshPhase::Plan).entered();
        if telemetry::config::json_mode() {
            use types::{FeedSample, RefreshPlan};
            let sample_feeds = targets.iter().take(args.plan_limit)
                .map(|f| FeedSample { feed_id: f.id.clone(), title: f.title.clone(), url: f.url.clone() })
                .collect();
            log.plan(&RefreshPlan { feeds: targets.len(), sample_feeds })?;
        } else {
            log.info(format!("📝 Refresh plan — feeds={}", targets.len()));
            for f in targets.iter().take(args.plan_limit) { log.info(format!("  [{}] {} <{}>", f.id, f.title, f.url)); }
            if targets.len() > args.plan_limit { log.info(format!("  ... ({} more)", targets.len() - args.plan_limit)); }
            log.info("   Use --apply to execute.");
        }
        return Ok(());
    }

    let service = RssService::new(pool.clone(), RefreshConfig::from_env())?;
    let results = match args.feed.as_deref() {
        Some(id) => match service.refresh_feed(id).await {
            Ok(outcome) => vec![FeedRefreshReport::ok(&outcome.feed, outcome.new_articles_count)],
            Err(e) => bail!("{}", e),
        },
        None => service.refresh_all_feeds().await?,
    };

    for r in &results {
        match (&r.error, r.new_articles) {
            (Some(err), _) => log.error_kv("❌ refresh failed", [("feed_id", r.feed_id.clone()), ("error", err.clone())]),
            (None, n) => log.info(format!("✅ {} — new_articles={}", r.feed_title, n.unwrap_or(0))),
        }
    }

    if telemetry::config::json_mode() {
        let total_new_articles = results.iter().filter_map(|r| r.new_articles).sum();
        log.result(&types::RefreshApply { total_new_articles, results })?;
    }
    Ok(())
}
