use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use sqlx::PgPool;
use url::Url;

use crate::config::RefreshConfig;
use crate::refresh::{FeedRefresher, RssService};
use crate::telemetry::{self};
use crate::telemetry::ops::feed::Phase as FeedPhase;

pub mod catalog;
pub mod db;
pub mod types;

pub use catalog::{FeedCatalog, PgFeedCatalog};
pub use types::Feed;

/// reader feed add/ls/rm/articles
#[derive(Args)]
pub struct FeedCmd {
    #[command(subcommand)]
    pub cmd: FeedSub,
}

#[derive(Subcommand)]
pub enum FeedSub {
    /// Add a feed; fetches it once to validate and ingest its current items (plan-only without --apply)
    Add {
        url: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long, default_value_t = false)]
        apply: bool,
    },
    /// List feeds
    Ls {
        /// Filter by active status: true/false. Omit to show all.
        #[arg(long)]
        active: Option<bool>,
    },
    /// List stored articles, newest first, with their top keywords
    Articles {
        #[arg(long)]
        feed: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        limit: Option<i64>,
        #[arg(long)]
        offset: Option<i64>,
    },
    /// Remove a feed and its articles (plan-only without --apply)
    Rm {
        feed_id: String,
        #[arg(long, default_value_t = false)]
        apply: bool,
    },
}

pub async fn run(pool: &PgPool, args: FeedCmd) -> Result<()> {
    let log = telemetry::feed();
    let _g = log.root_span().entered();
    match args.cmd {
        FeedSub::Add { url, title, category, apply } => add_feed(pool, url, title, category, apply).await?,
        FeedSub::Ls { active } => ls_feeds(pool, active).await?,
        FeedSub::Articles { feed, category, limit, offset } => {
            ls_articles(pool, types::ArticleFilter::new(feed, category, limit, offset)).await?
        }
        FeedSub::Rm { feed_id, apply } => rm_feed(pool, feed_id, apply).await?,
    }
    Ok(())
}

async fn add_feed(pool: &PgPool, url: String, title: Option<String>, category: Option<String>, apply: bool) -> Result<()> {
    let log = telemetry::feed();
    let _g = log.root_span_kv([
        ("mode", if apply { "apply".to_string() } else { "plan".to_string() }),
        ("url", url.clone()),
        ("title", format!("{:?}", title)),
        ("category", format!("{:?}", category)),
    ]).entered();

    // URL validation (friendly error before network I/O)
    if Url::parse(&url).is_err() { bail!("Invalid URL: {}", url); }

    if !apply {
        let _s = log.span(&FeedPhase::Plan).entered();
        log.info(format!("📝 Feed plan — add url={} title={:?} category={:?}", url, title, category));
        log.info("   Use --apply to execute.");
        if telemetry::config::json_mode() {
            let plan = types::FeedAddPlan { action: "add", url, title, category };
            log.plan(&plan)?;
        }
        return Ok(());
    }
    let _s = log.span(&FeedPhase::Add).entered();
    let service = RssService::new(pool.clone(), RefreshConfig::from_env())?;
    let feed = service.add_feed(&url, title.as_deref(), category.as_deref()).await?;
    log.info(format!("➕ Feed added: [{}] {}", feed.id, feed.title));
    if telemetry::config::json_mode() {
        log.result(&feed)?;
    }
    Ok(())
}

async fn ls_feeds(pool: &PgPool, active: Option<bool>) -> Result<()> {
    let log = telemetry::feed();
    let _g = log.root_span_kv([("active", format!("{:?}", active))]).entered();
    let _s = log.span(&FeedPhase::List).entered();
    let feeds = PgFeedCatalog::new(pool.clone()).list_feeds(active).await?;
    log.info("📡 Feeds:");
    for row in &feeds {
        log.info(format!(
            "[{}] {} <{}> category={} active={} articles={} last_fetched={:?}",
            row.feed.id, row.feed.title, row.feed.url, row.feed.category, row.feed.is_active, row.article_count, row.feed.last_fetched
        ));
    }
    if telemetry::config::json_mode() {
        let list = types::FeedList { feeds };
        log.result(&list)?;
    }
    Ok(())
}

async fn ls_articles(pool: &PgPool, filter: types::ArticleFilter) -> Result<()> {
    let log = telemetry::feed();
    let _g = log.root_span_kv([
        ("feed", format!("{:?}", filter.feed_id)),
        ("category", format!("{:?}", filter.category)),
        ("limit", filter.limit.to_string()),
        ("offset", filter.offset.to_string()),
    ]).entered();
    let _s = log.span(&FeedPhase::Articles).entered();
    let page = PgFeedCatalog::new(pool.clone()).list_articles(&filter).await?;
    log.info(format!("📰 Articles {}-{} of {}", filter.offset + 1, filter.offset + page.articles.len() as i64, page.pagination.total));
    for a in &page.articles {
        let words: Vec<&str> = a.keywords.iter().map(|k| k.word.as_str()).collect();
        log.info(format!("[{}] {} ({}) {} keywords={}", a.id, a.title, a.feed_title, a.published_at.format("%Y-%m-%d"), words.join(",")));
    }
    if page.pagination.has_more { log.info("   More available: raise --offset."); }
    if telemetry::config::json_mode() {
        log.result(&page)?;
    }
    Ok(())
}

async fn rm_feed(pool: &PgPool, feed_id: String, apply: bool) -> Result<()> {
    let log = telemetry::feed();
    let _g = log.root_span_kv([
        ("mode", if apply { "apply".to_string() } else { "plan".to_string() }),
        ("feed_id", feed_id.clone()),
    ]).entered();

    let Some(feed) = db::get_feed(pool, &feed_id).await? else { bail!("Feed not found: {}", feed_id) };

    if !apply {
        let _s = log.span(&FeedPhase::Plan).entered();
        log.info(format!("📝 Feed plan — remove [{}] {} <{}>", feed.id, feed.title, feed.url));
        log.info("   Use --apply to execute.");
        if telemetry::config::json_mode() {
            log.plan(&types::FeedRemovePlan { action: "remove", feed })?;
        }
        return Ok(());
    }
    let _s = log.span(&FeedPhase::Remove).entered();
    let deleted = PgFeedCatalog::new(pool.clone()).delete_feed(&feed_id).await?;
    if deleted { log.info("🗑️ Feed removed"); } else { log.warn("Feed vanished before delete"); }
    if telemetry::config::json_mode() {
        log.result(&types::FeedRemoveResult { deleted, feed_id })?;
    }
    Ok(())
}
