use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::routing::{delete, get, post};
use axum::Router;
use clap::Args;
use sqlx::PgPool;

use crate::config::RefreshConfig;
use crate::feed::{FeedCatalog, PgFeedCatalog};
use crate::refresh::{FeedRefresher, RssService};
use crate::telemetry::{self};
use crate::telemetry::ops::serve::Phase as ServePhase;

pub mod error;
pub mod handlers;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

/// Shared for the process lifetime; handlers only read through it.
#[derive(Clone)]
pub struct AppState {
    pub refresher: Arc<dyn FeedRefresher>,
    pub catalog: Arc<dyn FeedCatalog>,
}

impl AppState {
    pub fn new(refresher: Arc<dyn FeedRefresher>, catalog: Arc<dyn FeedCatalog>) -> Self {
        Self { refresher, catalog }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/feeds", get(handlers::list_feeds).post(handlers::add_feed))
        .route("/api/feeds/{id}", delete(handlers::delete_feed))
        .route("/api/feeds/{id}/refresh", post(handlers::refresh_feed))
        .route("/api/refresh", post(handlers::refresh_all))
        .route("/api/articles", get(handlers::list_articles))
        .with_state(state)
}

/// reader serve
#[derive(Args)]
pub struct ServeCmd {
    /// Address to listen on
    #[arg(short = 'i', long, default_value = "0.0.0.0")]
    pub ip: String,

    #[arg(short = 'p', long, default_value_t = 8081)]
    pub port: u16,
}

pub async fn run(pool: &PgPool, args: ServeCmd) -> Result<()> {
    let log = telemetry::serve();
    let addr: SocketAddr = format!("{}:{}", args.ip, args.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", args.ip, args.port))?;

    let refresher = Arc::new(RssService::new(pool.clone(), RefreshConfig::from_env())?);
    let catalog = Arc::new(PgFeedCatalog::new(pool.clone()));
    let app = router(AppState::new(refresher, catalog));

    let listener = {
        let _s = log.span_kv(&ServePhase::Bind, [("addr", addr.to_string())]).entered();
        tokio::net::TcpListener::bind(addr).await.with_context(|| format!("failed to bind {addr}"))?
    };
    log.info(format!("🚀 Listening on http://{}", addr));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    log.info("👋 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        telemetry::serve().warn_kv("ctrl-c handler failed", [("error", e.to_string())]);
    }
}
