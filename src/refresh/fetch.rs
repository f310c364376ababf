use bytes::Bytes;
use reqwest::Client;

use crate::config::RefreshConfig;

pub fn build_client(cfg: &RefreshConfig) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(cfg.fetch_timeout)
        .user_agent(cfg.user_agent.as_str())
        .build()
}

/// GET the feed document; non-2xx statuses are errors.
pub async fn fetch_rss(client: &Client, url: &str) -> reqwest::Result<Bytes> {
    let resp = client.get(url).send().await?.error_for_status()?;
    resp.bytes().await
}
