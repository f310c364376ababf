use std::env;
use std::time::Duration;

const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 20;
const DEFAULT_REFRESH_DELAY_MS: u64 = 1000;

/// Knobs for fetching feeds, read from the environment (and `.env`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefreshConfig {
    pub fetch_timeout: Duration,
    /// Pause between feeds when refreshing all of them.
    pub refresh_delay: Duration,
    pub user_agent: String,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        RefreshConfig {
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            refresh_delay: Duration::from_millis(DEFAULT_REFRESH_DELAY_MS),
            user_agent: default_user_agent(),
        }
    }
}

impl RefreshConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| env::var(k).ok())
    }

    fn from_lookup<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let secs = parse_u64(get("READER_FETCH_TIMEOUT_SECS")).unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS);
        let delay_ms = parse_u64(get("READER_REFRESH_DELAY_MS")).unwrap_or(DEFAULT_REFRESH_DELAY_MS);
        let user_agent = get("READER_USER_AGENT")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(default_user_agent);
        RefreshConfig {
            fetch_timeout: Duration::from_secs(secs.max(1)),
            refresh_delay: Duration::from_millis(delay_ms),
            user_agent,
        }
    }
}

fn parse_u64(v: Option<String>) -> Option<u64> {
    v.and_then(|s| s.trim().parse().ok())
}

fn default_user_agent() -> String {
    format!("feed-refresher/{}", env!("CARGO_PKG_VERSION"))
}
