use serde::{Deserialize, Serialize};

use crate::feed::types::{ArticleDetail, ArticleFilter, FeedOverview, Pagination};
use crate::feed::Feed;
use crate::refresh::{FeedRefreshReport, RefreshOutcome};

#[derive(Debug, Serialize)]
pub struct Failure {
    pub success: bool,
    pub error: String,
}

/// `POST /api/feeds/{id}/refresh` success body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Refreshed {
    pub success: bool,
    pub message: String,
    pub new_articles: usize,
}

impl From<&RefreshOutcome> for Refreshed {
    fn from(outcome: &RefreshOutcome) -> Self {
        Refreshed {
            success: true,
            message: format!("Refreshed feed: {}", outcome.feed.title),
            new_articles: outcome.new_articles_count,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshedAll {
    pub success: bool,
    pub message: String,
    pub total_new_articles: usize,
    pub results: Vec<FeedRefreshReport>,
}

impl RefreshedAll {
    pub fn from_reports(results: Vec<FeedRefreshReport>) -> Self {
        let ok = results.iter().filter(|r| r.success).count();
        let total_new_articles = results.iter().filter_map(|r| r.new_articles).sum();
        RefreshedAll {
            success: true,
            message: format!("Refreshed {}/{} feeds", ok, results.len()),
            total_new_articles,
            results,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FeedListing {
    pub success: bool,
    pub feeds: Vec<FeedOverview>,
}

/// `GET /api/articles` query string.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ArticlesParams {
    pub feed_id: Option<String>,
    pub category: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl From<ArticlesParams> for ArticleFilter {
    fn from(p: ArticlesParams) -> Self {
        ArticleFilter::new(p.feed_id, p.category, p.limit, p.offset)
    }
}

#[derive(Debug, Serialize)]
pub struct ArticleListing {
    pub success: bool,
    pub articles: Vec<ArticleDetail>,
    pub pagination: Pagination,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AddFeedRequest {
    pub url: Option<String>,
    pub title: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FeedCreated {
    pub success: bool,
    pub feed: CreatedFeed,
}

#[derive(Debug, Serialize)]
pub struct CreatedFeed {
    pub id: String,
    pub title: String,
    pub url: String,
    pub description: Option<String>,
    pub category: String,
}

impl From<Feed> for FeedCreated {
    fn from(f: Feed) -> Self {
        FeedCreated {
            success: true,
            feed: CreatedFeed { id: f.id, title: f.title, url: f.url, description: f.description, category: f.category },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub success: bool,
    pub message: &'static str,
}
