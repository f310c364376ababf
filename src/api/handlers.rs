use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;
use tracing::Instrument;

use crate::telemetry::{self};
use crate::telemetry::ops::serve::Phase as ServePhase;

use super::error::{ApiError, ApiResult};
use super::types::{AddFeedRequest, ArticleListing, ArticlesParams, Deleted, FeedCreated, FeedListing, Refreshed, RefreshedAll};
use super::AppState;

pub const REFRESH_FALLBACK: &str = "Failed to refresh feed";
const REFRESH_ALL_FALLBACK: &str = "Failed to refresh feeds";
const LIST_FALLBACK: &str = "Failed to fetch feeds";
const ADD_FALLBACK: &str = "Failed to add feed";
const DELETE_FALLBACK: &str = "Failed to delete feed";
const ARTICLES_FALLBACK: &str = "Failed to fetch articles";

/// `POST /api/feeds/{id}/refresh`
///
/// Every failure, a bad path included, is a 500 carrying the error's message.
pub async fn refresh_feed(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<Refreshed>> {
    let log = telemetry::serve();
    let feed_id = match path {
        Ok(Path(id)) => id,
        Err(rejection) => {
            let reason = rejection.body_text();
            log.error_kv("Error refreshing feed", [("error", reason.clone())]);
            return Err(ApiError::internal_or(Some(reason), REFRESH_FALLBACK));
        }
    };

    let span = log.span_kv(&ServePhase::Request, [("route", "refresh_feed".to_string()), ("feed_id", feed_id.clone())]);
    match state.refresher.refresh_feed(&feed_id).instrument(span).await {
        Ok(outcome) => Ok(Json(Refreshed::from(&outcome))),
        Err(err) => {
            log.error_kv("Error refreshing feed", [("feed_id", feed_id), ("error", err.to_string())]);
            Err(ApiError::internal_or(err.message(), REFRESH_FALLBACK))
        }
    }
}

/// `POST /api/refresh`
pub async fn refresh_all(State(state): State<AppState>) -> ApiResult<Json<RefreshedAll>> {
    let log = telemetry::serve();
    let span = log.span_kv(&ServePhase::Request, [("route", "refresh_all".to_string())]);
    match state.refresher.refresh_all_feeds().instrument(span).await {
        Ok(reports) => Ok(Json(RefreshedAll::from_reports(reports))),
        Err(err) => {
            log.error_kv("Error refreshing feeds", [("error", err.to_string())]);
            Err(ApiError::internal(REFRESH_ALL_FALLBACK))
        }
    }
}

/// `GET /api/feeds`: active feeds with counts and newest articles.
pub async fn list_feeds(State(state): State<AppState>) -> ApiResult<Json<FeedListing>> {
    let log = telemetry::serve();
    match state.catalog.list_feeds(Some(true)).await {
        Ok(feeds) => Ok(Json(FeedListing { success: true, feeds })),
        Err(err) => {
            log.error_kv("Error fetching feeds", [("error", format!("{err:#}"))]);
            Err(ApiError::internal(LIST_FALLBACK))
        }
    }
}

/// `GET /api/articles?feedId=&category=&limit=&offset=`
pub async fn list_articles(
    State(state): State<AppState>,
    params: Result<Query<ArticlesParams>, QueryRejection>,
) -> ApiResult<Json<ArticleListing>> {
    let log = telemetry::serve();
    let filter = match params {
        Ok(Query(p)) => p.into(),
        Err(rejection) => {
            log.error_kv("Error fetching articles", [("error", rejection.body_text())]);
            return Err(ApiError::internal(ARTICLES_FALLBACK));
        }
    };
    match state.catalog.list_articles(&filter).await {
        Ok(page) => Ok(Json(ArticleListing { success: true, articles: page.articles, pagination: page.pagination })),
        Err(err) => {
            log.error_kv("Error fetching articles", [("error", format!("{err:#}"))]);
            Err(ApiError::internal(ARTICLES_FALLBACK))
        }
    }
}

/// `POST /api/feeds` with `{url, title?, category?}`.
pub async fn add_feed(
    State(state): State<AppState>,
    body: Result<Json<AddFeedRequest>, JsonRejection>,
) -> ApiResult<Json<FeedCreated>> {
    let log = telemetry::serve();
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => {
            let reason = rejection.body_text();
            log.error_kv("Error adding feed", [("error", reason.clone())]);
            return Err(ApiError::internal_or(Some(reason), ADD_FALLBACK));
        }
    };
    let Some(url) = req.url.as_deref().map(str::trim).filter(|u| !u.is_empty()) else {
        return Err(ApiError::bad_request("URL is required"));
    };

    let span = log.span_kv(&ServePhase::Request, [("route", "add_feed".to_string()), ("url", url.to_string())]);
    match state
        .refresher
        .add_feed(url, req.title.as_deref(), req.category.as_deref())
        .instrument(span)
        .await
    {
        Ok(feed) => Ok(Json(FeedCreated::from(feed))),
        Err(err) => {
            log.error_kv("Error adding feed", [("url", url.to_string()), ("error", err.to_string())]);
            Err(ApiError::internal_or(err.message(), ADD_FALLBACK))
        }
    }
}

/// `DELETE /api/feeds/{id}`; an unknown id is a failure like any other.
pub async fn delete_feed(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<Deleted>> {
    let log = telemetry::serve();
    let Ok(Path(feed_id)) = path else { return Err(ApiError::internal(DELETE_FALLBACK)) };
    match state.catalog.delete_feed(&feed_id).await {
        Ok(true) => Ok(Json(Deleted { success: true, message: "Feed deleted successfully" })),
        Ok(false) => {
            log.error_kv("Error deleting feed", [("feed_id", feed_id), ("error", "not found".to_string())]);
            Err(ApiError::internal(DELETE_FALLBACK))
        }
        Err(err) => {
            log.error_kv("Error deleting feed", [("feed_id", feed_id), ("error", format!("{err:#}"))]);
            Err(ApiError::internal(DELETE_FALLBACK))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{state_with, StubCatalog};
    use crate::feed::Feed;
    use crate::refresh::{RefreshError, RefreshOutcome};
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use serde_json::{json, Value};

    async fn read(resp: Response) -> (StatusCode, Value) {
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn refresh(state: AppState, id: &str) -> (StatusCode, Value) {
        read(refresh_feed(State(state), Ok(Path(id.to_string()))).await.into_response()).await
    }

    fn tech_news(id: &str) -> Result<RefreshOutcome, RefreshError> {
        assert_eq!(id, "42");
        Ok(RefreshOutcome { feed: Feed::fixture(id, "Tech News"), new_articles_count: 3 })
    }

    #[tokio::test]
    async fn success_reports_title_and_count() {
        let (status, body) = refresh(state_with(tech_news), "42").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true, "message": "Refreshed feed: Tech News", "newArticles": 3}));
    }

    #[tokio::test]
    async fn title_is_copied_verbatim() {
        fn odd(id: &str) -> Result<RefreshOutcome, RefreshError> {
            Ok(RefreshOutcome { feed: Feed::fixture(id, "  «Ünïcode» & <tags>  "), new_articles_count: 0 })
        }
        let (status, body) = refresh(state_with(odd), "x").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Refreshed feed:   «Ünïcode» & <tags>  ");
        assert_eq!(body["newArticles"], 0);
    }

    #[tokio::test]
    async fn error_message_is_surfaced_with_500() {
        fn missing(_: &str) -> Result<RefreshOutcome, RefreshError> {
            Err(RefreshError::Fetch("connection refused".into()))
        }
        let (status, body) = refresh(state_with(missing), "missing").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"success": false, "error": "Failed to fetch RSS feed: connection refused"}));
    }

    #[tokio::test]
    async fn not_found_is_still_500() {
        fn missing(_: &str) -> Result<RefreshOutcome, RefreshError> { Err(RefreshError::NotFound) }
        let (status, body) = refresh(state_with(missing), "missing").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"success": false, "error": "Feed not found"}));
    }

    #[tokio::test]
    async fn messageless_error_uses_fallback() {
        fn opaque(_: &str) -> Result<RefreshOutcome, RefreshError> { Err(RefreshError::Unspecified) }
        let (status, body) = refresh(state_with(opaque), "7").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"success": false, "error": "Failed to refresh feed"}));
    }

    #[tokio::test]
    async fn database_errors_surface_their_text() {
        fn db(_: &str) -> Result<RefreshOutcome, RefreshError> { Err(RefreshError::Database(sqlx::Error::PoolTimedOut)) }
        let (_, body) = refresh(state_with(db), "7").await;
        assert_eq!(body["error"], sqlx::Error::PoolTimedOut.to_string());
        assert_eq!(body["success"], false);
        assert!(body.get("newArticles").is_none());
    }

    #[tokio::test]
    async fn refresh_all_summarizes_reports() {
        let resp = refresh_all(State(state_with(tech_news))).await.into_response();
        let (status, body) = read(resp).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Refreshed 2/3 feeds");
        assert_eq!(body["totalNewArticles"], 2);
        assert_eq!(body["results"][1], json!({"feedId": "b", "feedTitle": "Bravo", "success": false, "error": "Failed to fetch RSS feed: timeout"}));
    }

    #[tokio::test]
    async fn list_feeds_wraps_overviews() {
        let (status, body) = read(list_feeds(State(state_with(tech_news))).await.into_response()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["feeds"][0]["id"], StubCatalog::KNOWN);
        assert_eq!(body["feeds"][0]["articleCount"], 12);
    }

    async fn articles(query: &str) -> (StatusCode, Value) {
        let params: Query<ArticlesParams> = Query::try_from_uri(&format!("/api/articles?{query}").parse().unwrap()).unwrap();
        read(list_articles(State(state_with(tech_news)), Ok(params)).await.into_response()).await
    }

    #[tokio::test]
    async fn list_articles_defaults_to_first_page() {
        let (status, body) = articles("").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["pagination"], json!({"total": StubCatalog::ARTICLE_TOTAL, "limit": 20, "offset": 0, "hasMore": true}));
        assert_eq!(body["articles"][0]["feedTitle"], "Known");
        assert_eq!(body["articles"][0]["keywords"][0], json!({"word": "rust", "frequency": 4}));
    }

    #[tokio::test]
    async fn list_articles_passes_filters_through() {
        let (status, body) = articles("feedId=known&category=tech&limit=10&offset=20").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["pagination"]["hasMore"], false);
        assert_eq!(body["articles"][0]["feedCategory"], "tech");
        assert_eq!(body["articles"][0]["title"], "known #20");
    }

    #[tokio::test]
    async fn list_articles_failure_is_500() {
        let (status, body) = articles(&format!("category={}", StubCatalog::BROKEN)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"success": false, "error": "Failed to fetch articles"}));
    }

    async fn add(req: Value) -> (StatusCode, Value) {
        let req: AddFeedRequest = serde_json::from_value(req).unwrap();
        read(add_feed(State(state_with(tech_news)), Ok(Json(req))).await.into_response()).await
    }

    #[tokio::test]
    async fn add_feed_requires_non_blank_url() {
        let (status, body) = add(json!({"url": "   "})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"success": false, "error": "URL is required"}));
        let (status, _) = add(json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn add_feed_returns_created_feed() {
        let (status, body) = add(json!({"url": "https://blog.test/rss", "category": "technology"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["feed"]["url"], "https://blog.test/rss");
        assert_eq!(body["feed"]["title"], "Parsed Title");
        assert_eq!(body["feed"]["category"], "technology");
        assert_eq!(body["feed"]["description"], "From the channel");
        assert!(body["feed"].get("isActive").is_none());
    }

    #[tokio::test]
    async fn add_feed_failure_carries_message() {
        let (status, body) = add(json!({"url": "https://broken.test/rss"})).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Failed to fetch RSS feed: invalid xml");
    }

    #[tokio::test]
    async fn delete_outcomes() {
        let del = |id: &str| delete_feed(State(state_with(tech_news)), Ok(Path(id.to_string())));
        let (status, body) = read(del(StubCatalog::KNOWN).await.into_response()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true, "message": "Feed deleted successfully"}));

        for id in ["unknown", StubCatalog::BROKEN] {
            let (status, body) = read(del(id).await.into_response()).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            assert_eq!(body, json!({"success": false, "error": "Failed to delete feed"}));
        }
    }
}
