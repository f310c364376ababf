use sqlx::PgPool;

use super::types::{ArticleDetail, ArticleFilter, ArticleSummary, Feed, FeedCountRow, NewFeed};

#[derive(sqlx::FromRow)]
struct UpsertedFeed {
    #[sqlx(flatten)]
    feed: Feed,
    inserted: bool,
}

const FEED_COLUMNS: &str = "feed_id AS id, title, url, description, category, is_active, last_fetched, created_at";

pub async fn get_feed(pool: &PgPool, feed_id: &str) -> sqlx::Result<Option<Feed>> {
    let sql = format!("SELECT {FEED_COLUMNS} FROM reader.feed WHERE feed_id = $1");
    sqlx::query_as::<_, Feed>(&sql)
        .bind(feed_id)
        .fetch_optional(pool)
        .await
}

/// Insert a feed, or refresh its metadata (and reactivate it) when the URL is already tracked.
/// Returns the row and whether it was newly inserted.
pub async fn upsert_feed(pool: &PgPool, new: &NewFeed<'_>) -> sqlx::Result<(Feed, bool)> {
    let sql = format!(
        r#"
        INSERT INTO reader.feed (title, url, description, category, last_fetched)
        VALUES ($1, $2, $3, $4, now())
        ON CONFLICT (url)
        DO UPDATE SET title = EXCLUDED.title,
                      description = EXCLUDED.description,
                      category = EXCLUDED.category,
                      is_active = TRUE,
                      last_fetched = EXCLUDED.last_fetched
        RETURNING {FEED_COLUMNS}, (xmax = 0) AS inserted
        "#
    );
    let row = sqlx::query_as::<_, UpsertedFeed>(&sql)
        .bind(new.title)
        .bind(new.url)
        .bind(new.description)
        .bind(new.category)
        .fetch_one(pool)
        .await?;
    Ok((row.feed, row.inserted))
}

pub async fn list_feeds(pool: &PgPool, active: Option<bool>) -> sqlx::Result<Vec<FeedCountRow>> {
    sqlx::query_as::<_, FeedCountRow>(
        r#"
        SELECT f.feed_id AS id, f.title, f.url, f.description, f.category,
               f.is_active, f.last_fetched, f.created_at,
               (SELECT COUNT(*) FROM reader.article a WHERE a.feed_id = f.feed_id) AS article_count
        FROM reader.feed f
        WHERE ($1::bool IS NULL OR f.is_active = $1)
        ORDER BY f.created_at DESC
        "#,
    )
    .bind(active)
    .fetch_all(pool)
    .await
}

pub async fn active_feeds(pool: &PgPool) -> sqlx::Result<Vec<Feed>> {
    let sql = format!("SELECT {FEED_COLUMNS} FROM reader.feed WHERE is_active = TRUE ORDER BY created_at");
    sqlx::query_as::<_, Feed>(&sql).fetch_all(pool).await
}

/// Newest `per_feed` articles of each listed feed, newest first within a feed.
pub async fn recent_articles(pool: &PgPool, feed_ids: &[String], per_feed: i64) -> sqlx::Result<Vec<ArticleSummary>> {
    sqlx::query_as::<_, ArticleSummary>(
        r#"
        SELECT id, feed_id, title, summary, url, author, published_at, image_url,
               COALESCE(
                   (SELECT array_agg(k.word ORDER BY k.frequency DESC, k.word)
                    FROM reader.keyword k WHERE k.article_id = ranked.id),
                   ARRAY[]::text[]
               ) AS keywords
        FROM (
            SELECT a.article_id AS id, a.feed_id, a.title, a.summary, a.url, a.author,
                   a.published_at, a.image_url,
                   ROW_NUMBER() OVER (PARTITION BY a.feed_id ORDER BY a.published_at DESC) AS rn
            FROM reader.article a
            WHERE a.feed_id = ANY($1)
        ) ranked
        WHERE rn <= $2
        ORDER BY feed_id, published_at DESC
        "#,
    )
    .bind(feed_ids)
    .bind(per_feed)
    .fetch_all(pool)
    .await
}

const ARTICLE_FILTER: &str = "($1::text IS NULL OR a.feed_id = $1) AND ($2::text IS NULL OR f.category = $2)";

/// Newest first, each with its feed and its five most frequent keywords.
pub async fn list_articles(pool: &PgPool, filter: &ArticleFilter) -> sqlx::Result<Vec<ArticleDetail>> {
    let sql = format!(
        r#"
        SELECT a.article_id AS id, a.title, a.summary, a.content, a.url, a.author,
               a.published_at, a.image_url,
               f.title AS feed_title, f.category AS feed_category,
               COALESCE(
                   (SELECT json_agg(json_build_object('word', k.word, 'frequency', k.frequency)
                                    ORDER BY k.frequency DESC, k.word)
                    FROM (SELECT word, frequency FROM reader.keyword
                          WHERE article_id = a.article_id
                          ORDER BY frequency DESC, word
                          LIMIT 5) k),
                   '[]'::json
               ) AS keywords
        FROM reader.article a
        JOIN reader.feed f ON f.feed_id = a.feed_id
        WHERE {ARTICLE_FILTER}
        ORDER BY a.published_at DESC, a.article_id DESC
        LIMIT $3 OFFSET $4
        "#
    );
    sqlx::query_as::<_, ArticleDetail>(&sql)
        .bind(filter.feed_id.as_deref())
        .bind(filter.category.as_deref())
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(pool)
        .await
}

pub async fn count_articles(pool: &PgPool, filter: &ArticleFilter) -> sqlx::Result<i64> {
    let sql = format!(
        "SELECT COUNT(*) FROM reader.article a JOIN reader.feed f ON f.feed_id = a.feed_id WHERE {ARTICLE_FILTER}"
    );
    sqlx::query_scalar::<_, i64>(&sql)
        .bind(filter.feed_id.as_deref())
        .bind(filter.category.as_deref())
        .fetch_one(pool)
        .await
}

pub async fn touch_last_fetched(pool: &PgPool, feed_id: &str) -> sqlx::Result<()> {
    sqlx::query("UPDATE reader.feed SET last_fetched = now() WHERE feed_id = $1")
        .bind(feed_id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Articles and keywords go with the feed (ON DELETE CASCADE).
pub async fn delete_feed(pool: &PgPool, feed_id: &str) -> sqlx::Result<bool> {
    let res = sqlx::query("DELETE FROM reader.feed WHERE feed_id = $1")
        .bind(feed_id)
        .execute(pool)
        .await?;
    Ok(res.rows_affected() == 1)
}
