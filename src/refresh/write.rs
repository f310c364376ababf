use sqlx::PgPool;

use super::types::ParsedItem;

/// Insert an article unless its URL is already stored. Returns the new id, `None` when it existed.
pub async fn insert_article(pool: &PgPool, feed_id: &str, item: &ParsedItem) -> sqlx::Result<Option<i64>> {
    sqlx::query_scalar(
        r#"
        INSERT INTO reader.article (feed_id, title, content, summary, url, author, published_at, image_url)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        ON CONFLICT (url) DO NOTHING
        RETURNING article_id
        "#,
    )
    .bind(feed_id)
    .bind(&item.title)
    .bind(&item.content)
    .bind(&item.snippet)
    .bind(&item.link)
    .bind(&item.author)
    .bind(item.pub_date)
    .bind(item.image_url())
    .fetch_optional(pool)
    .await
}

/// Duplicate (article, word) pairs are ignored.
pub async fn insert_keywords(pool: &PgPool, article_id: i64, keywords: &[(String, usize)]) -> sqlx::Result<u64> {
    if keywords.is_empty() { return Ok(0); }
    let words: Vec<String> = keywords.iter().map(|(w, _)| w.clone()).collect();
    let freqs: Vec<i32> = keywords.iter().map(|(_, n)| i32::try_from(*n).unwrap_or(i32::MAX)).collect();
    let res = sqlx::query(
        r#"
        INSERT INTO reader.keyword (article_id, word, frequency)
        SELECT $1, w, f FROM UNNEST($2::text[], $3::int4[]) AS t(w, f)
        ON CONFLICT (article_id, word) DO NOTHING
        "#,
    )
    .bind(article_id)
    .bind(&words)
    .bind(&freqs)
    .execute(pool)
    .await?;
    Ok(res.rows_affected())
}
