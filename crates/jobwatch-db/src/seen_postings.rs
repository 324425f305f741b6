//! Database operations for `seen_postings`.
//!
//! Every category shares one table with a `UNIQUE (category, posting_id)`
//! constraint. Writes go through `ON CONFLICT DO NOTHING` so a duplicate
//! insert never aborts the surrounding transaction.

use chrono::{DateTime, Utc};
use jobwatch_core::{Category, InsertOutcome, SeenPosting};
use sqlx::{PgConnection, PgPool};

use crate::DbError;

/// A row from the `seen_postings` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SeenPostingRow {
    pub id: i64,
    /// The [`Category::key`] the posting was announced under.
    pub category: String,
    pub posting_id: String,
    pub title: String,
    pub company_name: String,
    pub company_url: String,
    pub application_url: String,
    pub location: String,
    pub created_at: DateTime<Utc>,
}

/// Returns `true` if `posting_id` is already recorded for `category`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn seen_posting_exists(
    conn: &mut PgConnection,
    category: Category,
    posting_id: &str,
) -> Result<bool, DbError> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS ( \
             SELECT 1 FROM seen_postings WHERE category = $1 AND posting_id = $2 \
         )",
    )
    .bind(category.key())
    .bind(posting_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(exists)
}

/// Inserts a seen-posting row unless `(category, posting_id)` already exists.
///
/// Returns [`InsertOutcome::Duplicate`] when the uniqueness constraint turned
/// the insert into a no-op, including when a concurrent transaction committed
/// the same key first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_seen_posting(
    conn: &mut PgConnection,
    record: &SeenPosting,
) -> Result<InsertOutcome, DbError> {
    let inserted: Option<i64> = sqlx::query_scalar::<_, i64>(
        "INSERT INTO seen_postings \
             (category, posting_id, title, company_name, company_url, application_url, location) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) \
         ON CONFLICT (category, posting_id) DO NOTHING \
         RETURNING id",
    )
    .bind(record.category.key())
    .bind(&record.posting_id)
    .bind(&record.title)
    .bind(&record.company_name)
    .bind(&record.company_url)
    .bind(&record.application_url)
    .bind(&record.location)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(if inserted.is_some() {
        InsertOutcome::Inserted
    } else {
        InsertOutcome::Duplicate
    })
}

/// Returns the most recent `limit` postings recorded for `category`, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_seen_postings(
    pool: &PgPool,
    category: Category,
    limit: i64,
) -> Result<Vec<SeenPostingRow>, DbError> {
    let rows = sqlx::query_as::<_, SeenPostingRow>(
        "SELECT id, category, posting_id, title, company_name, company_url, \
                application_url, location, created_at \
         FROM seen_postings \
         WHERE category = $1 \
         ORDER BY created_at DESC, id DESC \
         LIMIT $2",
    )
    .bind(category.key())
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Counts the postings recorded for `category`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_seen_postings(pool: &PgPool, category: Category) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM seen_postings WHERE category = $1",
    )
    .bind(category.key())
    .fetch_one(pool)
    .await?;

    Ok(count)
}
