//! Database operations for `freelance_postings`.

use chrono::{DateTime, Utc};
use jobwatch_core::{GigPosting, InsertOutcome};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `freelance_postings` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FreelancePostingRow {
    pub id: i64,
    pub link: String,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Inserts a gig unless its `link` is already recorded. Runs in its own
/// implicit transaction.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_freelance_posting(
    pool: &PgPool,
    gig: &GigPosting,
) -> Result<InsertOutcome, DbError> {
    let inserted: Option<i64> = sqlx::query_scalar::<_, i64>(
        "INSERT INTO freelance_postings (link, title, description) \
         VALUES ($1, $2, $3) \
         ON CONFLICT (link) DO NOTHING \
         RETURNING id",
    )
    .bind(&gig.link)
    .bind(&gig.title)
    .bind(&gig.description)
    .fetch_optional(pool)
    .await?;

    Ok(if inserted.is_some() {
        InsertOutcome::Inserted
    } else {
        InsertOutcome::Duplicate
    })
}
