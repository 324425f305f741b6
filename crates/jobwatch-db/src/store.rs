//! Postgres implementations of the store ports.

use jobwatch_core::{
    Category, GigPosting, GigStore, InsertOutcome, SeenBatch, SeenPosting, SeenStore,
};
use sqlx::{PgPool, Postgres, Transaction};

use crate::freelance_postings::insert_freelance_posting;
use crate::seen_postings::{insert_seen_posting, seen_posting_exists};
use crate::DbError;

/// Seen-postings store backed by the `seen_postings` table.
#[derive(Debug, Clone)]
pub struct PgSeenStore {
    pool: PgPool,
}

impl PgSeenStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// One publish invocation's transaction. Dropping it without committing rolls back.
pub struct PgSeenBatch {
    tx: Transaction<'static, Postgres>,
}

impl SeenStore for PgSeenStore {
    type Error = DbError;
    type Batch = PgSeenBatch;

    async fn begin(&self) -> Result<PgSeenBatch, DbError> {
        let tx = self.pool.begin().await?;
        Ok(PgSeenBatch { tx })
    }
}

impl SeenBatch for PgSeenBatch {
    type Error = DbError;

    async fn exists(&mut self, category: Category, posting_id: &str) -> Result<bool, DbError> {
        seen_posting_exists(&mut self.tx, category, posting_id).await
    }

    async fn insert(&mut self, record: &SeenPosting) -> Result<InsertOutcome, DbError> {
        insert_seen_posting(&mut self.tx, record).await
    }

    async fn commit(self) -> Result<(), DbError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<(), DbError> {
        self.tx.rollback().await?;
        Ok(())
    }
}

/// Gig store backed by the `freelance_postings` table.
#[derive(Debug, Clone)]
pub struct PgGigStore {
    pool: PgPool,
}

impl PgGigStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl GigStore for PgGigStore {
    type Error = DbError;

    async fn record_if_new(&self, gig: &GigPosting) -> Result<InsertOutcome, DbError> {
        insert_freelance_posting(&self.pool, gig).await
    }
}
