//! Boundaries between the pipeline and its external collaborators.
//!
//! The pipeline only sees these traits; the Postgres store, the HTTP source
//! clients and the webhook sink implement them in their own crates. Futures
//! are required to be `Send` so the scheduler can run on a spawned task.

use std::future::Future;

use crate::categories::{Category, Destination};
use crate::postings::{Announcement, GigPosting, RawPosting, SearchQuery, SeenPosting};

/// Result of an atomic insert-or-reject against a uniqueness constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// The key was already recorded (by an earlier cycle, an earlier row in
    /// the same batch, or a concurrent writer).
    Duplicate,
}

/// Fetches raw postings for one query. A failure means the source was
/// unavailable for this cycle.
pub trait PostingSource: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn fetch(
        &self,
        query: &SearchQuery,
    ) -> impl Future<Output = Result<Vec<RawPosting>, Self::Error>> + Send;
}

/// Per-category record of announced postings.
pub trait SeenStore: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;
    type Batch: SeenBatch<Error = Self::Error> + Send;

    /// Open a batch; nothing written through it is durable until [`SeenBatch::commit`].
    fn begin(&self) -> impl Future<Output = Result<Self::Batch, Self::Error>> + Send;
}

pub trait SeenBatch {
    type Error;

    fn exists(
        &mut self,
        category: Category,
        posting_id: &str,
    ) -> impl Future<Output = Result<bool, Self::Error>> + Send;

    /// Insert unless `(category, posting_id)` is already present.
    fn insert(
        &mut self,
        record: &SeenPosting,
    ) -> impl Future<Output = Result<InsertOutcome, Self::Error>> + Send;

    fn commit(self) -> impl Future<Output = Result<(), Self::Error>> + Send;

    fn rollback(self) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// Delivers an announcement to a destination. Rendering is up to the sink.
pub trait NotificationSink: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn send(
        &self,
        destination: &Destination,
        announcement: &Announcement,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}

/// Fetches listings from the freelance board.
pub trait GigSource: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn fetch_gigs(&self) -> impl Future<Output = Result<Vec<GigPosting>, Self::Error>> + Send;
}

/// Record of announced freelance gigs, keyed by link. Each call commits on its own.
pub trait GigStore: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    fn record_if_new(
        &self,
        gig: &GigPosting,
    ) -> impl Future<Output = Result<InsertOutcome, Self::Error>> + Send;
}
