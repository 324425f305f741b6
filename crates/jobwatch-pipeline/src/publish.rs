//! Dedup-and-publish: record each accepted posting once per category and
//! announce the ones that were newly recorded.
//!
//! Delivery is at most once per cycle. A posting counts as announced as soon
//! as its insert succeeds, so a failed send is never retried. If the batch
//! cannot be committed nothing is recorded, and anything already sent from
//! that batch may be announced again on a later cycle.

use jobwatch_core::{
    Announcement, CategoryRule, InsertOutcome, JobAnnouncement, NotificationSink, RawPosting,
    SeenBatch, SeenPosting, SeenStore,
};

/// Counters for one [`publish`] invocation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishOutcome {
    /// Postings newly recorded and handed to the sink.
    pub recorded: usize,
    /// Postings that were already on record (earlier cycle or same fetch).
    pub duplicates: usize,
    /// Sends that failed after a successful insert.
    pub delivery_failures: usize,
    /// The batch was rolled back; nothing from this invocation is durable.
    pub aborted: bool,
}

impl PublishOutcome {
    /// Number of postings newly published. Zero when the batch was aborted.
    #[must_use]
    pub fn published(&self) -> usize {
        if self.aborted {
            0
        } else {
            self.recorded
        }
    }
}

enum Staged {
    Recorded,
    AlreadyRecorded,
}

/// Records and announces `accepted` for `rule.category` in one store batch.
///
/// Store failures abort the whole batch and are logged; they never
/// propagate. Sink failures are logged and leave the record in place.
pub async fn publish<S, N>(
    store: &S,
    sink: &N,
    rule: &CategoryRule,
    accepted: &[RawPosting],
) -> PublishOutcome
where
    S: SeenStore,
    N: NotificationSink,
{
    let category = rule.category;
    let mut outcome = PublishOutcome::default();

    let mut batch = match store.begin().await {
        Ok(batch) => batch,
        Err(e) => {
            tracing::error!(%category, error = %e, "publish: could not open store batch");
            outcome.aborted = true;
            return outcome;
        }
    };

    for posting in accepted {
        let staged = match stage(&mut batch, rule, posting).await {
            Ok(staged) => staged,
            Err(e) => {
                tracing::error!(
                    %category,
                    posting_id = %posting.id,
                    error = %e,
                    "publish: store error, rolling back batch"
                );
                if let Err(rollback_err) = batch.rollback().await {
                    tracing::warn!(%category, error = %rollback_err, "publish: rollback failed");
                }
                outcome.aborted = true;
                return outcome;
            }
        };

        match staged {
            Staged::AlreadyRecorded => {
                outcome.duplicates += 1;
                tracing::info!(
                    %category,
                    posting_id = %posting.id,
                    title = %posting.title,
                    "publish: already recorded, skipping"
                );
            }
            Staged::Recorded => {
                outcome.recorded += 1;
                let announcement = Announcement::Job(JobAnnouncement::from(posting));
                match sink.send(&rule.destination, &announcement).await {
                    Ok(()) => tracing::info!(
                        %category,
                        posting_id = %posting.id,
                        title = %posting.title,
                        "publish: posted job"
                    ),
                    Err(e) => {
                        outcome.delivery_failures += 1;
                        tracing::warn!(
                            %category,
                            posting_id = %posting.id,
                            error = %e,
                            "publish: delivery failed, record kept"
                        );
                    }
                }
            }
        }
    }

    if let Err(e) = batch.commit().await {
        tracing::error!(
            %category,
            error = %e,
            "publish: commit failed, batch discarded"
        );
        outcome.aborted = true;
    }
    outcome
}

async fn stage<B>(batch: &mut B, rule: &CategoryRule, posting: &RawPosting) -> Result<Staged, B::Error>
where
    B: SeenBatch,
{
    if batch.exists(rule.category, &posting.id).await? {
        return Ok(Staged::AlreadyRecorded);
    }
    let record = SeenPosting::from_raw(rule.category, posting);
    Ok(match batch.insert(&record).await? {
        InsertOutcome::Inserted => Staged::Recorded,
        InsertOutcome::Duplicate => Staged::AlreadyRecorded,
    })
}
