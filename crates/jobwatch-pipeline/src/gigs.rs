//! Freelance gig stage: every new listing is recorded by link and announced.
//! No keyword rules apply to gigs.

use jobwatch_core::{
    Announcement, Destination, GigAnnouncement, GigSource, GigStore, InsertOutcome,
    NotificationSink,
};

/// Fetches the board once and announces gigs whose link has not been seen.
///
/// Returns the number of gigs newly recorded. Fetch and store errors are
/// logged; a store error skips only the gig it happened on.
pub async fn publish_gigs<G, S, N>(
    source: &G,
    store: &S,
    sink: &N,
    destination: &Destination,
) -> usize
where
    G: GigSource,
    S: GigStore,
    N: NotificationSink,
{
    let gigs = match source.fetch_gigs().await {
        Ok(gigs) => gigs,
        Err(e) => {
            tracing::warn!(error = %e, "gigs: board unavailable");
            return 0;
        }
    };
    tracing::info!(count = gigs.len(), "gigs: fetched board");

    let mut recorded = 0;
    for gig in &gigs {
        match store.record_if_new(gig).await {
            Ok(InsertOutcome::Inserted) => {
                recorded += 1;
                let announcement = Announcement::Gig(GigAnnouncement::from(gig));
                match sink.send(destination, &announcement).await {
                    Ok(()) => tracing::info!(title = %gig.title, "gigs: posted gig"),
                    Err(e) => tracing::warn!(
                        title = %gig.title,
                        error = %e,
                        "gigs: delivery failed, record kept"
                    ),
                }
            }
            Ok(InsertOutcome::Duplicate) => {
                tracing::debug!(link = %gig.link, "gigs: already recorded");
            }
            Err(e) => {
                tracing::error!(link = %gig.link, error = %e, "gigs: store error, skipping");
            }
        }
    }
    recorded
}
