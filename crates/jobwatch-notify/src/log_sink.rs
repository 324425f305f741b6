use std::convert::Infallible;

use jobwatch_core::{Announcement, Destination, NotificationSink};

use crate::render::{gig_payload, job_markdown, JOB_EMOJIS};

/// Dry-run sink: logs what would have been posted and never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl NotificationSink for LogSink {
    type Error = Infallible;

    async fn send(
        &self,
        _destination: &Destination,
        announcement: &Announcement,
    ) -> Result<(), Infallible> {
        let title = announcement.title();
        match announcement {
            Announcement::Job(job) => {
                tracing::info!(
                    %title,
                    company = %job.company,
                    "dry-run: would post job\n{}",
                    job_markdown(job, JOB_EMOJIS[0])
                );
            }
            Announcement::Gig(gig) => {
                let payload = gig_payload(gig);
                tracing::info!(
                    %title,
                    link = %gig.link,
                    embeds = payload.embeds.len(),
                    "dry-run: would post gig"
                );
            }
        }
        Ok(())
    }
}
