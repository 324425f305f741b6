//! Cron-driven background jobs.
//!
//! The category rotation runs on its own task; only the freelance board
//! poll is cron-scheduled.

use std::sync::Arc;

use jobwatch_core::{Destination, NotificationSink};
use jobwatch_db::PgGigStore;
use jobwatch_pipeline::publish_gigs;
use jobwatch_sources::FreelancerClient;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Everything one gig poll needs.
pub(crate) struct GigTask<N> {
    pub(crate) source: FreelancerClient,
    pub(crate) store: PgGigStore,
    pub(crate) sink: N,
    pub(crate) destination: Destination,
}

impl<N: NotificationSink> GigTask<N> {
    async fn run_once(&self) -> usize {
        publish_gigs(&self.source, &self.store, &self.sink, &self.destination).await
    }
}

/// Builds and starts a [`JobScheduler`] with the gig poll registered on
/// `cron`.
///
/// The returned handle must be kept alive; call `shutdown` on it to stop.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised, the
/// cron expression is invalid, or the scheduler fails to start.
pub(crate) async fn build_job_scheduler<N>(
    cron: &str,
    task: GigTask<N>,
) -> Result<JobScheduler, JobSchedulerError>
where
    N: NotificationSink + 'static,
{
    let scheduler = JobScheduler::new().await?;
    register_gig_job(&scheduler, cron, Arc::new(task)).await?;
    scheduler.start().await?;
    Ok(scheduler)
}

async fn register_gig_job<N>(
    scheduler: &JobScheduler,
    cron: &str,
    task: Arc<GigTask<N>>,
) -> Result<(), JobSchedulerError>
where
    N: NotificationSink + 'static,
{
    let job = Job::new_async(cron, move |_uuid, _lock| {
        let task = Arc::clone(&task);

        Box::pin(async move {
            tracing::debug!("scheduler: starting freelance board poll");
            let recorded = task.run_once().await;
            tracing::info!(recorded, "scheduler: freelance board poll complete");
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron, "scheduler: registered freelance board job");
    Ok(())
}
