//! The polling loop: categories are processed one at a time in configured
//! order, with a fixed pause between them, forever.

use std::sync::Arc;
use std::time::Duration;

use jobwatch_core::{
    Catalog, Category, CategoryRule, ConfigError, GlobalRules, NotificationSink, PostingSource,
    SeenStore,
};
use tokio::sync::watch;

use crate::filter::filter;
use crate::publish::publish;
use crate::rotation::RotationState;

/// One enabled category and its rotation cursor.
#[derive(Debug, Clone)]
pub struct Slot {
    pub rule: CategoryRule,
    pub rotation: RotationState,
}

/// What happened to one category during one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryReport {
    pub category: Category,
    pub search_term: String,
    pub fetched: usize,
    pub accepted: usize,
    pub published: usize,
    pub source_failed: bool,
}

/// The categories visited in one pass over the rotation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RotationReport {
    pub categories: Vec<CategoryReport>,
    /// Shutdown was requested before every category was visited.
    pub interrupted: bool,
}

impl RotationReport {
    #[must_use]
    pub fn published(&self) -> usize {
        self.categories.iter().map(|c| c.published).sum()
    }
}

struct Adapters<P, S, N> {
    source: P,
    store: S,
    sink: N,
}

impl<P, S, N> Adapters<P, S, N>
where
    P: PostingSource,
    S: SeenStore,
    N: NotificationSink,
{
    async fn run_slot(&self, globals: &GlobalRules, slot: &mut Slot) -> CategoryReport {
        let category = slot.rule.category;
        let search_term = slot.rotation.next_term().to_owned();
        let query = slot.rule.query.query_for(&search_term);

        tracing::info!(%category, search_term = %search_term, "scheduler: running category");

        let (fetched, source_failed) = match self.source.fetch(&query).await {
            Ok(postings) => (postings, false),
            Err(e) => {
                tracing::warn!(
                    %category,
                    search_term = %search_term,
                    error = %e,
                    "scheduler: source unavailable, treating as no postings"
                );
                (Vec::new(), true)
            }
        };
        let fetched_count = fetched.len();

        let accepted = filter(fetched, &slot.rule, globals);
        let outcome = publish(&self.store, &self.sink, &slot.rule, &accepted).await;

        slot.rotation.advance();

        let report = CategoryReport {
            category,
            search_term,
            fetched: fetched_count,
            accepted: accepted.len(),
            published: outcome.published(),
            source_failed,
        };
        tracing::info!(
            %category,
            fetched = report.fetched,
            accepted = report.accepted,
            published = report.published,
            duplicates = outcome.duplicates,
            "scheduler: category done"
        );
        report
    }
}

/// Drives every enabled category through fetch, filter and publish.
pub struct Scheduler<P, S, N> {
    adapters: Adapters<P, S, N>,
    catalog: Arc<Catalog>,
    slots: Vec<Slot>,
    delay: Duration,
}

impl<P, S, N> Scheduler<P, S, N>
where
    P: PostingSource,
    S: SeenStore,
    N: NotificationSink,
{
    /// Builds one slot per enabled category, in catalog order, each starting
    /// at its first search term.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if a category has no search terms.
    pub fn new(
        source: P,
        store: S,
        sink: N,
        catalog: Arc<Catalog>,
        delay: Duration,
    ) -> Result<Self, ConfigError> {
        let slots = catalog
            .iter()
            .map(|rule| {
                Ok(Slot {
                    rotation: RotationState::new(rule.query.terms.clone())?,
                    rule: rule.clone(),
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;
        Ok(Self {
            adapters: Adapters {
                source,
                store,
                sink,
            },
            catalog,
            slots,
            delay,
        })
    }

    #[must_use]
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Runs one step for `category`: fetch with the current rotation term,
    /// filter, publish, then advance the rotation whatever the outcome.
    ///
    /// Returns `None` if `category` is not enabled.
    pub async fn run_category(&mut self, category: Category) -> Option<CategoryReport> {
        let slot = self
            .slots
            .iter_mut()
            .find(|slot| slot.rule.category == category)?;
        Some(self.adapters.run_slot(&self.catalog.globals, slot).await)
    }

    /// Visits every slot once, pausing between categories.
    ///
    /// Shutdown is checked before each category and cuts the pause short. A
    /// category that has started always finishes.
    pub async fn run_rotation(&mut self, shutdown: &mut watch::Receiver<bool>) -> RotationReport {
        let mut report = RotationReport::default();

        for slot in &mut self.slots {
            if shutdown_requested(shutdown) {
                report.interrupted = true;
                break;
            }
            report
                .categories
                .push(self.adapters.run_slot(&self.catalog.globals, slot).await);

            if pause(self.delay, shutdown).await {
                report.interrupted = true;
                break;
            }
        }
        report
    }

    /// Repeats [`Self::run_rotation`] until shutdown is requested.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(
            categories = self.slots.len(),
            delay_secs = self.delay.as_secs(),
            "scheduler: starting"
        );
        let mut rotations: u64 = 0;
        loop {
            let report = self.run_rotation(&mut shutdown).await;
            rotations += 1;
            tracing::info!(
                rotation = rotations,
                categories = report.categories.len(),
                published = report.published(),
                "scheduler: rotation complete"
            );
            if report.interrupted || shutdown_requested(&shutdown) {
                break;
            }
        }
        tracing::info!(rotations, "scheduler: stopped");
    }
}

/// A closed channel counts as a shutdown request.
fn shutdown_requested(shutdown: &watch::Receiver<bool>) -> bool {
    *shutdown.borrow() || shutdown.has_changed().is_err()
}

/// Sleeps for `delay`; returns `true` if shutdown was requested meanwhile.
async fn pause(delay: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    if shutdown_requested(shutdown) {
        return true;
    }
    tokio::select! {
        () = tokio::time::sleep(delay) => {}
        _ = shutdown.changed() => {}
    }
    shutdown_requested(shutdown)
}
