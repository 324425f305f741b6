//! In-memory implementations of the port traits for pipeline tests.

#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use jobwatch_core::{
    Announcement, Category, CategoryRule, Destination, GigPosting, GigSource, GigStore,
    GlobalRules, InsertOutcome, NotificationSink, PostingSource, QueryPlan, RawPosting,
    SearchQuery, SeenBatch, SeenPosting, SeenStore, TermSet,
};

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct FakeError(pub &'static str);

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

pub fn posting(id: &str, title: &str, company: &str) -> RawPosting {
    RawPosting {
        id: id.to_owned(),
        title: title.to_owned(),
        company: company.to_owned(),
        company_url: format!("https://{}.example", company.to_lowercase().replace(' ', "")),
        location: "Remote".to_owned(),
        job_url: format!("https://jobs.example/{id}"),
    }
}

pub fn rule(category: Category, terms: &[&str], required: &[&str], quarantine: &[&str]) -> CategoryRule {
    CategoryRule {
        category,
        display_name: category.key().to_owned(),
        destination: Destination::new(format!("https://discord.test/{}", category.key())),
        query: QueryPlan {
            terms: terms.iter().map(|t| (*t).to_owned()).collect(),
            location: "United States, Remote".to_owned(),
            sites: vec!["linkedin".to_owned()],
            results_wanted: 50,
            hours_old: 24,
        },
        required_terms: TermSet::new(required),
        quarantine_terms: TermSet::new(quarantine),
    }
}

pub fn globals(blacklist: &[&str], bad_roles: &[&str]) -> GlobalRules {
    GlobalRules {
        blacklist: blacklist.iter().map(|s| (*s).to_owned()).collect(),
        bad_role_terms: TermSet::new(bad_roles),
    }
}

// ---------------------------------------------------------------------------
// PostingSource
// ---------------------------------------------------------------------------

/// Replays scripted responses in order; empty once the script runs out.
#[derive(Clone, Default)]
pub struct ScriptedSource {
    responses: Arc<Mutex<VecDeque<Result<Vec<RawPosting>, FakeError>>>>,
    queries: Arc<Mutex<Vec<SearchQuery>>>,
}

impl ScriptedSource {
    pub fn push_ok(&self, postings: Vec<RawPosting>) {
        self.responses.lock().unwrap().push_back(Ok(postings));
    }

    pub fn push_err(&self, message: &'static str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(FakeError(message)));
    }

    pub fn search_terms(&self) -> Vec<String> {
        self.queries
            .lock()
            .unwrap()
            .iter()
            .map(|q| q.search_term.clone())
            .collect()
    }
}

impl PostingSource for ScriptedSource {
    type Error = FakeError;

    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<RawPosting>, FakeError> {
        self.queries.lock().unwrap().push(query.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

// ---------------------------------------------------------------------------
// SeenStore
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct MemoryStore {
    committed: Arc<Mutex<Vec<SeenPosting>>>,
    fail_commit: Arc<AtomicBool>,
    fail_insert: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn set_fail_commit(&self, fail: bool) {
        self.fail_commit.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_insert(&self, fail: bool) {
        self.fail_insert.store(fail, Ordering::SeqCst);
    }

    pub fn records(&self) -> Vec<SeenPosting> {
        self.committed.lock().unwrap().clone()
    }

    pub fn count(&self, category: Category) -> usize {
        self.committed
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.category == category)
            .count()
    }
}

pub struct MemoryBatch {
    store: MemoryStore,
    staged: Vec<SeenPosting>,
}

impl MemoryBatch {
    fn contains(&self, category: Category, posting_id: &str) -> bool {
        let hit = |r: &SeenPosting| r.category == category && r.posting_id == posting_id;
        self.staged.iter().any(hit) || self.store.committed.lock().unwrap().iter().any(hit)
    }
}

impl SeenStore for MemoryStore {
    type Error = FakeError;
    type Batch = MemoryBatch;

    async fn begin(&self) -> Result<MemoryBatch, FakeError> {
        Ok(MemoryBatch {
            store: self.clone(),
            staged: Vec::new(),
        })
    }
}

impl SeenBatch for MemoryBatch {
    type Error = FakeError;

    async fn exists(&mut self, category: Category, posting_id: &str) -> Result<bool, FakeError> {
        Ok(self.contains(category, posting_id))
    }

    async fn insert(&mut self, record: &SeenPosting) -> Result<InsertOutcome, FakeError> {
        if self.store.fail_insert.load(Ordering::SeqCst) {
            return Err(FakeError("insert failed"));
        }
        if self.contains(record.category, &record.posting_id) {
            return Ok(InsertOutcome::Duplicate);
        }
        self.staged.push(record.clone());
        Ok(InsertOutcome::Inserted)
    }

    async fn commit(self) -> Result<(), FakeError> {
        if self.store.fail_commit.load(Ordering::SeqCst) {
            return Err(FakeError("commit failed"));
        }
        self.store.committed.lock().unwrap().extend(self.staged);
        Ok(())
    }

    async fn rollback(self) -> Result<(), FakeError> {
        Ok(())
    }
}

/// A store whose `exists` always answers "absent", so only the insert's
/// uniqueness check can catch duplicates.
#[derive(Clone, Default)]
pub struct BlindExistsStore {
    pub inner: MemoryStore,
}

pub struct BlindBatch(MemoryBatch);

impl SeenStore for BlindExistsStore {
    type Error = FakeError;
    type Batch = BlindBatch;

    async fn begin(&self) -> Result<BlindBatch, FakeError> {
        Ok(BlindBatch(self.inner.begin().await?))
    }
}

impl SeenBatch for BlindBatch {
    type Error = FakeError;

    async fn exists(&mut self, _category: Category, _posting_id: &str) -> Result<bool, FakeError> {
        Ok(false)
    }

    async fn insert(&mut self, record: &SeenPosting) -> Result<InsertOutcome, FakeError> {
        self.0.insert(record).await
    }

    async fn commit(self) -> Result<(), FakeError> {
        self.0.commit().await
    }

    async fn rollback(self) -> Result<(), FakeError> {
        self.0.rollback().await
    }
}

// ---------------------------------------------------------------------------
// NotificationSink
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct RecordingSink {
    sent: Arc<Mutex<Vec<(String, Announcement)>>>,
    fail: Arc<AtomicBool>,
}

impl RecordingSink {
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<(String, Announcement)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn titles(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, a)| a.title().to_owned())
            .collect()
    }
}

impl NotificationSink for RecordingSink {
    type Error = FakeError;

    async fn send(
        &self,
        destination: &Destination,
        announcement: &Announcement,
    ) -> Result<(), FakeError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(FakeError("webhook down"));
        }
        self.sent
            .lock()
            .unwrap()
            .push((destination.as_str().to_owned(), announcement.clone()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Gig ports
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct FixedGigSource {
    pub gigs: Vec<GigPosting>,
    pub fail: bool,
}

impl GigSource for FixedGigSource {
    type Error = FakeError;

    async fn fetch_gigs(&self) -> Result<Vec<GigPosting>, FakeError> {
        if self.fail {
            Err(FakeError("board down"))
        } else {
            Ok(self.gigs.clone())
        }
    }
}

#[derive(Clone, Default)]
pub struct MemoryGigStore {
    links: Arc<Mutex<HashSet<String>>>,
    fail_link: Option<String>,
}

impl MemoryGigStore {
    pub fn failing_on(link: &str) -> Self {
        Self {
            links: Arc::default(),
            fail_link: Some(link.to_owned()),
        }
    }

    pub fn len(&self) -> usize {
        self.links.lock().unwrap().len()
    }
}

impl GigStore for MemoryGigStore {
    type Error = FakeError;

    async fn record_if_new(&self, gig: &GigPosting) -> Result<InsertOutcome, FakeError> {
        if self.fail_link.as_deref() == Some(gig.link.as_str()) {
            return Err(FakeError("insert failed"));
        }
        Ok(if self.links.lock().unwrap().insert(gig.link.clone()) {
            InsertOutcome::Inserted
        } else {
            InsertOutcome::Duplicate
        })
    }
}
