//! Posting records that flow between sources, the store, and sinks.

use crate::categories::Category;

/// A job posting as returned by a source adapter.
///
/// `id` is the dedup key and must be stable across fetches of the same live
/// posting. Optional text (employer URL, location) is `""` when the source
/// did not provide it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPosting {
    pub id: String,
    pub title: String,
    pub company: String,
    pub company_url: String,
    pub location: String,
    pub job_url: String,
}

/// Parameters for one source fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub search_term: String,
    pub location: String,
    pub results_wanted: u32,
    pub hours_old: u32,
    pub sites: Vec<String>,
}

/// A posting recorded as announced for one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeenPosting {
    pub category: Category,
    pub posting_id: String,
    pub title: String,
    pub company_name: String,
    pub company_url: String,
    pub application_url: String,
    pub location: String,
}

impl SeenPosting {
    #[must_use]
    pub fn from_raw(category: Category, posting: &RawPosting) -> Self {
        Self {
            category,
            posting_id: posting.id.clone(),
            title: posting.title.clone(),
            company_name: posting.company.clone(),
            company_url: posting.company_url.clone(),
            application_url: posting.job_url.clone(),
            location: posting.location.clone(),
        }
    }
}

/// A listing from the freelance board. `link` is the dedup key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GigPosting {
    pub title: String,
    pub link: String,
    pub description: Option<String>,
}

/// The five mandatory fields of a job announcement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobAnnouncement {
    pub company: String,
    pub company_url: String,
    pub title: String,
    pub application_url: String,
    pub location: String,
}

impl From<&RawPosting> for JobAnnouncement {
    fn from(posting: &RawPosting) -> Self {
        Self {
            company: posting.company.clone(),
            company_url: posting.company_url.clone(),
            title: posting.title.clone(),
            application_url: posting.job_url.clone(),
            location: posting.location.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GigAnnouncement {
    pub title: String,
    pub link: String,
    pub description: Option<String>,
}

impl From<&GigPosting> for GigAnnouncement {
    fn from(gig: &GigPosting) -> Self {
        Self {
            title: gig.title.clone(),
            link: gig.link.clone(),
            description: gig.description.clone(),
        }
    }
}

/// Structured content handed to a notification sink. Rendering is the sink's concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Announcement {
    Job(JobAnnouncement),
    Gig(GigAnnouncement),
}

impl Announcement {
    /// Short human-readable label for log lines.
    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            Announcement::Job(job) => &job.title,
            Announcement::Gig(gig) => &gig.title,
        }
    }
}
