//! Conversion from API rows to [`jobwatch_core::RawPosting`].

use jobwatch_core::RawPosting;

use crate::types::ApiJob;

/// Converts one API row into a [`RawPosting`].
///
/// Returns `None` when the row lacks an `id`, `title` or `job_url`, since
/// such a row can be neither deduplicated nor announced. Missing employer
/// name, employer URL and location become `""`.
#[must_use]
pub fn normalize_job(job: ApiJob) -> Option<RawPosting> {
    let id = non_blank(job.id)?;
    let title = non_blank(job.title)?;
    let job_url = non_blank(job.job_url)?;

    Some(RawPosting {
        id,
        title,
        company: non_blank(job.company).unwrap_or_default(),
        company_url: non_blank(job.company_url).unwrap_or_default(),
        location: non_blank(job.location).unwrap_or_default(),
        job_url,
    })
}

/// Normalizes every row, dropping (and logging) the unusable ones.
#[must_use]
pub fn normalize_jobs(jobs: Vec<ApiJob>) -> Vec<RawPosting> {
    let total = jobs.len();
    let postings: Vec<RawPosting> = jobs.into_iter().filter_map(normalize_job).collect();
    let dropped = total - postings.len();
    if dropped > 0 {
        tracing::debug!(
            dropped,
            total,
            "source: dropped rows missing id, title or job_url"
        );
    }
    postings
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
