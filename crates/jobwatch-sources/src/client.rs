//! HTTP client for a JobSpy-compatible `search_jobs` endpoint.

use std::time::Duration;

use jobwatch_core::{PostingSource, RawPosting, SearchQuery};
use reqwest::{Client, Url};

use crate::error::SourceError;
use crate::normalize::normalize_jobs;
use crate::rate_limit::retry_with_backoff;
use crate::types::SearchJobsResponse;

const SEARCH_PATH: &str = "api/v1/search_jobs";

/// Client for the job-search API.
///
/// 429, 5xx and transport errors are retried with exponential backoff up to
/// `max_retries` additional attempts. 404, other 4xx and malformed bodies
/// fail immediately.
pub struct JobSearchClient {
    client: Client,
    base_url: Url,
    max_retries: u32,
    /// Base delay in seconds for exponential backoff: `backoff_base_secs * 2^attempt`.
    backoff_base_secs: u64,
}

impl JobSearchClient {
    /// Creates a client rooted at `base_url` (e.g. `http://localhost:8000`).
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::InvalidUrl`] if `base_url` does not parse, or
    /// [`SourceError::Http`] if the underlying `reqwest::Client` cannot be built.
    pub fn new(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
        max_retries: u32,
        backoff_base_secs: u64,
    ) -> Result<Self, SourceError> {
        let base_url = parse_base_url(base_url)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self {
            client,
            base_url,
            max_retries,
            backoff_base_secs,
        })
    }

    /// Runs one search and returns the usable postings in API order.
    ///
    /// # Errors
    ///
    /// - [`SourceError::RateLimited`] after all retries are exhausted.
    /// - [`SourceError::NotFound`] on 404 (not retried).
    /// - [`SourceError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`SourceError::Http`] on network or TLS failure.
    /// - [`SourceError::Deserialize`] if the body does not match the expected shape.
    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<RawPosting>, SourceError> {
        let url = self.search_url(query)?;

        let response = retry_with_backoff(self.max_retries, self.backoff_base_secs, || {
            let url = url.clone();
            async move {
                let response = self.client.get(url.clone()).send().await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    let retry_after_secs = response
                        .headers()
                        .get(reqwest::header::RETRY_AFTER)
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse::<u64>().ok())
                        .unwrap_or(60);
                    return Err(SourceError::RateLimited {
                        url: url.to_string(),
                        retry_after_secs,
                    });
                }

                if status == reqwest::StatusCode::NOT_FOUND {
                    return Err(SourceError::NotFound {
                        url: url.to_string(),
                    });
                }

                if !status.is_success() {
                    return Err(SourceError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: url.to_string(),
                    });
                }

                let body = response.text().await?;
                serde_json::from_str::<SearchJobsResponse>(&body).map_err(|source| {
                    SourceError::Deserialize {
                        context: format!("search_jobs \"{}\"", query.search_term),
                        source,
                    }
                })
            }
        })
        .await?;

        tracing::debug!(
            search_term = %query.search_term,
            reported = ?response.count,
            rows = response.jobs.len(),
            "source: search_jobs returned"
        );

        Ok(normalize_jobs(response.jobs))
    }

    pub(crate) fn search_url(&self, query: &SearchQuery) -> Result<Url, SourceError> {
        let mut url = self
            .base_url
            .join(SEARCH_PATH)
            .map_err(|e| SourceError::InvalidUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            for site in &query.sites {
                pairs.append_pair("site_name", site);
            }
            pairs
                .append_pair("search_term", &query.search_term)
                .append_pair("location", &query.location)
                .append_pair("results_wanted", &query.results_wanted.to_string())
                .append_pair("hours_old", &query.hours_old.to_string());
        }
        Ok(url)
    }
}

impl PostingSource for JobSearchClient {
    type Error = SourceError;

    async fn fetch(&self, query: &SearchQuery) -> Result<Vec<RawPosting>, SourceError> {
        self.search(query).await
    }
}

/// Parses the API base, forcing a trailing slash so `join` appends instead of
/// replacing the last path segment.
fn parse_base_url(base_url: &str) -> Result<Url, SourceError> {
    let trimmed = base_url.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_owned()
    } else {
        format!("{trimmed}/")
    };
    let url = Url::parse(&with_slash).map_err(|e| SourceError::InvalidUrl {
        url: base_url.to_owned(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(SourceError::InvalidUrl {
            url: base_url.to_owned(),
            reason: format!("unsupported scheme {}", url.scheme()),
        });
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> SearchQuery {
        SearchQuery {
            search_term: "machine learning".to_owned(),
            location: "United States, Remote".to_owned(),
            results_wanted: 50,
            hours_old: 24,
            sites: vec!["linkedin".to_owned(), "indeed".to_owned()],
        }
    }

    #[test]
    fn search_url_encodes_every_parameter() {
        let client = JobSearchClient::new("http://search.test:8000", 5, "ua", 0, 0).unwrap();
        let url = client.search_url(&query()).unwrap();

        assert_eq!(url.path(), "/api/v1/search_jobs");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("site_name".to_owned(), "linkedin".to_owned()),
                ("site_name".to_owned(), "indeed".to_owned()),
                ("search_term".to_owned(), "machine learning".to_owned()),
                ("location".to_owned(), "United States, Remote".to_owned()),
                ("results_wanted".to_owned(), "50".to_owned()),
                ("hours_old".to_owned(), "24".to_owned()),
            ]
        );
    }

    #[test]
    fn base_url_path_prefix_is_kept() {
        let client = JobSearchClient::new("https://proxy.test/jobspy", 5, "ua", 0, 0).unwrap();
        let url = client.search_url(&query()).unwrap();
        assert_eq!(url.path(), "/jobspy/api/v1/search_jobs");
    }

    #[test]
    fn rejects_non_http_base_url() {
        let result = JobSearchClient::new("ftp://search.test", 5, "ua", 0, 0);
        assert!(matches!(result, Err(SourceError::InvalidUrl { .. })));
    }
}
