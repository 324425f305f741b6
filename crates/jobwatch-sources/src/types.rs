//! Response types for a JobSpy-compatible `search_jobs` endpoint.
//!
//! The API serialises the scraper's dataframe row by row. Observed quirks:
//! - `id` is a string like `"li-3912345678"` on most boards but some
//!   deployments emit a bare number.
//! - Any text column may be `null` when the board did not expose it
//!   (`company_url` and `location` most often).
//! - Extra columns (`description`, `min_amount`, `date_posted`, ...) vary by
//!   version and are ignored.

use serde::{Deserialize, Deserializer};

/// Top-level response from `GET /api/v1/search_jobs`.
#[derive(Debug, Deserialize)]
pub struct SearchJobsResponse {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub jobs: Vec<ApiJob>,
}

/// One row of the search result.
#[derive(Debug, Default, Deserialize)]
pub struct ApiJob {
    #[serde(default, deserialize_with = "string_or_number")]
    pub id: Option<String>,
    #[serde(default)]
    pub site: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub company_url: Option<String>,
    #[serde(default)]
    pub job_url: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
    }))
}
