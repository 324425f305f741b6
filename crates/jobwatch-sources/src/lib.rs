pub mod client;
pub mod error;
pub mod freelancer;
pub mod normalize;
mod rate_limit;
pub mod types;

pub use client::JobSearchClient;
pub use error::SourceError;
pub use freelancer::{parse_gig_cards, FreelancerClient};
pub use normalize::{normalize_job, normalize_jobs};
pub use types::{ApiJob, SearchJobsResponse};
