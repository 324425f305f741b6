pub mod app_config;
pub mod categories;
pub mod config;
pub mod ports;
pub mod postings;
pub mod terms;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use categories::{
    load_catalog, parse_catalog, Catalog, Category, CategoryRule, Destination, GlobalRules,
    QueryPlan,
};
pub use config::{load_app_config, load_app_config_from_env};
pub use ports::{
    GigSource, GigStore, InsertOutcome, NotificationSink, PostingSource, SeenBatch, SeenStore,
};
pub use postings::{
    Announcement, GigAnnouncement, GigPosting, JobAnnouncement, RawPosting, SearchQuery,
    SeenPosting,
};
pub use terms::TermSet;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read categories file {path}: {source}")]
    CategoriesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse categories file: {0}")]
    CategoriesFileParse(#[from] serde_yaml::Error),

    #[error("category '{category}' has no destination: {var} is not set")]
    MissingDestination { category: String, var: String },

    #[error("categories validation error: {0}")]
    Validation(String),
}
