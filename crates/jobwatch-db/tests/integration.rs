//! Offline unit tests for jobwatch-db pool configuration and row types.
//! These tests do not require a live database connection.

use jobwatch_core::{AppConfig, Environment};
use jobwatch_db::{FreelancePostingRow, PoolConfig, SeenPostingRow};
use std::path::PathBuf;

fn app_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        log_level: "info".to_string(),
        categories_path: PathBuf::from("./config/categories.yaml"),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        search_api_url: "http://localhost:8000".to_string(),
        source_request_timeout_secs: 60,
        source_user_agent: "ua".to_string(),
        source_max_retries: 2,
        source_retry_backoff_base_secs: 5,
        inter_category_delay_secs: 10,
        notify_timeout_secs: 5,
        notify_max_retries: 3,
        freelancer_url: "https://www.freelancer.com/jobs".to_string(),
        freelancer_cron: "0 * * * * *".to_string(),
        freelancer_webhook_url: None,
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let pool_config = PoolConfig::from_app_config(&app_config());
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

/// Compile-time smoke test: confirm that [`SeenPostingRow`] has all expected
/// fields with the correct types. No database required.
#[test]
fn seen_posting_row_has_expected_fields() {
    use chrono::Utc;

    let row = SeenPostingRow {
        id: 1_i64,
        category: "full-time".to_string(),
        posting_id: "li-123".to_string(),
        title: "Software Engineer".to_string(),
        company_name: "Acme".to_string(),
        company_url: String::new(),
        application_url: "https://jobs.example/123".to_string(),
        location: "Remote".to_string(),
        created_at: Utc::now(),
    };

    assert_eq!(row.category, "full-time");
    assert!(row.company_url.is_empty());
}

#[test]
fn freelance_posting_row_allows_missing_description() {
    use chrono::Utc;

    let row = FreelancePostingRow {
        id: 1_i64,
        link: "https://www.freelancer.com/projects/x".to_string(),
        title: "Build a site".to_string(),
        description: None,
        created_at: Utc::now(),
    };

    assert!(row.description.is_none());
}
