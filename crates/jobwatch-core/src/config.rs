use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

pub(crate) const DEFAULT_FREELANCER_URL: &str =
    "https://www.freelancer.com/jobs/?fixed=true&hourly=true&languages=en";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a pure
/// `HashMap` lookup.
pub(crate) fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("JOBWATCH_ENV", "development"))?;
    let log_level = or_default("JOBWATCH_LOG_LEVEL", "info");
    let categories_path = PathBuf::from(or_default(
        "JOBWATCH_CATEGORIES_PATH",
        "./config/categories.yaml",
    ));

    let db_max_connections = parse_u32("JOBWATCH_DB_MAX_CONNECTIONS", "5")?;
    let db_min_connections = parse_u32("JOBWATCH_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("JOBWATCH_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let search_api_url = or_default("JOBWATCH_SEARCH_API_URL", "http://localhost:8000");
    let source_request_timeout_secs = parse_u64("JOBWATCH_SOURCE_REQUEST_TIMEOUT_SECS", "60")?;
    let source_user_agent = or_default("JOBWATCH_SOURCE_USER_AGENT", "jobwatch/0.1 (job-alerts)");
    let source_max_retries = parse_u32("JOBWATCH_SOURCE_MAX_RETRIES", "2")?;
    let source_retry_backoff_base_secs =
        parse_u64("JOBWATCH_SOURCE_RETRY_BACKOFF_BASE_SECS", "5")?;

    let inter_category_delay_secs = parse_u64("JOBWATCH_INTER_CATEGORY_DELAY_SECS", "10")?;

    let notify_timeout_secs = parse_u64("JOBWATCH_NOTIFY_TIMEOUT_SECS", "5")?;
    let notify_max_retries = parse_u32("JOBWATCH_NOTIFY_MAX_RETRIES", "3")?;

    let freelancer_url = or_default("JOBWATCH_FREELANCER_URL", DEFAULT_FREELANCER_URL);
    let freelancer_cron = or_default("JOBWATCH_FREELANCER_CRON", "0 * * * * *");
    let freelancer_webhook_url = lookup("JOBWATCH_FREELANCER_WEBHOOK_URL")
        .ok()
        .filter(|v| !v.trim().is_empty());

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        categories_path,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        search_api_url,
        source_request_timeout_secs,
        source_user_agent,
        source_max_retries,
        source_retry_backoff_base_secs,
        inter_category_delay_secs,
        notify_timeout_secs,
        notify_max_retries,
        freelancer_url,
        freelancer_cron,
        freelancer_webhook_url,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for unrecognized values.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "JOBWATCH_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
