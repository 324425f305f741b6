//! Subcommand handlers. Each one owns its setup (pool, catalog, adapters)
//! so commands that need no database never connect to one.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use jobwatch_core::{AppConfig, Catalog, Category, Destination, NotificationSink};
use jobwatch_db::{PgGigStore, PgSeenStore, PoolConfig};
use jobwatch_notify::{DiscordWebhookSink, LogSink};
use jobwatch_pipeline::{publish_gigs, Scheduler};
use jobwatch_sources::{FreelancerClient, JobSearchClient};
use sqlx::PgPool;
use tokio::sync::watch;

use crate::jobs::{build_job_scheduler, GigTask};

/// Placeholder destination used when `--dry-run` is set and a webhook
/// variable is missing.
const DRY_RUN_DESTINATION: &str = "dry-run";

pub(crate) fn load_catalog(config: &AppConfig, dry_run: bool) -> anyhow::Result<Catalog> {
    let catalog = jobwatch_core::load_catalog(&config.categories_path, |var| {
        match std::env::var(var) {
            Ok(value) if !value.trim().is_empty() => Ok(value),
            _ if dry_run => Ok(DRY_RUN_DESTINATION.to_string()),
            other => other,
        }
    })
    .with_context(|| {
        format!(
            "failed to load categories from {}",
            config.categories_path.display()
        )
    })?;
    Ok(catalog)
}

async fn connect(config: &AppConfig) -> anyhow::Result<PgPool> {
    let pool = jobwatch_db::connect_pool(&config.database_url, PoolConfig::from_app_config(config))
        .await
        .context("failed to connect to database")?;
    let applied = jobwatch_db::run_migrations(&pool).await?;
    if applied > 0 {
        tracing::info!(applied, "applied database migrations");
    }
    Ok(pool)
}

fn job_search_client(config: &AppConfig) -> anyhow::Result<JobSearchClient> {
    Ok(JobSearchClient::new(
        &config.search_api_url,
        config.source_request_timeout_secs,
        &config.source_user_agent,
        config.source_max_retries,
        config.source_retry_backoff_base_secs,
    )?)
}

fn freelancer_client(config: &AppConfig) -> anyhow::Result<FreelancerClient> {
    Ok(FreelancerClient::new(
        &config.freelancer_url,
        config.source_request_timeout_secs,
        &config.source_user_agent,
        config.source_max_retries,
        config.source_retry_backoff_base_secs,
    )?)
}

fn webhook_sink(config: &AppConfig) -> anyhow::Result<DiscordWebhookSink> {
    Ok(DiscordWebhookSink::new(
        config.notify_timeout_secs,
        config.notify_max_retries,
    )?)
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

pub(crate) async fn run(config: AppConfig, dry_run: bool) -> anyhow::Result<()> {
    let catalog = Arc::new(load_catalog(&config, dry_run)?);
    let pool = connect(&config).await?;

    if dry_run {
        serve(config, catalog, pool, LogSink).await
    } else {
        let sink = webhook_sink(&config)?;
        serve(config, catalog, pool, sink).await
    }
}

async fn serve<N>(
    config: AppConfig,
    catalog: Arc<Catalog>,
    pool: PgPool,
    sink: N,
) -> anyhow::Result<()>
where
    N: NotificationSink + Clone + 'static,
{
    tracing::info!(
        env = %config.env,
        categories = catalog.len(),
        "jobwatch starting"
    );

    let mut scheduler = Scheduler::new(
        job_search_client(&config)?,
        PgSeenStore::new(pool.clone()),
        sink.clone(),
        catalog,
        Duration::from_secs(config.inter_category_delay_secs),
    )?;

    let mut cron = match &config.freelancer_webhook_url {
        Some(url) => {
            let task = GigTask {
                source: freelancer_client(&config)?,
                store: PgGigStore::new(pool.clone()),
                sink,
                destination: Destination::new(url.clone()),
            };
            Some(build_job_scheduler(&config.freelancer_cron, task).await?)
        }
        None => {
            tracing::info!("JOBWATCH_FREELANCER_WEBHOOK_URL not set; gig job disabled");
            None
        }
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut loop_handle = tokio::spawn(async move { scheduler.run(shutdown_rx).await });

    tokio::select! {
        () = crate::shutdown_signal() => {}
        result = &mut loop_handle => {
            tracing::error!(?result, "scheduler loop exited unexpectedly");
        }
    }

    // Receiver may already be gone if the loop exited on its own.
    let _ = shutdown_tx.send(true);
    if !loop_handle.is_finished() {
        if let Err(e) = loop_handle.await {
            tracing::error!(error = %e, "scheduler loop task failed");
        }
    }

    if let Some(cron) = cron.as_mut() {
        if let Err(e) = cron.shutdown().await {
            tracing::warn!(error = %e, "cron scheduler shutdown failed");
        }
    }
    pool.close().await;
    tracing::info!("jobwatch stopped");
    Ok(())
}

// ---------------------------------------------------------------------------
// once / gigs-once
// ---------------------------------------------------------------------------

pub(crate) async fn once(config: &AppConfig, category: Category, dry_run: bool) -> anyhow::Result<()> {
    let catalog = Arc::new(load_catalog(config, dry_run)?);
    if catalog.rule(category).is_none() {
        anyhow::bail!("category '{category}' is not enabled in the categories file");
    }
    let pool = connect(config).await?;

    let report = if dry_run {
        run_single(config, catalog, &pool, LogSink, category).await?
    } else {
        run_single(config, catalog, &pool, webhook_sink(config)?, category).await?
    };
    pool.close().await;

    println!(
        "{}: term \"{}\", fetched {}, accepted {}, published {}{}",
        report.category,
        report.search_term,
        report.fetched,
        report.accepted,
        report.published,
        if report.source_failed {
            " (source unavailable)"
        } else {
            ""
        }
    );
    Ok(())
}

async fn run_single<N>(
    config: &AppConfig,
    catalog: Arc<Catalog>,
    pool: &PgPool,
    sink: N,
    category: Category,
) -> anyhow::Result<jobwatch_pipeline::CategoryReport>
where
    N: NotificationSink,
{
    let mut scheduler = Scheduler::new(
        job_search_client(config)?,
        PgSeenStore::new(pool.clone()),
        sink,
        catalog,
        Duration::ZERO,
    )?;
    scheduler
        .run_category(category)
        .await
        .with_context(|| format!("category '{category}' is not enabled"))
}

pub(crate) async fn gigs_once(config: &AppConfig, dry_run: bool) -> anyhow::Result<()> {
    let destination = match (&config.freelancer_webhook_url, dry_run) {
        (Some(url), _) => Destination::new(url.clone()),
        (None, true) => Destination::new(DRY_RUN_DESTINATION),
        (None, false) => anyhow::bail!("JOBWATCH_FREELANCER_WEBHOOK_URL is not set"),
    };
    let pool = connect(config).await?;
    let source = freelancer_client(config)?;
    let store = PgGigStore::new(pool.clone());

    let recorded = if dry_run {
        publish_gigs(&source, &store, &LogSink, &destination).await
    } else {
        publish_gigs(&source, &store, &webhook_sink(config)?, &destination).await
    };
    pool.close().await;

    println!("freelancer: {recorded} new gig(s)");
    Ok(())
}

// ---------------------------------------------------------------------------
// migrate / check-config / history
// ---------------------------------------------------------------------------

pub(crate) async fn migrate(config: &AppConfig) -> anyhow::Result<()> {
    let pool = jobwatch_db::connect_pool(&config.database_url, PoolConfig::from_app_config(config))
        .await
        .context("failed to connect to database")?;
    let applied = jobwatch_db::run_migrations(&pool).await?;
    pool.close().await;
    println!("applied {applied} migration(s)");
    Ok(())
}

pub(crate) fn check_config(config: &AppConfig) -> anyhow::Result<()> {
    let catalog = load_catalog(config, false)?;

    println!("environment: {}", config.env);
    println!("categories file: {}", config.categories_path.display());
    println!(
        "globals: {} blacklisted employers, {} bad-role terms",
        catalog.globals.blacklist.len(),
        catalog.globals.bad_role_terms.len()
    );
    for rule in catalog.iter() {
        println!(
            "  {:<18} {:<28} terms: {} ({}h, {} results, sites: {})",
            rule.category.key(),
            rule.display_name,
            rule.query.terms.join(" | "),
            rule.query.hours_old,
            rule.query.results_wanted,
            rule.query.sites.join(","),
        );
    }
    println!(
        "gig job: {}",
        if config.freelancer_webhook_url.is_some() {
            format!("enabled ({})", config.freelancer_cron)
        } else {
            "disabled".to_string()
        }
    );
    Ok(())
}

pub(crate) async fn history(config: &AppConfig, category: Category, limit: i64) -> anyhow::Result<()> {
    if limit <= 0 {
        anyhow::bail!("--limit must be positive");
    }
    let pool = jobwatch_db::connect_pool(&config.database_url, PoolConfig::from_app_config(config))
        .await
        .context("failed to connect to database")?;
    let total = jobwatch_db::count_seen_postings(&pool, category).await?;
    let rows = jobwatch_db::list_seen_postings(&pool, category, limit).await?;
    pool.close().await;

    println!("{category}: {total} recorded, showing {}", rows.len());
    for row in rows {
        println!(
            "{}  {:<40}  {:<24}  {}",
            row.created_at.format("%Y-%m-%d %H:%M"),
            row.title,
            row.company_name,
            row.application_url
        );
    }
    Ok(())
}
