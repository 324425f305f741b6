mod commands;
mod jobs;

use clap::{Parser, Subcommand};
use jobwatch_core::Category;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "jobwatch")]
#[command(about = "Polls job boards and posts new matches to Discord")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the polling loop and the gig job until interrupted (default).
    Run {
        /// Log announcements instead of posting them.
        #[arg(long)]
        dry_run: bool,
    },
    /// Run a single category once and exit.
    Once {
        category: Category,
        #[arg(long)]
        dry_run: bool,
    },
    /// Poll the freelance board once and exit.
    GigsOnce {
        #[arg(long)]
        dry_run: bool,
    },
    /// Apply pending database migrations.
    Migrate,
    /// Validate configuration and the categories file without connecting.
    CheckConfig,
    /// List postings already recorded for a category.
    History {
        category: Category,
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = jobwatch_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command.unwrap_or(Commands::Run { dry_run: false }) {
        Commands::Run { dry_run } => commands::run(config, dry_run).await,
        Commands::Once { category, dry_run } => commands::once(&config, category, dry_run).await,
        Commands::GigsOnce { dry_run } => commands::gigs_once(&config, dry_run).await,
        Commands::Migrate => commands::migrate(&config).await,
        Commands::CheckConfig => commands::check_config(&config),
        Commands::History { category, limit } => commands::history(&config, category, limit).await,
    }
}

/// Resolves when SIGINT or SIGTERM arrives.
pub(crate) async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
