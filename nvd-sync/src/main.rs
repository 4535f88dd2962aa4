use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use domain_db::{cve_sources::nist, db};
use dotenvy::dotenv;
use env_logger::Env;

mod configuration;

use crate::configuration::DatabaseSettings;

fn main() -> Result<()> {
    let opts = Opts::parse();

    dotenv().ok();

    // Repository
    let repository = {
        let db_settings = DatabaseSettings::try_from_env()?;

        db::PostgresRepository::new(&db_settings.connection_string())
            .context("Cannot connect to database")?
    };

    // Setup logger
    {
        #[cfg(debug_assertions)]
        let default_env_filter = "debug";
        #[cfg(not(debug_assertions))]
        let default_env_filter = "info";

        let env = Env::default().default_filter_or(default_env_filter);
        env_logger::Builder::from_env(env)
            .try_init()
            .context("Failed to setup logger")?;
    }

    // Check for pending migrations
    if repository.any_pending_migrations()? {
        if opts.migrate {
            repository.run_pending_migrations()?;
            log::info!("Migration successfully")
        } else {
            log::error!("Migration needed");
            std::process::exit(1)
        }
    }

    match opts.cmd {
        Commands::Sync {
            page_size,
            request_interval,
            endpoint,
        } => {
            let client = nist::FeedClient::new(endpoint)?;
            let options = nist::import::SyncOptions {
                page_size,
                request_interval: Duration::from_secs(request_interval),
            };

            let report = nist::import::run(&repository, &client, &options)?;

            log::info!(
                "synced {} records over {} pages ({} metric entries skipped)",
                report.records,
                report.pages,
                report.skipped_metrics
            );
        }
    }

    Ok(())
}

#[derive(Parser)]
#[command(author, version, about)]
#[command(disable_help_subcommand = true)]
struct Opts {
    /// Migrate database
    #[arg(short = 'm', long = "migrate")]
    migrate: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Synchronizes the local store against the NVD CVE API feed
    #[command(name = "sync")]
    Sync {
        /// Requested page size; the feed's returned page size is authoritative
        #[arg(short = 'p', long = "page-size", default_value_t = nist::DEFAULT_PAGE_SIZE)]
        page_size: u32,

        /// Minimum seconds between feed requests
        #[arg(long = "request-interval", default_value_t = nist::DEFAULT_REQUEST_INTERVAL.as_secs())]
        request_interval: u64,

        /// Feed endpoint
        #[arg(long = "endpoint", default_value_t = String::from(nist::DEFAULT_ENDPOINT))]
        endpoint: String,
    },
}
