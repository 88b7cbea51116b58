//! podcrawl CLI
//!
//! Crawls the episode catalog into a data directory and serves it.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use podcrawl::{
    error::{AppError, Result},
    models::Config,
    pipeline,
    utils::http::HttpFetcher,
};
use tokio_util::sync::CancellationToken;

/// podcrawl - Episode Catalog Harvester
#[derive(Parser, Debug)]
#[command(name = "podcrawl", version, about = "Episode catalog harvester")]

struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "podcrawl.toml")]
    config: PathBuf,

    /// Data directory for sidecars and media (overrides config)
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl listing pages and download every episode
    Crawl {
        /// Number of listing pages to crawl (overrides config)
        #[arg(short, long)]
        pages: Option<u32>,
    },

    /// Serve the downloaded catalog over HTTP
    #[cfg(feature = "serve")]
    Serve,

    /// Crawl, then serve the resulting catalog
    #[cfg(feature = "serve")]
    Run {
        /// Number of listing pages to crawl (overrides config)
        #[arg(short, long)]
        pages: Option<u32>,
    },

    /// Print the catalog in episode order
    Catalog,

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Token cancelled on Ctrl-C.
fn shutdown_token() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                log::warn!("Interrupt received, finishing in-flight episodes...");
                trigger.cancel();
            }
            Err(e) => log::warn!("Cannot listen for Ctrl-C: {}", e),
        }
    });
    token
}

fn ensure_data_dir(config: &Config) -> Result<()> {
    std::fs::create_dir_all(&config.paths.data_dir).map_err(|e| {
        AppError::config(format!(
            "Cannot create data directory {}: {}",
            config.paths.data_dir.display(),
            e
        ))
    })
}

async fn crawl(config: Arc<Config>, cancel: CancellationToken) -> Result<()> {
    let fetcher = Arc::new(HttpFetcher::new(&config.crawler)?);
    let pages = config.site.pages;
    let outcome = pipeline::run_crawler(config, fetcher, pages, cancel).await?;

    if outcome.cancelled > 0 {
        log::warn!("{} episodes were not started", outcome.cancelled);
    }
    Ok(())
}

#[cfg(feature = "serve")]
async fn serve(config: &Config, cancel: CancellationToken) -> Result<()> {
    let episodes = pipeline::load_episodes(config)?;
    pipeline::run_server(config, &episodes, cancel).await
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("podcrawl starting...");

    let mut config = Config::load_or_default(&cli.config);
    if let Some(dir) = cli.data_dir {
        config.paths.data_dir = dir;
    }

    match cli.command {
        Command::Crawl { pages } => {
            if let Some(pages) = pages {
                config.site.pages = pages;
            }
            config.validate()?;
            ensure_data_dir(&config)?;
            crawl(Arc::new(config), shutdown_token()).await?;
        }

        #[cfg(feature = "serve")]
        Command::Serve => {
            config.validate()?;
            ensure_data_dir(&config)?;
            serve(&config, shutdown_token()).await?;
        }

        #[cfg(feature = "serve")]
        Command::Run { pages } => {
            if let Some(pages) = pages {
                config.site.pages = pages;
            }
            config.validate()?;
            ensure_data_dir(&config)?;

            let cancel = shutdown_token();
            let config = Arc::new(config);

            log::info!("Step 1/2: Crawling...");
            crawl(Arc::clone(&config), cancel.clone()).await?;

            if cancel.is_cancelled() {
                log::warn!("Crawl interrupted, not starting the server");
                return Ok(());
            }

            log::info!("Step 2/2: Serving...");
            serve(&config, cancel).await?;
        }

        Command::Catalog => {
            pipeline::run_load(&config)?;
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK ({} pages from {})", config.site.pages, config.site.base_url);
        }
    }

    log::info!("Done!");

    Ok(())
}
