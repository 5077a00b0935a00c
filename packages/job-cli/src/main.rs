//! Job Journal CLI
//!
//! Runs the extraction pipeline against a live URL or a saved page, through
//! the same relay → content path the extension uses, and prints the
//! resulting job data as JSON.

mod fetch;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use job_extraction::{
    Acceptance, ExtractionConfig, InMemoryBrowser, JobDataResponse, Message, MessageSender, Relay,
    StrategyRegistry,
};

#[derive(Parser)]
#[command(name = "job-journal")]
#[command(about = "Extract company and job title from job posting pages")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract job data from a posting
    Extract {
        /// Posting URL (also used as the page location with --file)
        url: String,

        /// Read the page from a saved HTML file instead of fetching it
        #[arg(long)]
        file: Option<PathBuf>,

        /// Retries after the first attempt
        #[arg(long)]
        max_retries: Option<u32>,

        /// Delay between attempts in milliseconds
        #[arg(long)]
        retry_delay_ms: Option<u64>,

        /// Stop retrying when "any" or "all" fields are found
        #[arg(long)]
        acceptance: Option<Acceptance>,

        /// Disable the DOM change watcher
        #[arg(long)]
        no_watch: bool,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// List known job site patterns
    Sites,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,job_extraction=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Extract {
            url,
            file,
            max_retries,
            retry_delay_ms,
            acceptance,
            no_watch,
            pretty,
        } => {
            let mut config = ExtractionConfig::from_env().context("Failed to load configuration")?;
            if let Some(max_retries) = max_retries {
                config = config.with_max_retries(max_retries);
            }
            if let Some(delay) = retry_delay_ms {
                config = config.with_retry_delay(Duration::from_millis(delay));
            }
            if let Some(acceptance) = acceptance {
                config = config.with_acceptance(acceptance);
            }
            if no_watch {
                config = config.with_watch(false);
            }

            let html = match file {
                Some(path) => fetch::read_html(&path)?,
                None => {
                    tracing::info!("Fetching {}", url);
                    fetch::fetch_html(&url).await?
                }
            };

            extract(url, html, config, pretty).await
        }
        Commands::Sites => {
            list_sites();
            Ok(())
        }
    }
}

async fn extract(url: String, html: String, config: ExtractionConfig, pretty: bool) -> Result<()> {
    let registry = Arc::new(StrategyRegistry::with_defaults());
    let browser = Arc::new(InMemoryBrowser::new(registry.clone(), config.content_config()));
    let relay = Arc::new(Relay::new(browser.clone(), browser.clone(), registry));

    let events = browser.navigation_events();
    let listener = {
        let relay = relay.clone();
        tokio::spawn(async move { relay.watch_navigation(events).await })
    };

    let tab = browser.open_tab(url, html);
    tokio::task::yield_now().await;

    let response = relay
        .handle(&Message::RequestJobDataFromTab, &MessageSender::tab(tab))
        .await
        .context("Relay did not answer the job data request")?;
    listener.abort();

    let output = if pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    println!("{}", output);

    if let JobDataResponse::Error { error } = response {
        anyhow::bail!("Extraction failed: {}", error);
    }
    Ok(())
}

fn list_sites() {
    let registry = StrategyRegistry::with_defaults();

    println!("{}", "Known job sites (first match wins):".bright_cyan().bold());
    for (pattern, extractor) in registry.patterns() {
        println!("  {:<20} {}", pattern.bright_green(), extractor);
    }
    println!(
        "  {:<20} {}",
        "(anything else)".dimmed(),
        registry.fallback().name()
    );
}
