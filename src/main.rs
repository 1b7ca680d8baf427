//! danawa-crawler - Danawa product search scraper
//!
//! Crawls a range of result pages and exports the products as a table,
//! JSON, Markdown, CSV or an `.xlsx` workbook with thumbnails.

use anyhow::Result;
use clap::{Parser, Subcommand};
use danawa_crawler::commands::{PagesCommand, SearchCommand};
use danawa_crawler::config::{Config, FetcherKind, OutputFormat};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "danawa-crawler",
    version,
    about = "Danawa product search scraper",
    long_about = "Fetches Danawa search result pages, extracts product fields and exports them as text, CSV or a spreadsheet with embedded thumbnails."
)]
struct Cli {
    /// Proxy URL (e.g., socks5://host:port)
    #[arg(long, global = true, env = "DANAWA_PROXY")]
    proxy: Option<String>,

    /// Delay between requests in milliseconds
    #[arg(long, global = true, env = "DANAWA_DELAY")]
    delay: Option<u64>,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format (table, json, markdown, csv, xlsx)
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Page fetcher (http, browser)
    #[arg(long, global = true)]
    fetcher: Option<FetcherKind>,

    /// Write output to this file
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl search result pages and export the products
    #[command(alias = "s")]
    Search {
        /// Search query
        query: String,

        /// First page to crawl
        #[arg(long)]
        start: Option<u32>,

        /// Last page to crawl (probes the page count when omitted)
        #[arg(long)]
        end: Option<u32>,

        /// Upper bound on pages crawled after probing
        #[arg(long)]
        max_pages: Option<u32>,

        /// Keep image URLs instead of embedding thumbnails in xlsx output
        #[arg(long)]
        no_images: bool,
    },

    /// Report how many result pages a query has
    #[command(alias = "p")]
    Pages {
        /// Search query
        query: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::WARN.into())
    };

    // stdout carries the export only
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    // Apply CLI overrides
    if let Some(proxy) = cli.proxy {
        config.proxy = Some(proxy);
    }
    if let Some(delay) = cli.delay {
        config.delay_ms = delay;
    }
    if let Some(format) = cli.format {
        config.format = format;
    }
    if let Some(fetcher) = cli.fetcher {
        config.fetcher = fetcher;
    }
    if let Some(output) = cli.output {
        config.output = Some(output);
    }

    match cli.command {
        Commands::Search { query, start, end, max_pages, no_images } => {
            if let Some(start) = start {
                config.start_page = start;
            }
            if end.is_some() {
                config.end_page = end;
            }
            if let Some(max_pages) = max_pages {
                config.max_pages = max_pages;
            }
            if no_images {
                config.embed_images = false;
            }

            let cmd = SearchCommand::new(config);
            let output = cmd.execute(&query).await?;
            println!("{}", output);
        }

        Commands::Pages { query } => {
            let cmd = PagesCommand::new(config);
            let output = cmd.execute(&query).await?;
            println!("{}", output);
        }
    }

    Ok(())
}
