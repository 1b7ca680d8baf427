//! Configuration management with TOML, environment variables, and CLI overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default search endpoint host.
pub const DEFAULT_BASE_URL: &str = "https://search.danawa.com";

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Search site base URL (overridden in tests)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Proxy URL (e.g., socks5://host:port)
    #[serde(default)]
    pub proxy: Option<String>,

    /// Base delay between requests in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Random jitter added to delay (0 to this value)
    #[serde(default = "default_delay_jitter_ms")]
    pub delay_jitter_ms: u64,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// How result pages are fetched
    #[serde(default)]
    pub fetcher: FetcherKind,

    /// Fixed wait after navigation before reading the rendered page (browser only)
    #[serde(default = "default_render_wait_ms")]
    pub render_wait_ms: u64,

    /// First page to crawl
    #[serde(default = "default_start_page")]
    pub start_page: u32,

    /// Last page to crawl; `None` probes the page count from the first page
    #[serde(default)]
    pub end_page: Option<u32>,

    /// Upper bound on pages crawled when probing
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Output format
    #[serde(default)]
    pub format: OutputFormat,

    /// Output file; text formats go to stdout when unset
    #[serde(default)]
    pub output: Option<PathBuf>,

    /// Download and embed thumbnails in workbook exports
    #[serde(default = "default_embed_images")]
    pub embed_images: bool,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_delay_ms() -> u64 {
    500
}

fn default_delay_jitter_ms() -> u64 {
    500
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_render_wait_ms() -> u64 {
    3000
}

fn default_start_page() -> u32 {
    1
}

fn default_max_pages() -> u32 {
    10
}

fn default_embed_images() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            proxy: None,
            delay_ms: default_delay_ms(),
            delay_jitter_ms: default_delay_jitter_ms(),
            timeout_secs: default_timeout_secs(),
            fetcher: FetcherKind::Http,
            render_wait_ms: default_render_wait_ms(),
            start_page: default_start_page(),
            end_page: None,
            max_pages: default_max_pages(),
            format: OutputFormat::Table,
            output: None,
            embed_images: default_embed_images(),
        }
    }
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        // 1. Explicit path takes precedence
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        // 2. Try current directory
        let local_config = Path::new("config.toml");
        if local_config.exists() {
            debug!("Found config.toml in current directory");
            return Self::from_file(local_config);
        }

        // 3. Try XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("danawa-crawler").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        // 4. Return default config
        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(base_url) = std::env::var("DANAWA_BASE_URL") {
            if !base_url.trim().is_empty() {
                self.base_url = base_url;
            }
        }

        if let Ok(proxy) = std::env::var("DANAWA_PROXY") {
            self.proxy = Some(proxy);
        }

        if let Ok(delay) = std::env::var("DANAWA_DELAY") {
            if let Ok(d) = delay.parse() {
                self.delay_ms = d;
            }
        }

        self
    }

    /// Builds the search URL for one page.
    pub fn search_url(&self, query: &str, page: u32) -> String {
        format!(
            "{}/dsearch.php?query={}&page={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(query),
            page
        )
    }
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Markdown,
    Csv,
    Xlsx,
}

impl OutputFormat {
    /// File extension used for exported files.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Table => "txt",
            OutputFormat::Json => "json",
            OutputFormat::Markdown => "md",
            OutputFormat::Csv => "csv",
            OutputFormat::Xlsx => "xlsx",
        }
    }

    /// Returns true for formats that cannot be printed to a terminal.
    pub fn is_binary(&self) -> bool {
        matches!(self, OutputFormat::Xlsx)
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "csv" => Ok(OutputFormat::Csv),
            "xlsx" | "excel" => Ok(OutputFormat::Xlsx),
            _ => Err(format!("Unknown format: {}. Use: table, json, markdown, csv, xlsx", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Xlsx => write!(f, "xlsx"),
        }
    }
}

/// Page fetching strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetcherKind {
    /// Plain HTTP GET of the search URL
    #[default]
    Http,
    /// Headless Chrome, page source read after a fixed wait
    Browser,
}

impl std::str::FromStr for FetcherKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "http" => Ok(FetcherKind::Http),
            "browser" | "chrome" => Ok(FetcherKind::Browser),
            _ => Err(format!("Unknown fetcher: {}. Use: http, browser", s)),
        }
    }
}

impl std::fmt::Display for FetcherKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetcherKind::Http => write!(f, "http"),
            FetcherKind::Browser => write!(f, "browser"),
        }
    }
}
