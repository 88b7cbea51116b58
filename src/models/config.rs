//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::SiteSelectors;

/// Placeholder substituted with the page number in [`SiteConfig::listing_url`].
pub const PAGE_PLACEHOLDER: &str = "{page}";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and crawling behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Catalog site location and size
    #[serde(default)]
    pub site: SiteConfig,

    /// CSS selectors for listing and detail pages
    #[serde(default)]
    pub selectors: SiteSelectors,

    /// Episode number extraction
    #[serde(default)]
    pub numbering: NumberingConfig,

    /// Local directories
    #[serde(default)]
    pub paths: PathsConfig,

    /// Presentation server
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.download_timeout_secs == 0 {
            return Err(AppError::validation(
                "crawler.download_timeout_secs must be > 0",
            ));
        }
        if self.crawler.max_concurrent == 0 {
            return Err(AppError::validation("crawler.max_concurrent must be > 0"));
        }
        if self.site.pages == 0 {
            return Err(AppError::validation("site.pages must be > 0"));
        }
        if !self.site.listing_url.contains(PAGE_PLACEHOLDER) {
            return Err(AppError::validation(format!(
                "site.listing_url must contain {PAGE_PLACEHOLDER}"
            )));
        }
        url::Url::parse(&self.site.base_url)
            .map_err(|e| AppError::validation(format!("site.base_url is invalid: {e}")))?;
        if self.numbering.chapter_word.trim().is_empty() {
            return Err(AppError::validation("numbering.chapter_word is empty"));
        }
        if self.paths.metadata_ext.trim_matches('.').is_empty() {
            return Err(AppError::validation("paths.metadata_ext is empty"));
        }
        self.selectors.compile()?;
        Ok(())
    }
}

/// HTTP client and crawling behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Timeout for listing and detail page requests, in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Timeout for a whole media download, in seconds
    #[serde(default = "defaults::download_timeout")]
    pub download_timeout_secs: u64,

    /// Maximum episodes processed at once within a page
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Maximum redirect hops followed per request
    #[serde(default = "defaults::max_redirects")]
    pub max_redirects: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            download_timeout_secs: defaults::download_timeout(),
            max_concurrent: defaults::max_concurrent(),
            max_redirects: defaults::max_redirects(),
        }
    }
}

/// Catalog site settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Listing page URL with a `{page}` placeholder
    #[serde(default = "defaults::listing_url")]
    pub listing_url: String,

    /// Prefix that relative listing links are resolved against
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Number of listing pages to crawl, starting at 1
    #[serde(default = "defaults::pages")]
    pub pages: u32,
}

impl SiteConfig {
    /// URL of the given listing page.
    pub fn page_url(&self, page: u32) -> String {
        self.listing_url
            .replace(PAGE_PLACEHOLDER, &page.to_string())
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            listing_url: defaults::listing_url(),
            base_url: defaults::base_url(),
            pages: defaults::pages(),
        }
    }
}

/// Episode numbering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NumberingConfig {
    /// Word preceding the episode number inside descriptions
    #[serde(default = "defaults::chapter_word")]
    pub chapter_word: String,
}

impl Default for NumberingConfig {
    fn default() -> Self {
        Self {
            chapter_word: defaults::chapter_word(),
        }
    }
}

/// Local directory settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding media and sidecar files
    #[serde(default = "defaults::data_dir")]
    pub data_dir: PathBuf,

    /// Directory holding static assets for the server
    #[serde(default = "defaults::static_dir")]
    pub static_dir: PathBuf,

    /// Extension of sidecar metadata files, without the dot
    #[serde(default = "defaults::metadata_ext")]
    pub metadata_ext: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: defaults::data_dir(),
            static_dir: defaults::static_dir(),
            metadata_ext: defaults::metadata_ext(),
        }
    }
}

/// Presentation server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on
    #[serde(default = "defaults::bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: defaults::bind(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; podcrawl/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn download_timeout() -> u64 {
        900
    }
    pub fn max_concurrent() -> usize {
        1
    }
    pub fn max_redirects() -> usize {
        10
    }

    // Site defaults
    pub fn listing_url() -> String {
        "https://www.ccma.cat/catradio/alacarta/en-guardia/ultims-programes/?pagina={page}".into()
    }
    pub fn base_url() -> String {
        "https://www.ccma.cat".into()
    }
    pub fn pages() -> u32 {
        66
    }

    // Numbering defaults
    pub fn chapter_word() -> String {
        "Capítol".into()
    }

    // Path defaults
    pub fn data_dir() -> PathBuf {
        PathBuf::from("capitols")
    }
    pub fn static_dir() -> PathBuf {
        PathBuf::from("static")
    }
    pub fn metadata_ext() -> String {
        "json".into()
    }

    // Server defaults
    pub fn bind() -> String {
        "0.0.0.0:8080".into()
    }
}
