//! Application configuration structures.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::RankingCategory;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Backend service locations and HTTP behavior
    #[serde(default)]
    pub backend: BackendConfig,

    /// Search result memoization
    #[serde(default)]
    pub cache: CacheConfig,

    /// Debounced suggestions and trending keywords
    #[serde(default)]
    pub autocomplete: AutocompleteConfig,

    /// Rotating ranking sidebar
    #[serde(default)]
    pub ranking: RankingConfig,

    /// Page sizes and news categories
    #[serde(default)]
    pub listing: ListingConfig,

    /// Durable favorites/recents location
    #[serde(default)]
    pub storage: StorageConfig,

    /// Log filter
    #[serde(default)]
    pub logging: LoggingConfig,
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
        for (name, url) in [
            ("backend.listing_url", &self.backend.listing_url),
            ("backend.ranking_url", &self.backend.ranking_url),
            ("backend.search_url", &self.backend.search_url),
        ] {
            url::Url::parse(url)
                .map_err(|e| AppError::validation(format!("{name} is not a valid URL: {e}")))?;
        }
        if self.backend.user_agent.trim().is_empty() {
            return Err(AppError::validation("backend.user_agent is empty"));
        }
        if self.backend.timeout_secs == 0 {
            return Err(AppError::validation("backend.timeout_secs must be > 0"));
        }
        if self.cache.ttl_secs == 0 {
            return Err(AppError::validation("cache.ttl_secs must be > 0"));
        }
        if self.autocomplete.debounce_ms == 0 {
            return Err(AppError::validation("autocomplete.debounce_ms must be > 0"));
        }
        if self.autocomplete.trending_refresh_secs == 0 {
            return Err(AppError::validation(
                "autocomplete.trending_refresh_secs must be > 0",
            ));
        }
        if self.ranking.interval_secs == 0 {
            return Err(AppError::validation("ranking.interval_secs must be > 0"));
        }
        if self.ranking.categories.is_empty() {
            return Err(AppError::validation("No ranking categories defined"));
        }
        if self.listing.stock_page_size == 0
            || self.listing.news_page_size == 0
            || self.listing.global_news_page_size == 0
        {
            return Err(AppError::validation("listing page sizes must be > 0"));
        }
        if self.listing.news_categories.is_empty() {
            return Err(AppError::validation("No news categories defined"));
        }
        Ok(())
    }
}

/// The three independent backend services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Primary listing API (market lists, news pages)
    #[serde(default = "defaults::listing_url")]
    pub listing_url: String,

    /// Ranking, favorites and recently-viewed API
    #[serde(default = "defaults::ranking_url")]
    pub ranking_url: String,

    /// Search, autocomplete, correction and trending API
    #[serde(default = "defaults::search_url")]
    pub search_url: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            listing_url: defaults::listing_url(),
            ranking_url: defaults::ranking_url(),
            search_url: defaults::search_url(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "defaults::cache_ttl")]
    pub ttl_secs: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: defaults::cache_ttl(),
        }
    }
}

/// Suggestion engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutocompleteConfig {
    /// Input inactivity window before a suggestion request fires
    #[serde(default = "defaults::debounce")]
    pub debounce_ms: u64,

    /// Shortest input (in characters) eligible for spelling correction
    #[serde(default = "defaults::min_correction_chars")]
    pub min_correction_chars: usize,

    /// Look-back window for trending keywords
    #[serde(default = "defaults::trending_hours")]
    pub trending_hours: u32,

    /// Trending refresh cadence, independent of keystrokes
    #[serde(default = "defaults::trending_refresh")]
    pub trending_refresh_secs: u64,

    /// Trending keywords shown alongside suggestions
    #[serde(default = "defaults::trending_limit")]
    pub trending_limit: usize,
}

impl AutocompleteConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn trending_refresh(&self) -> Duration {
        Duration::from_secs(self.trending_refresh_secs)
    }
}

impl Default for AutocompleteConfig {
    fn default() -> Self {
        Self {
            debounce_ms: defaults::debounce(),
            min_correction_chars: defaults::min_correction_chars(),
            trending_hours: defaults::trending_hours(),
            trending_refresh_secs: defaults::trending_refresh(),
            trending_limit: defaults::trending_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Rotation period
    #[serde(default = "defaults::ranking_interval")]
    pub interval_secs: u64,

    /// Items kept per snapshot
    #[serde(default = "defaults::top_n")]
    pub top_n: usize,

    /// Categories in rotation order
    #[serde(default = "defaults::ranking_categories")]
    pub categories: Vec<RankingCategory>,
}

impl RankingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            interval_secs: defaults::ranking_interval(),
            top_n: defaults::top_n(),
            categories: defaults::ranking_categories(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingConfig {
    #[serde(default = "defaults::stock_page_size")]
    pub stock_page_size: usize,

    #[serde(default = "defaults::news_page_size")]
    pub news_page_size: usize,

    #[serde(default = "defaults::global_news_page_size")]
    pub global_news_page_size: usize,

    /// Domestic news categories, in tab order
    #[serde(default = "defaults::news_categories")]
    pub news_categories: Vec<String>,

    #[serde(default = "defaults::default_news_category")]
    pub default_news_category: String,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            stock_page_size: defaults::stock_page_size(),
            news_page_size: defaults::news_page_size(),
            global_news_page_size: defaults::global_news_page_size(),
            news_categories: defaults::news_categories(),
            default_news_category: defaults::default_news_category(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "defaults::storage_dir")]
    pub dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: defaults::storage_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    use crate::models::RankingCategory;

    // Backend defaults
    pub fn listing_url() -> String {
        "http://localhost:8585/api/krx/".into()
    }
    pub fn ranking_url() -> String {
        "http://localhost:8585/api/krx/".into()
    }
    pub fn search_url() -> String {
        "http://127.0.0.1:8000/".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; stocknews/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }

    pub fn cache_ttl() -> u64 {
        30
    }

    // Autocomplete defaults
    pub fn debounce() -> u64 {
        200
    }
    pub fn min_correction_chars() -> usize {
        2
    }
    pub fn trending_hours() -> u32 {
        24
    }
    pub fn trending_refresh() -> u64 {
        300
    }
    pub fn trending_limit() -> usize {
        6
    }

    // Ranking defaults
    pub fn ranking_interval() -> u64 {
        5
    }
    pub fn top_n() -> usize {
        10
    }
    pub fn ranking_categories() -> Vec<RankingCategory> {
        RankingCategory::ALL.to_vec()
    }

    // Listing defaults
    pub fn stock_page_size() -> usize {
        50
    }
    pub fn news_page_size() -> usize {
        5
    }
    pub fn global_news_page_size() -> usize {
        10
    }
    pub fn news_categories() -> Vec<String> {
        [
            "금융",
            "증권",
            "산업/재계",
            "중기/벤처",
            "글로벌 경제",
            "생활경제",
            "경제 일반",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }
    pub fn default_news_category() -> String {
        "금융".into()
    }

    pub fn storage_dir() -> String {
        "storage".into()
    }
    pub fn log_level() -> String {
        "info".into()
    }
}
