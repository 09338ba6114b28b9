use serde::Deserialize;
use std::collections::BTreeMap;

/// Main configuration structure for Catalog-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub source: SourceConfig,
    #[serde(default)]
    pub market: MarketConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
    pub translation: TranslationConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Endpoints of the primary retail source
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Page holding the category navigation menu
    #[serde(rename = "category-menu-url")]
    pub category_menu_url: String,

    /// Windowed listing endpoint, queried with `category`, `start` and `end`
    #[serde(rename = "listing-url")]
    pub listing_url: String,

    /// Extra static query pairs appended to every listing request
    #[serde(rename = "listing-params", default)]
    pub listing_params: BTreeMap<String, String>,

    /// Tag lookup URL template; `{product_id}` is substituted per product
    #[serde(rename = "category-tags-url")]
    pub category_tags_url: String,

    /// Value of the `x-consumer-id` header sent to the tag endpoint
    #[serde(rename = "consumer-id", default)]
    pub consumer_id: Option<String>,

    /// Locale segment embedded in product page URLs, e.g. `rs/sr`
    #[serde(rename = "locale-path", default = "default_source_locale")]
    pub locale_path: String,
}

/// Secondary market used for the `price_hr` lookup
#[derive(Debug, Clone, Deserialize)]
pub struct MarketConfig {
    /// Locale segment swapped into the product page URL, e.g. `hr/hr`
    #[serde(rename = "locale-path", default = "default_market_locale")]
    pub locale_path: String,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            locale_path: default_market_locale(),
        }
    }
}

/// Crawl orchestration settings
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Window size for the paginated listing endpoint
    #[serde(rename = "page-size", default = "default_page_size")]
    pub page_size: u32,

    /// Enrich listings through the worker pool instead of one at a time
    #[serde(default = "default_true")]
    pub concurrent: bool,

    /// Ceiling on simultaneously running enrichment tasks
    #[serde(
        rename = "max-concurrent-enrichments",
        default = "default_max_concurrent"
    )]
    pub max_concurrent_enrichments: u32,

    /// Global product cap; the run stops early once reached
    #[serde(rename = "max-products", default)]
    pub max_products: Option<usize>,

    /// Subcategory names skipped by literal match
    #[serde(
        rename = "excluded-subcategories",
        default = "default_excluded_subcategories"
    )]
    pub excluded_subcategories: Vec<String>,

    /// Store whose stock status decides availability
    #[serde(rename = "fulfillment-store", default = "default_fulfillment_store")]
    pub fulfillment_store: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            concurrent: true,
            max_concurrent_enrichments: default_max_concurrent(),
            max_products: None,
            excluded_subcategories: default_excluded_subcategories(),
            fulfillment_store: default_fulfillment_store(),
        }
    }
}

/// Retry policy for the listing transport
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(rename = "backoff-base-ms", default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            backoff_base_ms: default_backoff_base_ms(),
        }
    }
}

/// Per-request timeouts (milliseconds)
#[derive(Debug, Clone, Deserialize)]
pub struct TimeoutConfig {
    /// Detail pages, market pages, tag lookups and translations
    #[serde(rename = "lookup-ms", default = "default_lookup_ms")]
    pub lookup_ms: u64,

    /// Paginated listing calls
    #[serde(rename = "listing-ms", default = "default_listing_ms")]
    pub listing_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            lookup_ms: default_lookup_ms(),
            listing_ms: default_listing_ms(),
        }
    }
}

/// Derived price formula: `ceil(price * multiplier / divisor)`
#[derive(Debug, Clone, Deserialize)]
pub struct PricingConfig {
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,

    #[serde(default = "default_divisor")]
    pub divisor: f64,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            multiplier: default_multiplier(),
            divisor: default_divisor(),
        }
    }
}

/// Secondary-language product pages
#[derive(Debug, Clone, Deserialize)]
pub struct TranslationConfig {
    #[serde(rename = "base-url")]
    pub base_url: String,

    #[serde(default = "default_locales")]
    pub locales: Vec<String>,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl UserAgentConfig {
    /// Renders the `User-Agent` header value
    pub fn header_value(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Path to the markdown summary file
    #[serde(rename = "summary-path")]
    pub summary_path: String,
}

fn default_source_locale() -> String {
    "rs/sr".to_string()
}

fn default_market_locale() -> String {
    "hr/hr".to_string()
}

fn default_page_size() -> u32 {
    1000
}

fn default_true() -> bool {
    true
}

fn default_max_concurrent() -> u32 {
    100
}

fn default_excluded_subcategories() -> Vec<String> {
    vec!["Restoran i Bistro".to_string()]
}

fn default_fulfillment_store() -> String {
    "Beograd".to_string()
}

fn default_max_retries() -> u32 {
    5
}

fn default_backoff_base_ms() -> u64 {
    100
}

fn default_lookup_ms() -> u64 {
    10_000
}

fn default_listing_ms() -> u64 {
    60_000
}

fn default_multiplier() -> f64 {
    1.44
}

fn default_divisor() -> f64 {
    117.0
}

fn default_locales() -> Vec<String> {
    vec!["ru".to_string(), "en".to_string()]
}
