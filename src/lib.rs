//! Catalog-Harvest: a crawl-and-reconcile pipeline for retail product catalogs
//!
//! This crate walks a retailer's category tree, enriches every listed product
//! with detail-page and secondary-market data, and reconciles the batch against
//! a persistent store so that repeated runs only pay translation cost for
//! genuinely new products.

pub mod config;
pub mod crawler;
pub mod cycle;
pub mod enrich;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod source;
pub mod state;
pub mod storage;

use thiserror::Error;

/// Main error type for Catalog-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Network, transport and non-2xx failures
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error for {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Unexpected HTTP status {status} from {url}")]
    Status { url: String, status: u16 },
}

impl FetchError {
    /// Classifies a `reqwest` failure, separating timeouts from other transport errors
    pub fn from_reqwest(url: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else {
            Self::Http {
                url: url.to_string(),
                source,
            }
        }
    }

    /// Returns true for failures worth retrying after a back-off delay
    ///
    /// Timeouts, connection failures, HTTP 5xx and HTTP 429 are transient.
    /// Any other status is returned to the caller immediately.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Http { source, .. } => {
                source.is_connect() || source.is_request() || source.is_body()
            }
            Self::Status { status, .. } => *status >= 500 || *status == 429,
        }
    }

    /// The URL the failed request was sent to
    pub fn url(&self) -> &str {
        match self {
            Self::Http { url, .. } | Self::Timeout { url } | Self::Status { url, .. } => url,
        }
    }
}

/// Structurally unexpected page or payload content
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("JSON deserialization error for {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unexpected structure in {context}: {message}")]
    Structure { context: String, message: String },
}

/// Secondary-language fetch or parse failures
#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("Failed to fetch '{locale}' page for product {product_id}: {source}")]
    Fetch {
        locale: String,
        product_id: u64,
        #[source]
        source: FetchError,
    },

    #[error("Failed to parse '{locale}' page for product {product_id}: {message}")]
    Parse {
        locale: String,
        product_id: u64,
        message: String,
    },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Catalog-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use cycle::{run_cycle, CycleOutcome};
pub use model::{CategoryNode, CategoryTree, EnrichedProduct, RawListing};
pub use output::CoverageReport;
pub use state::CrawlPhase;
