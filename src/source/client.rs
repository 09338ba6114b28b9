use super::menu::parse_category_menu;
use super::traits::CatalogSource;
use super::transport::{build_http_client, RetryPolicy, Transport};
use crate::config::{Config, SourceConfig};
use crate::model::{CategoryTree, RawListing};
use crate::{FetchError, HarvestError, ParseError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListingResponse {
    more_products: ProductWindow,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductWindow {
    #[serde(default)]
    product_window: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TagsResponse {
    range_ids: Vec<String>,
}

/// `CatalogSource` backed by the retailer's HTTP endpoints
///
/// Listing calls go through a retrying transport with the long listing
/// timeout. Menu, page and tag lookups are single attempts with the short
/// lookup timeout.
pub struct HttpCatalogSource {
    config: SourceConfig,
    page_size: u32,
    listing: Transport,
    lookup: Transport,
}

impl HttpCatalogSource {
    pub fn new(config: &Config) -> Result<Self, HarvestError> {
        let client = build_http_client(&config.user_agent, false)?;

        let listing = Transport::new(
            client.clone(),
            RetryPolicy::new(config.retry.max_retries, config.retry.backoff_base_ms),
            Duration::from_millis(config.timeouts.listing_ms),
        );
        let lookup = Transport::new(
            client,
            RetryPolicy::none(),
            Duration::from_millis(config.timeouts.lookup_ms),
        );

        Ok(Self {
            config: config.source.clone(),
            page_size: config.crawler.page_size,
            listing,
            lookup,
        })
    }

    /// Builds the URL of the window `[start, end)` for a category
    fn window_url(&self, category_id: &str, start: u64, end: u64) -> Result<String, HarvestError> {
        let mut url = Url::parse(&self.config.listing_url).map_err(|e| ParseError::Structure {
            context: "listing-url".to_string(),
            message: e.to_string(),
        })?;

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("category", category_id)
                .append_pair("start", &start.to_string())
                .append_pair("end", &end.to_string());
            for (key, value) in &self.config.listing_params {
                query.append_pair(key, value);
            }
        }

        Ok(url.to_string())
    }

    /// Fetches one window, returning the parsed listings and the number of
    /// entries the source sent before malformed ones were dropped
    async fn fetch_window(&self, url: &str) -> Result<(Vec<RawListing>, usize), HarvestError> {
        let body = self.listing.get_text(url).await?;
        let response: ListingResponse =
            serde_json::from_str(&body).map_err(|source| ParseError::Json {
                context: url.to_string(),
                source,
            })?;

        let received = response.more_products.product_window.len();
        let mut listings = Vec::with_capacity(received);
        for value in response.more_products.product_window {
            match serde_json::from_value::<RawListing>(value) {
                Ok(listing) => listings.push(listing),
                Err(e) => tracing::warn!(url, error = %e, "Skipping malformed listing entry"),
            }
        }

        Ok((listings, received))
    }

    fn tags_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(consumer_id) = &self.config.consumer_id {
            if let Ok(value) = HeaderValue::from_str(consumer_id) {
                headers.insert(HeaderName::from_static("x-consumer-id"), value);
            }
        }
        headers
    }
}

#[async_trait]
impl CatalogSource for HttpCatalogSource {
    async fn list_categories(&self) -> Result<CategoryTree, HarvestError> {
        let html = self.lookup.get_text(&self.config.category_menu_url).await?;
        Ok(parse_category_menu(&html)?)
    }

    async fn list_products_in_category(
        &self,
        category_id: &str,
    ) -> Result<Vec<RawListing>, HarvestError> {
        let page_size = u64::from(self.page_size);
        let mut all = Vec::new();
        let mut start = 0u64;

        loop {
            let url = self.window_url(category_id, start, start + page_size)?;
            let (window, received) = self.fetch_window(&url).await?;
            if received == 0 {
                break;
            }
            tracing::debug!(
                category = category_id,
                start,
                received,
                count = window.len(),
                "Fetched listing window"
            );
            all.extend(window);
            start += page_size;
        }

        Ok(all)
    }

    async fn get_category_tags(&self, product_id: u64) -> Option<Vec<String>> {
        let url = self
            .config
            .category_tags_url
            .replace("{product_id}", &product_id.to_string());

        let body = match self.lookup.get_text_with_headers(&url, self.tags_headers()).await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!(product_id, error = %e, "Category tag lookup failed");
                return None;
            }
        };

        match serde_json::from_str::<TagsResponse>(&body) {
            Ok(response) => Some(response.range_ids),
            Err(e) => {
                tracing::debug!(product_id, error = %e, "Malformed category tag response");
                None
            }
        }
    }

    async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        self.lookup.get_text(url).await
    }
}
