use super::detail::parse_detail_page;
use super::market::{market_url, parse_market_price};
use super::pricing::derived_price;
use crate::config::{Config, PricingConfig};
use crate::model::{EnrichedProduct, RawListing};
use crate::source::CatalogSource;
use crate::state::SeenIds;
use crate::{HarvestError, ParseError};
use chrono::Utc;
use std::sync::Arc;

/// Where in the category walk a listing was found; used for log context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryContext {
    pub category: String,
    pub subcategory: String,
}

/// Knobs the enricher reads from configuration
#[derive(Debug, Clone)]
pub struct EnrichSettings {
    pub fulfillment_store: String,
    pub source_locale: String,
    pub market_locale: String,
    pub pricing: PricingConfig,
}

impl EnrichSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            fulfillment_store: config.crawler.fulfillment_store.clone(),
            source_locale: config.source.locale_path.clone(),
            market_locale: config.market.locale_path.clone(),
            pricing: config.pricing.clone(),
        }
    }
}

/// Turns raw listings into enriched products
///
/// The enricher only reads from the network. A product whose detail page
/// cannot be fetched is dropped and its identifier is released from the
/// seen set, so a later listing of the same product may try again.
#[derive(Clone)]
pub struct Enricher {
    source: Arc<dyn CatalogSource>,
    seen: SeenIds,
    settings: Arc<EnrichSettings>,
}

impl Enricher {
    pub fn new(source: Arc<dyn CatalogSource>, seen: SeenIds, settings: EnrichSettings) -> Self {
        Self {
            source,
            seen,
            settings: Arc::new(settings),
        }
    }

    pub fn seen(&self) -> &SeenIds {
        &self.seen
    }

    /// Enriches one listing
    ///
    /// # Returns
    ///
    /// * `Ok(Some(product))` - The listing was enriched
    /// * `Ok(None)` - The product was already claimed earlier in this run
    /// * `Err(HarvestError)` - The id could not be read or the detail page could not be fetched
    pub async fn enrich(
        &self,
        listing: &RawListing,
        context: &CategoryContext,
    ) -> Result<Option<EnrichedProduct>, HarvestError> {
        let product_id = listing.product_id().ok_or_else(|| ParseError::Structure {
            context: format!("listing '{}'", listing.id),
            message: "identifier holds no digits".to_string(),
        })?;

        if !self.seen.claim(product_id) {
            tracing::trace!(product_id, "Already seen in this run");
            return Ok(None);
        }

        match self.build(listing, product_id).await {
            Ok(product) => Ok(Some(product)),
            Err(e) => {
                self.seen.release(product_id);
                tracing::warn!(
                    product_id,
                    category = %context.category,
                    subcategory = %context.subcategory,
                    error = %e,
                    "Enrichment failed, product dropped"
                );
                Err(e)
            }
        }
    }

    async fn build(&self, listing: &RawListing, product_id: u64) -> Result<EnrichedProduct, HarvestError> {
        let product_url = listing
            .pip_url
            .clone()
            .ok_or_else(|| ParseError::Structure {
                context: format!("listing {}", product_id),
                message: "no product page URL".to_string(),
            })?;

        let (price_hr, detail_html) = tokio::join!(
            self.market_price(product_id, &product_url),
            self.source.fetch_page(&product_url)
        );
        let detail = parse_detail_page(&detail_html?);

        let breadcrumb = listing.breadcrumb();
        let category_tags = match self.source.get_category_tags(product_id).await {
            Some(tags) if !tags.is_empty() => tags,
            _ => breadcrumb.clone(),
        };

        let price_rs = listing.sales_price.as_ref().map(|p| p.numeral);

        let mut product = EnrichedProduct::new(product_id, listing.name.clone(), product_url);
        product.description = listing.short_description();
        product.long_description = detail.long_description;
        product.main_image_url = listing.main_image_url.clone();
        product.other_image_urls = detail.image_urls;
        product.price = price_rs.map(|p| derived_price(p, &self.settings.pricing));
        product.price_rs = price_rs;
        product.price_hr = price_hr;
        product.available = listing.available_at(&self.settings.fulfillment_store);
        product.packaging = detail.packaging;
        product.multi_pack = detail.multi_pack;
        product.product_parts = detail.product_parts;
        product.materials = detail.materials;
        product.breadcrumb = breadcrumb;
        product.category_tags = category_tags;
        product.modified_at = Utc::now();

        Ok(product)
    }

    /// Secondary-market price; any failure leaves it unknown
    async fn market_price(&self, product_id: u64, product_url: &str) -> Option<f64> {
        let Some(url) = market_url(
            product_url,
            &self.settings.source_locale,
            &self.settings.market_locale,
        ) else {
            tracing::debug!(product_id, product_url, "Product URL has no source locale segment");
            return None;
        };

        match self.source.fetch_page(&url).await {
            Ok(html) => {
                let price = parse_market_price(&html);
                if price.is_none() {
                    tracing::debug!(product_id, url = %url, "Market page has no price block");
                }
                price
            }
            Err(e) => {
                tracing::debug!(product_id, error = %e, "Market price fetch failed");
                None
            }
        }
    }
}
