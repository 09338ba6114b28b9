use crate::model::{CategoryTree, RawListing};
use crate::{FetchError, HarvestError};
use async_trait::async_trait;

/// Read-only view of the retail source used by the orchestrator and enricher
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetches and parses the navigation menu into a two-level tree
    async fn list_categories(&self) -> Result<CategoryTree, HarvestError>;

    /// Pages through the listing endpoint until an empty window comes back
    async fn list_products_in_category(
        &self,
        category_id: &str,
    ) -> Result<Vec<RawListing>, HarvestError>;

    /// Best-effort category tag lookup; `None` on any failure
    async fn get_category_tags(&self, product_id: u64) -> Option<Vec<String>>;

    /// Fetches a product page (detail or secondary-market) as HTML
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError>;
}
