use serde::{Deserialize, Serialize};

/// A product as it appears in one window of the category listing endpoint
///
/// Only the fields the enricher reads are modelled; everything else in the
/// payload is ignored. Missing optional fields deserialize to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawListing {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub main_image_alt: Option<String>,
    #[serde(default)]
    pub main_image_url: Option<String>,
    #[serde(default)]
    pub pip_url: Option<String>,
    #[serde(default)]
    pub sales_price: Option<SalesPrice>,
    #[serde(default)]
    pub availability: Vec<StoreAvailability>,
    #[serde(default)]
    pub category_path: Vec<CategoryPathEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesPrice {
    pub numeral: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreAvailability {
    #[serde(default)]
    pub store: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryPathEntry {
    pub key: String,
}

impl RawListing {
    /// Numeric identifier built from the digits of the raw id field
    ///
    /// Returns `None` when the id holds no digits or does not fit in a `u64`.
    pub fn product_id(&self) -> Option<u64> {
        let digits: String = self.id.chars().filter(char::is_ascii_digit).collect();
        digits.parse().ok()
    }

    /// Short description: the image alt text without the leading product name
    pub fn short_description(&self) -> String {
        let alt = self.main_image_alt.as_deref().unwrap_or_default();
        alt.replace(&format!("{} ", self.name), "")
    }

    /// Availability at a single named store
    ///
    /// The last entry for that store decides; no entry means unavailable.
    pub fn available_at(&self, store: &str) -> bool {
        self.availability
            .iter()
            .filter(|entry| entry.store.as_deref() == Some(store))
            .last()
            .map(|entry| entry.status.as_deref() != Some("OUT_OF_STOCK"))
            .unwrap_or(false)
    }

    /// Category keys of the breadcrumb, outermost first
    pub fn breadcrumb(&self) -> Vec<String> {
        self.category_path.iter().map(|c| c.key.clone()).collect()
    }
}
