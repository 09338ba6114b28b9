use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Description fields in one secondary language
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedDescription {
    pub description: String,
    pub long_description: String,
}

impl LocalizedDescription {
    pub fn new(description: impl Into<String>, long_description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            long_description: long_description.into(),
        }
    }
}

/// Aggregated packaging table of a product
///
/// Each metric is `None` when the detail page yields nothing for it, which is
/// kept distinct from a measured zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PackagingMetrics {
    pub num_of_packages: Option<u32>,
    /// Cubic metres, rounded to two decimals
    pub sum_volume: Option<f64>,
    /// Kilograms, rounded to two decimals
    pub sum_weight: Option<f64>,
    /// Metres
    pub max_dimension: Option<f64>,
}

/// Canonical output of enriching one listing
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedProduct {
    pub product_id: u64,
    pub name: String,
    pub description: String,
    pub long_description: Option<String>,
    /// Keyed by locale; empty until the reconciliation stage translates the product
    pub translations: BTreeMap<String, LocalizedDescription>,
    pub main_image_url: Option<String>,
    pub other_image_urls: Vec<String>,
    pub product_url: String,
    /// Derived price
    pub price: Option<i64>,
    /// Canonical listing price
    pub price_rs: Option<f64>,
    /// Secondary-market price
    pub price_hr: Option<f64>,
    pub available: bool,
    pub packaging: PackagingMetrics,
    pub multi_pack: bool,
    pub product_parts: Vec<u64>,
    pub materials: Option<String>,
    pub breadcrumb: Vec<String>,
    pub category_tags: Vec<String>,
    pub modified_at: DateTime<Utc>,
}

impl EnrichedProduct {
    /// Minimal product with every optional field unknown
    pub fn new(product_id: u64, name: impl Into<String>, product_url: impl Into<String>) -> Self {
        Self {
            product_id,
            name: name.into(),
            description: String::new(),
            long_description: None,
            translations: BTreeMap::new(),
            main_image_url: None,
            other_image_urls: Vec::new(),
            product_url: product_url.into(),
            price: None,
            price_rs: None,
            price_hr: None,
            available: false,
            packaging: PackagingMetrics::default(),
            multi_pack: false,
            product_parts: Vec::new(),
            materials: None,
            breadcrumb: Vec::new(),
            category_tags: Vec::new(),
            modified_at: Utc::now(),
        }
    }
}
