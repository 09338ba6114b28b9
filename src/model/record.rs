use super::LocalizedDescription;
use std::collections::BTreeMap;

/// Flat, storage-shaped form of a product; one row per `product_id`
///
/// List fields hold their JSON text. Unknown values stay `None` and map to
/// SQL `NULL`.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub product_id: u64,
    pub product_name: String,
    pub product_description: String,
    pub product_long_description: Option<String>,
    pub main_image_url: Option<String>,
    pub other_image_urls: String,
    pub product_url: String,
    pub price: Option<i64>,
    pub price_rs: Option<f64>,
    pub price_hr: Option<f64>,
    pub availability: bool,
    pub num_of_packages: Option<i64>,
    pub multi_pack: bool,
    pub product_parts: String,
    pub sum_volume: Option<f64>,
    pub sum_weight: Option<f64>,
    pub materials: Option<String>,
    pub max_dimension: Option<f64>,
    /// RFC 3339 timestamp
    pub modified_date: String,
    pub breadcrumb_categories: String,
    pub category_tags: String,
    /// Only locales carried by this record; absent locales are left untouched on upsert
    pub translations: BTreeMap<String, LocalizedDescription>,
}

/// Column names reported on by coverage, in report order
pub(crate) const BASE_FIELDS: &[&str] = &[
    "product_name",
    "product_description",
    "product_long_description",
    "product_id",
    "main_image_url",
    "other_image_urls",
    "product_url",
    "price",
    "price_rs",
    "price_hr",
    "availability",
    "num_of_packages",
    "multi_pack",
    "product_parts",
    "sum_volume",
    "sum_weight",
    "materials",
    "max_dimension",
    "modified_date",
    "breadcrumb_categories",
    "category_tags",
];

fn text(value: &str) -> bool {
    !value.trim().is_empty()
}

fn list(value: &str) -> bool {
    text(value) && value.trim() != "[]"
}

impl StoredRecord {
    /// Whether a named field holds a non-empty value
    ///
    /// Translation fields are addressed as `description_<locale>` and
    /// `long_description_<locale>`. Unknown names are reported as empty.
    pub fn is_filled(&self, field: &str) -> bool {
        match field {
            "product_name" => text(&self.product_name),
            "product_description" => text(&self.product_description),
            "product_long_description" => self.product_long_description.as_deref().is_some_and(text),
            "product_id" => true,
            "main_image_url" => self.main_image_url.as_deref().is_some_and(text),
            "other_image_urls" => list(&self.other_image_urls),
            "product_url" => text(&self.product_url),
            "price" => self.price.is_some(),
            "price_rs" => self.price_rs.is_some(),
            "price_hr" => self.price_hr.is_some(),
            "availability" | "multi_pack" => true,
            "num_of_packages" => self.num_of_packages.is_some(),
            "product_parts" => list(&self.product_parts),
            "sum_volume" => self.sum_volume.is_some(),
            "sum_weight" => self.sum_weight.is_some(),
            "materials" => self.materials.as_deref().is_some_and(text),
            "max_dimension" => self.max_dimension.is_some(),
            "modified_date" => text(&self.modified_date),
            "breadcrumb_categories" => list(&self.breadcrumb_categories),
            "category_tags" => list(&self.category_tags),
            other => {
                if let Some(locale) = other.strip_prefix("long_description_") {
                    self.translations
                        .get(locale)
                        .is_some_and(|t| text(&t.long_description))
                } else if let Some(locale) = other.strip_prefix("description_") {
                    self.translations
                        .get(locale)
                        .is_some_and(|t| text(&t.description))
                } else {
                    false
                }
            }
        }
    }
}
