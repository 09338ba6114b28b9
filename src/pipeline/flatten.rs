use crate::model::{EnrichedProduct, StoredRecord};
use serde_json::Value;

// Strings and integers map onto JSON values directly, so no step here can fail.
fn json_list<T: Clone + Into<Value>>(values: &[T]) -> String {
    Value::from(values).to_string()
}

/// Maps a product onto its storage shape, field by field
///
/// List fields become JSON arrays and the timestamp becomes RFC 3339 text.
/// Unknown values stay unknown.
pub fn flatten_product(product: &EnrichedProduct) -> StoredRecord {
    StoredRecord {
        product_id: product.product_id,
        product_name: product.name.clone(),
        product_description: product.description.clone(),
        product_long_description: product.long_description.clone(),
        main_image_url: product.main_image_url.clone(),
        other_image_urls: json_list(&product.other_image_urls),
        product_url: product.product_url.clone(),
        price: product.price,
        price_rs: product.price_rs,
        price_hr: product.price_hr,
        availability: product.available,
        num_of_packages: product.packaging.num_of_packages.map(i64::from),
        multi_pack: product.multi_pack,
        product_parts: json_list(&product.product_parts),
        sum_volume: product.packaging.sum_volume,
        sum_weight: product.packaging.sum_weight,
        materials: product.materials.clone(),
        max_dimension: product.packaging.max_dimension,
        modified_date: product.modified_at.to_rfc3339(),
        breadcrumb_categories: json_list(&product.breadcrumb),
        category_tags: json_list(&product.category_tags),
        translations: product.translations.clone(),
    }
}
