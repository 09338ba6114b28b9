//! Data model shared by the crawl, reconciliation and storage stages

mod category;
mod listing;
mod product;
mod record;

pub use category::{CategoryNode, CategoryTree, TopCategory, ROOT_CATEGORY_ID};
pub use listing::{CategoryPathEntry, RawListing, SalesPrice, StoreAvailability};
pub use product::{EnrichedProduct, LocalizedDescription, PackagingMetrics};
pub use record::StoredRecord;
pub(crate) use record::BASE_FIELDS;
