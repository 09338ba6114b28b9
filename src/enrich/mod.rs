//! Product enrichment
//!
//! Turns one raw listing into an `EnrichedProduct` by combining listing
//! fields with the product detail page, the secondary-market price and the
//! category tag lookup.

mod detail;
mod enricher;
mod market;
mod pricing;

pub use detail::{parse_detail_page, DetailPage};
pub use enricher::{CategoryContext, EnrichSettings, Enricher};
pub use market::{market_url, parse_market_price};
pub use pricing::derived_price;
