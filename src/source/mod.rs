//! Source client for the retail catalog
//!
//! This module contains everything that talks to the primary source:
//! - The `CatalogSource` seam used by the orchestrator and enricher
//! - `HttpCatalogSource`, its HTTP implementation
//! - The retrying transport and client builder
//! - The category navigation menu parser

mod client;
pub(crate) mod html;
mod menu;
mod traits;
mod transport;

pub use client::HttpCatalogSource;
pub use menu::parse_category_menu;
pub use traits::CatalogSource;
pub use transport::{build_http_client, RetryPolicy, Transport};
