//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlPhase`: the per-run orchestration state machine
//! - `SeenIds`: product identifiers claimed during the current run, shared by workers
//! - `CancelFlag`: cooperative stop signal raised when the product cap is reached

mod cancel;
mod phase;
mod seen;

pub use cancel::CancelFlag;
pub use phase::CrawlPhase;
pub use seen::SeenIds;
