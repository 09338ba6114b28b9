//! Storage traits and error types
//!
//! This module defines the trait interface the reconciliation stage uses to
//! talk to the product store, and the associated error types.

use crate::model::{EnrichedProduct, StoredRecord};
use crate::storage::RunRecord;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Product id {0} does not fit the store's key type")]
    KeyOutOfRange(u64),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Split of a batch into products already stored and genuinely new ones
#[derive(Debug, Default)]
pub struct DiffSplit {
    pub existing: Vec<EnrichedProduct>,
    pub new: Vec<EnrichedProduct>,
}

/// Trait for product store implementations
///
/// The store is the sole source of truth for product identity. It is only
/// touched from the single-threaded reconciliation stage.
pub trait ProductStore: Send {
    // ===== Products =====

    /// Splits `batch` by whether each identifier is already stored
    ///
    /// Every input product lands in exactly one half; input order is kept
    /// within each half.
    fn diff(&self, batch: Vec<EnrichedProduct>) -> StorageResult<DiffSplit>;

    /// Inserts or updates each record keyed by `product_id`
    ///
    /// Translations are written only for the locales a record carries.
    ///
    /// # Returns
    ///
    /// The number of records written
    fn upsert(&mut self, records: &[StoredRecord]) -> StorageResult<usize>;

    /// Reads every stored record, ordered by identifier
    fn all(&self) -> StorageResult<Vec<StoredRecord>>;

    /// Gets total product count
    fn count(&self) -> StorageResult<u64>;

    // ===== Run Management =====

    /// Creates a new crawl run
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration file
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Marks a run as completed and stores its report
    fn complete_run(&mut self, run_id: i64, report_json: &str) -> StorageResult<()>;

    /// Marks a run as failed with the error that ended it
    fn fail_run(&mut self, run_id: i64, message: &str) -> StorageResult<()>;

    /// Gets the most recent run
    fn latest_run(&self) -> StorageResult<Option<RunRecord>>;
}
