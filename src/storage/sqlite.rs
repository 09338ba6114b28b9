//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the ProductStore trait.

use crate::model::{EnrichedProduct, LocalizedDescription, StoredRecord};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{DiffSplit, ProductStore, StorageError, StorageResult};
use crate::storage::{RunRecord, RunStatus};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

const UPSERT_PRODUCT_SQL: &str = "
    INSERT INTO products (
        product_id, product_name, product_description, product_long_description,
        main_image_url, other_image_urls, product_url, price, price_rs, price_hr,
        availability, num_of_packages, multi_pack, product_parts, sum_volume,
        sum_weight, materials, max_dimension, modified_date, breadcrumb_categories,
        category_tags
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21)
    ON CONFLICT(product_id) DO UPDATE SET
        product_name = excluded.product_name,
        product_description = excluded.product_description,
        product_long_description = excluded.product_long_description,
        main_image_url = excluded.main_image_url,
        other_image_urls = excluded.other_image_urls,
        product_url = excluded.product_url,
        price = excluded.price,
        price_rs = excluded.price_rs,
        price_hr = excluded.price_hr,
        availability = excluded.availability,
        num_of_packages = excluded.num_of_packages,
        multi_pack = excluded.multi_pack,
        product_parts = excluded.product_parts,
        sum_volume = excluded.sum_volume,
        sum_weight = excluded.sum_weight,
        materials = excluded.materials,
        max_dimension = excluded.max_dimension,
        modified_date = excluded.modified_date,
        breadcrumb_categories = excluded.breadcrumb_categories,
        category_tags = excluded.category_tags
";

const UPSERT_TRANSLATION_SQL: &str = "
    INSERT INTO product_translations (product_id, locale, description, long_description)
    VALUES (?1, ?2, ?3, ?4)
    ON CONFLICT(product_id, locale) DO UPDATE SET
        description = excluded.description,
        long_description = excluded.long_description
";

const SELECT_PRODUCTS_SQL: &str = "
    SELECT product_id, product_name, product_description, product_long_description,
           main_image_url, other_image_urls, product_url, price, price_rs, price_hr,
           availability, num_of_packages, multi_pack, product_parts, sum_volume,
           sum_weight, materials, max_dimension, modified_date, breadcrumb_categories,
           category_tags
    FROM products ORDER BY product_id
";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn exists(&self, product_id: u64) -> StorageResult<bool> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT 1 FROM products WHERE product_id = ?1")?;
        Ok(stmt.exists(params![key(product_id)?])?)
    }

    fn load_translations(&self) -> StorageResult<HashMap<i64, BTreeMap<String, LocalizedDescription>>> {
        let mut stmt = self.conn.prepare(
            "SELECT product_id, locale, description, long_description FROM product_translations",
        )?;

        let mut translations: HashMap<i64, BTreeMap<String, LocalizedDescription>> = HashMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                LocalizedDescription::new(row.get::<_, String>(2)?, row.get::<_, String>(3)?),
            ))
        })?;

        for row in rows {
            let (product_id, locale, text) = row?;
            translations.entry(product_id).or_default().insert(locale, text);
        }

        Ok(translations)
    }

    fn write_record(tx: &rusqlite::Transaction<'_>, record: &StoredRecord) -> StorageResult<()> {
        let id = key(record.product_id)?;

        tx.prepare_cached(UPSERT_PRODUCT_SQL)?.execute(params![
            id,
            record.product_name,
            record.product_description,
            record.product_long_description,
            record.main_image_url,
            record.other_image_urls,
            record.product_url,
            record.price,
            record.price_rs,
            record.price_hr,
            record.availability,
            record.num_of_packages,
            record.multi_pack,
            record.product_parts,
            record.sum_volume,
            record.sum_weight,
            record.materials,
            record.max_dimension,
            record.modified_date,
            record.breadcrumb_categories,
            record.category_tags,
        ])?;

        let mut stmt = tx.prepare_cached(UPSERT_TRANSLATION_SQL)?;
        for (locale, text) in &record.translations {
            stmt.execute(params![id, locale, text.description, text.long_description])?;
        }

        Ok(())
    }
}

fn key(product_id: u64) -> StorageResult<i64> {
    i64::try_from(product_id).map_err(|_| StorageError::KeyOutOfRange(product_id))
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<(i64, StoredRecord)> {
    let id: i64 = row.get(0)?;
    let product_id =
        u64::try_from(id).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(0, id))?;

    Ok((
        id,
        StoredRecord {
            product_id,
            product_name: row.get(1)?,
            product_description: row.get(2)?,
            product_long_description: row.get(3)?,
            main_image_url: row.get(4)?,
            other_image_urls: row.get(5)?,
            product_url: row.get(6)?,
            price: row.get(7)?,
            price_rs: row.get(8)?,
            price_hr: row.get(9)?,
            availability: row.get(10)?,
            num_of_packages: row.get(11)?,
            multi_pack: row.get(12)?,
            product_parts: row.get(13)?,
            sum_volume: row.get(14)?,
            sum_weight: row.get(15)?,
            materials: row.get(16)?,
            max_dimension: row.get(17)?,
            modified_date: row.get(18)?,
            breadcrumb_categories: row.get(19)?,
            category_tags: row.get(20)?,
            translations: BTreeMap::new(),
        },
    ))
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(4)?).unwrap_or(RunStatus::Running),
        report: row.get(5)?,
        error_message: row.get(6)?,
    })
}

impl ProductStore for SqliteStorage {
    // ===== Products =====

    fn diff(&self, batch: Vec<EnrichedProduct>) -> StorageResult<DiffSplit> {
        let mut split = DiffSplit::default();
        for product in batch {
            if self.exists(product.product_id)? {
                split.existing.push(product);
            } else {
                split.new.push(product);
            }
        }
        Ok(split)
    }

    fn upsert(&mut self, records: &[StoredRecord]) -> StorageResult<usize> {
        let tx = self.conn.transaction()?;
        let mut written = 0;

        for record in records {
            match Self::write_record(&tx, record) {
                Ok(()) => written += 1,
                Err(e) => {
                    tracing::warn!(product_id = record.product_id, error = %e, "Row rejected by store");
                }
            }
        }

        tx.commit()?;
        tracing::debug!(written, total = records.len(), "Upsert committed");
        Ok(written)
    }

    fn all(&self) -> StorageResult<Vec<StoredRecord>> {
        let mut translations = self.load_translations()?;
        let mut stmt = self.conn.prepare(SELECT_PRODUCTS_SQL)?;

        let rows = stmt.query_map([], record_from_row)?;
        let mut records = Vec::new();
        for row in rows {
            let (id, mut record) = row?;
            if let Some(text) = translations.remove(&id) {
                record.translations = text;
            }
            records.push(record);
        }

        Ok(records)
    }

    fn count(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM products", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn complete_run(&mut self, run_id: i64, report_json: &str) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let changed = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, report = ?3 WHERE id = ?4",
            params![RunStatus::Completed.to_db_string(), now, report_json, run_id],
        )?;
        if changed == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn fail_run(&mut self, run_id: i64, message: &str) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let changed = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, error_message = ?3 WHERE id = ?4",
            params![RunStatus::Failed.to_db_string(), now, message, run_id],
        )?;
        if changed == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                "SELECT id, started_at, finished_at, config_hash, status, report, error_message
                 FROM runs ORDER BY id DESC LIMIT 1",
                [],
                run_from_row,
            )
            .optional()?;
        Ok(run)
    }
}
