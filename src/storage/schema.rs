//! Database schema definitions
//!
//! One row per product in `products`, keyed by the product identifier.
//! Localized descriptions live in `product_translations`, one row per
//! product and locale.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track crawl cycles
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL,
    report TEXT,
    error_message TEXT
);

CREATE TABLE IF NOT EXISTS products (
    product_id INTEGER PRIMARY KEY,
    product_name TEXT NOT NULL,
    product_description TEXT NOT NULL,
    product_long_description TEXT,
    main_image_url TEXT,
    other_image_urls TEXT NOT NULL DEFAULT '[]',
    product_url TEXT NOT NULL,
    price INTEGER,
    price_rs REAL,
    price_hr REAL,
    availability INTEGER NOT NULL DEFAULT 0,
    num_of_packages INTEGER,
    multi_pack INTEGER NOT NULL DEFAULT 0,
    product_parts TEXT NOT NULL DEFAULT '[]',
    sum_volume REAL,
    sum_weight REAL,
    materials TEXT,
    max_dimension REAL,
    modified_date TEXT NOT NULL,
    breadcrumb_categories TEXT NOT NULL DEFAULT '[]',
    category_tags TEXT NOT NULL DEFAULT '[]'
);

CREATE TABLE IF NOT EXISTS product_translations (
    product_id INTEGER NOT NULL REFERENCES products(product_id) ON DELETE CASCADE,
    locale TEXT NOT NULL,
    description TEXT NOT NULL,
    long_description TEXT NOT NULL,
    PRIMARY KEY (product_id, locale)
);

CREATE INDEX IF NOT EXISTS idx_translations_product ON product_translations(product_id);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
