use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Each crawl run records this hash so that runs can be traced back to the
/// configuration that produced them.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL: &str = r#"
[source]
category-menu-url = "https://shop.example.com/rs/sr/cat/"
listing-url = "https://shop.example.com/listing/more-products"
category-tags-url = "https://api.example.com/statics/{product_id}"

[translation]
base-url = "https://translate.example.com"

[user-agent]
crawler-name = "TestHarvester"
crawler-version = "1.0"
contact-url = "https://example.com/about"
contact-email = "admin@example.com"

[output]
database-path = "./test.db"
summary-path = "./summary.md"
"#;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_minimal_config_applies_defaults() {
        let file = create_temp_config(MINIMAL);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawler.page_size, 1000);
        assert!(config.crawler.concurrent);
        assert_eq!(config.crawler.max_concurrent_enrichments, 100);
        assert_eq!(config.crawler.max_products, None);
        assert_eq!(
            config.crawler.excluded_subcategories,
            vec!["Restoran i Bistro".to_string()]
        );
        assert_eq!(config.crawler.fulfillment_store, "Beograd");
        assert_eq!(config.retry.max_retries, 5);
        assert_eq!(config.retry.backoff_base_ms, 100);
        assert_eq!(config.timeouts.lookup_ms, 10_000);
        assert_eq!(config.timeouts.listing_ms, 60_000);
        assert_eq!(config.pricing.multiplier, 1.44);
        assert_eq!(config.pricing.divisor, 117.0);
        assert_eq!(config.translation.locales, vec!["ru", "en"]);
        assert_eq!(config.source.locale_path, "rs/sr");
        assert_eq!(config.market.locale_path, "hr/hr");
    }

    #[test]
    fn test_listing_params_and_overrides() {
        let content = format!(
            "{}\n[crawler]\nmax-products = 50\nconcurrent = false\n",
            MINIMAL.replace(
                "[translation]",
                "[source.listing-params]\nstore = \"050\"\nzip = \"11000\"\n\n[translation]"
            )
        );
        let config = parse_config(&content).unwrap();

        assert_eq!(config.crawler.max_products, Some(50));
        assert!(!config.crawler.concurrent);
        assert_eq!(
            config.source.listing_params.get("store").map(String::as_str),
            Some("050")
        );
        assert_eq!(config.source.listing_params.len(), 2);
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/harvest.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let content = format!("{}\n[crawler]\nmax-concurrent-enrichments = 0\n", MINIMAL);
        let file = create_temp_config(&content);
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_compute_config_hash() {
        let file = create_temp_config(MINIMAL);

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_different_content_different_hash() {
        let file1 = create_temp_config("content 1");
        let file2 = create_temp_config("content 2");

        let hash1 = compute_config_hash(file1.path()).unwrap();
        let hash2 = compute_config_hash(file2.path()).unwrap();

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_load_config_with_hash() {
        let file = create_temp_config(MINIMAL);
        let (config, hash) = load_config_with_hash(file.path()).unwrap();
        assert_eq!(config.output.database_path, "./test.db");
        assert_eq!(hash, compute_config_hash(file.path()).unwrap());
    }
}
