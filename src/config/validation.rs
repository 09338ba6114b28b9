use crate::config::types::{
    Config, CrawlerConfig, OutputConfig, PricingConfig, RetryConfig, SourceConfig, TimeoutConfig,
    TranslationConfig, UserAgentConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_source_config(&config.source)?;
    validate_locale_path("market.locale-path", &config.market.locale_path)?;
    validate_crawler_config(&config.crawler)?;
    validate_retry_config(&config.retry)?;
    validate_timeout_config(&config.timeouts)?;
    validate_pricing_config(&config.pricing)?;
    validate_translation_config(&config.translation)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

fn validate_source_config(config: &SourceConfig) -> Result<(), ConfigError> {
    validate_http_url("category-menu-url", &config.category_menu_url)?;
    validate_http_url("listing-url", &config.listing_url)?;

    if !config.category_tags_url.contains("{product_id}") {
        return Err(ConfigError::Validation(format!(
            "category-tags-url must contain a {{product_id}} placeholder, got '{}'",
            config.category_tags_url
        )));
    }
    validate_http_url(
        "category-tags-url",
        &config.category_tags_url.replace("{product_id}", "0"),
    )?;

    validate_locale_path("source.locale-path", &config.locale_path)
}

fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.page_size < 1 {
        return Err(ConfigError::Validation(
            "page-size must be >= 1".to_string(),
        ));
    }

    if config.max_concurrent_enrichments < 1 || config.max_concurrent_enrichments > 500 {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-enrichments must be between 1 and 500, got {}",
            config.max_concurrent_enrichments
        )));
    }

    if config.max_products == Some(0) {
        return Err(ConfigError::Validation(
            "max-products must be >= 1 when set".to_string(),
        ));
    }

    if config.fulfillment_store.trim().is_empty() {
        return Err(ConfigError::Validation(
            "fulfillment-store cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_retry_config(config: &RetryConfig) -> Result<(), ConfigError> {
    if config.max_retries > 20 {
        return Err(ConfigError::Validation(format!(
            "max-retries must be <= 20, got {}",
            config.max_retries
        )));
    }
    Ok(())
}

fn validate_timeout_config(config: &TimeoutConfig) -> Result<(), ConfigError> {
    if config.lookup_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "lookup-ms must be >= 100ms, got {}ms",
            config.lookup_ms
        )));
    }
    if config.listing_ms < 100 {
        return Err(ConfigError::Validation(format!(
            "listing-ms must be >= 100ms, got {}ms",
            config.listing_ms
        )));
    }
    Ok(())
}

fn validate_pricing_config(config: &PricingConfig) -> Result<(), ConfigError> {
    if !config.multiplier.is_finite() || config.multiplier <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "pricing multiplier must be positive, got {}",
            config.multiplier
        )));
    }
    if !config.divisor.is_finite() || config.divisor <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "pricing divisor must be positive, got {}",
            config.divisor
        )));
    }
    Ok(())
}

fn validate_translation_config(config: &TranslationConfig) -> Result<(), ConfigError> {
    validate_http_url("translation base-url", &config.base_url)?;

    if config.locales.len() < 2 {
        return Err(ConfigError::Validation(format!(
            "at least two translation locales are required, got {}",
            config.locales.len()
        )));
    }

    for (i, locale) in config.locales.iter().enumerate() {
        if locale.is_empty() || !locale.chars().all(|c| c.is_ascii_alphabetic() || c == '-') {
            return Err(ConfigError::Validation(format!(
                "Invalid translation locale '{}'",
                locale
            )));
        }
        if config.locales[..i].contains(locale) {
            return Err(ConfigError::Validation(format!(
                "Duplicate translation locale '{}'",
                locale
            )));
        }
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if config.summary_path.is_empty() {
        return Err(ConfigError::Validation(
            "summary_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::Validation(format!(
            "{} must use http or https, got '{}'",
            field, other
        ))),
    }
}

/// A locale path is two slash-separated segments, e.g. `rs/sr`
fn validate_locale_path(field: &str, value: &str) -> Result<(), ConfigError> {
    let segments: Vec<&str> = value.split('/').collect();
    let well_formed = segments.len() == 2
        && segments
            .iter()
            .all(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric()));

    if !well_formed {
        return Err(ConfigError::Validation(format!(
            "{} must look like 'xx/yy', got '{}'",
            field, value
        )));
    }
    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !parts[1].contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
