//! Secondary-language descriptions
//!
//! The translation site serves each product at a URL keyed by the
//! zero-padded 8-digit identifier. The language is chosen by a session
//! cookie, so every locale gets its own cookie-holding client, primed once
//! by visiting the locale switch page.

use crate::config::{Config, TranslationConfig};
use crate::model::LocalizedDescription;
use crate::source::html::{selector, trimmed_text};
use crate::source::{build_http_client, RetryPolicy, Transport};
use crate::{HarvestError, TranslationError};
use async_trait::async_trait;
use scraper::Html;
use std::collections::HashMap;
use std::time::Duration;

/// Fetches description fields of one product in one locale
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(
        &self,
        product_id: u64,
        locale: &str,
    ) -> Result<LocalizedDescription, TranslationError>;
}

/// `Translator` backed by the localized product pages of the translation site
pub struct MarketTranslator {
    base_url: String,
    sessions: HashMap<String, Transport>,
}

impl MarketTranslator {
    /// Builds one session per configured locale and primes it
    ///
    /// A session whose priming request fails is kept; its pages may come back
    /// in the site's default language, which the caller cannot tell apart.
    pub async fn connect(config: &Config) -> Result<Self, HarvestError> {
        let TranslationConfig { base_url, locales } = &config.translation;
        let base_url = base_url.trim_end_matches('/').to_string();
        let mut sessions = HashMap::new();

        for locale in locales {
            let client = build_http_client(&config.user_agent, true)?;
            let transport = Transport::new(
                client,
                RetryPolicy::new(config.retry.max_retries, config.retry.backoff_base_ms),
                Duration::from_millis(config.timeouts.lookup_ms),
            );

            let switch_url = format!("{}/locale/{}", base_url, locale);
            if let Err(e) = transport.get_text(&switch_url).await {
                tracing::warn!(locale = %locale, error = %e, "Failed to prime translation session");
            }
            sessions.insert(locale.clone(), transport);
        }

        Ok(Self { base_url, sessions })
    }

    pub fn product_url(&self, product_id: u64) -> String {
        format!("{}/product/{:08}", self.base_url, product_id)
    }
}

#[async_trait]
impl Translator for MarketTranslator {
    async fn translate(
        &self,
        product_id: u64,
        locale: &str,
    ) -> Result<LocalizedDescription, TranslationError> {
        let transport = self.sessions.get(locale).ok_or_else(|| TranslationError::Parse {
            locale: locale.to_string(),
            product_id,
            message: "no session for locale".to_string(),
        })?;

        let html = transport
            .get_text(&self.product_url(product_id))
            .await
            .map_err(|source| TranslationError::Fetch {
                locale: locale.to_string(),
                product_id,
                source,
            })?;

        parse_translation_page(&html).map_err(|message| TranslationError::Parse {
            locale: locale.to_string(),
            product_id,
            message,
        })
    }
}

/// Reads the short and long description from a localized product page
///
/// A page carrying neither is an error; a page carrying one leaves the other
/// empty.
pub fn parse_translation_page(html: &str) -> Result<LocalizedDescription, String> {
    let document = Html::parse_document(html);
    let short = selector("div.product__info p").map_err(|e| e.to_string())?;
    let long = selector("div.product__description").map_err(|e| e.to_string())?;

    let description = document.select(&short).next().and_then(|e| trimmed_text(&e));
    let long_description = document.select(&long).next().and_then(|e| trimmed_text(&e));

    if description.is_none() && long_description.is_none() {
        return Err("page has no description block".to_string());
    }

    Ok(LocalizedDescription::new(
        description.unwrap_or_default(),
        long_description.unwrap_or_default(),
    ))
}
