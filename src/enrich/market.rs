//! Secondary-market price lookup
//!
//! The secondary market serves the same product pages under a different
//! locale segment. Its price block splits the amount into an integer part
//! (with `.` thousands separators) and a decimal part prefixed by a comma.

use crate::source::html::{element_text, selector};
use scraper::Html;

/// Swaps the source locale segment of a product URL for the market's
///
/// Returns `None` when the URL does not contain `/{source_locale}/`.
pub fn market_url(product_url: &str, source_locale: &str, market_locale: &str) -> Option<String> {
    let from = format!("/{}/", source_locale.trim_matches('/'));
    let to = format!("/{}/", market_locale.trim_matches('/'));
    product_url
        .contains(&from)
        .then(|| product_url.replacen(&from, &to, 1))
}

/// Reads the price block of a market product page
///
/// A missing price block yields `None`. Inside the block, an integer or
/// decimal part that cannot be read counts as zero.
pub fn parse_market_price(html: &str) -> Option<f64> {
    let document = Html::parse_document(html);
    let block_selector = selector("div.pip-temp-price-module__price").ok()?;
    let integer_selector = selector("span.pip-temp-price__integer").ok()?;
    let decimal_selector = selector("span.pip-temp-price__decimal").ok()?;

    let block = document.select(&block_selector).next()?;

    let integer = block
        .select(&integer_selector)
        .next()
        .and_then(|span| element_text(&span).trim().replace('.', "").parse::<i64>().ok())
        .unwrap_or(0);

    let decimal = block
        .select(&decimal_selector)
        .next()
        .and_then(|span| {
            let text = element_text(&span);
            let digits: String = text.trim().chars().skip(1).collect();
            digits.parse::<i64>().ok()
        })
        .unwrap_or(0);

    Some(integer as f64 + decimal as f64 / 100.0)
}
