//! Category navigation menu parser
//!
//! Every `<nav>` in the menu page is one top-level category, named by the text
//! of its first `<span>`. Its subcategories are the `li > a` links; the link's
//! `data-tracking-label` attribute is the subcategory id and the link text is
//! its display name. The catch-all link labelled `all` is skipped.

use super::html::{selector, trimmed_text};
use crate::model::CategoryTree;
use crate::ParseError;
use scraper::Html;

const CATCH_ALL_LABEL: &str = "all";

/// Parses the navigation menu into a two-level category tree
///
/// # Returns
///
/// * `Ok(CategoryTree)` - At least one top-level category was found
/// * `Err(ParseError)` - The page holds no recognisable navigation structure
pub fn parse_category_menu(html: &str) -> Result<CategoryTree, ParseError> {
    let document = Html::parse_document(html);
    let nav_selector = selector("nav")?;
    let span_selector = selector("span")?;
    let link_selector = selector("li > a")?;

    let mut tree = CategoryTree::new();

    for nav in document.select(&nav_selector) {
        let Some(name) = nav.select(&span_selector).next().and_then(|s| trimmed_text(&s)) else {
            tracing::debug!("Skipping navigation block without a title span");
            continue;
        };

        let index = tree.push_category(&name);

        for link in nav.select(&link_selector) {
            let Some(id) = link.value().attr("data-tracking-label") else {
                continue;
            };
            if id.is_empty() || id == CATCH_ALL_LABEL {
                continue;
            }
            let sub_name = trimmed_text(&link).unwrap_or_else(|| id.to_string());
            tree.push_subcategory(index, id, &sub_name);
        }
    }

    if tree.is_empty() {
        return Err(ParseError::Structure {
            context: "category menu".to_string(),
            message: "no <nav> category blocks found".to_string(),
        });
    }

    tracing::debug!(
        categories = tree.categories().len(),
        subcategories = tree.subcategory_count(),
        "Parsed category menu"
    );

    Ok(tree)
}
