//! Small helpers over `scraper` shared by the page parsers

use crate::ParseError;
use scraper::{ElementRef, Selector};

/// Compiles a CSS selector, reporting failures as a structural parse error
pub(crate) fn selector(css: &str) -> Result<Selector, ParseError> {
    Selector::parse(css).map_err(|e| ParseError::Structure {
        context: format!("selector '{}'", css),
        message: e.to_string(),
    })
}

/// Concatenated text of an element and its descendants
pub(crate) fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>()
}

/// Trimmed text of an element, `None` when blank
pub(crate) fn trimmed_text(element: &ElementRef<'_>) -> Option<String> {
    let text = element_text(element);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
