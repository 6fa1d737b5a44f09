use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::utils::text::collapse_whitespace;

/// Tries each selector in priority order and returns the matches of the first
/// one that yields anything. Markup drift degrades to an empty result.
pub fn select_cards<'a>(document: &'a Html, strategies: &[&str]) -> Vec<ElementRef<'a>> {
    for raw in strategies {
        let Ok(selector) = Selector::parse(raw) else {
            continue;
        };
        let cards: Vec<ElementRef<'a>> = document.select(&selector).collect();
        if !cards.is_empty() {
            debug!(selector = *raw, count = cards.len(), "card selector matched");
            return cards;
        }
    }
    Vec::new()
}

pub fn first_element<'a>(element: &ElementRef<'a>, selector: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(selector).ok()?;
    element.select(&selector).next()
}

pub fn element_text(element: &ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

pub fn first_text(element: &ElementRef<'_>, selector: &str) -> Option<String> {
    first_element(element, selector)
        .map(|el| element_text(&el))
        .filter(|text| !text.is_empty())
}

pub fn attr(element: &ElementRef<'_>, name: &str) -> Option<String> {
    element
        .value()
        .attr(name)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
